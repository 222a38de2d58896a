//! Error types for naily-server.

use thiserror::Error;

use crate::server::ServerState;

/// Error surface for the server lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// `run` was called on a server that is not idle.
    #[error("server cannot start from state {state}")]
    AlreadyStarted { state: ServerState },

    /// The tokio runtime behind `start_blocking` could not be built.
    #[error("failed to build tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// Installing the ctrl-c listener failed.
    #[error("ctrl-c handler failed: {0}")]
    Signal(#[source] std::io::Error),
}
