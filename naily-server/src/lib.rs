//! naily-server — the `Server` subsystem: worker lifecycle shell.

mod error;
pub mod server;

use naily_core::{LoadContext, LoadError};

pub use error::ServerError;
pub use server::{Server, ServerState, StopReason};

/// Name of the deferred binding this crate provides.
pub const BINDING: &str = "Server";

/// Binding initializer. The server shares the namespace's logger slot.
pub fn load_subsystem(ctx: &LoadContext) -> Result<Server, LoadError> {
    let server = Server::new(ctx.logger_slot());
    ctx.logger()
        .in_scope(|| tracing::debug!(name = ctx.name(), "server subsystem initialised"));
    Ok(server)
}
