//! Worker lifecycle: `Idle → Running → Stopped`.
//!
//! The server owns no protocol. `run` marks it running, waits for either an
//! explicit [`Server::shutdown`] or ctrl-c, then marks it stopped.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use naily_core::LoggerSlot;
use tokio::sync::watch;

use crate::error::ServerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Idle,
    Running,
    Stopped,
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ServerState::Idle => "idle",
            ServerState::Running => "running",
            ServerState::Stopped => "stopped",
        };
        f.write_str(label)
    }
}

/// How a `run` call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Requested,
    Interrupted,
}

pub struct Server {
    logger: Arc<LoggerSlot>,
    state: Mutex<ServerState>,
    shutdown: watch::Sender<bool>,
}

impl Server {
    /// `logger` is read on every log call, so later `set_logger` calls apply.
    pub fn new(logger: Arc<LoggerSlot>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            logger,
            state: Mutex::new(ServerState::Idle),
            shutdown,
        }
    }

    pub fn state(&self) -> ServerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ask a running (or not yet started) server to stop.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Run until shutdown is requested or the process receives ctrl-c.
    pub async fn run(&self) -> Result<StopReason, ServerError> {
        self.transition(ServerState::Idle, ServerState::Running)?;
        self.logger
            .get()
            .in_scope(|| tracing::info!("server started"));

        let reason = tokio::select! {
            _ = shutdown_requested(self.shutdown.subscribe()) => StopReason::Requested,
            signal = tokio::signal::ctrl_c() => {
                if let Err(err) = signal {
                    self.set_state(ServerState::Stopped);
                    return Err(ServerError::Signal(err));
                }
                self.logger
                    .get()
                    .in_scope(|| tracing::info!("received ctrl-c, shutting down server"));
                StopReason::Interrupted
            }
        };

        self.set_state(ServerState::Stopped);
        self.logger
            .get()
            .in_scope(|| tracing::info!(reason = ?reason, "server stopped"));
        Ok(reason)
    }

    /// Build a multi-thread runtime and block the current thread on [`Server::run`].
    pub fn start_blocking(&self) -> Result<StopReason, ServerError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(ServerError::Runtime)?;
        runtime.block_on(self.run())
    }

    fn transition(&self, from: ServerState, to: ServerState) -> Result<(), ServerError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != from {
            return Err(ServerError::AlreadyStarted { state: *state });
        }
        *state = to;
        Ok(())
    }

    fn set_state(&self, to: ServerState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = to;
    }
}

async fn shutdown_requested(mut rx: watch::Receiver<bool>) {
    // The sender is owned by the server, so the channel stays open while `run` is pending.
    let _ = rx.wait_for(|stop| *stop).await;
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
