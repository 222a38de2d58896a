//! `naily start` — run the worker in the foreground.

use anyhow::{Context, Result};

pub fn run() -> Result<()> {
    let server = naily::server().context("failed to resolve Server")?;
    naily::get_logger()
        .in_scope(|| tracing::info!(version = naily::VERSION, "naily worker starting"));
    server.start_blocking().context("server exited with error")?;
    Ok(())
}
