//! naily-config — the `Config` subsystem.
//!
//! Resolved lazily through the bootstrap namespace; see [`load_subsystem`].

pub mod error;
pub mod settings;

use naily_core::{LoadContext, LoadError};

pub use error::ConfigError;
pub use settings::{default_path_at, Config, ConfigLocation, CONFIG_ENV};

/// Name of the deferred binding this crate provides.
pub const BINDING: &str = "Config";

/// Binding initializer: load settings from the environment-derived location.
pub fn load_subsystem(ctx: &LoadContext) -> Result<Config, LoadError> {
    load_from(ctx, ConfigLocation::from_env()?)
}

/// Binding initializer for a fixed location.
pub fn loader_at(
    location: ConfigLocation,
) -> impl Fn(&LoadContext) -> Result<Config, LoadError> + Send + Sync + 'static {
    move |ctx: &LoadContext| load_from(ctx, location.clone())
}

fn load_from(ctx: &LoadContext, location: ConfigLocation) -> Result<Config, LoadError> {
    let logger = ctx.logger();
    let config = location.load().map_err(|err| {
        logger.in_scope(|| {
            tracing::error!(path = %location.path().display(), error = %err, "config load failed")
        });
        err
    })?;
    logger.in_scope(|| match config.source() {
        Some(path) => tracing::info!(path = %path.display(), settings = config.len(), "config loaded"),
        None => tracing::info!(path = %location.path().display(), "no config file, using defaults"),
    });
    Ok(config)
}
