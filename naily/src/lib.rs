//! naily — bootstrap namespace of the orchestration worker.
//!
//! One process-wide [`Namespace`] holds the logger and two deferred
//! bindings, `Config` and `Server`. Neither subsystem is initialised until it
//! is first resolved, and each is initialised at most once.
//!
//! ```no_run
//! let config = naily::config()?;
//! naily::get_logger().in_scope(|| tracing::info!(settings = config.len(), "ready"));
//! # Ok::<(), naily::ResolutionError>(())
//! ```

use std::sync::{Arc, OnceLock};

pub use naily_config::Config;
pub use naily_core::{
    BindingState, LoggerHandle, Namespace, ResolutionError, SubsystemHandle,
};
pub use naily_server::Server;

/// Worker version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

static NAMESPACE: OnceLock<Namespace> = OnceLock::new();

/// The process-wide namespace, declared on first use.
pub fn namespace() -> &'static Namespace {
    NAMESPACE.get_or_init(declare)
}

/// A fresh namespace with the standard bindings. The process-wide instance
/// is built with this; tests use it to get an isolated copy.
pub fn declare() -> Namespace {
    Namespace::builder()
        .bind(naily_config::BINDING, naily_config::load_subsystem)
        .bind(naily_server::BINDING, naily_server::load_subsystem)
        .build()
}

/// Current process-wide logger; stdout by default.
pub fn get_logger() -> LoggerHandle {
    namespace().get_logger()
}

/// Replace the process-wide logger for all subsequent [`get_logger`] calls.
pub fn set_logger(handle: LoggerHandle) {
    namespace().set_logger(handle);
}

pub fn resolve(name: &str) -> Result<SubsystemHandle, ResolutionError> {
    namespace().resolve(name)
}

pub fn config() -> Result<Arc<Config>, ResolutionError> {
    namespace().resolve_as(naily_config::BINDING)
}

pub fn server() -> Result<Arc<Server>, ResolutionError> {
    namespace().resolve_as(naily_server::BINDING)
}
