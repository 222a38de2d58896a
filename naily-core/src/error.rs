//! Error types for naily-core.

use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

/// Error type returned by subsystem loaders.
pub type LoadError = Box<dyn StdError + Send + Sync + 'static>;

/// Failures surfaced by [`Namespace::resolve`](crate::Namespace::resolve).
///
/// Cloneable so a cached load failure can be handed to every later caller.
#[derive(Debug, Clone, Error)]
pub enum ResolutionError {
    /// No binding is declared under this name.
    #[error("unknown subsystem '{name}'")]
    UnknownSubsystem { name: String },

    /// The loader for this binding returned an error or panicked.
    #[error("failed to load subsystem '{name}': {source}")]
    LoadFailed {
        name: &'static str,
        #[source]
        source: Arc<dyn StdError + Send + Sync + 'static>,
    },

    /// A loader asked for a binding that its own thread is still loading.
    #[error("subsystem '{name}' was referenced while it was loading (dependency cycle)")]
    Cycle { name: &'static str },

    /// The binding resolved, but not to the requested type.
    #[error("subsystem '{name}' is not a {expected}")]
    UnexpectedType {
        name: &'static str,
        expected: &'static str,
    },
}

impl ResolutionError {
    pub(crate) fn load_failed(name: &'static str, source: LoadError) -> Self {
        ResolutionError::LoadFailed {
            name,
            source: Arc::from(source),
        }
    }
}

/// A loader panicked instead of returning.
#[derive(Debug, Error)]
#[error("loader panicked: {message}")]
pub struct LoadPanic {
    pub message: String,
}
