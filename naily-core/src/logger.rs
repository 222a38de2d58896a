//! Process-wide logger handle and the slot that owns it.
//!
//! A [`LoggerHandle`] wraps a `tracing` dispatcher. The [`LoggerSlot`] holds
//! the current handle and builds the stdout default on first read.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::Dispatch;
use tracing_subscriber::{fmt as tracing_fmt, EnvFilter};

/// Shared handle to one log sink. Clones refer to the same sink.
#[derive(Clone)]
pub struct LoggerHandle {
    dispatch: Arc<Dispatch>,
}

impl LoggerHandle {
    /// Default sink: human-readable lines on standard output, filtered by
    /// `RUST_LOG` (falls back to `info`).
    pub fn stdout() -> Self {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = tracing_fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stdout)
            .finish();
        Self::from_subscriber(subscriber)
    }

    pub fn from_subscriber<S>(subscriber: S) -> Self
    where
        S: tracing::Subscriber + Send + Sync + 'static,
    {
        Self::from_dispatch(Dispatch::new(subscriber))
    }

    pub fn from_dispatch(dispatch: Dispatch) -> Self {
        Self {
            dispatch: Arc::new(dispatch),
        }
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Run `f` with this handle as the thread's default `tracing` dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// `true` when both handles refer to the same underlying sink.
    pub fn same_as(&self, other: &LoggerHandle) -> bool {
        Arc::ptr_eq(&self.dispatch, &other.dispatch)
    }
}

impl fmt::Debug for LoggerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerHandle")
            .field("sink", &Arc::as_ptr(&self.dispatch))
            .finish()
    }
}

/// Holder of "the" logger for a namespace.
///
/// `get` is get-or-create: racing first reads build at most one default.
#[derive(Default)]
pub struct LoggerSlot {
    current: RwLock<Option<LoggerHandle>>,
}

impl LoggerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot that starts out holding `handle` instead of the stdout default.
    pub fn with_logger(handle: LoggerHandle) -> Self {
        Self {
            current: RwLock::new(Some(handle)),
        }
    }

    pub fn get(&self) -> LoggerHandle {
        if let Some(handle) = self
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return handle.clone();
        }

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have filled the slot between the two locks.
        current.get_or_insert_with(LoggerHandle::stdout).clone()
    }

    /// Replace the logger for every subsequent `get`. No validation.
    pub fn set(&self, handle: LoggerHandle) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    /// `true` once a logger has been set or lazily created.
    pub fn is_initialized(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl fmt::Debug for LoggerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerSlot")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
