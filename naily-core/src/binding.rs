//! Deferred bindings: named subsystems resolved on first reference.
//!
//! Each [`Binding`] carries a loader and a [`BindingState`]. The first
//! `resolve` flips the state to `Resolving`, runs the loader outside the lock
//! and publishes either the handle or the failure. Callers arriving while a
//! load is in flight wait on the binding's condition variable. A loader that
//! resolves its own binding, directly or through other bindings, gets
//! [`ResolutionError::Cycle`] instead of waiting on itself.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use crate::error::{LoadError, LoadPanic, ResolutionError};
use crate::logger::{LoggerHandle, LoggerSlot};

/// Type-erased subsystem instance produced by a loader.
pub type SubsystemObject = Arc<dyn Any + Send + Sync>;

/// One-shot initializer for a binding.
pub type Loader = Arc<dyn Fn(&LoadContext) -> Result<SubsystemObject, LoadError> + Send + Sync>;

/// Wrap a typed initializer as a [`Loader`].
pub fn loader<F, T>(init: F) -> Loader
where
    F: Fn(&LoadContext) -> Result<T, LoadError> + Send + Sync + 'static,
    T: Any + Send + Sync,
{
    Arc::new(move |ctx: &LoadContext| -> Result<SubsystemObject, LoadError> {
        init(ctx).map(|subsystem| Arc::new(subsystem) as SubsystemObject)
    })
}

/// Observable lifecycle of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    Unresolved,
    Resolving,
    Resolved,
    Failed,
}

impl fmt::Display for BindingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BindingState::Unresolved => "unresolved",
            BindingState::Resolving => "resolving",
            BindingState::Resolved => "resolved",
            BindingState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// What a loader gets to see while it builds its subsystem.
#[derive(Debug, Clone)]
pub struct LoadContext {
    name: &'static str,
    logger: Arc<LoggerSlot>,
}

impl LoadContext {
    pub(crate) fn new(name: &'static str, logger: Arc<LoggerSlot>) -> Self {
        Self { name, logger }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current namespace logger.
    pub fn logger(&self) -> LoggerHandle {
        self.logger.get()
    }

    /// The namespace's logger slot, for subsystems that log after loading
    /// and must follow later `set_logger` calls.
    pub fn logger_slot(&self) -> Arc<LoggerSlot> {
        Arc::clone(&self.logger)
    }
}

/// A resolved subsystem.
#[derive(Clone)]
pub struct SubsystemHandle {
    name: &'static str,
    object: SubsystemObject,
}

impl SubsystemHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Recover the concrete subsystem type.
    pub fn downcast<T>(&self) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        Arc::clone(&self.object).downcast::<T>().ok()
    }

    pub fn same_as(&self, other: &SubsystemHandle) -> bool {
        Arc::ptr_eq(&self.object, &other.object)
    }
}

impl fmt::Debug for SubsystemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubsystemHandle")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

enum Slot {
    Unresolved,
    /// Holds the thread running the loader.
    Resolving(ThreadId),
    Resolved(SubsystemHandle),
    Failed(ResolutionError),
}

impl Slot {
    fn state(&self) -> BindingState {
        match self {
            Slot::Unresolved => BindingState::Unresolved,
            Slot::Resolving(_) => BindingState::Resolving,
            Slot::Resolved(_) => BindingState::Resolved,
            Slot::Failed(_) => BindingState::Failed,
        }
    }
}

/// A named subsystem and its resolution state.
pub struct Binding {
    name: &'static str,
    loader: Loader,
    slot: Mutex<Slot>,
    settled: Condvar,
}

impl Binding {
    pub fn new(name: &'static str, loader: Loader) -> Self {
        Self {
            name,
            loader,
            slot: Mutex::new(Slot::Unresolved),
            settled: Condvar::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> BindingState {
        self.lock().state()
    }

    /// Resolve the binding, running the loader only if nobody has before.
    pub fn resolve(&self, logger: &Arc<LoggerSlot>) -> Result<SubsystemHandle, ResolutionError> {
        let mut slot = self.lock();
        loop {
            match &*slot {
                Slot::Resolved(handle) => return Ok(handle.clone()),
                Slot::Failed(err) => return Err(err.clone()),
                Slot::Unresolved => break,
                Slot::Resolving(loader) if *loader == thread::current().id() => {
                    return Err(ResolutionError::Cycle { name: self.name });
                }
                Slot::Resolving(_) => {}
            }
            slot = self
                .settled
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *slot = Slot::Resolving(thread::current().id());
        drop(slot);

        let log = logger.get();
        log.in_scope(|| tracing::debug!(name = self.name, "resolving subsystem"));

        let ctx = LoadContext::new(self.name, Arc::clone(logger));
        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| (self.loader)(&ctx))) {
            Ok(Ok(object)) => Ok(SubsystemHandle {
                name: self.name,
                object,
            }),
            Ok(Err(err)) => Err(ResolutionError::load_failed(self.name, err)),
            Err(payload) => Err(ResolutionError::load_failed(
                self.name,
                Box::new(LoadPanic {
                    message: panic_message(payload.as_ref()),
                }),
            )),
        };

        let mut slot = self.lock();
        *slot = match &outcome {
            Ok(handle) => {
                log.in_scope(|| tracing::info!(name = self.name, "subsystem resolved"));
                Slot::Resolved(handle.clone())
            }
            Err(err) => {
                log.in_scope(|| tracing::error!(name = self.name, error = %err, "subsystem failed to load"));
                Slot::Failed(err.clone())
            }
        };
        drop(slot);
        self.settled.notify_all();
        outcome
    }

    /// Return a `Failed` binding to `Unresolved`. Returns `true` if the state
    /// changed; bindings in any other state are left alone.
    pub fn reset(&self) -> bool {
        let mut slot = self.lock();
        if matches!(*slot, Slot::Failed(_)) {
            *slot = Slot::Unresolved;
            true
        } else {
            false
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::Dispatch;

    fn quiet_slot() -> Arc<LoggerSlot> {
        Arc::new(LoggerSlot::with_logger(LoggerHandle::from_dispatch(
            Dispatch::none(),
        )))
    }

    fn counting_loader(count: Arc<AtomicUsize>) -> Loader {
        loader(move |_ctx: &LoadContext| -> Result<u32, LoadError> {
            count.fetch_add(1, Ordering::SeqCst);
            Ok(42)
        })
    }

    #[test]
    fn state_moves_from_unresolved_to_resolved() {
        let count = Arc::new(AtomicUsize::new(0));
        let binding = Binding::new("Thing", counting_loader(count.clone()));
        assert_eq!(binding.state(), BindingState::Unresolved);

        let handle = binding.resolve(&quiet_slot()).unwrap();
        assert_eq!(binding.state(), BindingState::Resolved);
        assert_eq!(handle.name(), "Thing");
        assert_eq!(*handle.downcast::<u32>().unwrap(), 42);
        assert!(handle.downcast::<String>().is_none());
    }

    #[test]
    fn failed_load_is_cached_until_reset() {
        let count = Arc::new(AtomicUsize::new(0));
        let calls = count.clone();
        let binding = Binding::new(
            "Broken",
            loader(move |_ctx: &LoadContext| -> Result<(), LoadError> {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("missing definition".into())
            }),
        );
        let logger = quiet_slot();

        let first = binding.resolve(&logger).unwrap_err();
        let second = binding.resolve(&logger).unwrap_err();
        assert_eq!(count.load(Ordering::SeqCst), 1, "failure must not be retried");
        assert_eq!(binding.state(), BindingState::Failed);
        assert!(first.to_string().contains("missing definition"));
        assert_eq!(first.to_string(), second.to_string());

        assert!(binding.reset());
        assert_eq!(binding.state(), BindingState::Unresolved);
        let _ = binding.resolve(&logger);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn reset_leaves_resolved_binding_alone() {
        let binding = Binding::new("Thing", counting_loader(Arc::new(AtomicUsize::new(0))));
        binding.resolve(&quiet_slot()).unwrap();
        assert!(!binding.reset());
        assert_eq!(binding.state(), BindingState::Resolved);
    }

    #[test]
    fn panicking_loader_becomes_load_failure() {
        let binding = Binding::new(
            "Explodes",
            loader(|_ctx: &LoadContext| -> Result<(), LoadError> { panic!("boom during init") }),
        );

        let err = binding.resolve(&quiet_slot()).unwrap_err();
        assert!(matches!(err, ResolutionError::LoadFailed { name: "Explodes", .. }));
        assert!(err.to_string().contains("boom during init"), "got: {err}");
        assert_eq!(binding.state(), BindingState::Failed);
    }

    #[test]
    fn loader_sees_its_name_and_logger() {
        let logger = quiet_slot();
        let expected = logger.get();
        let binding = Binding::new(
            "Observer",
            loader(move |ctx: &LoadContext| -> Result<(), LoadError> {
                assert_eq!(ctx.name(), "Observer");
                assert!(ctx.logger().same_as(&expected));
                Ok(())
            }),
        );
        binding.resolve(&logger).unwrap();
    }
}
