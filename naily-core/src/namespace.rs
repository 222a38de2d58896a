//! The bootstrap namespace: one logger slot plus a table of deferred bindings.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::binding::{self, Binding, BindingState, LoadContext, SubsystemHandle};
use crate::error::{LoadError, ResolutionError};
use crate::logger::{LoggerHandle, LoggerSlot};

/// Owns the logger slot and the binding table for one process (or one test).
pub struct Namespace {
    logger: Arc<LoggerSlot>,
    bindings: BTreeMap<&'static str, Binding>,
}

impl Namespace {
    pub fn builder() -> NamespaceBuilder {
        NamespaceBuilder::default()
    }

    /// Current logger, building the stdout default on first read.
    pub fn get_logger(&self) -> LoggerHandle {
        self.logger.get()
    }

    pub fn set_logger(&self, handle: LoggerHandle) {
        self.logger.set(handle);
    }

    pub fn logger_slot(&self) -> Arc<LoggerSlot> {
        Arc::clone(&self.logger)
    }

    /// Resolve a named subsystem, loading it on first use.
    ///
    /// Unknown names fail without touching any binding. A load failure is
    /// cached: later calls return the same error until [`Namespace::reset`].
    pub fn resolve(&self, name: &str) -> Result<SubsystemHandle, ResolutionError> {
        let binding = self
            .bindings
            .get(name)
            .ok_or_else(|| ResolutionError::UnknownSubsystem {
                name: name.to_string(),
            })?;
        binding.resolve(&self.logger)
    }

    /// Resolve and downcast in one step.
    pub fn resolve_as<T>(&self, name: &str) -> Result<Arc<T>, ResolutionError>
    where
        T: Any + Send + Sync,
    {
        let handle = self.resolve(name)?;
        handle
            .downcast::<T>()
            .ok_or_else(|| ResolutionError::UnexpectedType {
                name: handle.name(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// State of a binding, or `None` if no binding has this name.
    pub fn state(&self, name: &str) -> Option<BindingState> {
        self.bindings.get(name).map(Binding::state)
    }

    /// Allow a failed binding to be attempted again.
    pub fn reset(&self, name: &str) -> Result<bool, ResolutionError> {
        self.bindings
            .get(name)
            .map(Binding::reset)
            .ok_or_else(|| ResolutionError::UnknownSubsystem {
                name: name.to_string(),
            })
    }

    /// Declared binding names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.bindings.keys().copied()
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("logger", &self.logger)
            .field("bindings", &self.bindings.values().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Default)]
pub struct NamespaceBuilder {
    logger: Option<LoggerHandle>,
    bindings: BTreeMap<&'static str, Binding>,
}

impl NamespaceBuilder {
    /// Declare a deferred binding. Declaring the same name twice keeps the
    /// last loader.
    pub fn bind<F, T>(mut self, name: &'static str, init: F) -> Self
    where
        F: Fn(&LoadContext) -> Result<T, LoadError> + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        self.bindings
            .insert(name, Binding::new(name, binding::loader(init)));
        self
    }

    /// Start with `handle` as the logger instead of the lazy stdout default.
    pub fn logger(mut self, handle: LoggerHandle) -> Self {
        self.logger = Some(handle);
        self
    }

    pub fn build(self) -> Namespace {
        let logger = match self.logger {
            Some(handle) => LoggerSlot::with_logger(handle),
            None => LoggerSlot::new(),
        };
        Namespace {
            logger: Arc::new(logger),
            bindings: self.bindings,
        }
    }
}
