//! naily core library — the worker's bootstrap namespace.
//!
//! - [`logger`] — [`LoggerHandle`] and the get-or-create [`LoggerSlot`]
//! - [`binding`] — deferred bindings resolved at most once
//! - [`namespace`] — [`Namespace`], tying a logger slot to a binding table
//! - [`error`] — [`ResolutionError`]

pub mod binding;
pub mod error;
pub mod logger;
pub mod namespace;

pub use binding::{BindingState, LoadContext, SubsystemHandle};
pub use error::{LoadError, LoadPanic, ResolutionError};
pub use logger::{LoggerHandle, LoggerSlot};
pub use namespace::{Namespace, NamespaceBuilder};
