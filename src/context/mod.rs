// Copyright © 2025 Stephan Kunz
//! The blackboard: a keyed variable store plus a tree library, in four flavours.
//!
//! [`Context`] is the capability set every flavour implements. [`BasicContext`] is the
//! flat, owning root. [`HierarchicalContext`] chains to a parent for fall-through reads
//! while keeping writes local. [`SafeContext`] and [`SafeOutputContext`] are copy-on-write
//! overlays used to give a guard sub-tree (or a decorator-scoped child) read access to an
//! outer context without letting it mutate that context except through an explicit
//! output whitelist.

mod basic;
mod hierarchical;
mod library;
mod safe;
mod safe_output;

pub use basic::BasicContext;
pub use hierarchical::HierarchicalContext;
pub use library::TreeLibrary;
pub use safe::SafeContext;
pub use safe_output::SafeOutputContext;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::model::ModelNode;

/// An opaque value stored in a [`Context`].
///
/// The engine never inspects the contents; it is handed back verbatim to whoever reads
/// it. Extension-point behaviors downcast it to their own concrete type.
pub type Value = Arc<dyn Any + Send + Sync>;

/// Wraps a value of any `Send + Sync + 'static` type for storage in a [`Context`].
pub fn value<T: Any + Send + Sync + 'static>(v: T) -> Value {
    Arc::new(v)
}

/// The blackboard capability set.
///
/// `get(name) == None` iff the variable is undefined at the scope visible through this
/// context. `set(name, None)` clears the variable. Overlay contexts never mutate their
/// input context except where their own contract (an output-variable whitelist)
/// explicitly allows it.
pub trait Context: fmt::Debug + Send + Sync {
    /// Reads a variable, or `None` if it is undefined at this scope.
    fn get(&self, name: &str) -> Option<Value>;

    /// Writes a variable; `None` clears it. Returns `true` (the capability always
    /// succeeds; the boolean exists so embedders scripting against this contract have a
    /// success signal to check).
    fn set(&self, name: &str, value: Option<Value>) -> bool;

    /// Clears every variable visible at this scope's local storage.
    fn clear(&self);

    /// Clears a single variable.
    fn clear_variable(&self, name: &str);

    /// Looks up a named model tree in the shared [`TreeLibrary`].
    fn get_bt(&self, name: &str) -> Option<Arc<ModelNode>>;

    /// The shared tree library backing this context (and every context derived from it).
    fn library(&self) -> &Arc<TreeLibrary>;
}

/// Convenience typed accessor built on top of [`Context::get`].
pub fn get_typed<T: Clone + Send + Sync + 'static>(ctx: &dyn Context, name: &str) -> Option<T> {
    ctx.get(name).and_then(|v| v.downcast_ref::<T>().cloned())
}

/// Convenience typed setter built on top of [`Context::set`].
pub fn set_typed<T: Send + Sync + 'static>(ctx: &dyn Context, name: &str, v: T) {
    ctx.set(name, Some(value(v)));
}
