// Copyright © 2025 Stephan Kunz
//! [`SafeContext`] — a copy-on-write, read-through overlay.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use super::{Context, TreeLibrary, Value};
use crate::model::ModelNode;
use crate::ConstString;

/// A copy-on-write overlay over an `input` context.
///
/// Reads of a variable fall through to `input` until that variable has been *recorded as
/// locally modified* by a `set`/`clear_variable` call on this overlay; from then on, the
/// overlay's own local value (which may itself be "cleared", i.e. absent) is
/// authoritative. The `input` context is never mutated.
///
/// This is the engine's read-only sandbox: guard sub-trees, and any decorator that wants
/// to hand a child read access to the outer blackboard without write-back, are spawned
/// with a `SafeContext` layered on top of their real context.
///
/// A historical variant of this overlay additionally treated a locally-present value as
/// authoritative even when no modification had been recorded, purely because the local
/// map happened to be non-empty. That is not this type's contract: presence in `modified`
/// is the only thing that makes the local map authoritative for a given name.
pub struct SafeContext {
    input: Arc<dyn Context>,
    local: RwLock<HashMap<ConstString, Value>>,
    modified: RwLock<HashSet<ConstString>>,
}

impl SafeContext {
    /// Creates a read-through overlay over `input`.
    #[must_use]
    pub fn new(input: Arc<dyn Context>) -> Self {
        Self {
            input,
            local: RwLock::new(HashMap::new()),
            modified: RwLock::new(HashSet::new()),
        }
    }
}

impl Context for SafeContext {
    fn get(&self, name: &str) -> Option<Value> {
        let modified = self.modified.read().unwrap_or_else(|poison| poison.into_inner());
        if modified.contains(name) {
            let local = self.local.read().unwrap_or_else(|poison| poison.into_inner());
            return local.get(name).cloned();
        }
        drop(modified);
        self.input.get(name)
    }

    fn set(&self, name: &str, value: Option<Value>) -> bool {
        let mut modified = self.modified.write().unwrap_or_else(|poison| poison.into_inner());
        modified.insert(name.into());
        drop(modified);
        let mut local = self.local.write().unwrap_or_else(|poison| poison.into_inner());
        match value {
            Some(v) => {
                local.insert(name.into(), v);
            }
            None => {
                local.remove(name);
            }
        }
        true
    }

    fn clear(&self) {
        let mut local = self.local.write().unwrap_or_else(|poison| poison.into_inner());
        local.clear();
        let mut modified = self.modified.write().unwrap_or_else(|poison| poison.into_inner());
        modified.clear();
    }

    fn clear_variable(&self, name: &str) {
        let mut local = self.local.write().unwrap_or_else(|poison| poison.into_inner());
        local.remove(name);
        let mut modified = self.modified.write().unwrap_or_else(|poison| poison.into_inner());
        modified.insert(name.into());
    }

    fn get_bt(&self, name: &str) -> Option<Arc<ModelNode>> {
        self.input.get_bt(name)
    }

    fn library(&self) -> &Arc<TreeLibrary> {
        self.input.library()
    }
}

impl std::fmt::Debug for SafeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let local = self.local.read().unwrap_or_else(|poison| poison.into_inner());
        f.debug_struct("SafeContext")
            .field("local", &local.len())
            .field("input", &self.input)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{value, BasicContext};

    #[test]
    fn unwritten_variable_reads_through() {
        let input = Arc::new(BasicContext::new());
        input.set("x", Some(value(1_i64)));
        let overlay = SafeContext::new(input.clone());
        assert_eq!(overlay.get("x").and_then(|v| v.downcast_ref::<i64>().copied()), Some(1));
    }

    #[test]
    fn write_stays_local_and_shadows_input() {
        let input = Arc::new(BasicContext::new());
        input.set("x", Some(value(1_i64)));
        let overlay = SafeContext::new(input.clone());
        overlay.set("x", Some(value(2_i64)));
        assert_eq!(overlay.get("x").and_then(|v| v.downcast_ref::<i64>().copied()), Some(2));
        assert_eq!(input.get("x").and_then(|v| v.downcast_ref::<i64>().copied()), Some(1));
    }

    #[test]
    fn clearing_locally_does_not_fall_back_to_input() {
        let input = Arc::new(BasicContext::new());
        input.set("x", Some(value(1_i64)));
        let overlay = SafeContext::new(input);
        overlay.clear_variable("x");
        assert!(overlay.get("x").is_none());
    }
}
