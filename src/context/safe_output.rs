// Copyright © 2025 Stephan Kunz
//! [`SafeOutputContext`] — a [`SafeContext`] with a write-through allow-list.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use super::{Context, TreeLibrary, Value};
use crate::model::ModelNode;
use crate::ConstString;

/// Like [`SafeContext`](super::SafeContext), except that a whitelist of *output variable
/// names* read and write straight through to the `input` context instead of staying
/// local.
///
/// This is how a decorator scope exposes a controlled write channel back to its
/// surrounding context (e.g. "this subtree may only ever publish `result` and
/// `error_code` to the outer blackboard") while keeping everything else sandboxed.
pub struct SafeOutputContext {
    input: Arc<dyn Context>,
    outputs: HashSet<ConstString>,
    local: RwLock<HashMap<ConstString, Value>>,
    modified: RwLock<HashSet<ConstString>>,
}

impl SafeOutputContext {
    /// Creates an overlay over `input` whose `outputs` names pass through unchanged.
    #[must_use]
    pub fn new(input: Arc<dyn Context>, outputs: impl IntoIterator<Item = ConstString>) -> Self {
        Self {
            input,
            outputs: outputs.into_iter().collect(),
            local: RwLock::new(HashMap::new()),
            modified: RwLock::new(HashSet::new()),
        }
    }

    fn is_output(&self, name: &str) -> bool {
        self.outputs.contains(name)
    }
}

impl Context for SafeOutputContext {
    fn get(&self, name: &str) -> Option<Value> {
        if self.is_output(name) {
            return self.input.get(name);
        }
        let modified = self.modified.read().unwrap_or_else(|poison| poison.into_inner());
        if modified.contains(name) {
            let local = self.local.read().unwrap_or_else(|poison| poison.into_inner());
            return local.get(name).cloned();
        }
        drop(modified);
        self.input.get(name)
    }

    fn set(&self, name: &str, value: Option<Value>) -> bool {
        if self.is_output(name) {
            return self.input.set(name, value);
        }
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
        drop(modified);
        drop(local);
        for name in &self.outputs {
            self.input.clear_variable(name);
        }
    }

    fn clear_variable(&self, name: &str) {
        if self.is_output(name) {
            self.input.clear_variable(name);
            return;
        }
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

impl std::fmt::Debug for SafeOutputContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let local = self.local.read().unwrap_or_else(|poison| poison.into_inner());
        f.debug_struct("SafeOutputContext")
            .field("outputs", &self.outputs.len())
            .field("local", &local.len())
            .finish()
    }
}
