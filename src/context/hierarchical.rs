// Copyright © 2025 Stephan Kunz
//! [`HierarchicalContext`] — a parent-chained scope.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{Context, TreeLibrary, Value};
use crate::model::ModelNode;
use crate::ConstString;

/// A context whose reads fall through to a parent scope when undefined locally.
///
/// Created by the hierarchical context manager decorator (see
/// [`crate::task::decorator`]) for each spawn of its child: variables the child writes
/// live only in this new scope and vanish when the decorator's child terminates, while
/// reads of names the child never wrote resolve against the parent.
pub struct HierarchicalContext {
    parent: Arc<dyn Context>,
    local: RwLock<HashMap<ConstString, Value>>,
}

impl HierarchicalContext {
    /// Creates a new scope chained to `parent`.
    #[must_use]
    pub fn new(parent: Arc<dyn Context>) -> Self {
        Self {
            parent,
            local: RwLock::new(HashMap::new()),
        }
    }
}

impl Context for HierarchicalContext {
    fn get(&self, name: &str) -> Option<Value> {
        let local = self.local.read().unwrap_or_else(|poison| poison.into_inner());
        if let Some(v) = local.get(name) {
            return Some(v.clone());
        }
        drop(local);
        self.parent.get(name)
    }

    fn set(&self, name: &str, value: Option<Value>) -> bool {
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
    }

    fn clear_variable(&self, name: &str) {
        let mut local = self.local.write().unwrap_or_else(|poison| poison.into_inner());
        local.remove(name);
    }

    fn get_bt(&self, name: &str) -> Option<Arc<ModelNode>> {
        self.parent.get_bt(name)
    }

    fn library(&self) -> &Arc<TreeLibrary> {
        self.parent.library()
    }
}

impl std::fmt::Debug for HierarchicalContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let local = self.local.read().unwrap_or_else(|poison| poison.into_inner());
        f.debug_struct("HierarchicalContext")
            .field("local", &local.len())
            .field("parent", &self.parent)
            .finish()
    }
}
