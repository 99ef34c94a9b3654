// Copyright © 2025 Stephan Kunz
//! [`BasicContext`] — the flat, root blackboard.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{Context, TreeLibrary, Value};
use crate::model::ModelNode;
use crate::ConstString;

/// A flat keyed variable store with no parent scope.
///
/// This is the context an embedder constructs to hand to
/// [`BtExecutor::new`](crate::scheduler::BtExecutor::new); every other [`Context`] flavour
/// is layered on top of one of these (directly, or transitively through another layer).
#[derive(Default)]
pub struct BasicContext {
    vars: RwLock<HashMap<ConstString, Value>>,
    library: Arc<TreeLibrary>,
}

impl BasicContext {
    /// Creates an empty context backed by a fresh, empty [`TreeLibrary`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            vars: RwLock::new(HashMap::new()),
            library: Arc::new(TreeLibrary::new()),
        }
    }

    /// Creates an empty context sharing an existing [`TreeLibrary`].
    #[must_use]
    pub fn with_library(library: Arc<TreeLibrary>) -> Self {
        Self {
            vars: RwLock::new(HashMap::new()),
            library,
        }
    }
}

impl Context for BasicContext {
    fn get(&self, name: &str) -> Option<Value> {
        let vars = self.vars.read().unwrap_or_else(|poison| poison.into_inner());
        vars.get(name).cloned()
    }

    fn set(&self, name: &str, value: Option<Value>) -> bool {
        let mut vars = self.vars.write().unwrap_or_else(|poison| poison.into_inner());
        match value {
            Some(v) => {
                vars.insert(name.into(), v);
            }
            None => {
                vars.remove(name);
            }
        }
        true
    }

    fn clear(&self) {
        let mut vars = self.vars.write().unwrap_or_else(|poison| poison.into_inner());
        vars.clear();
    }

    fn clear_variable(&self, name: &str) {
        let mut vars = self.vars.write().unwrap_or_else(|poison| poison.into_inner());
        vars.remove(name);
    }

    fn get_bt(&self, name: &str) -> Option<Arc<ModelNode>> {
        self.library.get(name)
    }

    fn library(&self) -> &Arc<TreeLibrary> {
        &self.library
    }
}

impl std::fmt::Debug for BasicContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let vars = self.vars.read().unwrap_or_else(|poison| poison.into_inner());
        f.debug_struct("BasicContext").field("vars", &vars.len()).finish()
    }
}
