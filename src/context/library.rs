// Copyright © 2025 Stephan Kunz
//! [`TreeLibrary`] — the lookup table from tree names to model trees.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::model::ModelNode;
use crate::ConstString;

/// A finite, thread-safe table mapping tree names to model trees.
///
/// Every [`Context`](super::Context) carries a [`TreeLibrary`] so that the
/// `SubtreeLookup` leaf (see [`crate::task::leaf`]) can resolve a subtree by name without
/// the engine knowing anything about how trees are authored or loaded.
#[derive(Default)]
pub struct TreeLibrary {
    trees: RwLock<HashMap<ConstString, Arc<ModelNode>>>,
}

impl TreeLibrary {
    /// Creates an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `tree` under `name`, returning `true` if it replaced an existing entry.
    pub fn add(&self, name: impl Into<ConstString>, tree: Arc<ModelNode>) -> bool {
        let mut trees = self.trees.write().unwrap_or_else(|poison| poison.into_inner());
        trees.insert(name.into(), tree).is_some()
    }

    /// Looks up a tree by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<ModelNode>> {
        let trees = self.trees.read().unwrap_or_else(|poison| poison.into_inner());
        trees.get(name).cloned()
    }

    /// Returns a finite snapshot of the registered `(name, tree)` pairs.
    #[must_use]
    pub fn iter(&self) -> Vec<(ConstString, Arc<ModelNode>)> {
        let trees = self.trees.read().unwrap_or_else(|poison| poison.into_inner());
        trees.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl std::fmt::Debug for TreeLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let trees = self.trees.read().unwrap_or_else(|poison| poison.into_inner());
        f.debug_struct("TreeLibrary").field("len", &trees.len()).finish()
    }
}
