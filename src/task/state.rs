// Copyright © 2025 Stephan Kunz
//! [`TaskState`] — the opaque, per-position state map persisted across spawns.

use std::collections::HashMap;

use crate::context::Value;
use crate::ConstString;

/// The variable name the [`Limit`](crate::model::DecoratorKind::Limit) decorator persists
/// its run counter under.
pub const RUNS_SO_FAR: &str = "RunsSoFar";

/// A mapping from string names to opaque values, keyed by [`Position`](crate::position::Position)
/// in [`BtExecutor`](crate::scheduler::BtExecutor)'s `tasksStates` / `tasksTerminationStates`
/// maps.
///
/// The engine defines no schema beyond this; concrete task kinds agree privately on the
/// names they read and write (e.g. [`RUNS_SO_FAR`]).
#[derive(Default, Debug, Clone)]
pub struct TaskState(HashMap<ConstString, Value>);

impl TaskState {
    /// An empty state map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a named entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Reads a named entry as `i64`, if present and of that type.
    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.downcast_ref::<i64>().copied())
    }

    /// Writes a named entry.
    pub fn set(&mut self, key: impl Into<ConstString>, value: Value) {
        self.0.insert(key.into(), value);
    }
}
