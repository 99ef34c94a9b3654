// Copyright © 2025 Stephan Kunz
//! A tick-driven behaviour tree execution engine.
//!
//! A [`ModelNode`](model::ModelNode) tree describes the *shape* of a behaviour: composites,
//! decorators, and leaves, wired together once and never mutated. A
//! [`BtExecutor`](scheduler::BtExecutor) walks that shape lazily, spawning an execution
//! task for each node it actually visits and driving every live task forward exactly once
//! per [`tick`](scheduler::BtExecutor::tick). Structural changes a tick discovers (a
//! decorator re-spawning its child, an interrupter firing) are queued and applied at the
//! next tick boundary rather than mid-walk, so a single tick always sees one consistent
//! shape of the tree.

// region:		--- modules
pub mod behavior;
pub mod context;
pub mod error;
pub mod model;
pub mod position;
pub mod prelude;
pub mod scheduler;
pub mod status;
pub mod task;

use std::sync::Arc;
// endregion:	--- modules

// region:		--- types
/// An immutable, cheaply cloned string, used throughout for variable and tree names.
pub type ConstString = Arc<str>;
// endregion:	--- types

// region:		--- literal constants
/// Marker for invariants the engine itself is responsible for upholding.
///
/// Reached only if the scheduler or model layer has a bug; never a reachable user error.
pub const SHOULD_NOT_HAPPEN: &str = "should not happen";
// endregion:	--- literal constants
