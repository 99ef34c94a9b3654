// Copyright © 2025 Stephan Kunz
//! Convenience re-exports for embedders: `use behavior_engine::prelude::*;`.

pub use crate::behavior::{Behavior, BehaviorKind};
pub use crate::context::{value, BasicContext, Context, HierarchicalContext, SafeContext, SafeOutputContext, TreeLibrary, Value};
pub use crate::error::{EngineResult, Error};
pub use crate::model::builder::{GuardedChild, InterrupterHandle, ModelBuilder};
pub use crate::model::{CompositeKind, DecoratorKind, LeafKind, ModelNode, NodeId, ParallelPolicy};
pub use crate::position::Position;
pub use crate::scheduler::BtExecutor;
pub use crate::status::Status;
pub use crate::task::state::TaskState;
pub use crate::task::TaskId;
