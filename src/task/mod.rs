// Copyright © 2025 Stephan Kunz
//! Execution tasks: the mutable, per-run counterpart to an immutable [`ModelNode`](crate::model::ModelNode).
//!
//! A task is created lazily, the first time the scheduler's walk actually reaches its
//! model node, and lives in [`BtExecutor`](crate::scheduler::BtExecutor)'s arena for as
//! long as it stays relevant. [`TaskId`] indexes that arena instead of the tree holding
//! `Rc`/`Arc` links to its own children, so a decorator re-spawning its child or an
//! interrupter cutting one off never has to walk back up through shared ownership.

pub(crate) mod composite;
pub(crate) mod decorator;
pub(crate) mod leaf;
pub mod state;

use std::sync::Arc;

use crate::context::Context;
use crate::model::ModelNode;
use crate::status::Status;

/// An index into [`BtExecutor`](crate::scheduler::BtExecutor)'s task arena.
///
/// Never reused across a run: the arena only grows, so an id always names the same
/// logical spawn even after the task it named has terminated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(pub(crate) usize);

/// The three task shapes, mirroring [`crate::model::NodeBody`].
pub(crate) enum TaskKind {
    Composite(composite::CompositeTask),
    Decorator(decorator::DecoratorTask),
    Leaf(leaf::LeafTask),
}

impl TaskKind {
    fn tag(&self) -> TaskKindTag {
        match self {
            Self::Composite(_) => TaskKindTag::Composite,
            Self::Decorator(_) => TaskKindTag::Decorator,
            Self::Leaf(_) => TaskKindTag::Leaf,
        }
    }
}

/// A cheap, `Copy` discriminant for [`TaskKind`], so dispatch can read it and drop the
/// borrow before calling back into the scheduler with `&mut self`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskKindTag {
    Composite,
    Decorator,
    Leaf,
}

/// One live (or terminated-but-not-yet-reaped) execution task.
pub(crate) struct TaskNode {
    /// The model node this task instantiates.
    pub(crate) model: Arc<ModelNode>,
    /// The task that spawned this one, or `None` for the tree root.
    pub(crate) parent: Option<TaskId>,
    /// The context this task was spawned with.
    pub(crate) context: Arc<dyn Context>,
    /// The task's current status.
    pub(crate) status: Status,
    /// Set once by an explicit `terminate()`, to make repeated calls idempotent and to
    /// distinguish "terminated on purpose" from "resolved Success/Failure on its own".
    pub(crate) terminated: bool,
    /// The kind-specific runtime state.
    pub(crate) kind: TaskKind,
}

impl TaskNode {
    pub(crate) fn new(model: Arc<ModelNode>, parent: Option<TaskId>, context: Arc<dyn Context>) -> Self {
        let kind = match model.body() {
            crate::model::NodeBody::Composite { kind, .. } => TaskKind::Composite(composite::CompositeTask::new(kind)),
            crate::model::NodeBody::Decorator { kind, .. } => TaskKind::Decorator(decorator::DecoratorTask::new(kind)),
            crate::model::NodeBody::Leaf { kind } => TaskKind::Leaf(leaf::LeafTask::new(kind)),
        };
        Self { model, parent, context, status: Status::Running, terminated: false, kind }
    }

    pub(crate) fn tag(&self) -> TaskKindTag {
        self.kind.tag()
    }
}
