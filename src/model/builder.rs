// Copyright © 2025 Stephan Kunz
//! A small fluent API for assembling model trees in-process.
//!
//! This is the in-process analogue of external tree-authoring tooling: it has no file
//! format and performs no parsing, it just builds [`Arc<ModelNode>`] graphs without
//! requiring callers to spell out every field by hand.

use std::sync::Arc;

use crate::behavior::{Behavior, BehaviorKind};
use crate::model::{error::Error, CompositeKind, DecoratorKind, LeafKind, ModelNode, NodeId, ParallelPolicy};
use crate::status::Status;
use crate::ConstString;

/// The stable identity of a spawned interrupter, handed back by
/// [`ModelBuilder::interrupter`] so a [`ModelBuilder::perform_interruption`] leaf
/// elsewhere in the tree can name it as a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterrupterHandle(NodeId);

/// A child paired with the guard that gates it in a priority-list composite.
pub struct GuardedChild {
    /// The child's model node.
    pub child: Arc<ModelNode>,
    /// The guard sub-tree; `None` evaluates to Success.
    pub guard: Option<Arc<ModelNode>>,
}

impl From<Arc<ModelNode>> for GuardedChild {
    fn from(child: Arc<ModelNode>) -> Self {
        Self { child, guard: None }
    }
}

impl From<(Arc<ModelNode>, Arc<ModelNode>)> for GuardedChild {
    fn from((child, guard): (Arc<ModelNode>, Arc<ModelNode>)) -> Self {
        Self { child, guard: Some(guard) }
    }
}

/// Namespace of fluent constructors for [`ModelNode`] graphs.
pub struct ModelBuilder;

impl ModelBuilder {
    /// `Sequence` composite.
    ///
    /// # Errors
    /// Returns [`Error::NoChildren`] if `children` is empty.
    pub fn sequence(children: Vec<Arc<ModelNode>>) -> Result<Arc<ModelNode>, Error> {
        ModelNode::composite(CompositeKind::Sequence, children)
    }

    /// `Selector` composite.
    ///
    /// # Errors
    /// Returns [`Error::NoChildren`] if `children` is empty.
    pub fn selector(children: Vec<Arc<ModelNode>>) -> Result<Arc<ModelNode>, Error> {
        ModelNode::composite(CompositeKind::Selector, children)
    }

    /// `RandomSequence` composite.
    ///
    /// # Errors
    /// Returns [`Error::NoChildren`] if `children` is empty.
    pub fn random_sequence(children: Vec<Arc<ModelNode>>) -> Result<Arc<ModelNode>, Error> {
        ModelNode::composite(CompositeKind::RandomSequence, children)
    }

    /// `RandomSelector` composite.
    ///
    /// # Errors
    /// Returns [`Error::NoChildren`] if `children` is empty.
    pub fn random_selector(children: Vec<Arc<ModelNode>>) -> Result<Arc<ModelNode>, Error> {
        ModelNode::composite(CompositeKind::RandomSelector, children)
    }

    /// `StaticPriorityList` composite; each entry may carry its own guard.
    ///
    /// # Errors
    /// Returns [`Error::NoChildren`] if `children` is empty.
    pub fn static_priority(children: Vec<GuardedChild>) -> Result<Arc<ModelNode>, Error> {
        Self::priority_list(CompositeKind::StaticPriorityList, children)
    }

    /// `DynamicPriorityList` composite; each entry may carry its own guard.
    ///
    /// # Errors
    /// Returns [`Error::NoChildren`] if `children` is empty.
    pub fn dynamic_priority(children: Vec<GuardedChild>) -> Result<Arc<ModelNode>, Error> {
        Self::priority_list(CompositeKind::DynamicPriorityList, children)
    }

    fn priority_list(kind: CompositeKind, children: Vec<GuardedChild>) -> Result<Arc<ModelNode>, Error> {
        let mut nodes = Vec::with_capacity(children.len());
        for entry in children {
            nodes.push(match entry.guard {
                Some(guard) => entry.child.as_ref().with_guard_attached(guard),
                None => entry.child,
            });
        }
        ModelNode::composite(kind, nodes)
    }

    /// `Parallel` composite.
    ///
    /// # Errors
    /// Returns [`Error::NoChildren`] if `children` is empty.
    pub fn parallel(policy: ParallelPolicy, children: Vec<Arc<ModelNode>>) -> Result<Arc<ModelNode>, Error> {
        ModelNode::composite(CompositeKind::Parallel { policy }, children)
    }

    /// `Inverter` decorator.
    #[must_use]
    pub fn inverter(child: Arc<ModelNode>) -> Arc<ModelNode> {
        ModelNode::decorator(DecoratorKind::Inverter, child)
    }

    /// `Succeeder` decorator.
    #[must_use]
    pub fn succeeder(child: Arc<ModelNode>) -> Arc<ModelNode> {
        ModelNode::decorator(DecoratorKind::Succeeder, child)
    }

    /// `UntilFail` decorator.
    #[must_use]
    pub fn until_fail(child: Arc<ModelNode>) -> Arc<ModelNode> {
        ModelNode::decorator(DecoratorKind::UntilFail, child)
    }

    /// `Repeat` (forever) decorator.
    #[must_use]
    pub fn repeat(child: Arc<ModelNode>) -> Arc<ModelNode> {
        ModelNode::decorator(DecoratorKind::Repeat, child)
    }

    /// `Limit(bound)` decorator.
    #[must_use]
    pub fn limit(bound: u32, child: Arc<ModelNode>) -> Arc<ModelNode> {
        ModelNode::decorator(DecoratorKind::Limit { bound }, child)
    }

    /// Hierarchical context manager decorator.
    #[must_use]
    pub fn hierarchical_context(child: Arc<ModelNode>) -> Arc<ModelNode> {
        ModelNode::decorator(DecoratorKind::HierarchicalContextManager, child)
    }

    /// Safe (read-through) context manager decorator.
    #[must_use]
    pub fn safe_context(child: Arc<ModelNode>) -> Arc<ModelNode> {
        ModelNode::decorator(DecoratorKind::SafeContextManager, child)
    }

    /// Safe-output context manager decorator.
    #[must_use]
    pub fn safe_output_context(outputs: Vec<ConstString>, child: Arc<ModelNode>) -> Arc<ModelNode> {
        ModelNode::decorator(DecoratorKind::SafeOutputContextManager { outputs }, child)
    }

    /// Interrupter decorator; returns the node alongside a handle usable with
    /// [`perform_interruption`](Self::perform_interruption).
    #[must_use]
    pub fn interrupter(child: Arc<ModelNode>) -> (Arc<ModelNode>, InterrupterHandle) {
        let node = ModelNode::decorator(DecoratorKind::Interrupter, child);
        let handle = InterrupterHandle(node.id());
        (node, handle)
    }

    /// Synchronous `Success` leaf.
    #[must_use]
    pub fn success() -> Arc<ModelNode> {
        ModelNode::leaf(LeafKind::Success)
    }

    /// Synchronous `Failure` leaf.
    #[must_use]
    pub fn failure() -> Arc<ModelNode> {
        ModelNode::leaf(LeafKind::Failure)
    }

    /// `Wait(millis)` leaf.
    #[must_use]
    pub fn wait(duration_ms: u64) -> Arc<ModelNode> {
        ModelNode::leaf(LeafKind::Wait { duration_ms })
    }

    /// `SubtreeLookup(name)` leaf.
    #[must_use]
    pub fn subtree(name: impl Into<ConstString>) -> Arc<ModelNode> {
        ModelNode::leaf(LeafKind::SubtreeLookup { name: name.into() })
    }

    /// `VariableRenamer(old, new)` leaf.
    #[must_use]
    pub fn rename(old: impl Into<ConstString>, new: impl Into<ConstString>) -> Arc<ModelNode> {
        ModelNode::leaf(LeafKind::VariableRenamer { old: old.into(), new: new.into() })
    }

    /// `PerformInterruption(target, desired_status)` leaf.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInterruptStatus`] unless `desired_status` is
    /// [`Status::Success`] or [`Status::Failure`].
    pub fn perform_interruption(target: InterrupterHandle, desired_status: Status) -> Result<Arc<ModelNode>, Error> {
        if !matches!(desired_status, Status::Success | Status::Failure) {
            return Err(Error::InvalidInterruptStatus { status: desired_status });
        }
        Ok(ModelNode::leaf(LeafKind::PerformInterruption { target: target.0, desired_status }))
    }

    /// An Action or Condition extension-point leaf.
    pub fn behavior<F, B>(name: impl Into<ConstString>, kind: BehaviorKind, factory: F) -> Arc<ModelNode>
    where
        F: Fn() -> B + Send + Sync + 'static,
        B: Behavior + 'static,
    {
        ModelNode::leaf(LeafKind::Behavior {
            name: name.into(),
            kind,
            factory: Arc::new(move || Box::new(factory()) as Box<dyn Behavior>),
        })
    }
}

