// Copyright © 2025 Stephan Kunz
//! The immutable model tree: node kinds, guards, and the `computePositions` pass.
//!
//! A [`ModelNode`] is constructed once (usually through [`crate::model::builder`]) and
//! never mutated afterwards. [`BtExecutor::new`](crate::scheduler::BtExecutor::new) walks
//! it once via [`ModelNode::compute_positions`] to assign every node its [`Position`],
//! then instantiates execution tasks from it lazily as the tree runs.

pub mod builder;
pub mod error;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use crate::behavior::{Behavior, BehaviorKind};
use crate::position::Position;
use crate::status::Status;
use crate::ConstString;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// A stable identity for a model node, independent of its [`Position`].
///
/// Used by the interrupter registry and by [`LeafKind::PerformInterruption`] to name a
/// target interrupter without caring where in the tree it happens to live.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The policy a [`CompositeKind::Parallel`] combines its children's statuses with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParallelPolicy {
    /// Succeeds iff every child succeeds; fails as soon as any child fails.
    Sequence,
    /// Succeeds as soon as any child succeeds; fails iff every child fails.
    Selector,
}

/// A factory for an Action/Condition extension-point leaf.
pub type BehaviorFactory = Arc<dyn Fn() -> Box<dyn Behavior> + Send + Sync>;

/// The composite policies: children combined by one of several selection rules.
#[derive(Clone)]
pub enum CompositeKind {
    /// Spawns children left to right; fails/terminates on the first non-success.
    Sequence,
    /// Spawns children left to right; succeeds on the first success.
    Selector,
    /// Like [`Sequence`](CompositeKind::Sequence), visited in a random order fixed at spawn.
    RandomSequence,
    /// Like [`Selector`](CompositeKind::Selector), visited in a random order fixed at spawn.
    RandomSelector,
    /// Picks the leftmost child whose guard is true once, at first spawn.
    StaticPriorityList,
    /// Like [`StaticPriorityList`](CompositeKind::StaticPriorityList), but re-evaluates
    /// guards to the left of the active child every tick.
    DynamicPriorityList,
    /// Spawns every child at once and combines their statuses per `policy`.
    Parallel {
        /// The combination policy.
        policy: ParallelPolicy,
    },
}

/// The decorator kinds: each wraps exactly one child.
#[derive(Clone)]
pub enum DecoratorKind {
    /// Success and Failure are swapped; Terminated maps to Success; Running passes through.
    Inverter,
    /// Reports Success on any terminal child status.
    Succeeder,
    /// Re-spawns the child after Success; reports Success on Failure/Terminated.
    UntilFail,
    /// Re-spawns the child after any terminal status; always reports Running.
    Repeat,
    /// Spawns the child at most `bound` times across the decorator's lifetime.
    Limit {
        /// The maximum number of spawns allowed.
        bound: u32,
    },
    /// Spawns the child in a fresh [`HierarchicalContext`](crate::context::HierarchicalContext).
    HierarchicalContextManager,
    /// Spawns the child in a fresh [`SafeContext`](crate::context::SafeContext) overlay.
    SafeContextManager,
    /// Spawns the child in a fresh [`SafeOutputContext`](crate::context::SafeOutputContext) overlay.
    SafeOutputContextManager {
        /// The allow-listed output variable names that write through to the input context.
        outputs: Vec<ConstString>,
    },
    /// Passthrough whose child can be forcibly terminated and substituted by a
    /// [`LeafKind::PerformInterruption`] elsewhere in the tree.
    Interrupter,
}

/// The leaf kinds: no children, the primitive work of the tree.
#[derive(Clone)]
pub enum LeafKind {
    /// Always reports Success.
    Success,
    /// Always reports Failure.
    Failure,
    /// Reports Running until `duration_ms` milliseconds have elapsed since spawn, then Success.
    Wait {
        /// The duration to wait, in milliseconds.
        duration_ms: u64,
    },
    /// Looks up a named tree in the context's [`TreeLibrary`](crate::context::TreeLibrary)
    /// and runs it as a child; Failure (with a diagnostic) on a lookup miss.
    SubtreeLookup {
        /// The name to resolve.
        name: ConstString,
    },
    /// Moves a variable from `old` to `new` in the context, then reports Success.
    VariableRenamer {
        /// The variable to read and clear.
        old: ConstString,
        /// The variable to write.
        new: ConstString,
    },
    /// Fires the interrupter registered for `target`, substituting `desired_status`.
    PerformInterruption {
        /// The interrupter's model-node identity, as handed out by the builder.
        target: NodeId,
        /// The status to substitute; must be Success or Failure.
        desired_status: Status,
    },
    /// An Action or Condition extension point.
    Behavior {
        /// A human-readable name, used in diagnostics.
        name: ConstString,
        /// Whether this is an Action or a Condition.
        kind: BehaviorKind,
        /// Constructs a fresh instance of the behavior for each spawn.
        factory: BehaviorFactory,
    },
}

pub(crate) enum NodeBody {
    Composite {
        kind: CompositeKind,
        children: Vec<Arc<ModelNode>>,
    },
    Decorator {
        kind: DecoratorKind,
        child: Arc<ModelNode>,
    },
    Leaf {
        kind: LeafKind,
    },
}

/// One immutable node of a behaviour tree's shape.
pub struct ModelNode {
    id: NodeId,
    body: NodeBody,
    guard: Option<Arc<ModelNode>>,
    position: OnceLock<Position>,
}

impl ModelNode {
    /// Constructs a composite node. `children` must be non-empty.
    ///
    /// # Errors
    /// Returns [`error::Error::NoChildren`] if `children` is empty.
    pub fn composite(kind: CompositeKind, children: Vec<Arc<ModelNode>>) -> Result<Arc<Self>, error::Error> {
        Self::composite_guarded(kind, children, None)
    }

    /// As [`composite`](Self::composite), additionally attaching a guard sub-tree.
    ///
    /// Guards gate whether a priority-list composite's child may become active; see
    /// [`CompositeKind::StaticPriorityList`] and [`CompositeKind::DynamicPriorityList`].
    ///
    /// # Errors
    /// Returns [`error::Error::NoChildren`] if `children` is empty.
    pub fn composite_guarded(
        kind: CompositeKind,
        children: Vec<Arc<ModelNode>>,
        guard: Option<Arc<ModelNode>>,
    ) -> Result<Arc<Self>, error::Error> {
        if children.is_empty() {
            return Err(error::Error::NoChildren { kind: "composite" });
        }
        Ok(Arc::new(Self {
            id: NodeId::next(),
            body: NodeBody::Composite { kind, children },
            guard,
            position: OnceLock::new(),
        }))
    }

    /// Constructs a decorator node wrapping `child`.
    #[must_use]
    pub fn decorator(kind: DecoratorKind, child: Arc<ModelNode>) -> Arc<Self> {
        Self::decorator_guarded(kind, child, None)
    }

    /// As [`decorator`](Self::decorator), additionally attaching a guard sub-tree.
    #[must_use]
    pub fn decorator_guarded(kind: DecoratorKind, child: Arc<ModelNode>, guard: Option<Arc<ModelNode>>) -> Arc<Self> {
        Arc::new(Self {
            id: NodeId::next(),
            body: NodeBody::Decorator { kind, child },
            guard,
            position: OnceLock::new(),
        })
    }

    /// Constructs a leaf node.
    #[must_use]
    pub fn leaf(kind: LeafKind) -> Arc<Self> {
        Self::leaf_guarded(kind, None)
    }

    /// As [`leaf`](Self::leaf), additionally attaching a guard sub-tree.
    #[must_use]
    pub fn leaf_guarded(kind: LeafKind, guard: Option<Arc<ModelNode>>) -> Arc<Self> {
        Arc::new(Self {
            id: NodeId::next(),
            body: NodeBody::Leaf { kind },
            guard,
            position: OnceLock::new(),
        })
    }

    /// This node's stable identity.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// The node's guard sub-tree, if any.
    #[must_use]
    pub fn guard(&self) -> Option<&Arc<ModelNode>> {
        self.guard.as_ref()
    }

    /// The node's children (empty for leaves, exactly one for decorators).
    #[must_use]
    pub fn children(&self) -> &[Arc<ModelNode>] {
        match &self.body {
            NodeBody::Composite { children, .. } => children,
            NodeBody::Decorator { child, .. } => std::slice::from_ref(child),
            NodeBody::Leaf { .. } => &[],
        }
    }

    /// This node's assigned position. Panics if called before
    /// [`compute_positions`](Self::compute_positions) has run for this node; the
    /// scheduler guarantees that by calling it once in `BtExecutor::new`.
    #[must_use]
    pub fn position(&self) -> &Position {
        self.position
            .get()
            .unwrap_or_else(|| unreachable!("{}", crate::SHOULD_NOT_HAPPEN))
    }

    /// Assigns this node and every descendant its deterministic position, a path of
    /// child indices from `root`. Idempotent: re-running it on the same tree shape
    /// assigns the same positions, so sharing one model tree across several
    /// [`BtExecutor`](crate::scheduler::BtExecutor) instances is safe.
    pub fn compute_positions(self: &Arc<Self>) {
        self.assign_position(Position::root());
    }

    fn assign_position(&self, position: Position) {
        let _ = self.position.set(position.clone());
        if let Some(guard) = &self.guard {
            guard.assign_position(position.child(usize::MAX));
        }
        for (index, child) in self.children().iter().enumerate() {
            child.assign_position(position.child(index));
        }
    }

    /// Dispatch helper: the node's composite/decorator/leaf body.
    pub(crate) fn body(&self) -> &NodeBody {
        &self.body
    }

    /// Rebuilds an equivalent node with `guard` attached, for builders that construct a
    /// child before learning it needs a guard (see [`crate::model::builder`]). Discards
    /// any position already computed on the original, since a fresh node has no position.
    #[must_use]
    pub(crate) fn with_guard_attached(&self, guard: Arc<ModelNode>) -> Arc<Self> {
        match &self.body {
            NodeBody::Composite { kind, children } => {
                Self::composite_guarded(kind.clone(), children.clone(), Some(guard))
                    .unwrap_or_else(|_| unreachable!("{}", crate::SHOULD_NOT_HAPPEN))
            }
            NodeBody::Decorator { kind, child } => Self::decorator_guarded(kind.clone(), child.clone(), Some(guard)),
            NodeBody::Leaf { kind } => Self::leaf_guarded(kind.clone(), Some(guard)),
        }
    }
}

impl fmt::Debug for ModelNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelNode")
            .field("id", &self.id)
            .field("position", &self.position.get())
            .field("children", &self.children().len())
            .finish()
    }
}
