// Copyright © 2025 Stephan Kunz
//! [`BtExecutor`] — walks a model tree lazily and drives every live task one step per tick.
//!
//! The executor owns an arena of [`TaskNode`]s indexed by [`TaskId`], never the tree
//! itself: a [`ModelNode`] describes shape, a `TaskNode` describes one run of a piece of
//! that shape. Two worklists ([`Worklist`]) record structural changes a tick discovers
//! (a decorator re-spawning its child, a priority list switching its active child) and
//! apply them only at the next tick boundary, so a single walk always sees one consistent
//! shape.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::context::{Context, SafeContext};
use crate::model::{ModelNode, NodeId};
use crate::position::Position;
use crate::status::Status;
use crate::task::state::TaskState;
use crate::task::{composite, decorator, leaf, TaskId, TaskKind, TaskKindTag, TaskNode};

#[derive(Default)]
struct Worklist {
    members: Vec<TaskId>,
    member_set: HashSet<TaskId>,
    pending_insert: Vec<TaskId>,
    pending_cancel: HashSet<TaskId>,
}

impl Worklist {
    fn request_insert(&mut self, id: TaskId) {
        self.pending_cancel.remove(&id);
        if !self.member_set.contains(&id) && !self.pending_insert.contains(&id) {
            self.pending_insert.push(id);
        }
    }

    fn request_cancel(&mut self, id: TaskId) {
        self.pending_insert.retain(|&member| member != id);
        if self.member_set.contains(&id) {
            self.pending_cancel.insert(id);
        }
    }

    fn apply(&mut self) {
        if !self.pending_cancel.is_empty() {
            let cancelled = std::mem::take(&mut self.pending_cancel);
            self.members.retain(|id| !cancelled.contains(id));
            for id in cancelled {
                self.member_set.remove(&id);
            }
        }
        for id in self.pending_insert.drain(..) {
            if self.member_set.insert(id) {
                self.members.push(id);
            }
        }
    }
}

/// Walks a [`ModelNode`] tree lazily, one tick at a time.
///
/// Created once per run against a root context; [`compute_positions`](ModelNode::compute_positions)
/// is idempotent, so the same model tree may back any number of independent executors.
pub struct BtExecutor {
    model_root: Arc<ModelNode>,
    root_context: Arc<dyn Context>,
    arena: Vec<TaskNode>,
    root: Option<TaskId>,
    tickable: Worklist,
    guard_eval: Worklist,
    interrupters: HashMap<NodeId, TaskId>,
    task_states: HashMap<Position, TaskState>,
    task_termination_states: HashMap<Position, TaskState>,
    rng: Box<dyn rand::RngCore + Send>,
}

impl BtExecutor {
    /// Prepares an executor for `model_root`, rooted at `context`, with a freshly
    /// OS-seeded PRNG backing the random composite variants. Nothing is spawned until
    /// the first [`tick`](Self::tick) call.
    #[must_use]
    pub fn new(model_root: Arc<ModelNode>, context: Arc<dyn Context>) -> Self {
        use rand::SeedableRng;
        Self::with_rng(model_root, context, rand::rngs::StdRng::from_os_rng())
    }

    /// As [`new`](Self::new), but with an explicitly injected randomness source, so a
    /// test (or an embedder wanting reproducible runs) can pin down the exact child
    /// ordering a `RandomSequence`/`RandomSelector` produces.
    #[must_use]
    pub fn with_rng(model_root: Arc<ModelNode>, context: Arc<dyn Context>, rng: impl rand::RngCore + Send + 'static) -> Self {
        model_root.compute_positions();
        Self {
            model_root,
            root_context: context,
            arena: Vec::new(),
            root: None,
            tickable: Worklist::default(),
            guard_eval: Worklist::default(),
            interrupters: HashMap::new(),
            task_states: HashMap::new(),
            task_termination_states: HashMap::new(),
            rng: Box::new(rng),
        }
    }

    /// Advances the tree by one tick, returning its status afterwards.
    ///
    /// The first call spawns the root (and, transitively, every descendant the initial
    /// walk reaches). Each call applies any guard/tickable worklist changes queued by the
    /// previous tick before doing its own work, so a tick never observes a shape that is
    /// half-way through a structural change queued during itself.
    pub fn tick(&mut self) -> Status {
        if self.root.is_none() {
            let model = self.model_root.clone();
            let ctx = self.root_context.clone();
            self.root = Some(self.spawn_task(model, None, ctx));
        }

        self.guard_eval.apply();
        for id in self.guard_eval.members.clone() {
            if !self.node(id).status.is_terminal() {
                composite::reevaluate_guards(self, id);
            }
        }

        self.tickable.apply();
        for id in self.tickable.members.clone() {
            self.tick_task(id);
        }

        self.get_status()
    }

    /// The tree's current status. `Ready` before the first tick.
    #[must_use]
    pub fn get_status(&self) -> Status {
        self.root.map_or(Status::Ready, |id| self.node(id).status)
    }

    /// Forcibly stops the tree: terminates the root (and every live descendant)
    /// without letting any of them report a natural outcome. Idempotent.
    pub fn terminate(&mut self) {
        if let Some(root) = self.root {
            self.terminate_task(root);
        }
    }

    /// The persisted state for the task at `position`, if any has been stored (for
    /// example a [`Limit`](crate::model::DecoratorKind::Limit) decorator's run counter).
    #[must_use]
    pub fn get_task_state(&self, position: &Position) -> Option<&TaskState> {
        self.task_states.get(position)
    }

    /// The state a task at `position` was left with the last time it resolved terminal.
    #[must_use]
    pub fn get_task_termination_state(&self, position: &Position) -> Option<&TaskState> {
        self.task_termination_states.get(position)
    }

    /// The live execution task currently registered as the interrupter named `target`,
    /// if its interrupter decorator is still spawned.
    #[must_use]
    pub fn get_execution_interrupter(&self, target: NodeId) -> Option<TaskId> {
        self.interrupters.get(&target).copied()
    }

    pub(crate) fn node(&self, id: TaskId) -> &TaskNode {
        &self.arena[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: TaskId) -> &mut TaskNode {
        &mut self.arena[id.0]
    }

    pub(crate) fn request_tickable(&mut self, id: TaskId) {
        self.tickable.request_insert(id);
    }

    pub(crate) fn request_guard_eval(&mut self, id: TaskId) {
        self.guard_eval.request_insert(id);
    }

    pub(crate) fn register_interrupter(&mut self, target: NodeId, id: TaskId) {
        self.interrupters.insert(target, id);
    }

    pub(crate) fn unregister_interrupter(&mut self, target: NodeId) {
        self.interrupters.remove(&target);
    }

    pub(crate) fn restore_state(&self, position: &Position) -> TaskState {
        self.task_states.get(position).cloned().unwrap_or_default()
    }

    pub(crate) fn store_state(&mut self, position: Position, state: TaskState) {
        self.task_states.insert(position, state);
    }

    pub(crate) fn shuffle_order(&mut self, order: &mut [usize]) {
        use rand::seq::SliceRandom;
        order.shuffle(&mut self.rng);
    }

    pub(crate) fn spawn_task(&mut self, model: Arc<ModelNode>, parent: Option<TaskId>, context: Arc<dyn Context>) -> TaskId {
        let id = TaskId(self.arena.len());
        self.arena.push(TaskNode::new(model, parent, context));
        tracing::trace!(task = id.0, position = %self.node(id).model.position(), parent = ?parent.map(|p| p.0), "spawn");
        match self.node(id).tag() {
            TaskKindTag::Composite => composite::spawn(self, id),
            TaskKindTag::Decorator => decorator::spawn(self, id),
            TaskKindTag::Leaf => leaf::spawn(self, id),
        }
        id
    }

    fn tick_task(&mut self, id: TaskId) {
        if self.node(id).terminated || self.node(id).status.is_terminal() {
            return;
        }
        let status = match self.node(id).tag() {
            TaskKindTag::Composite => composite::internal_tick(self, id),
            TaskKindTag::Decorator => decorator::internal_tick(self, id),
            TaskKindTag::Leaf => leaf::internal_tick(self, id),
        };
        if status.is_terminal() {
            self.finish_task(id, status);
        }
    }

    /// Resolves `id` to a terminal `status` it reached on its own, and notifies its
    /// parent synchronously. Idempotent.
    pub(crate) fn finish_task(&mut self, id: TaskId, status: Status) {
        if self.node(id).status.is_terminal() {
            return;
        }
        tracing::debug!(task = id.0, ?status, "finish");
        self.node_mut(id).status = status;
        self.tickable.request_cancel(id);
        self.guard_eval.request_cancel(id);

        let position = self.node(id).model.position().clone();
        let state = self.task_states.get(&position).cloned().unwrap_or_default();
        self.task_termination_states.insert(position, state);

        match self.node(id).tag() {
            TaskKindTag::Leaf => leaf::on_finish(self, id, status),
            TaskKindTag::Decorator => decorator::on_finish(self, id, status),
            TaskKindTag::Composite => {}
        }

        if let Some(parent_id) = self.node(id).parent {
            match self.node(parent_id).tag() {
                TaskKindTag::Composite => composite::on_child_status(self, parent_id, id, status),
                TaskKindTag::Decorator => decorator::on_child_status(self, parent_id, id, status),
                TaskKindTag::Leaf => leaf::on_child_status(self, parent_id, id, status),
            }
        }
    }

    /// Forcibly terminates `id` (and whatever live children it holds), without notifying
    /// its parent. Idempotent.
    pub(crate) fn terminate_task(&mut self, id: TaskId) {
        if self.node(id).terminated {
            return;
        }
        if self.node(id).status.is_terminal() {
            self.node_mut(id).terminated = true;
            return;
        }
        tracing::debug!(task = id.0, "terminate");
        self.tickable.request_cancel(id);
        self.guard_eval.request_cancel(id);
        match self.node(id).tag() {
            TaskKindTag::Composite => composite::terminate(self, id),
            TaskKindTag::Decorator => decorator::terminate(self, id),
            TaskKindTag::Leaf => leaf::terminate(self, id),
        }
        let node = self.node_mut(id);
        node.status = Status::Terminated;
        node.terminated = true;
    }

    /// Fires the interrupter registered for `target`: terminates its current child,
    /// substitutes `desired_status`, and re-arms it for one more tick. A no-op if no
    /// interrupter is currently registered for `target` (it was never spawned, or it has
    /// already resolved and unregistered itself).
    pub(crate) fn fire_interrupt(&mut self, target: NodeId, desired_status: Status) {
        let Some(&interrupter_id) = self.interrupters.get(&target) else {
            tracing::trace!(?target, "perform_interruption: no live interrupter registered, ignoring");
            return;
        };
        tracing::debug!(?target, task = interrupter_id.0, ?desired_status, "interrupter fired");
        let child = match &self.node(interrupter_id).kind {
            TaskKind::Decorator(decorator) => decorator.child,
            TaskKind::Composite(_) | TaskKind::Leaf(_) => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
        };
        if let Some(child_id) = child {
            self.terminate_task(child_id);
        }
        if let TaskKind::Decorator(decorator) = &mut self.node_mut(interrupter_id).kind {
            decorator.child = None;
            decorator.set_pending_substitute(desired_status);
        }
        self.request_tickable(interrupter_id);
    }
}

/// Evaluates `guard` once, against a read-only [`SafeContext`] overlay of `ctx`. A
/// missing guard evaluates to `true` (Success). Runs a disposable nested [`BtExecutor`]
/// ticked exactly once, so only guards that resolve on their first tick (the built-in
/// synchronous leaves, and `Condition`/`Action` behaviors that do the same) are
/// guaranteed to produce a meaningful result; a guard sub-tree built from composites that
/// need more than one tick to resolve reads as `false` until it would.
pub(crate) fn evaluate_guard(guard: Option<&Arc<ModelNode>>, ctx: &Arc<dyn Context>) -> bool {
    let Some(guard) = guard else { return true };
    let overlay: Arc<dyn Context> = Arc::new(SafeContext::new(ctx.clone()));
    let mut nested = BtExecutor::new(guard.clone(), overlay);
    let result = nested.tick() == Status::Success;
    tracing::trace!(position = %guard.position(), result, "guard evaluated");
    result
}
