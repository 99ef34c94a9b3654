// Copyright © 2025 Stephan Kunz
//! Leaf execution: the tree's primitive work, with no children of its own (`SubtreeLookup`
//! aside, which spawns one on a lookup hit).
//!
//! Every leaf but [`LeafKind::Wait`] and [`LeafKind::Behavior`] resolves its outcome
//! synchronously at spawn time and just replays it the first time the scheduler ticks it;
//! see [`LeafRuntime::Synchronous`]. A `SubtreeLookup` hit is the one leaf that is purely
//! reactive like a decorator: it never occupies tickable itself, and instead adopts its
//! spawned subtree's status from [`on_child_status`] the moment that tree resolves.

use std::time::{Duration, Instant};

use crate::behavior::Behavior;
use crate::model::{LeafKind, NodeBody};
use crate::scheduler::BtExecutor;
use crate::status::Status;
use crate::task::{TaskId, TaskKind};

pub(crate) struct LeafTask {
    runtime: LeafRuntime,
}

enum LeafRuntime {
    /// Success, Failure, VariableRenamer, PerformInterruption, and a SubtreeLookup miss:
    /// the outcome is already known by the time `spawn` returns.
    Synchronous { result: Option<Status> },
    /// Re-evaluated against the wall clock on every tick.
    Wait { duration: Duration, started: Option<Instant> },
    /// A SubtreeLookup hit: passthrough to a spawned child tree.
    Subtree { child: Option<TaskId> },
    /// An embedder-supplied Action or Condition.
    Behavior { instance: Option<Box<dyn Behavior>> },
}

impl LeafTask {
    pub(crate) fn new(kind: &LeafKind) -> Self {
        let runtime = match kind {
            LeafKind::Success
            | LeafKind::Failure
            | LeafKind::VariableRenamer { .. }
            | LeafKind::PerformInterruption { .. } => LeafRuntime::Synchronous { result: None },
            LeafKind::Wait { duration_ms } => {
                LeafRuntime::Wait { duration: Duration::from_millis(*duration_ms), started: None }
            }
            LeafKind::SubtreeLookup { .. } => LeafRuntime::Subtree { child: None },
            LeafKind::Behavior { .. } => LeafRuntime::Behavior { instance: None },
        };
        Self { runtime }
    }
}

fn leaf_mut(sched: &mut BtExecutor, id: TaskId) -> &mut LeafTask {
    match &mut sched.node_mut(id).kind {
        TaskKind::Leaf(leaf) => leaf,
        _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
    }
}

pub(crate) fn spawn(sched: &mut BtExecutor, id: TaskId) {
    let kind = match sched.node(id).model.body() {
        NodeBody::Leaf { kind } => kind.clone(),
        _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
    };
    let ctx = sched.node(id).context.clone();
    match kind {
        LeafKind::Success => {
            leaf_mut(sched, id).runtime = LeafRuntime::Synchronous { result: Some(Status::Success) };
            sched.request_tickable(id);
        }
        LeafKind::Failure => {
            leaf_mut(sched, id).runtime = LeafRuntime::Synchronous { result: Some(Status::Failure) };
            sched.request_tickable(id);
        }
        LeafKind::Wait { duration_ms } => {
            leaf_mut(sched, id).runtime =
                LeafRuntime::Wait { duration: Duration::from_millis(duration_ms), started: Some(Instant::now()) };
            sched.request_tickable(id);
        }
        LeafKind::SubtreeLookup { name } => match ctx.get_bt(&name) {
            Some(subtree_model) => {
                subtree_model.compute_positions();
                let child_id = sched.spawn_task(subtree_model, Some(id), ctx.clone());
                leaf_mut(sched, id).runtime = LeafRuntime::Subtree { child: Some(child_id) };
            }
            None => {
                tracing::debug!(name = %name, "subtree lookup miss");
                leaf_mut(sched, id).runtime = LeafRuntime::Synchronous { result: Some(Status::Failure) };
                sched.request_tickable(id);
            }
        },
        LeafKind::VariableRenamer { old, new } => {
            if let Some(value) = ctx.get(&old) {
                ctx.set(&new, Some(value));
                ctx.clear_variable(&old);
            }
            leaf_mut(sched, id).runtime = LeafRuntime::Synchronous { result: Some(Status::Success) };
            sched.request_tickable(id);
        }
        LeafKind::PerformInterruption { target, desired_status } => {
            sched.fire_interrupt(target, desired_status);
            leaf_mut(sched, id).runtime = LeafRuntime::Synchronous { result: Some(Status::Success) };
            sched.request_tickable(id);
        }
        LeafKind::Behavior { factory, .. } => {
            leaf_mut(sched, id).runtime = LeafRuntime::Behavior { instance: Some(factory()) };
            sched.request_tickable(id);
        }
    }
}

/// Called when a `SubtreeLookup` hit's spawned tree resolves terminal; the lookup leaf
/// adopts and propagates that status as its own.
pub(crate) fn on_child_status(sched: &mut BtExecutor, id: TaskId, _child: TaskId, status: Status) {
    if let LeafRuntime::Subtree { child } = &mut leaf_mut(sched, id).runtime {
        *child = None;
    }
    sched.finish_task(id, status);
}

pub(crate) fn internal_tick(sched: &mut BtExecutor, id: TaskId) -> Status {
    enum Action {
        Return(Status),
        Wait { duration: Duration, started: Instant },
        Behavior,
    }

    let action = match &sched.node(id).kind {
        TaskKind::Leaf(leaf) => match &leaf.runtime {
            LeafRuntime::Synchronous { result } => Action::Return(result.unwrap_or(Status::Failure)),
            LeafRuntime::Wait { duration, started } => Action::Wait {
                duration: *duration,
                started: started.unwrap_or_else(|| unreachable!("{}", crate::SHOULD_NOT_HAPPEN)),
            },
            LeafRuntime::Subtree { .. } => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
            LeafRuntime::Behavior { .. } => Action::Behavior,
        },
        _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
    };

    match action {
        Action::Return(status) => status,
        Action::Wait { duration, started } => {
            if started.elapsed() >= duration {
                Status::Success
            } else {
                Status::Running
            }
        }
        Action::Behavior => {
            let ctx = sched.node(id).context.clone();
            let status = match &mut leaf_mut(sched, id).runtime {
                LeafRuntime::Behavior { instance } => {
                    instance.as_deref_mut().unwrap_or_else(|| unreachable!("{}", crate::SHOULD_NOT_HAPPEN)).tick(ctx.as_ref())
                }
                _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
            };
            if matches!(status, Status::Ready | Status::Terminated) {
                tracing::warn!(?status, "behavior returned a non-terminal-tick status, treating as Failure");
                Status::Failure
            } else {
                status
            }
        }
    }
}

/// Called once by the scheduler when this task resolves a terminal status, either on its
/// own or via [`terminate`].
pub(crate) fn on_finish(sched: &mut BtExecutor, id: TaskId, status: Status) {
    if let LeafRuntime::Behavior { instance } = &mut leaf_mut(sched, id).runtime {
        if let Some(mut behavior) = instance.take() {
            behavior.on_terminate(status);
        }
    }
}

pub(crate) fn terminate(sched: &mut BtExecutor, id: TaskId) {
    let child = match &mut leaf_mut(sched, id).runtime {
        LeafRuntime::Subtree { child } => child.take(),
        _ => None,
    };
    if let Some(child_id) = child {
        sched.terminate_task(child_id);
    }
}
