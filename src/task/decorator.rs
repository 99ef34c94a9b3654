// Copyright © 2025 Stephan Kunz
//! Decorator execution: each wraps exactly one child, and is otherwise purely reactive.
//!
//! Decorators almost never need their own place in the tickable worklist: all of their
//! logic runs synchronously from [`on_child_status`], called the instant the child they
//! are currently hosting resolves terminal. Two exceptions request tickable membership
//! for themselves: a fired [`Interrupter`](crate::model::DecoratorKind::Interrupter), and a
//! [`Limit`](crate::model::DecoratorKind::Limit) whose bound is already used up at spawn
//! time, which has no child to create a natural pause point for its own Failure — see the
//! `exhausted` field below for why that would otherwise recurse forever under a parent
//! that unconditionally re-spawns on any terminal status (`Repeat`).

use std::sync::Arc;

use crate::context::{value, Context, HierarchicalContext, SafeContext, SafeOutputContext};
use crate::model::{DecoratorKind, NodeBody};
use crate::scheduler::BtExecutor;
use crate::status::Status;
use crate::task::state::{self, TaskState};
use crate::task::{TaskId, TaskKind};

pub(crate) struct DecoratorTask {
    pub(crate) child: Option<TaskId>,
    extra: DecoratorExtra,
}

enum DecoratorExtra {
    Plain,
    /// `exhausted` is set when a spawn finds the bound already used up, so the Failure it
    /// reports still passes through one tickable cycle instead of resolving synchronously
    /// at spawn time. Without that, a parent that unconditionally re-spawns on any terminal
    /// status (e.g. `Repeat`) wrapped around an already-exhausted `Limit` would recurse
    /// spawn -> finish -> respawn forever within a single external tick, since no child is
    /// ever created to give the cascade a natural pause point.
    Limit { bound: u32, exhausted: bool },
    SafeOutput { outputs: Vec<crate::ConstString> },
    Interrupter { pending_substitute: Option<Status> },
}

impl DecoratorTask {
    pub(crate) fn new(kind: &DecoratorKind) -> Self {
        let extra = match kind {
            DecoratorKind::Inverter
            | DecoratorKind::Succeeder
            | DecoratorKind::UntilFail
            | DecoratorKind::Repeat
            | DecoratorKind::HierarchicalContextManager
            | DecoratorKind::SafeContextManager => DecoratorExtra::Plain,
            DecoratorKind::Limit { bound } => DecoratorExtra::Limit { bound: *bound, exhausted: false },
            DecoratorKind::SafeOutputContextManager { outputs } => DecoratorExtra::SafeOutput { outputs: outputs.clone() },
            DecoratorKind::Interrupter => DecoratorExtra::Interrupter { pending_substitute: None },
        };
        Self { child: None, extra }
    }

    /// The substitute status an interrupter is carrying, if it has fired.
    pub(crate) fn pending_substitute(&self) -> Option<Status> {
        match &self.extra {
            DecoratorExtra::Interrupter { pending_substitute } => *pending_substitute,
            _ => None,
        }
    }

    pub(crate) fn set_pending_substitute(&mut self, status: Status) {
        if let DecoratorExtra::Interrupter { pending_substitute } = &mut self.extra {
            *pending_substitute = Some(status);
        }
    }

    pub(crate) fn is_interrupter(&self) -> bool {
        matches!(self.extra, DecoratorExtra::Interrupter { .. })
    }
}

fn decorator_mut(sched: &mut BtExecutor, id: TaskId) -> &mut DecoratorTask {
    match &mut sched.node_mut(id).kind {
        TaskKind::Decorator(decorator) => decorator,
        _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
    }
}

fn spawn_child(sched: &mut BtExecutor, id: TaskId, context: Arc<dyn Context>) {
    let child_model = sched.node(id).model.children()[0].clone();
    let child_id = sched.spawn_task(child_model, Some(id), context);
    decorator_mut(sched, id).child = Some(child_id);
}

pub(crate) fn spawn(sched: &mut BtExecutor, id: TaskId) {
    let kind = match sched.node(id).model.body() {
        NodeBody::Decorator { kind, .. } => kind.clone(),
        _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
    };
    let ctx = sched.node(id).context.clone();
    match kind {
        DecoratorKind::Inverter | DecoratorKind::Succeeder | DecoratorKind::UntilFail | DecoratorKind::Repeat => {
            spawn_child(sched, id, ctx);
        }
        DecoratorKind::Limit { bound } => {
            let position = sched.node(id).model.position().clone();
            let previous = sched.restore_state(&position).get_i64(state::RUNS_SO_FAR).unwrap_or(0);
            let runs_so_far = previous + 1;
            let mut new_state = TaskState::new();
            new_state.set(state::RUNS_SO_FAR, value(runs_so_far));
            sched.store_state(position, new_state);
            if runs_so_far <= i64::from(bound) {
                spawn_child(sched, id, ctx);
            } else {
                if let TaskKind::Decorator(decorator) = &mut sched.node_mut(id).kind {
                    if let DecoratorExtra::Limit { exhausted, .. } = &mut decorator.extra {
                        *exhausted = true;
                    }
                }
                sched.request_tickable(id);
            }
        }
        DecoratorKind::HierarchicalContextManager => {
            spawn_child(sched, id, Arc::new(HierarchicalContext::new(ctx)));
        }
        DecoratorKind::SafeContextManager => {
            spawn_child(sched, id, Arc::new(SafeContext::new(ctx)));
        }
        DecoratorKind::SafeOutputContextManager { outputs } => {
            spawn_child(sched, id, Arc::new(SafeOutputContext::new(ctx, outputs)));
        }
        DecoratorKind::Interrupter => {
            spawn_child(sched, id, ctx);
            let node_id = sched.node(id).model.id();
            sched.register_interrupter(node_id, id);
        }
    }
}

fn respawn_child(sched: &mut BtExecutor, id: TaskId) {
    let ctx = sched.node(id).context.clone();
    spawn_child(sched, id, ctx);
}

pub(crate) fn on_child_status(sched: &mut BtExecutor, id: TaskId, _child: TaskId, status: Status) {
    let kind = match sched.node(id).model.body() {
        NodeBody::Decorator { kind, .. } => kind.clone(),
        _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
    };
    match kind {
        DecoratorKind::Inverter => {
            let mapped = match status {
                Status::Success => Status::Failure,
                Status::Failure | Status::Terminated => Status::Success,
                Status::Ready | Status::Running => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
            };
            sched.finish_task(id, mapped);
        }
        DecoratorKind::Succeeder => sched.finish_task(id, Status::Success),
        DecoratorKind::UntilFail => {
            if status == Status::Success {
                respawn_child(sched, id);
            } else {
                sched.finish_task(id, Status::Success);
            }
        }
        DecoratorKind::Repeat => respawn_child(sched, id),
        DecoratorKind::Limit { .. }
        | DecoratorKind::HierarchicalContextManager
        | DecoratorKind::SafeContextManager
        | DecoratorKind::SafeOutputContextManager { .. }
        | DecoratorKind::Interrupter => sched.finish_task(id, status),
    }
}

pub(crate) fn internal_tick(sched: &mut BtExecutor, id: TaskId) -> Status {
    match &sched.node(id).kind {
        TaskKind::Decorator(decorator) => match &decorator.extra {
            DecoratorExtra::Limit { exhausted: true, .. } => Status::Failure,
            _ => decorator.pending_substitute().unwrap_or(Status::Running),
        },
        _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
    }
}

/// Called once when this task resolves a terminal status, naturally or via [`terminate`].
pub(crate) fn on_finish(sched: &mut BtExecutor, id: TaskId, _status: Status) {
    if decorator_mut(sched, id).is_interrupter() {
        let node_id = sched.node(id).model.id();
        sched.unregister_interrupter(node_id);
    }
}

pub(crate) fn terminate(sched: &mut BtExecutor, id: TaskId) {
    let child = decorator_mut(sched, id).child.take();
    if let Some(child_id) = child {
        sched.terminate_task(child_id);
    }
    if decorator_mut(sched, id).is_interrupter() {
        let node_id = sched.node(id).model.id();
        sched.unregister_interrupter(node_id);
    }
}
