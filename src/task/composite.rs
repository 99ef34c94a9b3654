// Copyright © 2025 Stephan Kunz
//! Composite execution: Sequence/Selector family, the two priority lists, and Parallel.
//!
//! Like decorators, composites carry no per-cycle work of their own (the one exception,
//! re-evaluating a [`CompositeKind::DynamicPriorityList`]'s guards, is driven directly by
//! the scheduler's guard-evaluation worklist, not by ticking the composite itself): the
//! policy lives entirely in [`on_child_status`], invoked when the active child (or, for
//! `Parallel`, any child) resolves terminal. A priority list whose spawn finds no true
//! guard is the other exception: with no child to host, it requests tickable membership
//! for itself instead of resolving on the spot, the same way a spent
//! [`Limit`](crate::model::DecoratorKind::Limit) does in the decorator module.

use crate::model::{CompositeKind, NodeBody, ParallelPolicy};
use crate::scheduler::{evaluate_guard, BtExecutor};
use crate::status::Status;
use crate::task::{TaskId, TaskKind};

#[derive(Clone, Copy, PartialEq, Eq)]
enum SequentialPolicy {
    Sequence,
    Selector,
}

pub(crate) struct CompositeTask {
    runtime: CompositeRuntime,
}

enum CompositeRuntime {
    /// `Sequence`, `Selector`, and their randomized variants: one active child at a time,
    /// visited in `order`.
    Sequential { policy: SequentialPolicy, order: Vec<usize>, active_ordinal: usize, active_child: Option<TaskId> },
    /// `StaticPriorityList` and `DynamicPriorityList`: one active child, chosen by guard.
    /// `unmatched` is set when spawn finds no true guard, so the resulting Failure still
    /// passes through one tickable cycle instead of resolving synchronously with no child
    /// spawned — see the note on [`super::decorator::DecoratorTask`]'s `Limit` variant for
    /// why that matters under a parent that unconditionally re-spawns on any terminal
    /// status.
    Priority { active_index: Option<usize>, active_child: Option<TaskId>, unmatched: bool },
    /// `Parallel`: every child spawned at once.
    Parallel { policy: ParallelPolicy, children: Vec<Option<TaskId>>, results: Vec<Option<Status>> },
}

enum RuntimeTag {
    Sequential,
    Priority,
    Parallel,
}

impl CompositeTask {
    pub(crate) fn new(kind: &CompositeKind) -> Self {
        let runtime = match kind {
            CompositeKind::Sequence | CompositeKind::RandomSequence => {
                CompositeRuntime::Sequential { policy: SequentialPolicy::Sequence, order: Vec::new(), active_ordinal: 0, active_child: None }
            }
            CompositeKind::Selector | CompositeKind::RandomSelector => {
                CompositeRuntime::Sequential { policy: SequentialPolicy::Selector, order: Vec::new(), active_ordinal: 0, active_child: None }
            }
            CompositeKind::StaticPriorityList | CompositeKind::DynamicPriorityList => {
                CompositeRuntime::Priority { active_index: None, active_child: None, unmatched: false }
            }
            CompositeKind::Parallel { policy } => CompositeRuntime::Parallel { policy: *policy, children: Vec::new(), results: Vec::new() },
        };
        Self { runtime }
    }

    fn tag(&self) -> RuntimeTag {
        match &self.runtime {
            CompositeRuntime::Sequential { .. } => RuntimeTag::Sequential,
            CompositeRuntime::Priority { .. } => RuntimeTag::Priority,
            CompositeRuntime::Parallel { .. } => RuntimeTag::Parallel,
        }
    }
}

fn composite_mut(sched: &mut BtExecutor, id: TaskId) -> &mut CompositeTask {
    match &mut sched.node_mut(id).kind {
        TaskKind::Composite(composite) => composite,
        _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
    }
}

pub(crate) fn spawn(sched: &mut BtExecutor, id: TaskId) {
    let kind = match sched.node(id).model.body() {
        NodeBody::Composite { kind, .. } => kind.clone(),
        _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
    };
    let child_count = sched.node(id).model.children().len();
    let ctx = sched.node(id).context.clone();
    match kind {
        CompositeKind::Sequence | CompositeKind::Selector | CompositeKind::RandomSequence | CompositeKind::RandomSelector => {
            let mut order: Vec<usize> = (0..child_count).collect();
            if matches!(kind, CompositeKind::RandomSequence | CompositeKind::RandomSelector) {
                sched.shuffle_order(&mut order);
            }
            let child_index = order[0];
            let child_model = sched.node(id).model.children()[child_index].clone();
            let child_id = sched.spawn_task(child_model, Some(id), ctx);
            if let CompositeRuntime::Sequential { order: stored_order, active_ordinal, active_child, .. } = &mut composite_mut(sched, id).runtime {
                *stored_order = order;
                *active_ordinal = 0;
                *active_child = Some(child_id);
            }
        }
        CompositeKind::StaticPriorityList | CompositeKind::DynamicPriorityList => {
            let dynamic = matches!(kind, CompositeKind::DynamicPriorityList);
            let mut chosen = None;
            for idx in 0..child_count {
                let guard = sched.node(id).model.children()[idx].guard().cloned();
                if evaluate_guard(guard.as_ref(), &ctx) {
                    chosen = Some(idx);
                    break;
                }
            }
            match chosen {
                Some(idx) => {
                    let child_model = sched.node(id).model.children()[idx].clone();
                    let child_id = sched.spawn_task(child_model, Some(id), ctx);
                    if let CompositeRuntime::Priority { active_index, active_child, .. } = &mut composite_mut(sched, id).runtime {
                        *active_index = Some(idx);
                        *active_child = Some(child_id);
                    }
                    if dynamic {
                        sched.request_guard_eval(id);
                    }
                }
                None => {
                    if let CompositeRuntime::Priority { unmatched, .. } = &mut composite_mut(sched, id).runtime {
                        *unmatched = true;
                    }
                    sched.request_tickable(id);
                }
            }
        }
        CompositeKind::Parallel { .. } => {
            let child_models: Vec<_> = sched.node(id).model.children().to_vec();
            let mut children = Vec::with_capacity(child_models.len());
            for child_model in child_models {
                children.push(Some(sched.spawn_task(child_model, Some(id), ctx.clone())));
            }
            let results = vec![None; children.len()];
            if let CompositeRuntime::Parallel { children: stored_children, results: stored_results, .. } = &mut composite_mut(sched, id).runtime {
                *stored_children = children;
                *stored_results = results;
            }
        }
    }
}

pub(crate) fn on_child_status(sched: &mut BtExecutor, id: TaskId, child: TaskId, status: Status) {
    let tag = match &sched.node(id).kind {
        TaskKind::Composite(composite) => composite.tag(),
        _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
    };
    match tag {
        RuntimeTag::Sequential => on_child_status_sequential(sched, id, status),
        RuntimeTag::Priority => sched.finish_task(id, status),
        RuntimeTag::Parallel => on_child_status_parallel(sched, id, child, status),
    }
}

fn on_child_status_sequential(sched: &mut BtExecutor, id: TaskId, status: Status) {
    let (policy, order_len, active_ordinal) = match &sched.node(id).kind {
        TaskKind::Composite(composite) => match &composite.runtime {
            CompositeRuntime::Sequential { policy, order, active_ordinal, .. } => (*policy, order.len(), *active_ordinal),
            _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
        },
        _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
    };
    match (policy, status) {
        (SequentialPolicy::Sequence, Status::Success) | (SequentialPolicy::Selector, Status::Failure) => {
            if active_ordinal + 1 < order_len {
                advance_sequential(sched, id, active_ordinal + 1);
            } else {
                let resolved = match policy {
                    SequentialPolicy::Sequence => Status::Success,
                    SequentialPolicy::Selector => Status::Failure,
                };
                sched.finish_task(id, resolved);
            }
        }
        (SequentialPolicy::Sequence, Status::Failure) | (SequentialPolicy::Selector, Status::Success) => {
            sched.finish_task(id, status);
        }
        (_, Status::Terminated) => sched.finish_task(id, Status::Terminated),
        _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
    }
}

fn advance_sequential(sched: &mut BtExecutor, id: TaskId, new_ordinal: usize) {
    let child_index = match &sched.node(id).kind {
        TaskKind::Composite(composite) => match &composite.runtime {
            CompositeRuntime::Sequential { order, .. } => order[new_ordinal],
            _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
        },
        _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
    };
    let child_model = sched.node(id).model.children()[child_index].clone();
    let ctx = sched.node(id).context.clone();
    let child_id = sched.spawn_task(child_model, Some(id), ctx);
    if let CompositeRuntime::Sequential { active_ordinal, active_child, .. } = &mut composite_mut(sched, id).runtime {
        *active_ordinal = new_ordinal;
        *active_child = Some(child_id);
    }
}

fn on_child_status_parallel(sched: &mut BtExecutor, id: TaskId, child: TaskId, status: Status) {
    let (policy, snapshot, child_index) = match &sched.node(id).kind {
        TaskKind::Composite(composite) => match &composite.runtime {
            CompositeRuntime::Parallel { policy, children, results } => {
                let index = children
                    .iter()
                    .position(|&c| c == Some(child))
                    .unwrap_or_else(|| unreachable!("{}", crate::SHOULD_NOT_HAPPEN));
                let mut snapshot = results.clone();
                snapshot[index] = Some(status);
                (*policy, snapshot, index)
            }
            _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
        },
        _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
    };
    if let CompositeRuntime::Parallel { results, .. } = &mut composite_mut(sched, id).runtime {
        results[child_index] = Some(status);
    }

    let all_terminal = snapshot.iter().all(Option::is_some);
    let any_success = snapshot.iter().any(|s| *s == Some(Status::Success));
    let failure_or_terminated = snapshot.iter().find(|s| matches!(s, Some(Status::Failure) | Some(Status::Terminated)));

    match policy {
        ParallelPolicy::Sequence => {
            if let Some(&Some(culprit)) = failure_or_terminated {
                terminate_other_children(sched, id, child);
                sched.finish_task(id, culprit);
            } else if all_terminal {
                sched.finish_task(id, Status::Success);
            }
        }
        ParallelPolicy::Selector => {
            if any_success {
                terminate_other_children(sched, id, child);
                sched.finish_task(id, Status::Success);
            } else if all_terminal {
                sched.finish_task(id, Status::Failure);
            }
        }
    }
}

fn terminate_other_children(sched: &mut BtExecutor, id: TaskId, except: TaskId) {
    let children = match &sched.node(id).kind {
        TaskKind::Composite(composite) => match &composite.runtime {
            CompositeRuntime::Parallel { children, .. } => children.clone(),
            _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
        },
        _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
    };
    for maybe_child in children.into_iter().flatten() {
        if maybe_child != except {
            sched.terminate_task(maybe_child);
        }
    }
}

pub(crate) fn internal_tick(sched: &mut BtExecutor, id: TaskId) -> Status {
    match &sched.node(id).kind {
        TaskKind::Composite(composite) => match &composite.runtime {
            CompositeRuntime::Priority { unmatched: true, .. } => Status::Failure,
            _ => Status::Running,
        },
        _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
    }
}

/// Re-evaluates the guards to the left of the active child of a `DynamicPriorityList`,
/// switching the active child if a more-leftward guard has become true. Driven once per
/// tick by the scheduler's guard-evaluation worklist, never by [`internal_tick`].
pub(crate) fn reevaluate_guards(sched: &mut BtExecutor, id: TaskId) {
    let active_index = match &sched.node(id).kind {
        TaskKind::Composite(composite) => match &composite.runtime {
            CompositeRuntime::Priority { active_index, .. } => *active_index,
            _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
        },
        _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
    };
    let Some(active_index) = active_index else { return };
    let ctx = sched.node(id).context.clone();
    let mut switch_to = None;
    for idx in 0..active_index {
        let guard = sched.node(id).model.children()[idx].guard().cloned();
        if evaluate_guard(guard.as_ref(), &ctx) {
            switch_to = Some(idx);
            break;
        }
    }
    let Some(new_index) = switch_to else { return };

    let old_child = match &sched.node(id).kind {
        TaskKind::Composite(composite) => match &composite.runtime {
            CompositeRuntime::Priority { active_child, .. } => *active_child,
            _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
        },
        _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
    };
    if let Some(old_id) = old_child {
        sched.terminate_task(old_id);
    }
    let child_model = sched.node(id).model.children()[new_index].clone();
    let new_child_id = sched.spawn_task(child_model, Some(id), ctx);
    if let CompositeRuntime::Priority { active_index, active_child, .. } = &mut composite_mut(sched, id).runtime {
        *active_index = Some(new_index);
        *active_child = Some(new_child_id);
    }
}

pub(crate) fn terminate(sched: &mut BtExecutor, id: TaskId) {
    let children: Vec<TaskId> = match &sched.node(id).kind {
        TaskKind::Composite(composite) => match &composite.runtime {
            CompositeRuntime::Sequential { active_child, .. } | CompositeRuntime::Priority { active_child, .. } => {
                active_child.iter().copied().collect()
            }
            CompositeRuntime::Parallel { children, .. } => children.iter().filter_map(|c| *c).collect(),
        },
        _ => unreachable!("{}", crate::SHOULD_NOT_HAPPEN),
    };
    for child_id in children {
        sched.terminate_task(child_id);
    }
}
