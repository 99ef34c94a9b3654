// Copyright © 2025 Stephan Kunz
//! Tests the executor's own bookkeeping: position assignment, termination, and the
//! per-position state maps — as opposed to the composite/decorator policies layered on
//! top of them.

#[path = "support.rs"]
mod support;

use std::collections::HashSet;
use std::sync::Arc;

use behavior_engine::position::Position;
use behavior_engine::prelude::*;
use behavior_engine::task::state::RUNS_SO_FAR;
use support::tick_until_terminal;

const MAX_TICKS: usize = 20;

fn collect_positions(node: &Arc<ModelNode>, out: &mut Vec<Position>) {
    out.push(node.position().clone());
    if let Some(guard) = node.guard() {
        collect_positions(guard, out);
    }
    for child in node.children() {
        collect_positions(child, out);
    }
}

#[test]
fn every_node_in_a_tree_gets_a_distinct_position() {
    let guarded_a = (ModelBuilder::success(), ModelBuilder::failure()).into();
    let guarded_b = (ModelBuilder::failure(), ModelBuilder::success()).into();
    let priority = ModelBuilder::static_priority(vec![guarded_a, guarded_b]).expect("two children");
    let tree = ModelBuilder::sequence(vec![priority, ModelBuilder::repeat(ModelBuilder::wait(5))]).expect("two children");
    tree.compute_positions();

    let mut positions = Vec::new();
    collect_positions(&tree, &mut positions);
    let unique: HashSet<_> = positions.iter().cloned().collect();
    assert_eq!(positions.len(), unique.len(), "duplicate position among {positions:?}");
}

#[test]
fn compute_positions_is_idempotent_across_independent_executors() {
    let tree = ModelBuilder::sequence(vec![ModelBuilder::success(), ModelBuilder::failure()]).expect("two children");
    let mut first = BtExecutor::new(tree.clone(), Arc::new(BasicContext::new()));
    let mut second = BtExecutor::new(tree, Arc::new(BasicContext::new()));
    assert_eq!(tick_until_terminal(&mut first, MAX_TICKS), tick_until_terminal(&mut second, MAX_TICKS));
}

#[test]
fn status_is_ready_before_the_first_tick() {
    let tree = ModelBuilder::success();
    let exec = BtExecutor::new(tree, Arc::new(BasicContext::new()));
    assert_eq!(exec.get_status(), Status::Ready);
}

#[test]
fn terminate_is_idempotent_and_reports_terminated() {
    let tree = ModelBuilder::wait(1_000_000);
    let mut exec = BtExecutor::new(tree, Arc::new(BasicContext::new()));
    assert_eq!(exec.tick(), Status::Running);
    exec.terminate();
    assert_eq!(exec.get_status(), Status::Terminated);
    exec.terminate();
    assert_eq!(exec.get_status(), Status::Terminated);
}

#[test]
fn terminate_before_any_tick_does_not_panic() {
    let tree = ModelBuilder::wait(1_000_000);
    let mut exec = BtExecutor::new(tree, Arc::new(BasicContext::new()));
    exec.terminate();
    assert_eq!(exec.get_status(), Status::Ready);
}

#[test]
fn limit_run_counter_persists_in_task_state_across_repeat_respawns() {
    let leaf = ModelBuilder::behavior("leaf", BehaviorKind::Action, || support::ChangeStatusAfter::new(Status::Success, Status::Success, 0));
    let limited = ModelBuilder::limit(2, leaf);
    let tree = ModelBuilder::repeat(limited);
    tree.compute_positions();
    let position = tree.children()[0].position().clone();

    let mut exec = BtExecutor::new(tree, Arc::new(BasicContext::new()));
    for _ in 0..MAX_TICKS {
        exec.tick();
    }

    let runs = exec.get_task_state(&position).and_then(|s| s.get_i64(RUNS_SO_FAR));
    assert!(runs.unwrap_or(0) >= 2, "expected the bound to have been reached, got {runs:?}");
}
