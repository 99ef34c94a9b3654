// Copyright © 2025 Stephan Kunz
//! Tests the decorator executors: the simple status-mappers, `Limit`, and `Interrupter`.

#[path = "support.rs"]
mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use behavior_engine::prelude::*;
use rstest::rstest;
use support::{spawn_sequence, tick_until_terminal, CountedStatus};

const MAX_TICKS: usize = 30;

fn fixed(name: &'static str, status: Status) -> Arc<ModelNode> {
    ModelBuilder::behavior(name, BehaviorKind::Action, move || support::ChangeStatusAfter::new(status, status, 0))
}

#[rstest]
#[case(Status::Success, Status::Failure)]
#[case(Status::Failure, Status::Success)]
fn inverter_swaps_success_and_failure(#[case] child: Status, #[case] expected: Status) {
    let tree = ModelBuilder::inverter(fixed("child", child));
    let mut exec = BtExecutor::new(tree, Arc::new(BasicContext::new()));
    assert_eq!(tick_until_terminal(&mut exec, MAX_TICKS), expected);
}

#[rstest]
#[case(Status::Success)]
#[case(Status::Failure)]
fn succeeder_always_reports_success(#[case] child: Status) {
    let tree = ModelBuilder::succeeder(fixed("child", child));
    let mut exec = BtExecutor::new(tree, Arc::new(BasicContext::new()));
    assert_eq!(tick_until_terminal(&mut exec, MAX_TICKS), Status::Success);
}

#[test]
fn until_fail_respawns_on_success_and_reports_success_on_the_first_failure() {
    let tree = ModelBuilder::until_fail(ModelBuilder::behavior(
        "child",
        BehaviorKind::Action,
        spawn_sequence(vec![Status::Success, Status::Success, Status::Failure]),
    ));
    let mut exec = BtExecutor::new(tree, Arc::new(BasicContext::new()));
    assert_eq!(tick_until_terminal(&mut exec, MAX_TICKS), Status::Success);
}

#[test]
fn repeat_respawns_unconditionally_and_never_resolves_on_its_own() {
    let tree = ModelBuilder::repeat(ModelBuilder::behavior(
        "child",
        BehaviorKind::Action,
        spawn_sequence(vec![Status::Success, Status::Failure, Status::Success]),
    ));
    let mut exec = BtExecutor::new(tree, Arc::new(BasicContext::new()));
    for _ in 0..MAX_TICKS {
        assert_eq!(exec.tick(), Status::Running);
    }
}

/// A `Limit(2)` decorator's bound is persisted across every re-spawn at its tree position,
/// even though `Repeat` re-enters the subtree indefinitely: each wrapped leaf is invoked
/// at most twice over the whole run, whichever `Limit` happens to exhaust first as the
/// left-to-right spawn order keeps re-entering the sequence.
#[test]
fn limit_bound_survives_across_repeat_respawns() {
    let first_count = Arc::new(AtomicUsize::new(0));
    let second_count = Arc::new(AtomicUsize::new(0));
    let third_count = Arc::new(AtomicUsize::new(0));

    let counted = |count: Arc<AtomicUsize>, status: Status| {
        ModelBuilder::behavior("leaf", BehaviorKind::Action, move || CountedStatus { count: count.clone(), status })
    };

    let sequence = ModelBuilder::sequence(vec![
        ModelBuilder::limit(2, counted(first_count.clone(), Status::Success)),
        ModelBuilder::limit(2, counted(second_count.clone(), Status::Success)),
        ModelBuilder::limit(2, counted(third_count.clone(), Status::Failure)),
    ])
    .expect("three children");
    let tree = ModelBuilder::repeat(sequence);
    let mut exec = BtExecutor::new(tree, Arc::new(BasicContext::new()));

    for _ in 0..MAX_TICKS {
        assert_eq!(exec.tick(), Status::Running);
    }

    assert!(first_count.load(Ordering::SeqCst) <= 2);
    assert!(second_count.load(Ordering::SeqCst) <= 2);
    assert!(third_count.load(Ordering::SeqCst) <= 2);
}

#[test]
fn interrupter_fires_and_terminates_its_running_child() {
    let (interrupter, handle) = ModelBuilder::interrupter(ModelBuilder::wait(1_000_000));
    let perform = ModelBuilder::perform_interruption(handle, Status::Success).expect("success is a valid substitute");
    let tree = ModelBuilder::parallel(ParallelPolicy::Selector, vec![interrupter, perform]).expect("two children");
    let mut exec = BtExecutor::new(tree, Arc::new(BasicContext::new()));
    assert_eq!(tick_until_terminal(&mut exec, MAX_TICKS), Status::Success);
}

#[test]
fn perform_interruption_rejects_a_non_terminal_substitute_status() {
    let (_interrupter, handle) = ModelBuilder::interrupter(ModelBuilder::wait(1_000_000));
    assert!(ModelBuilder::perform_interruption(handle, Status::Running).is_err());
}
