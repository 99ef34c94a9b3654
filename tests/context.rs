// Copyright © 2025 Stephan Kunz
//! Tests the context-manager decorators and the context-touching leaves, exercised
//! through an actual spawned tree rather than the overlay types in isolation.

#[path = "support.rs"]
mod support;

use std::sync::Arc;

use behavior_engine::context::{get_typed, set_typed};
use behavior_engine::prelude::*;
use support::tick_until_terminal;

const MAX_TICKS: usize = 10;

struct WriteVar {
    name: &'static str,
    val: i64,
}

impl Behavior for WriteVar {
    fn tick(&mut self, ctx: &dyn Context) -> Status {
        set_typed(ctx, self.name, self.val);
        Status::Success
    }
}

struct ReadVarInto {
    name: &'static str,
    out: Arc<std::sync::Mutex<Option<i64>>>,
}

impl Behavior for ReadVarInto {
    fn tick(&mut self, ctx: &dyn Context) -> Status {
        *self.out.lock().expect("lock") = get_typed::<i64>(ctx, self.name);
        Status::Success
    }
}

#[test]
fn hierarchical_context_manager_does_not_leak_writes_back_to_the_parent() {
    let ctx = Arc::new(BasicContext::new());
    let write_local = ModelBuilder::behavior("write", BehaviorKind::Action, || WriteVar { name: "scoped", val: 7 });
    let tree = ModelBuilder::hierarchical_context(write_local);
    let mut exec = BtExecutor::new(tree, ctx.clone());
    assert_eq!(tick_until_terminal(&mut exec, MAX_TICKS), Status::Success);
    assert!(get_typed::<i64>(ctx.as_ref(), "scoped").is_none());
}

#[test]
fn hierarchical_context_manager_still_reads_through_to_the_parent() {
    let ctx = Arc::new(BasicContext::new());
    set_typed(ctx.as_ref(), "outer", 3_i64);
    let out = Arc::new(std::sync::Mutex::new(None));
    let read = {
        let out = out.clone();
        ModelBuilder::behavior("read", BehaviorKind::Action, move || ReadVarInto { name: "outer", out: out.clone() })
    };
    let tree = ModelBuilder::hierarchical_context(read);
    let mut exec = BtExecutor::new(tree, ctx);
    assert_eq!(tick_until_terminal(&mut exec, MAX_TICKS), Status::Success);
    assert_eq!(*out.lock().expect("lock"), Some(3));
}

#[test]
fn safe_context_manager_sandboxes_writes_from_the_outer_context() {
    let ctx = Arc::new(BasicContext::new());
    set_typed(ctx.as_ref(), "x", 1_i64);
    let write_local = ModelBuilder::behavior("write", BehaviorKind::Action, || WriteVar { name: "x", val: 99 });
    let tree = ModelBuilder::safe_context(write_local);
    let mut exec = BtExecutor::new(tree, ctx.clone());
    assert_eq!(tick_until_terminal(&mut exec, MAX_TICKS), Status::Success);
    assert_eq!(get_typed::<i64>(ctx.as_ref(), "x"), Some(1));
}

#[test]
fn safe_output_context_manager_lets_whitelisted_writes_through() {
    let ctx = Arc::new(BasicContext::new());
    let write_result = ModelBuilder::behavior("write", BehaviorKind::Action, || WriteVar { name: "result", val: 42 });
    let write_scratch = ModelBuilder::behavior("scratch", BehaviorKind::Action, || WriteVar { name: "scratch", val: 1 });
    let sequence = ModelBuilder::sequence(vec![write_result, write_scratch]).expect("two children");
    let tree = ModelBuilder::safe_output_context(vec!["result".into()], sequence);
    let mut exec = BtExecutor::new(tree, ctx.clone());
    assert_eq!(tick_until_terminal(&mut exec, MAX_TICKS), Status::Success);
    assert_eq!(get_typed::<i64>(ctx.as_ref(), "result"), Some(42));
    assert!(get_typed::<i64>(ctx.as_ref(), "scratch").is_none());
}

#[test]
fn variable_renamer_moves_a_value_and_clears_the_old_name() {
    let ctx = Arc::new(BasicContext::new());
    set_typed(ctx.as_ref(), "old_name", 5_i64);
    let tree = ModelBuilder::rename("old_name", "new_name");
    let mut exec = BtExecutor::new(tree, ctx.clone());
    assert_eq!(tick_until_terminal(&mut exec, MAX_TICKS), Status::Success);
    assert!(get_typed::<i64>(ctx.as_ref(), "old_name").is_none());
    assert_eq!(get_typed::<i64>(ctx.as_ref(), "new_name"), Some(5));
}

#[test]
fn variable_renamer_round_trip_restores_the_original_binding() {
    let ctx = Arc::new(BasicContext::new());
    set_typed(ctx.as_ref(), "a", 11_i64);
    let there_and_back = ModelBuilder::sequence(vec![ModelBuilder::rename("a", "b"), ModelBuilder::rename("b", "a")]).expect("two children");
    let mut exec = BtExecutor::new(there_and_back, ctx.clone());
    assert_eq!(tick_until_terminal(&mut exec, MAX_TICKS), Status::Success);
    assert_eq!(get_typed::<i64>(ctx.as_ref(), "a"), Some(11));
    assert!(get_typed::<i64>(ctx.as_ref(), "b").is_none());
}

#[test]
fn variable_renamer_is_a_no_op_success_when_the_source_is_undefined() {
    let ctx = Arc::new(BasicContext::new());
    let tree = ModelBuilder::rename("missing", "new_name");
    let mut exec = BtExecutor::new(tree, ctx.clone());
    assert_eq!(tick_until_terminal(&mut exec, MAX_TICKS), Status::Success);
    assert!(get_typed::<i64>(ctx.as_ref(), "new_name").is_none());
}

#[test]
fn subtree_lookup_hit_spawns_and_resolves_the_registered_tree() {
    let library = Arc::new(TreeLibrary::new());
    library.add("sub", ModelBuilder::success());
    let ctx = Arc::new(BasicContext::with_library(library));
    let tree = ModelBuilder::subtree("sub");
    let mut exec = BtExecutor::new(tree, ctx);
    assert_eq!(tick_until_terminal(&mut exec, MAX_TICKS), Status::Success);
}

#[test]
fn subtree_lookup_hit_propagates_the_registered_trees_status() {
    // Registered the way an embedder actually does it: the library holds the raw model,
    // with no separate compute_positions() call before it's looked up at runtime.
    for (name, registered, expected) in
        [("ok", ModelBuilder::success(), Status::Success), ("bad", ModelBuilder::failure(), Status::Failure)]
    {
        let library = Arc::new(TreeLibrary::new());
        library.add(name, registered);
        let ctx = Arc::new(BasicContext::with_library(library));
        let tree = ModelBuilder::subtree(name);
        let mut exec = BtExecutor::new(tree, ctx);
        assert_eq!(tick_until_terminal(&mut exec, MAX_TICKS), expected);
    }
}

#[test]
fn subtree_lookup_miss_fails_without_spawning_anything() {
    let ctx = Arc::new(BasicContext::new());
    let tree = ModelBuilder::subtree("missing");
    let mut exec = BtExecutor::new(tree, ctx);
    assert_eq!(tick_until_terminal(&mut exec, MAX_TICKS), Status::Failure);
}
