// Copyright © 2025 Stephan Kunz
//! Test helpers shared across the integration suites.

#![allow(unused)]

use std::sync::{Arc, Mutex};

use behavior_engine::context::get_typed;
use behavior_engine::prelude::*;

/// Reports `before` for the first `flip_after` ticks, then `after` forever.
///
/// Mirrors `Wait`'s one-shot-resolution shape, but driven by tick count instead of wall
/// clock, so tests can pin exact reactive-cascade timing without sleeping.
pub struct ChangeStatusAfter {
    before: Status,
    after: Status,
    flip_after: usize,
    ticks: usize,
}

impl ChangeStatusAfter {
    #[must_use]
    pub const fn new(before: Status, after: Status, flip_after: usize) -> Self {
        Self { before, after, flip_after, ticks: 0 }
    }
}

impl Behavior for ChangeStatusAfter {
    fn tick(&mut self, _ctx: &dyn Context) -> Status {
        let status = if self.ticks >= self.flip_after { self.after } else { self.before };
        self.ticks += 1;
        status
    }
}

/// Counts how many times it has been ticked, always reporting `Running`; useful for
/// asserting a child was (or was not) spawned at all.
pub struct CountTicks {
    pub count: Arc<std::sync::atomic::AtomicUsize>,
}

impl Behavior for CountTicks {
    fn tick(&mut self, _ctx: &dyn Context) -> Status {
        self.count.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Status::Running
    }
}

/// A condition reading a `bool` variable from the context; `Failure` if unset.
pub struct VarTruthy(pub &'static str);

impl Behavior for VarTruthy {
    fn tick(&mut self, ctx: &dyn Context) -> Status {
        match get_typed::<bool>(ctx, self.0) {
            Some(true) => Status::Success,
            _ => Status::Failure,
        }
    }
}

/// Reports `Success` on its first tick, appending `tag` to a shared log first, so a test
/// can observe the order several of these were spawned in.
pub struct NameLogger {
    pub tag: &'static str,
    pub log: Arc<Mutex<Vec<&'static str>>>,
}

impl Behavior for NameLogger {
    fn tick(&mut self, _ctx: &dyn Context) -> Status {
        self.log.lock().expect("lock").push(self.tag);
        Status::Success
    }
}

/// Ticks once, counting into a shared counter, and always reports a fixed `status`.
pub struct CountedStatus {
    pub count: Arc<std::sync::atomic::AtomicUsize>,
    pub status: Status,
}

impl Behavior for CountedStatus {
    fn tick(&mut self, _ctx: &dyn Context) -> Status {
        self.count.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.status
    }
}

/// A fresh instance resolves to the next status in a shared queue on its very first tick,
/// `Failure` once the queue is drained. Unlike [`ChangeStatusAfter`], the sequence advances
/// one entry per *spawn* rather than per tick, so it models a decorator that re-spawns a
/// child with a different outcome each time (e.g. `UntilFail`, `Repeat`).
pub struct SequencedBehavior {
    queue: Arc<Mutex<std::vec::IntoIter<Status>>>,
}

impl Behavior for SequencedBehavior {
    fn tick(&mut self, _ctx: &dyn Context) -> Status {
        self.queue.lock().expect("lock").next().unwrap_or(Status::Failure)
    }
}

/// Builds a factory for [`SequencedBehavior`] that yields `statuses` in order, one per spawn.
pub fn spawn_sequence(statuses: Vec<Status>) -> impl Fn() -> SequencedBehavior {
    let queue = Arc::new(Mutex::new(statuses.into_iter()));
    move || SequencedBehavior { queue: queue.clone() }
}

/// Drives `exec` until its root resolves terminal, or panics after `max_ticks` — a guard
/// against a reactive cascade that never reaches a tick boundary, not a throughput limit.
pub fn tick_until_terminal(exec: &mut BtExecutor, max_ticks: usize) -> Status {
    for _ in 0..max_ticks {
        let status = exec.tick();
        if status.is_terminal() {
            return status;
        }
    }
    panic!("tree did not resolve terminal within {max_ticks} ticks");
}
