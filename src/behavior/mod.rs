// Copyright © 2025 Stephan Kunz
//! [`Behavior`] — the Action/Condition extension point embedders implement.
//!
//! Everything else in the tree (composites, decorators, the built-in leaves) is closed: a
//! complete implementation ships with the engine. `Behavior` is the one open seam, the
//! same role `BehaviorExecution` plays in a full authoring toolkit, trimmed down to what a
//! synchronous, tick-driven engine actually needs from it.

use crate::context::Context;
use crate::status::Status;

/// Whether an extension-point leaf reads the world (`Condition`) or acts on it (`Action`).
///
/// Purely informational: the engine ticks both the same way. Embedders use it for
/// diagnostics and for filtering a [`TreeLibrary`](crate::context::TreeLibrary) listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BehaviorKind {
    /// Performs work and may have side effects; typically reports Running across ticks.
    Action,
    /// A synchronous, side-effect-free check; expected to resolve in a single tick.
    Condition,
}

impl BehaviorKind {
    /// A short, stable label for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Action => "Action",
            Self::Condition => "Condition",
        }
    }
}

/// An embedder-supplied Action or Condition.
///
/// The engine constructs a fresh instance from the leaf's
/// [`BehaviorFactory`](crate::model::BehaviorFactory) each time the leaf spawns, and calls
/// [`tick`](Self::tick) once per scheduler tick until it reports a terminal
/// [`Status`]. [`on_terminate`](Self::on_terminate) always runs exactly once, even when the
/// behavior never reached a terminal status on its own (the scheduler cut it off).
pub trait Behavior: Send + Sync {
    /// Advances the behavior by one tick against `ctx`.
    ///
    /// Returning [`Status::Running`] keeps the instance alive for the next tick; any other
    /// status ends its lifetime. Returning [`Status::Ready`] or [`Status::Terminated`] is a
    /// contract violation the scheduler treats as [`Status::Failure`].
    fn tick(&mut self, ctx: &dyn Context) -> Status;

    /// Called exactly once when the instance is torn down, with the status it ended on.
    ///
    /// The default does nothing; override it to release resources acquired mid-run (e.g.
    /// cancel an in-flight request) when `status` is [`Status::Terminated`].
    fn on_terminate(&mut self, status: Status) {
        let _ = status;
    }
}
