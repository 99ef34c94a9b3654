// Copyright © 2025 Stephan Kunz
//! The closed status enumeration every execution task reports.

/// The outcome of evaluating a task.
///
/// `Ready` only ever appears before a task has been spawned by
/// [`BtExecutor`](crate::scheduler::BtExecutor). Once a task reaches [`Status::Success`],
/// [`Status::Failure`] or [`Status::Terminated`] it is *terminal*: [`Status::is_terminal`]
/// returns `true` and the scheduler will not invoke the task's internal tick again
/// without a fresh spawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Status {
    /// Constructed but not yet spawned.
    #[default]
    Ready,
    /// Spawned and awaiting a terminal outcome.
    Running,
    /// Completed successfully.
    Success,
    /// Completed with a domain failure.
    Failure,
    /// Stopped externally by a parent or an interrupter.
    Terminated,
}

impl Status {
    /// `true` for any outcome that will not change on a further tick without a re-spawn.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failure | Self::Terminated)
    }

    /// `true` if the task still wants to be ticked.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}
