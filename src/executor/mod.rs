//! Task executors.
//!
//! An [`Executor`] accepts [`Task`]s and guarantees each accepted task runs
//! exactly once. Two implementations share the same contract:
//!
//! - [`ImmediateExecutor`] runs the task on the caller's thread before
//!   `submit` returns,
//! - [`WorkerPool`] queues the task for a fixed set of worker threads and
//!   returns immediately.
//!
//! Once an executor has been shut down, `submit` returns
//! [`Submission::Rejected`] and the task never runs.
//!
//! A task that returns an [`Error`](crate::Error) is escalated: the
//! executor's callback (if any) may resolve it, and whatever remains is
//! rendered with its full chain and treated as fatal.

mod escalation;
mod immediate;
mod pool;
mod task;

pub use escalation::{Escalation, EscalationCallback, FatalHook};
pub use immediate::ImmediateExecutor;
pub use pool::{OsThreads, Spawner, WorkerMain, WorkerPool, WorkerPoolBuilder};
pub use task::{Task, TaskInfo};

/// Outcome of [`Executor::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use = "a rejected task never runs"]
pub enum Submission {
    /// The task ran (immediate) or was queued (pool).
    Accepted,
    /// The executor was shut down; the task was dropped without running.
    Rejected,
}

impl Submission {
    pub fn is_accepted(self) -> bool {
        self == Submission::Accepted
    }
}

/// Capability set shared by every executor.
pub trait Executor {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Hands `task` to the executor.
    ///
    /// Returns [`Submission::Rejected`] without running the task once the
    /// executor has been shut down.
    fn submit(&self, task: Task) -> Submission;

    /// Stops accepting tasks. Idempotent.
    fn shutdown(&self);

    fn is_shutdown(&self) -> bool;

    /// Releases the executor. For a pool this waits for queued tasks and
    /// joins the workers.
    fn destroy(self)
    where
        Self: Sized,
    {
        drop(self);
    }
}
