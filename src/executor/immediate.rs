use super::escalation::{Escalation, EscalationPolicy};
use super::task::{Task, run_guarded};
use super::{Executor, Submission};
use crate::error::Error;

use std::borrow::Cow;
use std::cell::Cell;
use std::sync::Arc;

/// Executor that runs each task on the caller's thread before `submit`
/// returns.
///
/// There is no internal concurrency. The executor is `Send` but not `Sync`,
/// so it cannot be shared between threads without external
/// synchronization.
///
/// # Examples
///
/// ```rust
/// use taskrt::{Executor, ImmediateExecutor, Submission, Task};
///
/// let executor = ImmediateExecutor::new("inline");
/// assert_eq!(executor.submit(Task::new(|| Ok(()))), Submission::Accepted);
///
/// executor.shutdown();
/// assert_eq!(executor.submit(Task::new(|| Ok(()))), Submission::Rejected);
/// ```
pub struct ImmediateExecutor {
    /// Name used in diagnostics.
    name: Cow<'static, str>,

    /// Set once by `shutdown`.
    shut: Cell<bool>,

    /// Id of the last accepted task.
    last_id: Cell<u64>,

    policy: EscalationPolicy,
}

impl ImmediateExecutor {
    /// Creates a ready executor with no escalation callback: every task
    /// error is fatal.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            shut: Cell::new(false),
            last_id: Cell::new(0),
            policy: EscalationPolicy::new(),
        }
    }

    /// Registers the escalation callback.
    pub fn with_escalation<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Escalation<'_>, Error) -> Option<Error> + Send + Sync + 'static,
    {
        self.policy.set_callback(Arc::new(callback));
        self
    }

    /// Replaces the hook invoked for unhandled task errors.
    pub fn with_fatal_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.policy.set_fatal(Arc::new(hook));
        self
    }
}

impl Executor for ImmediateExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    /// Runs `task` to completion on the calling thread.
    fn submit(&self, task: Task) -> Submission {
        if self.shut.get() {
            tracing::warn!(executor = %self.name, "task rejected: executor is shut down");
            return Submission::Rejected;
        }

        let id = self.last_id.get() + 1;
        self.last_id.set(id);

        let (info, body) = task.into_parts(id);

        if let Err(error) = run_guarded(body) {
            self.policy.handle(&self.name, &info, error);
        }

        Submission::Accepted
    }

    fn shutdown(&self) {
        self.shut.set(true);
    }

    fn is_shutdown(&self) -> bool {
        self.shut.get()
    }
}
