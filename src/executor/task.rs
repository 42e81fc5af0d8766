use crate::error::{Cause, Error, ErrorKind};

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// Type-erased body of a task.
pub(crate) type TaskBody = Box<dyn FnOnce() -> Result<(), Error> + Send + 'static>;

/// A unit of work submitted to an [`Executor`](super::Executor).
///
/// A task owns its payload (whatever the closure captures) until it runs.
/// It runs at most once, on whichever thread the executor picks: the
/// submitting thread for [`ImmediateExecutor`](super::ImmediateExecutor), a
/// worker for [`WorkerPool`](super::WorkerPool).
///
/// Returning `Err` hands the error to the executor's escalation policy.
pub struct Task {
    label: Option<Cow<'static, str>>,
    body: TaskBody,
}

impl Task {
    /// Creates a task from a closure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use taskrt::Task;
    ///
    /// let task = Task::new(|| {
    ///     println!("hello from a task");
    ///     Ok(())
    /// });
    /// ```
    pub fn new<F>(body: F) -> Self
    where
        F: FnOnce() -> Result<(), Error> + Send + 'static,
    {
        Self {
            label: None,
            body: Box::new(body),
        }
    }

    /// Creates a task from an explicit payload and the function that
    /// consumes it.
    pub fn with_payload<P, F>(payload: P, body: F) -> Self
    where
        P: Send + 'static,
        F: FnOnce(P) -> Result<(), Error> + Send + 'static,
    {
        Self::new(move || body(payload))
    }

    /// Attaches a label reported to escalation callbacks.
    pub fn labeled(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub(crate) fn into_parts(self, id: u64) -> (TaskInfo, TaskBody) {
        let info = TaskInfo {
            id,
            label: self.label,
        };

        (info, self.body)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Identity of a submitted task.
///
/// Ids are assigned by each executor in submission order, starting at 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskInfo {
    id: u64,
    label: Option<Cow<'static, str>>,
}

impl TaskInfo {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl fmt::Display for TaskInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "task #{} ({label})", self.id),
            None => write!(f, "task #{}", self.id),
        }
    }
}

/// Runs a task body, turning a panic into a task error.
pub(crate) fn run_guarded(body: TaskBody) -> Result<(), Error> {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(outcome) => outcome,
        Err(payload) => Err(panic_error(payload)),
    }
}

/// Converts a caught panic payload into a [`Cause::TaskPanicked`] error.
pub(crate) fn panic_error(payload: Box<dyn Any + Send>) -> Error {
    Error::leaf(
        ErrorKind::Task,
        Cause::TaskPanicked {
            message: panic_message(payload.as_ref()),
        },
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        return (*message).to_owned();
    }

    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }

    "non-string panic payload".to_owned()
}
