use super::task::{TaskInfo, panic_error};
use crate::error::{Error, FORMAT_FAILED, Fallible, Verbosity};

use std::fmt::Write as _;
use std::io::Write as _;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Caller-supplied hook invoked with every error a task returns.
///
/// The hook may resolve the error by returning `None`, or hand back an error
/// (the same one or a different one) that is then treated as fatal.
pub type EscalationCallback = dyn Fn(&Escalation<'_>, Error) -> Option<Error> + Send + Sync;

/// Hook invoked with the rendered chain of an unhandled task error.
///
/// The default writes the text to stderr and aborts the process. A hook
/// that returns lets the executor carry on, which is how tests observe the
/// fatal path.
pub type FatalHook = dyn Fn(&str) + Send + Sync;

/// Where a task error happened.
#[derive(Debug, Clone, Copy)]
pub struct Escalation<'a> {
    executor: &'a str,
    task: &'a TaskInfo,
}

impl<'a> Escalation<'a> {
    /// Name of the executor that ran the task.
    pub fn executor(&self) -> &'a str {
        self.executor
    }

    /// The task that failed.
    pub fn task(&self) -> &'a TaskInfo {
        self.task
    }
}

/// Error-escalation policy shared by both executors.
///
/// 1. A registered callback sees the error first and may suppress it. A
///    callback that panics leaves the error unresolved.
/// 2. Whatever survives is rendered at [`Verbosity::FULL`] and passed to the
///    fatal hook. A fatal hook that panics aborts the process.
///
/// Neither step unwinds into the caller, so a pool worker keeps draining its
/// queue whatever the hooks do.
#[derive(Clone)]
pub(crate) struct EscalationPolicy {
    callback: Option<Arc<EscalationCallback>>,
    fatal: Arc<FatalHook>,
}

impl EscalationPolicy {
    pub(crate) fn new() -> Self {
        Self {
            callback: None,
            fatal: Arc::new(abort_process),
        }
    }

    pub(crate) fn set_callback(&mut self, callback: Arc<EscalationCallback>) {
        self.callback = Some(callback);
    }

    pub(crate) fn set_fatal(&mut self, fatal: Arc<FatalHook>) {
        self.fatal = fatal;
    }

    pub(crate) fn handle(&self, executor: &str, task: &TaskInfo, error: Error) {
        let unresolved = match &self.callback {
            Some(callback) => {
                tracing::debug!(executor, %task, error = %error, "escalating task error");

                let escalation = Escalation { executor, task };
                panic::catch_unwind(AssertUnwindSafe(|| callback(&escalation, error)))
                    .unwrap_or_else(|payload| {
                        Some(panic_error(payload).context("escalation callback panicked"))
                    })
            }
            None => Some(error),
        };

        let Some(error) = unresolved else {
            return;
        };

        let text = unhandled_text(executor, task, &error);
        drop(error);

        let text = text.as_deref().unwrap_or(FORMAT_FAILED);
        tracing::error!(executor, %task, "{text}");

        if panic::catch_unwind(AssertUnwindSafe(|| (self.fatal)(text))).is_err() {
            abort_process(text);
        }
    }
}

/// Renders the fatal report, or `None` if it cannot be allocated.
fn unhandled_text(executor: &str, task: &TaskInfo, error: &Error) -> Option<String> {
    let mut text = String::new();
    let mut out = Fallible::new(&mut text);

    writeln!(out, "unhandled error in {task} on executor '{executor}':").ok()?;
    error.format(Verbosity::FULL, &mut out).ok()?;

    Some(text)
}

fn abort_process(text: &str) {
    let _ = writeln!(std::io::stderr(), "{text}");
    std::process::abort();
}
