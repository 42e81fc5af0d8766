use super::core::WorkerPool;
use super::spawner::{OsThreads, Spawner};
use crate::error::Error;
use crate::executor::escalation::{Escalation, EscalationPolicy};

use std::borrow::Cow;
use std::sync::Arc;
use std::thread;

/// Builder for configuring and starting a [`WorkerPool`].
///
/// # Examples
///
/// ```rust
/// use taskrt::WorkerPoolBuilder;
///
/// let pool = WorkerPoolBuilder::new("io")
///     .worker_threads(4)
///     .on_error(|escalation, error| {
///         eprintln!("{} failed: {error}", escalation.task());
///         None
///     })
///     .build()
///     .unwrap();
/// ```
pub struct WorkerPoolBuilder {
    /// Pool name, used in thread names and diagnostics.
    name: Cow<'static, str>,

    /// Number of worker threads in the pool.
    worker_threads: usize,

    /// Callback and fatal hook for task errors.
    policy: EscalationPolicy,

    /// Starts the worker threads.
    spawner: Box<dyn Spawner>,
}

impl WorkerPoolBuilder {
    /// Starts a configuration for a pool called `name`.
    ///
    /// The pool gets one worker per CPU the OS reports (a single worker when
    /// that count is unknown) and treats every task error as fatal until
    /// [`on_error`](Self::on_error) says otherwise.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        let worker_threads = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        Self {
            name: name.into(),
            worker_threads,
            policy: EscalationPolicy::new(),
            spawner: Box::new(OsThreads),
        }
    }

    /// Fixes the pool at `count` workers.
    ///
    /// # Panics
    ///
    /// A pool without workers would accept tasks it can never run, so a
    /// zero `count` panics.
    pub fn worker_threads(mut self, count: usize) -> Self {
        assert_ne!(count, 0, "a worker pool needs at least one thread");

        self.worker_threads = count;
        self
    }

    /// Registers the escalation callback.
    ///
    /// The callback runs on the worker thread that ran the failing task.
    /// Returning `None` resolves the error; returning an error makes it
    /// fatal.
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Escalation<'_>, Error) -> Option<Error> + Send + Sync + 'static,
    {
        self.policy.set_callback(Arc::new(callback));
        self
    }

    /// Replaces the hook invoked for unhandled task errors.
    pub fn on_fatal<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.policy.set_fatal(Arc::new(hook));
        self
    }

    /// Replaces the thread spawner.
    pub fn spawner<S>(mut self, spawner: S) -> Self
    where
        S: Spawner + 'static,
    {
        self.spawner = Box::new(spawner);
        self
    }

    /// Starts the pool with the configured options.
    ///
    /// Fails if a worker thread cannot be started; no thread outlives a
    /// failed build.
    pub fn build(self) -> Result<WorkerPool, Error> {
        WorkerPool::start(
            self.name,
            self.worker_threads,
            self.policy,
            self.spawner.as_ref(),
        )
    }
}
