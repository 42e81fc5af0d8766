use super::builder::WorkerPoolBuilder;
use super::queue::TaskQueue;
use super::spawner::Spawner;
use super::worker::Worker;
use crate::error::Error;
use crate::executor::escalation::EscalationPolicy;
use crate::executor::{Executor, Submission, Task};

use std::borrow::Cow;
use std::sync::Arc;
use std::thread::JoinHandle;

/// State shared by the pool handle and its workers.
pub(crate) struct Shared {
    /// Pool name, used in thread names and diagnostics.
    pub(crate) name: Cow<'static, str>,

    /// Pending tasks and the shutdown flag.
    pub(crate) queue: TaskQueue,

    /// What happens to task errors.
    pub(crate) policy: EscalationPolicy,
}

/// Executor backed by a fixed set of OS threads.
///
/// `submit` enqueues the task and returns immediately; one of the workers
/// picks it up later. Tasks are dequeued in submission order, but several
/// workers run concurrently so completion order is unspecified. The queue
/// is unbounded.
///
/// The pool is safe to submit to from any number of threads.
///
/// Dropping the pool shuts it down, lets the workers drain the queue, and
/// joins every worker thread.
///
/// # Examples
///
/// ```rust
/// use taskrt::{Executor, Task, WorkerPool};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let pool = WorkerPool::new("demo", 2).unwrap();
/// let counter = Arc::new(AtomicUsize::new(0));
///
/// for _ in 0..8 {
///     let counter = counter.clone();
///     let _ = pool.submit(Task::new(move || {
///         counter.fetch_add(1, Ordering::SeqCst);
///         Ok(())
///     }));
/// }
///
/// pool.join();
/// assert_eq!(counter.load(Ordering::SeqCst), 8);
/// ```
pub struct WorkerPool {
    /// State shared with the workers.
    shared: Arc<Shared>,

    /// Join handles for worker threads.
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Starts a pool of `worker_threads` workers with the default
    /// configuration: no escalation callback, so any task error is fatal.
    ///
    /// # Panics
    ///
    /// Panics if `worker_threads == 0`.
    pub fn new(name: impl Into<Cow<'static, str>>, worker_threads: usize) -> Result<Self, Error> {
        WorkerPoolBuilder::new(name)
            .worker_threads(worker_threads)
            .build()
    }

    /// Returns a builder for a pool named `name`.
    pub fn builder(name: impl Into<Cow<'static, str>>) -> WorkerPoolBuilder {
        WorkerPoolBuilder::new(name)
    }

    /// Spawns the workers.
    ///
    /// If a thread fails to start, the workers started so far are stopped
    /// and joined before the error is returned.
    pub(crate) fn start(
        name: Cow<'static, str>,
        worker_threads: usize,
        policy: EscalationPolicy,
        spawner: &dyn Spawner,
    ) -> Result<Self, Error> {
        let shared = Arc::new(Shared {
            name,
            queue: TaskQueue::new(),
            policy,
        });

        let mut pool = Self {
            shared,
            handles: Vec::with_capacity(worker_threads),
        };

        for id in 0..worker_threads {
            let worker = Worker::new(id, pool.shared.clone());
            let thread_name = format!("{}-worker-{id}", pool.shared.name);

            match spawner.spawn(thread_name, Box::new(move || worker.run())) {
                Ok(handle) => pool.handles.push(handle),
                Err(err) => {
                    let error = Error::from(err).context(format!(
                        "failed to spawn worker {id} of pool '{}'",
                        pool.shared.name
                    ));

                    tracing::error!(
                        pool = %pool.shared.name,
                        started = pool.handles.len(),
                        "worker pool construction failed"
                    );

                    // Dropping the partial pool stops and joins the started workers.
                    drop(pool);
                    return Err(error);
                }
            }
        }

        tracing::info!(pool = %pool.shared.name, workers = worker_threads, "worker pool started");

        Ok(pool)
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// Number of accepted tasks no worker has picked up yet.
    pub fn pending(&self) -> usize {
        self.shared.queue.len()
    }

    /// Shuts the pool down, waits for the queue to drain, and joins every
    /// worker. Equivalent to dropping the pool.
    pub fn join(self) {
        drop(self);
    }

    fn shutdown_and_join(&mut self) {
        self.shutdown();

        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                tracing::warn!(pool = %self.shared.name, "worker thread panicked");
            }
        }
    }
}

impl Executor for WorkerPool {
    fn name(&self) -> &str {
        &self.shared.name
    }

    /// Enqueues `task` without waiting for it to run.
    fn submit(&self, task: Task) -> Submission {
        match self.shared.queue.push(task) {
            Ok(_) => Submission::Accepted,
            Err(task) => {
                tracing::warn!(
                    pool = %self.shared.name,
                    label = task.label(),
                    "task rejected: pool is shut down"
                );
                Submission::Rejected
            }
        }
    }

    /// Stops accepting tasks. Workers finish the queued tasks, then exit.
    fn shutdown(&self) {
        if self.shared.queue.shutdown() {
            tracing::info!(pool = %self.shared.name, "worker pool shutting down");
        }
    }

    fn is_shutdown(&self) -> bool {
        self.shared.queue.is_shutdown()
    }
}

impl Drop for WorkerPool {
    /// Shuts down the pool.
    ///
    /// This performs the following steps:
    /// 1. Stops task submission and wakes every worker
    /// 2. Lets the workers drain the queue
    /// 3. Joins all worker threads
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}
