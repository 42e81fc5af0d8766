use crate::executor::task::{Task, TaskBody, TaskInfo};

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// A task waiting in the pool queue.
pub(crate) struct Job {
    pub(crate) info: TaskInfo,
    pub(crate) body: TaskBody,
}

/// State guarded by the queue mutex.
struct Pending {
    /// Accepted tasks in submission order.
    jobs: VecDeque<Job>,

    /// Id of the last accepted task.
    last_id: u64,
}

/// Unbounded FIFO queue shared by the pool and its workers.
///
/// Workers block on the condition variable while the queue is empty and
/// the pool is running. The shutdown flag is written under the mutex, so a
/// submission either lands in the queue before shutdown or is rejected;
/// it is readable without the mutex for cheap status checks.
pub(crate) struct TaskQueue {
    /// Pending jobs, protected by a mutex.
    pending: Mutex<Pending>,

    /// Condition variable used to wake waiting workers.
    condvar: Condvar,

    /// Indicates whether the pool stopped accepting tasks.
    shutdown: AtomicBool,
}

impl TaskQueue {
    /// Creates an empty, open queue.
    pub(crate) fn new() -> Self {
        Self {
            pending: Mutex::new(Pending {
                jobs: VecDeque::new(),
                last_id: 0,
            }),
            condvar: Condvar::new(),
            shutdown: AtomicBool::new(false),
        }
    }

    /// Appends `task` at the tail and wakes one waiting worker.
    ///
    /// Returns the task back if the queue is shut down.
    pub(crate) fn push(&self, task: Task) -> Result<u64, Task> {
        let mut pending = self.lock();

        if self.shutdown.load(Ordering::Acquire) {
            return Err(task);
        }

        pending.last_id += 1;
        let id = pending.last_id;

        let (info, body) = task.into_parts(id);
        pending.jobs.push_back(Job { info, body });
        drop(pending);

        self.condvar.notify_one();
        Ok(id)
    }

    /// Blocks until a job is available, or until the queue is shut down
    /// and empty, in which case `None` is returned.
    pub(crate) fn pop(&self) -> Option<Job> {
        let mut pending = self.lock();

        loop {
            if let Some(job) = pending.jobs.pop_front() {
                return Some(job);
            }

            if self.shutdown.load(Ordering::Acquire) {
                return None;
            }

            pending = self
                .condvar
                .wait(pending)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Stops accepting jobs and wakes every waiting worker.
    ///
    /// Returns `true` for the call that performed the transition.
    pub(crate) fn shutdown(&self) -> bool {
        let pending = self.lock();
        let first = !self.shutdown.swap(true, Ordering::AcqRel);
        drop(pending);

        self.condvar.notify_all();
        first
    }

    pub(crate) fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Number of jobs not yet picked up by a worker.
    pub(crate) fn len(&self) -> usize {
        self.lock().jobs.len()
    }

    /// Jobs run outside the lock, so poisoning can only come from a panic
    /// in this module; the queue state stays consistent either way.
    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
