use super::core::Shared;
use crate::executor::task::run_guarded;

use std::sync::Arc;

/// A worker thread of a [`WorkerPool`](super::WorkerPool).
///
/// Each worker repeatedly takes the oldest pending job, runs it, and
/// applies the pool's escalation policy to any error it returns. It exits
/// once the pool is shut down and the queue is drained.
pub(crate) struct Worker {
    /// Index of the worker within its pool.
    id: usize,

    /// State shared with the pool and the other workers.
    shared: Arc<Shared>,
}

impl Worker {
    pub(crate) fn new(id: usize, shared: Arc<Shared>) -> Self {
        Self { id, shared }
    }

    /// Runs the worker loop until shutdown-and-drained.
    pub(crate) fn run(self) {
        tracing::debug!(pool = %self.shared.name, worker = self.id, "worker started");

        while let Some(job) = self.shared.queue.pop() {
            if let Err(error) = run_guarded(job.body) {
                self.shared
                    .policy
                    .handle(&self.shared.name, &job.info, error);
            }
        }

        tracing::debug!(pool = %self.shared.name, worker = self.id, "worker exited");
    }
}
