use std::io;
use std::thread::{self, JoinHandle};

/// Body of a worker thread.
pub type WorkerMain = Box<dyn FnOnce() + Send + 'static>;

/// Starts the OS threads backing a [`WorkerPool`](super::WorkerPool).
///
/// The default [`OsThreads`] is what production code wants; other
/// implementations can wrap it to pin threads, adjust stack sizes, or
/// inject failures.
pub trait Spawner: Send + Sync {
    /// Starts a thread named `name` running `main`.
    fn spawn(&self, name: String, main: WorkerMain) -> io::Result<JoinHandle<()>>;
}

/// Spawns plain named OS threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsThreads;

impl Spawner for OsThreads {
    fn spawn(&self, name: String, main: WorkerMain) -> io::Result<JoinHandle<()>> {
        thread::Builder::new().name(name).spawn(main)
    }
}
