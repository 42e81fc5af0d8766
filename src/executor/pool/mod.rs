//! Fixed-size worker-pool executor.
//!
//! It is composed of:
//! - [`core`]: the pool handle and its lifecycle (start, shutdown, join),
//! - [`worker`]: the loop each worker thread runs,
//! - [`queue`]: the FIFO queue and shutdown flag shared with the workers,
//! - [`builder`]: configuration,
//! - [`spawner`]: the seam through which worker threads are started.

pub(crate) mod builder;
pub(crate) mod core;
pub(crate) mod queue;
pub(crate) mod spawner;
pub(crate) mod worker;

pub use builder::WorkerPoolBuilder;
pub use self::core::WorkerPool;
pub use spawner::{OsThreads, Spawner, WorkerMain};
