//! # taskrt
//!
//! **taskrt** is a small task-execution runtime built around two pieces:
//!
//! - an [`Executor`] abstraction with two interchangeable implementations,
//!   [`ImmediateExecutor`] (runs tasks inline) and [`WorkerPool`] (a fixed set
//!   of worker threads fed by a FIFO queue),
//! - [`Error`], an owned, chainable error value used to report task failures
//!   and escalate them through the executor.
//!
//! Task errors are never swallowed: an executor hands them to its escalation
//! callback, and any error the callback does not resolve is rendered with its
//! full chain and aborts the process.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use taskrt::{Error, Executor, Task, WorkerPool};
//!
//! let pool = WorkerPool::builder("jobs")
//!     .worker_threads(4)
//!     .on_error(|escalation, error| {
//!         eprintln!("{} failed: {error:?}", escalation.task());
//!         None
//!     })
//!     .build()?;
//!
//! let _ = pool.submit(Task::new(|| Err(Error::msg("disk full").context("flush cache"))));
//!
//! // Shuts down, drains the queue and joins the workers.
//! pool.join();
//! ```
//!
//! ## Modules
//!
//! - [`error`] — Error values, rendering and the OS error adapter
//! - [`executor`] — The executor trait, tasks and both executors
//! - [`log`] — The logging sink used to emit rendered errors

pub mod error;
pub mod executor;
pub mod log;

pub use error::{Error, ErrorKind, Verbosity, from_os_result};
pub use executor::{
    Escalation, Executor, ImmediateExecutor, Submission, Task, TaskInfo, WorkerPool,
    WorkerPoolBuilder,
};
