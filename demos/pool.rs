//! Example: a worker pool fed from several threads, with an escalation
//! callback that reports failing tasks instead of aborting.
//!
//! Run with `RUST_LOG=debug cargo run --example pool` to see worker
//! lifecycle events.

use taskrt::error::os;
use taskrt::log::Level;
use taskrt::{Executor, Task, Verbosity, WorkerPool};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use tracing_subscriber::EnvFilter;

fn main() -> Result<(), taskrt::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let pool = WorkerPool::builder("demo")
        .worker_threads(4)
        .on_error(|escalation, error| {
            // Report and resolve: the process keeps running.
            error
                .context(format!("{} failed", escalation.task()))
                .log_and_free(Level::Warning, Verbosity::CHAIN);
            None
        })
        .build()?;

    let completed = Arc::new(AtomicUsize::new(0));

    thread::scope(|scope| {
        for producer in 0..3 {
            let pool = &pool;
            let completed = &completed;

            scope.spawn(move || {
                for i in 0..10 {
                    let completed = completed.clone();
                    let task = Task::new(move || {
                        completed.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    })
                    .labeled(format!("producer-{producer}/{i}"));

                    let _ = pool.submit(task);
                }
            });
        }
    });

    // A task whose OS call fails: closing an invalid descriptor.
    let _ = pool.submit(
        Task::new(|| {
            // Safety: closing an invalid descriptor only sets errno.
            os::check(unsafe { libc::close(-1) }, "close stale descriptor")?;
            Ok(())
        })
        .labeled("cleanup"),
    );

    pool.join();

    println!("{} tasks completed", completed.load(Ordering::SeqCst));
    Ok(())
}
