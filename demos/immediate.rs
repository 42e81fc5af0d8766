//! Example: running tasks inline and rendering a compound failure.

use taskrt::error::from_os_result;
use taskrt::{Error, Executor, ImmediateExecutor, Task, Verbosity};

fn main() {
    let executor = ImmediateExecutor::new("inline").with_escalation(|escalation, error| {
        println!("{} reported:\n{}", escalation.task(), error.render(Verbosity::CHAIN));
        None
    });

    let _ = executor.submit(Task::new(|| {
        println!("running on the caller's thread");
        Ok(())
    }));

    let _ = executor.submit(
        Task::new(|| {
            let write = from_os_result(28, "write snapshot")
                .unwrap_or_else(|| Error::msg("write snapshot"));
            let cleanup = Error::msg("remove partial snapshot").context("cleanup");

            Err(write.context("save state").also(cleanup))
        })
        .labeled("snapshot"),
    );

    executor.shutdown();
    assert!(!executor.submit(Task::new(|| Ok(()))).is_accepted());
}
