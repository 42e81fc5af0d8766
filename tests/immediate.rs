use taskrt::error::Cause;
use taskrt::{Error, ErrorKind, Executor, ImmediateExecutor, Submission, Task};

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn recording_hook(calls: Arc<Mutex<Vec<String>>>) -> impl Fn(&str) + Send + Sync + 'static {
    move |text: &str| calls.lock().unwrap().push(text.to_owned())
}

#[test]
fn test_submit_runs_synchronously() {
    let executor = ImmediateExecutor::new("inline");
    let ran = Arc::new(AtomicBool::new(false));

    let flag = ran.clone();
    let submission = executor.submit(Task::new(move || {
        flag.store(true, Ordering::SeqCst);
        Ok(())
    }));

    assert_eq!(submission, Submission::Accepted);
    assert!(ran.load(Ordering::SeqCst), "Task should run before submit returns");
}

#[test]
fn test_submit_after_shutdown_is_rejected() {
    let executor = ImmediateExecutor::new("inline");
    let runs = Arc::new(AtomicUsize::new(0));

    executor.shutdown();
    assert!(executor.is_shutdown());

    for _ in 0..3 {
        let runs = runs.clone();
        let submission = executor.submit(Task::new(move || {
            runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));

        assert_eq!(submission, Submission::Rejected);
    }

    assert_eq!(runs.load(Ordering::SeqCst), 0, "Rejected tasks must never run");
}

#[test]
fn test_shutdown_is_idempotent() {
    let executor = ImmediateExecutor::new("inline");

    executor.shutdown();
    executor.shutdown();

    assert!(executor.is_shutdown());
    assert!(!executor.submit(Task::new(|| Ok(()))).is_accepted());
    executor.destroy();
}

#[test]
fn test_every_task_runs_exactly_once() {
    let executor = ImmediateExecutor::new("inline");
    let runs = Arc::new(AtomicUsize::new(0));

    for _ in 0..50 {
        let runs = runs.clone();
        let _ = executor.submit(Task::new(move || {
            runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));
    }

    assert_eq!(runs.load(Ordering::SeqCst), 50);
}

#[test]
fn test_unhandled_error_invokes_fatal_hook_once() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let executor = ImmediateExecutor::new("inline").with_fatal_hook(recording_hook(calls.clone()));

    let submission = executor.submit(
        Task::new(|| Err(Error::msg("disk on fire").context("flush cache"))).labeled("flusher"),
    );

    assert_eq!(submission, Submission::Accepted);

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1, "Fatal hook should run exactly once");
    assert!(calls[0].contains("flush cache"));
    assert!(calls[0].contains("caused by: disk on fire"));
    assert!(calls[0].contains("task #1 (flusher)"));
    assert!(calls[0].contains("'inline'"));
}

#[test]
fn test_callback_resolves_error() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::new(Mutex::new(Vec::new()));

    let record = seen.clone();
    let executor = ImmediateExecutor::new("inline")
        .with_escalation(move |escalation, error| {
            record.lock().unwrap().push((
                escalation.executor().to_owned(),
                escalation.task().id(),
                escalation.task().label().map(str::to_owned),
                error.to_string(),
            ));
            None
        })
        .with_fatal_hook(recording_hook(calls.clone()));

    let _ = executor.submit(Task::new(|| Ok(())));
    let _ = executor.submit(Task::new(|| Err(Error::msg("bad input"))).labeled("parser"));

    assert!(calls.lock().unwrap().is_empty(), "Resolved errors are not fatal");
    assert_eq!(
        *seen.lock().unwrap(),
        [(
            "inline".to_owned(),
            2,
            Some("parser".to_owned()),
            "bad input".to_owned()
        )]
    );
}

#[test]
fn test_callback_can_replace_error() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let executor = ImmediateExecutor::new("inline")
        .with_escalation(|_, error| Some(error.context("escalated by callback")))
        .with_fatal_hook(recording_hook(calls.clone()));

    let _ = executor.submit(Task::new(|| Err(Error::msg("original"))));

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].contains("escalated by callback"));
    assert!(calls[0].contains("caused by: original"));
}

#[test]
fn test_panicking_task_is_escalated() {
    let kinds = Arc::new(Mutex::new(Vec::new()));

    let record = kinds.clone();
    let executor = ImmediateExecutor::new("inline").with_escalation(move |_, error| {
        record.lock().unwrap().push((error.kind(), error.to_string()));
        None
    });

    let _ = executor.submit(Task::new(|| panic!("index out of range")));

    assert_eq!(
        *kinds.lock().unwrap(),
        [(ErrorKind::Task, "task panicked: index out of range".to_owned())]
    );
}

#[test]
fn test_panicking_callback_does_not_unwind_into_submit() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let executor = ImmediateExecutor::new("inline")
        .with_escalation(|_, _| panic!("callback bug"))
        .with_fatal_hook(recording_hook(calls.clone()));

    let submission = executor.submit(Task::new(|| Err(Error::msg("stale handle"))));

    assert_eq!(submission, Submission::Accepted);
    assert!(executor.submit(Task::new(|| Ok(()))).is_accepted());

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].contains("escalation callback panicked"));
    assert!(calls[0].contains("caused by: task panicked: callback bug"));
}

#[test]
fn test_payload_task() {
    let executor = ImmediateExecutor::new("inline");
    let total = Arc::new(AtomicUsize::new(0));

    let sink = total.clone();
    let _ = executor.submit(Task::with_payload(vec![1usize, 2, 3, 4], move |numbers| {
        sink.fetch_add(numbers.iter().sum(), Ordering::SeqCst);
        Ok(())
    }));

    assert_eq!(total.load(Ordering::SeqCst), 10);
}

#[test]
fn test_os_cause_surfaces_through_callback() {
    let texts = Arc::new(Mutex::new(Vec::new()));

    let record = texts.clone();
    let executor = ImmediateExecutor::new("inline").with_escalation(move |_, error| {
        record.lock().unwrap().push(error.to_string());
        None
    });

    let _ = executor.submit(Task::new(|| {
        Err(Error::from(Cause::Os {
            code: 28,
            message: "No space left on device".to_owned(),
            context: "write log".into(),
        }))
    }));

    assert_eq!(
        *texts.lock().unwrap(),
        ["write log: No space left on device (os error 28)"]
    );
}

#[test]
fn test_executor_name() {
    let executor = ImmediateExecutor::new(String::from("inline-7"));

    assert_eq!(executor.name(), "inline-7");
}
