use taskrt::error::os::{self, describe_code};
use taskrt::{Error, ErrorKind, from_os_result};

use std::io;

#[test]
fn test_success_code_is_not_an_error() {
    assert!(from_os_result(0, "open config").is_none());
}

#[test]
fn test_failure_embeds_code_message_and_context() {
    let error = from_os_result(libc::ENOENT, "open /etc/missing.conf").expect("error");
    let text = error.to_string();

    assert_eq!(error.kind(), ErrorKind::Os);
    assert!(text.contains("open /etc/missing.conf"), "Missing context in {text:?}");
    assert!(text.contains(&format!("os error {}", libc::ENOENT)), "Missing code in {text:?}");
    assert!(text.contains(&describe_code(libc::ENOENT)), "Missing OS message in {text:?}");
    assert!(error.cause().is_none());
    assert!(error.secondary().is_none());
}

#[test]
fn test_negative_code_is_normalized() {
    let error = from_os_result(-libc::EBADF, "close").expect("error");

    assert!(error.to_string().contains(&format!("os error {}", libc::EBADF)));
}

#[test]
fn test_describe_code_is_not_empty() {
    assert!(!describe_code(libc::EAGAIN).is_empty());
}

#[cfg(unix)]
#[test]
fn test_check_reports_errno() {
    // Safety: closing an invalid descriptor has no effect besides setting errno.
    let ret = unsafe { libc::close(-1) };
    let error = os::check(ret, "close fd -1").expect_err("close(-1) should fail");

    assert_eq!(error.kind(), ErrorKind::Os);
    assert!(error.to_string().starts_with("close fd -1: "));
    assert!(error.to_string().contains(&format!("os error {}", libc::EBADF)));
}

#[test]
fn test_check_passes_success_through() {
    assert_eq!(os::check(3, "dup").unwrap(), 3);
    assert_eq!(os::check(0, "close").unwrap(), 0);
}

#[test]
fn test_io_error_with_os_code() {
    let error = Error::from(io::Error::from_raw_os_error(libc::EACCES));

    assert_eq!(error.kind(), ErrorKind::Os);
    assert!(error.to_string().contains(&format!("os error {}", libc::EACCES)));
}

#[test]
fn test_io_error_without_os_code() {
    let error = Error::from(io::Error::other("socket closed by peer"));

    assert_eq!(error.kind(), ErrorKind::Os);
    assert_eq!(error.to_string(), "socket closed by peer");
}

#[test]
fn test_os_error_as_source() {
    let error = from_os_result(libc::ENOSPC, "write journal")
        .expect("error")
        .context("commit transaction");

    assert_eq!(error.depth(), 2);
    assert_eq!(error.kind(), ErrorKind::Os);
    assert!(
        error
            .render(taskrt::Verbosity::SOURCES)
            .contains("\n  caused by: write journal: ")
    );
}
