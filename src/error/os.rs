//! Entry point of OS failures into the error chain.
//!
//! The OS facade reports failures as a raw code plus caller context. The
//! helpers here normalize those into [`ErrorKind::Os`] leaves whose
//! description carries the code, the OS message for it, and the context.

use super::cause::Cause;
use super::chain::{Error, ErrorKind};

use std::borrow::Cow;
use std::io;

/// Converts a raw OS result into an error.
///
/// `0` means success and yields `None`. Negative codes are treated as negated
/// `errno` values, as returned by APIs following the `-errno` convention.
///
/// # Examples
///
/// ```rust
/// use taskrt::error::from_os_result;
///
/// assert!(from_os_result(0, "open config").is_none());
///
/// let error = from_os_result(2, "open config").unwrap();
/// assert!(error.to_string().starts_with("open config: "));
/// ```
pub fn from_os_result(code: i32, context: impl Into<Cow<'static, str>>) -> Option<Error> {
    if code == 0 {
        return None;
    }

    Some(leaf(code.saturating_abs(), context))
}

/// Checks a libc-style return value: `-1` means failure with the cause in
/// `errno`, anything else is passed through.
pub fn check(
    ret: libc::c_int,
    context: impl Into<Cow<'static, str>>,
) -> Result<libc::c_int, Error> {
    if ret == -1 {
        return Err(last_os_error(context));
    }

    Ok(ret)
}

/// Builds an error from the calling thread's current `errno`.
pub fn last_os_error(context: impl Into<Cow<'static, str>>) -> Error {
    let code = io::Error::last_os_error().raw_os_error().unwrap_or(0);
    leaf(code, context)
}

pub(crate) fn leaf(code: i32, context: impl Into<Cow<'static, str>>) -> Error {
    Error::leaf(
        ErrorKind::Os,
        Cause::Os {
            code,
            message: describe_code(code),
            context: context.into(),
        },
    )
}

/// The OS-supplied message for `code`.
#[cfg(unix)]
pub fn describe_code(code: i32) -> String {
    use std::ffi::CStr;

    let mut buf = [0 as libc::c_char; 256];

    // Safety: `buf` is valid for `buf.len()` bytes; the XSI `strerror_r`
    // NUL-terminates the message on success.
    let rc = unsafe { libc::strerror_r(code, buf.as_mut_ptr(), buf.len()) };
    if rc != 0 {
        return format!("unknown error {code}");
    }

    // Safety: see above, `buf` holds a NUL-terminated string.
    unsafe { CStr::from_ptr(buf.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}

/// The OS-supplied message for `code`.
#[cfg(not(unix))]
pub fn describe_code(code: i32) -> String {
    io::Error::from_raw_os_error(code).to_string()
}
