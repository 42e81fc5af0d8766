use std::borrow::Cow;

use thiserror::Error;

/// Built-in descriptions for the leaf errors produced inside the crate.
///
/// Any `Display + Send + Sync + 'static` value can describe an [`Error`](super::Error);
/// these variants cover the failures the runtime itself reports.
#[derive(Debug, Error)]
pub enum Cause {
    /// An OS call failed with `code`.
    #[error("{context}: {message} (os error {code})")]
    Os {
        code: i32,
        message: String,
        context: Cow<'static, str>,
    },

    /// An allocation failed while the allocator for the error itself still worked.
    #[error("out of memory: {context}")]
    OutOfMemory { context: Cow<'static, str> },

    /// A task body unwound instead of returning.
    #[error("task panicked: {message}")]
    TaskPanicked { message: String },

    /// Free-form description.
    #[error("{0}")]
    Message(Cow<'static, str>),
}
