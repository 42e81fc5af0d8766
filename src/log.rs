//! Logging sink.
//!
//! Formatted messages are emitted through [`tracing`] under the `taskrt`
//! target. Install any subscriber (e.g. `tracing-subscriber`) to see them.

/// Severity of an emitted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Info,
    Warning,
    Error,
}

/// Writes `text` to the log at `level`.
pub fn emit(level: Level, text: &str) {
    match level {
        Level::Info => tracing::info!(target: "taskrt", "{text}"),
        Level::Warning => tracing::warn!(target: "taskrt", "{text}"),
        Level::Error => tracing::error!(target: "taskrt", "{text}"),
    }
}
