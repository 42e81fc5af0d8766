//! Chainable error values.
//!
//! This module defines [`Error`], the owned failure record that tasks and
//! executors use to report and escalate failures.
//!
//! It is composed of:
//! - [`Error`] itself, a node with a description, a *source* link (linear
//!   causality) and a *secondary* link (a parallel failure, e.g. a cleanup
//!   step that failed while handling the primary one),
//! - [`Verbosity`] and the rendering routines that turn a chain into
//!   indented text,
//! - [`os`], the adapter through which OS failures enter a chain,
//! - [`Cause`], the descriptions used by the crate's own leaf errors.
//!
//! When a node cannot be allocated, constructors hand out the static
//! [sentinel](Error::sentinel) so that running out of memory remains
//! reportable.

mod cause;
mod chain;
mod format;

pub mod os;

pub use cause::Cause;
pub use chain::{Chain, Describe, Error, ErrorKind};
pub use format::{SUCCESS, Verbosity, format_outcome};

pub(crate) use format::{FORMAT_FAILED, Fallible};
pub use os::from_os_result;
