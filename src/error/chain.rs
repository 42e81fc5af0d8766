use super::cause::Cause;
use super::format::Verbosity;
use super::os;

use std::alloc::{self, Layout};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::borrow::Cow;
use std::fmt;
use std::io;
use std::ptr::NonNull;

/// Description capability of an error node.
///
/// Implemented for every `Display + Send + Sync + 'static` type, so plain
/// strings, [`Cause`] values or any `std::error::Error` can describe a node.
pub trait Describe: fmt::Display + Send + Sync + 'static {}

impl<T: fmt::Display + Send + Sync + 'static> Describe for T {}

/// Classification tag of an [`Error`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Raised by the OS facade.
    Os,
    /// An allocation failed and was reported through a regular node.
    OutOfMemory,
    /// Produced by a task body (or a caller wrapping one).
    Task,
    /// The static "could not allocate an error" value.
    Sentinel,
}

static SENTINEL_TEXT: &str = "out of memory: failed to allocate an error value";

/// A single heap-allocated link of an error chain.
pub(crate) struct Node {
    kind: ErrorKind,
    description: Box<dyn Describe>,
    source: Option<Error>,
    secondary: Option<Error>,
    backtrace: Option<Backtrace>,
}

enum Repr {
    /// Statically owned; dropping it releases nothing.
    Sentinel,
    Node(Box<Node>),
}

/// An owned, chainable failure record.
///
/// Every node carries a description and two optional links:
///
/// - the **source**: the failure that caused this one ("this failed because
///   of that"),
/// - the **secondary**: an unrelated failure that happened alongside this
///   one, typically during cleanup.
///
/// An `Error` is never shared. It moves from the point of failure through
/// return values, executors and escalation callbacks until it is rendered
/// or dropped. Dropping a node releases everything it links to.
///
/// If the node itself cannot be allocated, constructors return the
/// [sentinel](Error::sentinel) instead of aborting.
pub struct Error {
    repr: Repr,
}

impl Error {
    /// Builds a node with the given links.
    ///
    /// Returns the sentinel if the node cannot be allocated; in that case the
    /// links are released.
    pub fn new<D>(
        kind: ErrorKind,
        description: D,
        source: Option<Error>,
        secondary: Option<Error>,
    ) -> Self
    where
        D: Describe,
    {
        let Some(description) = try_box(description) else {
            return Self::sentinel();
        };

        let node = Node {
            kind,
            description,
            source,
            secondary,
            backtrace: capture_backtrace(),
        };

        match try_box(node) {
            Some(node) => Self {
                repr: Repr::Node(node),
            },
            None => Self::sentinel(),
        }
    }

    /// Builds a node without links.
    pub fn leaf<D: Describe>(kind: ErrorKind, description: D) -> Self {
        Self::new(kind, description, None, None)
    }

    /// Builds a task leaf from a message.
    pub fn msg(message: impl Into<Cow<'static, str>>) -> Self {
        Self::leaf(ErrorKind::Task, Cause::Message(message.into()))
    }

    /// The process-wide "failed to allocate an error" value.
    ///
    /// It has no links, a fixed description, and is never heap-allocated.
    pub const fn sentinel() -> Self {
        Self {
            repr: Repr::Sentinel,
        }
    }

    /// Wraps `self` as the source of a new node with the same kind.
    ///
    /// The sentinel absorbs the wrapper and stays the sentinel.
    pub fn context<D: Describe>(self, description: D) -> Self {
        match self.kind() {
            ErrorKind::Sentinel => self,
            kind => Self::new(kind, description, Some(self), None),
        }
    }

    /// Attaches `other` as a secondary failure.
    ///
    /// If a secondary is already present, `other` is attached to it in turn,
    /// so no failure is lost. The sentinel drops `other`.
    pub fn also(mut self, other: Error) -> Self {
        if let Repr::Node(node) = &mut self.repr {
            node.secondary = Some(match node.secondary.take() {
                Some(existing) => existing.also(other),
                None => other,
            });
        }

        self
    }

    pub fn kind(&self) -> ErrorKind {
        match &self.repr {
            Repr::Sentinel => ErrorKind::Sentinel,
            Repr::Node(node) => node.kind,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self.repr, Repr::Sentinel)
    }

    /// The description of this node only.
    pub fn description(&self) -> &dyn Describe {
        match &self.repr {
            Repr::Sentinel => &SENTINEL_TEXT,
            Repr::Node(node) => node.description.as_ref(),
        }
    }

    /// The failure that caused this one.
    pub fn cause(&self) -> Option<&Error> {
        match &self.repr {
            Repr::Sentinel => None,
            Repr::Node(node) => node.source.as_ref(),
        }
    }

    /// The auxiliary failure that happened alongside this one.
    pub fn secondary(&self) -> Option<&Error> {
        match &self.repr {
            Repr::Sentinel => None,
            Repr::Node(node) => node.secondary.as_ref(),
        }
    }

    /// The call stack captured when this node was built, if capturing was
    /// enabled (`RUST_BACKTRACE` / `RUST_LIB_BACKTRACE`).
    pub fn backtrace(&self) -> Option<&Backtrace> {
        match &self.repr {
            Repr::Sentinel => None,
            Repr::Node(node) => node.backtrace.as_ref(),
        }
    }

    /// Iterates over this node and its source chain.
    pub fn chain(&self) -> Chain<'_> {
        Chain {
            next: Some(self),
        }
    }

    /// Number of nodes in the source chain, this one included.
    pub fn depth(&self) -> usize {
        self.chain().count()
    }

    /// Releases the chain. Equivalent to dropping it.
    pub fn free(self) {
        drop(self);
    }

    fn take_source(&mut self) -> Option<Error> {
        match &mut self.repr {
            Repr::Sentinel => None,
            Repr::Node(node) => node.source.take(),
        }
    }
}

impl Drop for Error {
    fn drop(&mut self) {
        // Unlink the source chain iteratively so long chains cannot exhaust
        // the stack.
        let mut next = self.take_source();
        while let Some(mut error) = next {
            next = error.take_source();
        }
    }
}

/// Iterator over an error and its source chain.
pub struct Chain<'a> {
    next: Option<&'a Error>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Error;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.cause();
        Some(current)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.description(), f)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.format(Verbosity::CHAIN, f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause().map(|error| error as &(dyn std::error::Error + 'static))
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.raw_os_error() {
            Some(code) => os::leaf(code, err.kind().to_string()),
            None => Self::leaf(ErrorKind::Os, err),
        }
    }
}

impl From<Cause> for Error {
    fn from(cause: Cause) -> Self {
        let kind = match &cause {
            Cause::Os { .. } => ErrorKind::Os,
            Cause::OutOfMemory { .. } => ErrorKind::OutOfMemory,
            Cause::TaskPanicked { .. } | Cause::Message(_) => ErrorKind::Task,
        };

        Self::leaf(kind, cause)
    }
}

fn capture_backtrace() -> Option<Backtrace> {
    let backtrace = Backtrace::capture();

    match backtrace.status() {
        BacktraceStatus::Captured => Some(backtrace),
        _ => None,
    }
}

/// Moves `value` to the heap, returning `None` instead of aborting when the
/// allocator fails.
fn try_box<T>(value: T) -> Option<Box<T>> {
    let layout = Layout::new::<T>();

    if layout.size() == 0 {
        return Some(Box::new(value));
    }

    // Safety: `layout` has a non-zero size.
    let ptr = NonNull::new(unsafe { alloc::alloc(layout) }.cast::<T>())?;

    // Safety: `ptr` was just allocated with the layout of `T`, is non-null and
    // properly aligned, so it may be initialized and handed to `Box`.
    unsafe {
        ptr.as_ptr().write(value);
        Some(Box::from_raw(ptr.as_ptr()))
    }
}
