use super::chain::Error;
use crate::log::{self, Level};

use std::backtrace::Backtrace;
use std::fmt::{self, Write};

/// Rendered in place of an absent error at the top level.
pub const SUCCESS: &str = "success";

/// Emitted when a chain could not be rendered for lack of memory.
pub(crate) const FORMAT_FAILED: &str = "an error occurred, but rendering it failed: out of memory";

const INDENT: &str = "  ";
const SOURCE_PREFIX: &str = "caused by: ";
const SECONDARY_PREFIX: &str = "also failed: ";

/// Initial capacity reserved before a fallible render.
const RENDER_RESERVE: usize = 256;

/// Selects which parts of a chain get rendered.
///
/// The node's own description is always rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Verbosity {
    /// Follow the source chain.
    pub sources: bool,
    /// Render secondary failures.
    pub secondary: bool,
    /// Render captured backtraces.
    pub backtrace: bool,
}

impl Verbosity {
    pub const MINIMAL: Self = Self {
        sources: false,
        secondary: false,
        backtrace: false,
    };

    pub const SOURCES: Self = Self {
        sources: true,
        secondary: false,
        backtrace: false,
    };

    pub const CHAIN: Self = Self {
        sources: true,
        secondary: true,
        backtrace: false,
    };

    pub const FULL: Self = Self {
        sources: true,
        secondary: true,
        backtrace: true,
    };
}

impl Error {
    /// Renders the chain into `out`.
    ///
    /// Each hop down the source chain and each hop into a secondary failure
    /// adds one level of indentation. Lines are separated by `\n` with no
    /// trailing newline, so a leaf at [`Verbosity::MINIMAL`] renders as
    /// exactly its description.
    pub fn format<W>(&self, verbosity: Verbosity, out: &mut W) -> fmt::Result
    where
        W: Write + ?Sized,
    {
        Renderer {
            out,
            verbosity,
            first: true,
        }
        .chain(self, 0, "")
    }

    /// Renders the chain into a new string.
    pub fn render(&self, verbosity: Verbosity) -> String {
        let mut text = String::new();
        let _ = self.format(verbosity, &mut text);
        text
    }

    /// Renders the chain into a new string without aborting on allocation
    /// failure.
    ///
    /// Returns `None` if the buffer could not grow to hold the whole text.
    pub fn try_render(&self, verbosity: Verbosity) -> Option<String> {
        let mut text = String::new();
        text.try_reserve(RENDER_RESERVE).ok()?;

        self.format(verbosity, &mut Fallible::new(&mut text)).ok()?;
        Some(text)
    }

    /// Renders the chain, emits it to the log at `level` and releases it.
    ///
    /// If the text cannot be allocated a fixed message is logged instead;
    /// the chain is released either way.
    pub fn log_and_free(self, level: Level, verbosity: Verbosity) {
        let text = self.try_render(verbosity);
        drop(self);

        match text {
            Some(text) => log::emit(level, &text),
            None => log::emit(level, FORMAT_FAILED),
        }
    }
}

/// String sink that reports a failed allocation as [`fmt::Error`] instead of
/// aborting.
pub(crate) struct Fallible<'a> {
    text: &'a mut String,
}

impl<'a> Fallible<'a> {
    pub(crate) fn new(text: &'a mut String) -> Self {
        Self { text }
    }
}

impl Write for Fallible<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.text.try_reserve(s.len()).map_err(|_| fmt::Error)?;
        self.text.push_str(s);
        Ok(())
    }
}

/// Renders an operation outcome: the chain when there is one, [`SUCCESS`]
/// otherwise.
pub fn format_outcome<W>(
    outcome: Option<&Error>,
    verbosity: Verbosity,
    out: &mut W,
) -> fmt::Result
where
    W: Write + ?Sized,
{
    match outcome {
        Some(error) => error.format(verbosity, out),
        None => out.write_str(SUCCESS),
    }
}

struct Renderer<'a, W: ?Sized> {
    out: &'a mut W,
    verbosity: Verbosity,
    first: bool,
}

impl<W: Write + ?Sized> Renderer<'_, W> {
    fn line(&mut self, depth: usize, prefix: &str, body: fmt::Arguments<'_>) -> fmt::Result {
        if !self.first {
            self.out.write_char('\n')?;
        }
        self.first = false;

        for _ in 0..depth {
            self.out.write_str(INDENT)?;
        }

        self.out.write_str(prefix)?;
        self.out.write_fmt(body)
    }

    /// Walks the source chain iteratively; secondaries recurse.
    fn chain(&mut self, error: &Error, mut depth: usize, mut prefix: &str) -> fmt::Result {
        let mut current = Some(error);

        while let Some(error) = current {
            self.line(depth, prefix, format_args!("{}", error.description()))?;

            if self.verbosity.backtrace {
                if let Some(backtrace) = error.backtrace() {
                    self.backtrace(depth + 1, backtrace)?;
                }
            }

            if self.verbosity.secondary {
                if let Some(secondary) = error.secondary() {
                    self.chain(secondary, depth + 1, SECONDARY_PREFIX)?;
                }
            }

            if !self.verbosity.sources {
                break;
            }

            current = error.cause();
            depth += 1;
            prefix = SOURCE_PREFIX;
        }

        Ok(())
    }

    fn backtrace(&mut self, depth: usize, backtrace: &Backtrace) -> fmt::Result {
        self.line(depth, "backtrace:", format_args!(""))?;

        let mut frames = Frames {
            renderer: self,
            depth: depth + 1,
            fresh: true,
        };

        write!(frames, "{backtrace}")
    }
}

/// Re-indents backtrace output line by line as it is written, so frames are
/// never collected into an intermediate string.
struct Frames<'r, 'a, W: ?Sized> {
    renderer: &'r mut Renderer<'a, W>,
    depth: usize,
    fresh: bool,
}

impl<W: Write + ?Sized> Write for Frames<'_, '_, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for (i, piece) in s.split('\n').enumerate() {
            if i > 0 {
                self.fresh = true;
            }

            let piece = if self.fresh { piece.trim_start() } else { piece };
            if piece.is_empty() {
                continue;
            }

            if self.fresh {
                self.renderer.line(self.depth, "", format_args!("{piece}"))?;
                self.fresh = false;
            } else {
                self.renderer.out.write_str(piece)?;
            }
        }

        Ok(())
    }
}
