//! Unified error reporting for the assembler pipeline.
//!
//! Each stage owns a typed error carrying the source line it failed on.
//! [`AssembleError`] wraps them together with I/O failures so the per-file
//! driver can use `?` throughout, and renders diagnostics in the form
//!
//! ```text
//! prog.asm:12: error: unknown computation: D*A
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::emitter::HackTextError;
use crate::encoder::{EncodeError, EncodeErrorKind};
use crate::parser::{ParseError, ParseErrorKind};
use crate::symbols::{SymbolError, SymbolErrorKind};

/// A source location for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLoc {
    /// File path. Empty when the error was raised on in-memory lines.
    pub file: PathBuf,
    /// 1-indexed line number.
    pub line: usize,
}

impl SourceLoc {
    /// Creates a location with no file attached yet.
    #[must_use]
    pub const fn line(line: usize) -> Self {
        Self {
            file: PathBuf::new(),
            line,
        }
    }
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file.as_os_str().is_empty() {
            write!(f, "line {}", self.line)
        } else {
            write!(f, "{}:{}", self.file.display(), self.line)
        }
    }
}

/// A failure that aborted one file's assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleError {
    /// The kind of error.
    pub kind: AssembleErrorKind,
    /// Source location if the error is tied to a line.
    pub location: Option<SourceLoc>,
}

impl AssembleError {
    /// Creates an error with no location.
    #[must_use]
    pub const fn new(kind: AssembleErrorKind) -> Self {
        Self {
            kind,
            location: None,
        }
    }

    /// Creates an I/O error for `path`.
    #[must_use]
    pub fn io(path: &Path, error: &std::io::Error) -> Self {
        Self::new(AssembleErrorKind::Io {
            path: path.to_path_buf(),
            message: error.to_string(),
        })
    }

    /// Attaches the file the failing line belongs to.
    #[must_use]
    pub fn in_file(mut self, path: &Path) -> Self {
        if let Some(loc) = &mut self.location {
            loc.file = path.to_path_buf();
        }
        self
    }

    /// Returns the failing line number, if any.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        self.location.as_ref().map(|loc| loc.line)
    }

    /// Formats the error for stderr output.
    #[must_use]
    pub fn format_for_stderr(&self) -> String {
        self.location.as_ref().map_or_else(
            || format!("error: {}", self.kind),
            |loc| format!("{loc}: error: {}", self.kind),
        )
    }
}

impl fmt::Display for AssembleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{loc}: {}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for AssembleError {}

impl From<ParseError> for AssembleError {
    fn from(e: ParseError) -> Self {
        Self {
            kind: AssembleErrorKind::Parse(e.kind),
            location: Some(SourceLoc::line(e.line)),
        }
    }
}

impl From<SymbolError> for AssembleError {
    fn from(e: SymbolError) -> Self {
        Self {
            kind: AssembleErrorKind::Symbol(e.kind),
            location: Some(SourceLoc::line(e.line)),
        }
    }
}

impl From<EncodeError> for AssembleError {
    fn from(e: EncodeError) -> Self {
        Self {
            kind: AssembleErrorKind::Encode(e.kind),
            location: Some(SourceLoc::line(e.line)),
        }
    }
}

impl From<HackTextError> for AssembleError {
    fn from(e: HackTextError) -> Self {
        let line = e.line;
        Self {
            kind: AssembleErrorKind::HackText(e),
            location: Some(SourceLoc::line(line)),
        }
    }
}

/// Classification of assembler errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssembleErrorKind {
    /// Illegal character or malformed instruction.
    #[error(transparent)]
    Parse(ParseErrorKind),
    /// Duplicate label or address-space exhaustion.
    #[error(transparent)]
    Symbol(SymbolErrorKind),
    /// Unknown computation or jump mnemonic.
    #[error(transparent)]
    Encode(EncodeErrorKind),
    /// Malformed `.hack` text.
    #[error(transparent)]
    HackText(HackTextError),
    /// Reading a source or writing an output failed.
    #[error("cannot access {}: {message}", path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The operating-system error text.
        message: String,
    },
}
