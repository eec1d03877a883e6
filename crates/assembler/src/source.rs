//! Source ingestion and directory discovery.
//!
//! Lines keep their original 1-indexed numbers so every later stage can
//! report errors against the file the user wrote.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Extension assembled in directory mode, matched case-insensitively.
pub const SOURCE_EXTENSION: &str = "asm";

/// A line of source with its original location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// The source text (without trailing newline).
    pub text: String,
    /// 1-indexed line number in the original file.
    pub original_line: usize,
}

/// All lines of one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContent {
    /// Lines in file order.
    pub lines: Vec<SourceLine>,
    /// The file path (for error reporting).
    pub file_path: PathBuf,
}

impl SourceContent {
    /// Splits file text into numbered lines. `\n` and `\r\n` endings are
    /// both accepted.
    #[must_use]
    pub fn from_text(file_path: &Path, content: &str) -> Self {
        Self::from_bytes(file_path, content.as_bytes())
    }

    /// Splits raw file bytes into numbered lines.
    ///
    /// Each line is decoded on its own; bytes that are not UTF-8 become
    /// U+FFFD, which the normalizer ignores inside comments and reports as
    /// an illegal character anywhere else.
    #[must_use]
    pub fn from_bytes(file_path: &Path, content: &[u8]) -> Self {
        let lines = if content.is_empty() {
            Vec::new()
        } else {
            content
                .strip_suffix(b"\n")
                .unwrap_or(content)
                .split(|byte| *byte == b'\n')
                .enumerate()
                .map(|(idx, line)| SourceLine {
                    text: String::from_utf8_lossy(line.strip_suffix(b"\r").unwrap_or(line))
                        .into_owned(),
                    original_line: idx + 1,
                })
                .collect()
        };
        Self {
            lines,
            file_path: file_path.to_path_buf(),
        }
    }

    /// Reads and splits a source file.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be read.
    pub fn load(path: &Path) -> io::Result<Self> {
        let content = fs::read(path)?;
        Ok(Self::from_bytes(path, &content))
    }
}

/// Returns true if `path` ends in `.asm`, ignoring case.
#[must_use]
pub fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION))
}

/// Lists every regular `.asm` file directly inside `dir`, sorted by path.
///
/// # Errors
///
/// Returns the I/O error if the directory cannot be read.
pub fn discover_sources(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && has_source_extension(&path) {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}
