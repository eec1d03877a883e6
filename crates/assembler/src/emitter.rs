//! `.hack` text images: one sixteen-character binary word per line.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

/// Extension of assembled output files.
pub const OUTPUT_EXTENSION: &str = "hack";

/// Width of one rendered word.
pub const WORD_WIDTH: usize = 16;

/// Renders a word as sixteen `0`/`1` characters, most significant first.
#[must_use]
pub fn format_word(word: u16) -> String {
    format!("{word:016b}")
}

/// Renders a program: one word per line, no trailing newline.
#[must_use]
pub fn render_words(words: &[u16]) -> String {
    words
        .iter()
        .map(|word| format_word(*word))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Writes a program image to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns the I/O error if the file cannot be written.
pub fn write_hack_file(path: &Path, words: &[u16]) -> io::Result<()> {
    fs::write(path, render_words(words))
}

/// A line in a `.hack` image that is not a binary word.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected 16 binary digits, found {text:?}")]
pub struct HackTextError {
    /// 1-indexed line.
    pub line: usize,
    /// The offending text.
    pub text: String,
}

/// Parses a `.hack` image back into words.
///
/// # Errors
///
/// Returns the first line that is not exactly sixteen `0`/`1` characters.
pub fn parse_hack_text(text: &str) -> Result<Vec<u16>, HackTextError> {
    text.lines()
        .enumerate()
        .map(|(idx, line)| {
            let bits = line.trim_end();
            let well_formed =
                bits.len() == WORD_WIDTH && bits.bytes().all(|b| b == b'0' || b == b'1');
            well_formed
                .then(|| u16::from_str_radix(bits, 2).ok())
                .flatten()
                .ok_or_else(|| HackTextError {
                    line: idx + 1,
                    text: line.to_string(),
                })
        })
        .collect()
}
