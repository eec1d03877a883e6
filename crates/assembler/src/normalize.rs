//! Line normalization: whitespace removal, comment stripping, and
//! character validation.

use crate::parser::{ParseError, ParseErrorKind};

/// Punctuation allowed in a canonical line besides ASCII letters and digits.
pub const LEGAL_PUNCTUATION: &[char] = &[
    '=', ';', '+', '-', '!', '&', '|', '@', '(', ')', '_', '.', '$', ':',
];

/// Returns true if `ch` may appear in a canonical line.
#[must_use]
pub fn is_legal_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || LEGAL_PUNCTUATION.contains(&ch)
}

/// Reduces a raw line to its canonical instruction text.
///
/// All whitespace is removed and everything from `//` onward is dropped.
/// Returns `None` for blank and comment-only lines.
///
/// # Errors
///
/// Returns `IllegalCharacter` for a lone `/` or any character outside the
/// legal set.
pub fn normalize_line(raw: &str, line: usize) -> Result<Option<String>, ParseError> {
    let illegal = |ch| ParseError {
        line,
        kind: ParseErrorKind::IllegalCharacter(ch),
    };

    let mut canonical = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch.is_whitespace() {
            continue;
        }
        if ch == '/' {
            if chars.peek() == Some(&'/') {
                break;
            }
            return Err(illegal(ch));
        }
        if !is_legal_char(ch) {
            return Err(illegal(ch));
        }
        canonical.push(ch);
    }

    Ok((!canonical.is_empty()).then_some(canonical))
}
