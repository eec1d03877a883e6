//! Instruction parser and the per-file instruction stream.
//!
//! A canonical line (see [`crate::normalize`]) is classified by its first
//! character: `@` loads an address, `(` defines a label, and anything else is
//! a compute instruction of the form `[dest=]comp[;jump]`.

use hack_isa::{Dest, MAX_ADDRESS_VALUE};
use thiserror::Error;
use tracing::debug;

use crate::normalize::normalize_line;
use crate::source::SourceLine;

/// Target of an address instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressTarget {
    /// A decimal literal, already range-checked.
    Literal(u16),
    /// A predefined symbol, label, or variable name.
    Symbol(String),
}

/// The three instruction shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstructionKind {
    /// `@value` or `@symbol`.
    Address(AddressTarget),
    /// `dest=comp;jump`. The computation and jump stay as written and are
    /// checked against the encoding tables by the encoder.
    Compute {
        /// Destination set, empty when no `=` was given.
        dest: Dest,
        /// Computation mnemonic.
        comp: String,
        /// Jump mnemonic, if a `;` was given.
        jump: Option<String>,
    },
    /// `(NAME)`.
    Label(String),
}

impl InstructionKind {
    /// Returns true for label definitions, which occupy no slot.
    #[must_use]
    pub const fn is_label(&self) -> bool {
        matches!(self, Self::Label(_))
    }
}

/// A parsed instruction with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// What the instruction does.
    pub kind: InstructionKind,
    /// Number of address/compute instructions before this one. For a label
    /// this is the address it binds to.
    pub slot: usize,
    /// 1-indexed source line.
    pub line: usize,
    /// Canonical text the instruction was parsed from.
    pub text: String,
}

/// Parse error with source line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ParseError {
    /// 1-indexed source line.
    pub line: usize,
    /// Kind of parse error.
    pub kind: ParseErrorKind,
}

/// Classification of parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// Character outside the legal set, or a `/` not starting a comment.
    #[error("illegal character '{0}'")]
    IllegalCharacter(char),
    /// `@` with nothing after it.
    #[error("address instruction has no operand")]
    EmptyAddress,
    /// Operand starts with a digit but is not all digits.
    #[error("invalid literal: {0}")]
    InvalidLiteral(String),
    /// Literal does not fit in 15 bits.
    #[error("literal {0} exceeds the largest address 32767")]
    LiteralOutOfRange(String),
    /// Name with characters outside letters, digits, `_ . $ :`.
    #[error("invalid symbol name: {0}")]
    InvalidSymbol(String),
    /// `(` without a closing `)` at the end of the line.
    #[error("label is missing its closing ')': {0}")]
    UnclosedLabel(String),
    /// `()`.
    #[error("label has an empty name")]
    EmptyLabel,
    /// Nothing left once destination and jump are removed.
    #[error("compute instruction has no computation: {0}")]
    EmptyComputation(String),
    /// Destination with a letter outside `A`, `D`, `M` or a repeated letter.
    #[error("invalid destination: {0}")]
    InvalidDestination(String),
    /// `;` with nothing after it.
    #[error("compute instruction has an empty jump: {0}")]
    EmptyJump(String),
}

/// Parses one canonical line.
///
/// `slot` is the number of address/compute instructions already in the
/// stream; the caller advances it after every non-label instruction.
///
/// # Errors
///
/// Returns a `ParseError` carrying `line` if the text is not a well-formed
/// instruction.
pub fn parse_instruction(text: &str, slot: usize, line: usize) -> Result<Instruction, ParseError> {
    let fail = |kind| ParseError { line, kind };

    let kind = if let Some(operand) = text.strip_prefix('@') {
        InstructionKind::Address(parse_address(operand).map_err(fail)?)
    } else if text.starts_with('(') {
        InstructionKind::Label(parse_label(text).map_err(fail)?)
    } else {
        parse_compute(text).map_err(fail)?
    };

    Ok(Instruction {
        kind,
        slot,
        line,
        text: text.to_string(),
    })
}

fn parse_address(operand: &str) -> Result<AddressTarget, ParseErrorKind> {
    let Some(first) = operand.chars().next() else {
        return Err(ParseErrorKind::EmptyAddress);
    };

    if first.is_ascii_digit() {
        if !operand.chars().all(|c| c.is_ascii_digit()) {
            return Err(ParseErrorKind::InvalidLiteral(operand.to_string()));
        }
        return operand
            .parse::<u16>()
            .ok()
            .filter(|value| *value <= MAX_ADDRESS_VALUE)
            .map(AddressTarget::Literal)
            .ok_or_else(|| ParseErrorKind::LiteralOutOfRange(operand.to_string()));
    }

    validate_symbol(operand)?;
    Ok(AddressTarget::Symbol(operand.to_string()))
}

fn parse_label(text: &str) -> Result<String, ParseErrorKind> {
    let name = text
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| ParseErrorKind::UnclosedLabel(text.to_string()))?;
    if name.is_empty() {
        return Err(ParseErrorKind::EmptyLabel);
    }
    validate_symbol(name)?;
    Ok(name.to_string())
}

fn parse_compute(text: &str) -> Result<InstructionKind, ParseErrorKind> {
    let (dest_text, rest) = text.split_once('=').unwrap_or(("", text));
    let (comp, jump) = match rest.split_once(';') {
        Some((comp, jump)) => (comp, Some(jump)),
        None => (rest, None),
    };

    if comp.is_empty() {
        return Err(ParseErrorKind::EmptyComputation(text.to_string()));
    }
    if jump.is_some_and(str::is_empty) {
        return Err(ParseErrorKind::EmptyJump(text.to_string()));
    }
    let dest = Dest::parse(dest_text)
        .ok_or_else(|| ParseErrorKind::InvalidDestination(dest_text.to_string()))?;

    Ok(InstructionKind::Compute {
        dest,
        comp: comp.to_string(),
        jump: jump.map(str::to_string),
    })
}

/// Returns true for characters allowed in symbol names.
#[must_use]
pub fn is_symbol_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '$' | ':')
}

fn validate_symbol(name: &str) -> Result<(), ParseErrorKind> {
    let starts_with_digit = name.starts_with(|c: char| c.is_ascii_digit());
    if starts_with_digit || !name.chars().all(is_symbol_char) {
        return Err(ParseErrorKind::InvalidSymbol(name.to_string()));
    }
    Ok(())
}

/// The ordered instructions of one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstructionStream {
    instructions: Vec<Instruction>,
    slots: usize,
}

impl InstructionStream {
    /// Creates an empty stream.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            instructions: Vec::new(),
            slots: 0,
        }
    }

    /// Normalizes and parses every line of a file.
    ///
    /// # Errors
    ///
    /// Returns the first normalization or parse error.
    pub fn from_lines(lines: &[SourceLine]) -> Result<Self, ParseError> {
        let mut stream = Self::new();
        for source in lines {
            if let Some(text) = normalize_line(&source.text, source.original_line)? {
                stream.push_line(&text, source.original_line)?;
            }
        }
        Ok(stream)
    }

    /// Parses a canonical line and appends it at the next slot.
    ///
    /// # Errors
    ///
    /// Returns the parse error; the stream is left unchanged.
    pub fn push_line(&mut self, text: &str, line: usize) -> Result<(), ParseError> {
        debug!(line, text, "analyzing instruction");
        let instruction = parse_instruction(text, self.slots, line)?;
        if !instruction.kind.is_label() {
            self.slots += 1;
        }
        debug!(line, slot = instruction.slot, "stored instruction");
        self.instructions.push(instruction);
        Ok(())
    }

    /// Number of instructions, labels included.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if no instructions were parsed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Number of words the stream will assemble to.
    #[must_use]
    pub const fn slot_count(&self) -> usize {
        self.slots
    }

    /// The instructions in source order.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Iterates the instructions in source order.
    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }
}

impl<'a> IntoIterator for &'a InstructionStream {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
