//! Instruction encoding (final pass).
//!
//! Converts resolved instructions into 16-bit words using the tables in
//! `hack_isa`. Labels produce no word.

use hack_isa::{encode_address, encode_compute, Comp, Dest, Jump};
use thiserror::Error;

use crate::symbols::{ResolvedInstruction, ResolvedKind};

/// Error during encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct EncodeError {
    /// Source line where the error occurred.
    pub line: usize,
    /// Kind of error.
    pub kind: EncodeErrorKind,
}

/// Classification of encoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeErrorKind {
    /// Computation outside the instruction set.
    #[error("unknown computation: {0}")]
    UnknownComputation(String),
    /// Jump mnemonic outside `JGT..JMP`.
    #[error("invalid jump: {0}")]
    InvalidJump(String),
    /// Address value that would set bit 15.
    #[error("address {0} does not fit in 15 bits")]
    AddressOutOfRange(u16),
}

/// One emitted word with its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedWord {
    /// The machine word.
    pub word: u16,
    /// Output slot.
    pub slot: usize,
    /// 1-indexed source line.
    pub line: usize,
}

/// Encodes a compute instruction from its textual fields.
///
/// # Errors
///
/// Returns `UnknownComputation` or `InvalidJump` naming the mnemonic.
pub fn encode_compute_text(
    dest: Dest,
    comp: &str,
    jump: Option<&str>,
) -> Result<u16, EncodeErrorKind> {
    let comp = Comp::from_mnemonic(comp)
        .ok_or_else(|| EncodeErrorKind::UnknownComputation(comp.to_string()))?;
    let jump = jump
        .map(|text| {
            Jump::from_mnemonic(text).ok_or_else(|| EncodeErrorKind::InvalidJump(text.to_string()))
        })
        .transpose()?;
    Ok(encode_compute(comp, dest, jump))
}

/// Encodes one instruction. Returns `None` for labels.
///
/// # Errors
///
/// Returns an `EncodeError` carrying the instruction's line.
pub fn encode_instruction(instruction: &ResolvedInstruction) -> Result<Option<u16>, EncodeError> {
    let fail = |kind| EncodeError {
        line: instruction.line,
        kind,
    };

    match &instruction.kind {
        ResolvedKind::Address(value) => encode_address(*value)
            .map(Some)
            .ok_or_else(|| fail(EncodeErrorKind::AddressOutOfRange(*value))),
        ResolvedKind::Compute { dest, comp, jump } => {
            encode_compute_text(*dest, comp, jump.as_deref())
                .map(Some)
                .map_err(fail)
        }
        ResolvedKind::Label(_) => Ok(None),
    }
}

/// Encodes a whole resolved program in slot order.
///
/// # Errors
///
/// Returns the first encoding error; no words are produced in that case.
pub fn encode_program(
    instructions: &[ResolvedInstruction],
) -> Result<Vec<EncodedWord>, EncodeError> {
    let mut words = Vec::with_capacity(instructions.len());
    for instruction in instructions {
        if let Some(word) = encode_instruction(instruction)? {
            words.push(EncodedWord {
                word,
                slot: instruction.slot,
                line: instruction.line,
            });
        }
    }
    Ok(words)
}
