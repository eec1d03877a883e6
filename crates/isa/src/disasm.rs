//! Word disassembly for the Hack ISA.
//!
//! Converts assembled words back into canonical mnemonic text. Aliases
//! collapse to one spelling, so `M+D` disassembles as `D+M`.

use crate::decoder::{DecodedOrFault, Decoder};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single disassembled word.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisassemblyRow {
    /// Instruction memory address (slot index) of the word.
    pub address: usize,
    /// The raw word.
    pub raw_word: u16,
    /// Canonical mnemonic text, or a `.word` fallback for illegal words.
    pub text: String,
    /// Whether the word failed to decode.
    pub is_illegal: bool,
}

/// Disassembles a single word.
#[must_use]
pub fn disassemble_word(address: usize, raw_word: u16) -> DisassemblyRow {
    match Decoder::decode(raw_word) {
        DecodedOrFault::Word(decoded) => DisassemblyRow {
            address,
            raw_word,
            text: decoded.to_string(),
            is_illegal: false,
        },
        DecodedOrFault::Fault(fault) => DisassemblyRow {
            address,
            raw_word,
            text: format!(".word 0b{raw_word:016b} ; ILLEGAL ({fault})"),
            is_illegal: true,
        },
    }
}

/// Disassembles a program image, one row per word in slot order.
#[must_use]
pub fn disassemble(words: &[u16]) -> Vec<DisassemblyRow> {
    words
        .iter()
        .enumerate()
        .map(|(address, word)| disassemble_word(address, *word))
        .collect()
}
