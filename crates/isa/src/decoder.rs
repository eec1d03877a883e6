//! Word decoder for the Hack ISA.
//!
//! Splits a 16-bit word back into an address load or a compute instruction,
//! validating the compute prefix and the computation field against the
//! encoding tables.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encoding::{
    encode_compute, Comp, Dest, Jump, COMPUTE_PREFIX, COMP_MASK, COMP_SHIFT, DEST_SHIFT,
    FIELD_MASK, MEMORY_OPERAND_BIT,
};

/// Bit 15: clear for address instructions, set for compute instructions.
const COMPUTE_FLAG: u16 = 1 << 15;

/// A decoded instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DecodedWord {
    /// Load a 15-bit value into the A register.
    Address(u16),
    /// Compute, optionally store, optionally jump.
    Compute {
        /// The computation.
        comp: Comp,
        /// Destination set (possibly empty).
        dest: Dest,
        /// Jump condition, `None` for no jump.
        jump: Option<Jump>,
    },
}

impl DecodedWord {
    /// Re-encodes this instruction back to a 16-bit word.
    #[must_use]
    pub fn encode(self) -> u16 {
        match self {
            Self::Address(value) => value & !COMPUTE_FLAG,
            Self::Compute { comp, dest, jump } => encode_compute(comp, dest, jump),
        }
    }
}

impl fmt::Display for DecodedWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(value) => write!(f, "@{value}"),
            Self::Compute { comp, dest, jump } => {
                if !dest.is_empty() {
                    write!(f, "{}=", dest.mnemonic())?;
                }
                write!(f, "{}", comp.mnemonic())?;
                if let Some(jump) = jump {
                    write!(f, ";{}", jump.mnemonic())?;
                }
                Ok(())
            }
        }
    }
}

/// Reasons a word cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DecodeFault {
    /// Bits 14..13 of a compute word were not `11`.
    #[error("compute word prefix must be 111, found 1{0:02b}")]
    InvalidPrefix(u8),
    /// The `a` and ALU control bits are not an assigned computation.
    #[error("unassigned computation bits a={memory} c={control:06b}")]
    UnknownComputation {
        /// The `a` bit.
        memory: bool,
        /// The six ALU control bits.
        control: u8,
    },
}

/// Result of decoding a word: either an instruction or the fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedOrFault {
    /// Successfully decoded instruction.
    Word(DecodedWord),
    /// Decoding failed.
    Fault(DecodeFault),
}

impl DecodedOrFault {
    /// Returns the decoded instruction if present.
    #[must_use]
    pub const fn word(self) -> Option<DecodedWord> {
        match self {
            Self::Word(w) => Some(w),
            Self::Fault(_) => None,
        }
    }
}

impl From<DecodedOrFault> for Result<DecodedWord, DecodeFault> {
    fn from(value: DecodedOrFault) -> Self {
        match value {
            DecodedOrFault::Word(w) => Ok(w),
            DecodedOrFault::Fault(f) => Err(f),
        }
    }
}

/// Instruction decoder for the Hack ISA.
pub struct Decoder;

impl Decoder {
    /// Decodes a 16-bit word.
    ///
    /// Address words always decode. Compute words must carry the `111`
    /// prefix and an assigned computation; destination and jump fields
    /// accept every bit pattern.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn decode(word: u16) -> DecodedOrFault {
        if word & COMPUTE_FLAG == 0 {
            return DecodedOrFault::Word(DecodedWord::Address(word));
        }

        if word & COMPUTE_PREFIX != COMPUTE_PREFIX {
            let prefix = ((word >> 13) & 0b11) as u8;
            return DecodedOrFault::Fault(DecodeFault::InvalidPrefix(prefix));
        }

        let memory = word & MEMORY_OPERAND_BIT != 0;
        let control = ((word >> COMP_SHIFT) & COMP_MASK) as u8;
        let Some(comp) = Comp::from_bits(memory, control) else {
            return DecodedOrFault::Fault(DecodeFault::UnknownComputation { memory, control });
        };

        let dest = Dest::from_bits(word >> DEST_SHIFT);
        let jump = Jump::from_bits((word & FIELD_MASK) as u8);

        DecodedOrFault::Word(DecodedWord::Compute { comp, dest, jump })
    }
}
