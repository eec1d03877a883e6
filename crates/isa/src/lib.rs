//! Instruction-set tables for the Hack 16-bit computer.

/// Computation, destination, and jump encoding tables.
pub mod encoding;
pub use encoding::{
    encode_address, encode_compute, AluOp, Comp, Dest, Jump, Operand, COMPUTE_PREFIX,
    COMP_MNEMONICS, MAX_ADDRESS_VALUE, MEMORY_OPERAND_BIT,
};

/// Data memory map and predefined symbols.
pub mod memory;
pub use memory::{
    decode_memory_region, MemoryRegion, KBD, MAX_ADDRESS,
    PREDEFINED_SYMBOLS, SCREEN, VARIABLE_BASE,
};

/// Word decoder with prefix and computation validation.
pub mod decoder;
pub use decoder::{DecodeFault, DecodedOrFault, DecodedWord, Decoder};

/// Canonical disassembly of program images.
pub mod disasm;
pub use disasm::{disassemble, disassemble_word, DisassemblyRow};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
