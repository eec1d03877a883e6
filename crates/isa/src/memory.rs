//! Data memory map and the predefined symbol bindings.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stack pointer slot.
pub const SP: u16 = 0;
/// Local segment base slot.
pub const LCL: u16 = 1;
/// Argument segment base slot.
pub const ARG: u16 = 2;
/// `this` segment base slot.
pub const THIS: u16 = 3;
/// `that` segment base slot.
pub const THAT: u16 = 4;
/// Number of virtual registers `R0..R15`.
pub const VIRTUAL_REGISTER_COUNT: u16 = 16;
/// First RAM address handed out to user variables.
pub const VARIABLE_BASE: u16 = 16;
/// Base of the memory-mapped screen.
pub const SCREEN: u16 = 16384;
/// Memory-mapped keyboard register.
pub const KBD: u16 = 24576;
/// Highest address an address instruction can name.
pub const MAX_ADDRESS: u16 = 0x7FFF;

/// Every predefined symbol with its fixed address. Names are case-sensitive.
pub const PREDEFINED_SYMBOLS: &[(&str, u16)] = &[
    ("SP", SP),
    ("LCL", LCL),
    ("ARG", ARG),
    ("THIS", THIS),
    ("THAT", THAT),
    ("R0", 0),
    ("R1", 1),
    ("R2", 2),
    ("R3", 3),
    ("R4", 4),
    ("R5", 5),
    ("R6", 6),
    ("R7", 7),
    ("R8", 8),
    ("R9", 9),
    ("R10", 10),
    ("R11", 11),
    ("R12", 12),
    ("R13", 13),
    ("R14", 14),
    ("R15", 15),
    ("SCREEN", SCREEN),
    ("KBD", KBD),
];

/// Region classification for data-memory addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MemoryRegion {
    /// Virtual registers `R0..R15` (`0..=15`).
    Registers,
    /// General-purpose RAM (`16..=16383`).
    Ram,
    /// Screen memory map (`16384..=24575`).
    Screen,
    /// Keyboard register (`24576`).
    Keyboard,
    /// Anything above the keyboard register.
    Unmapped,
}

impl MemoryRegion {
    /// Returns the inclusive bounds for this region.
    #[must_use]
    pub const fn bounds(self) -> (u16, u16) {
        match self {
            Self::Registers => (0, VIRTUAL_REGISTER_COUNT - 1),
            Self::Ram => (VARIABLE_BASE, SCREEN - 1),
            Self::Screen => (SCREEN, KBD - 1),
            Self::Keyboard => (KBD, KBD),
            Self::Unmapped => (KBD + 1, MAX_ADDRESS),
        }
    }

    /// Returns `true` when `addr` belongs to this region.
    #[must_use]
    pub const fn contains(self, addr: u16) -> bool {
        let (start, end) = self.bounds();
        addr >= start && addr <= end
    }
}

/// Classifies a data-memory address.
#[must_use]
pub const fn decode_memory_region(addr: u16) -> MemoryRegion {
    if addr < VARIABLE_BASE {
        MemoryRegion::Registers
    } else if addr < SCREEN {
        MemoryRegion::Ram
    } else if addr < KBD {
        MemoryRegion::Screen
    } else if addr == KBD {
        MemoryRegion::Keyboard
    } else {
        MemoryRegion::Unmapped
    }
}
