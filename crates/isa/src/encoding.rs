//! Computation, destination, and jump tables for compute instructions.
//!
//! A compute word is laid out as `[111][a][c1..c6][d1 d2 d3][j1 j2 j3]`.
//! The tables here are the single source of truth for both the assembler's
//! encoder and the decoder.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fixed `111` prefix occupying bits 15..13 of every compute word.
pub const COMPUTE_PREFIX: u16 = 0b111 << 13;
/// Bit 12 (`a`): selects memory (`M`) instead of the A register.
pub const MEMORY_OPERAND_BIT: u16 = 1 << 12;
/// Shift of the six-bit ALU control field.
pub const COMP_SHIFT: u16 = 6;
/// Shift of the three-bit destination field.
pub const DEST_SHIFT: u16 = 3;
/// Mask of the six-bit ALU control field once shifted down.
pub const COMP_MASK: u16 = 0b11_1111;
/// Mask of a three-bit field once shifted down.
pub const FIELD_MASK: u16 = 0b111;
/// Largest value an address instruction can load (bit 15 stays clear).
pub const MAX_ADDRESS_VALUE: u16 = 0x7FFF;

/// ALU operations. `X` stands for the second operand, which is either the
/// A register or the memory word it addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[allow(missing_docs)]
pub enum AluOp {
    Zero,
    One,
    MinusOne,
    D,
    X,
    NotD,
    NotX,
    NegD,
    NegX,
    DPlusOne,
    XPlusOne,
    DMinusOne,
    XMinusOne,
    DPlusX,
    DMinusX,
    XMinusD,
    DAndX,
    DOrX,
}

impl AluOp {
    /// Every ALU operation, in table order.
    pub const ALL: [Self; 18] = [
        Self::Zero,
        Self::One,
        Self::MinusOne,
        Self::D,
        Self::X,
        Self::NotD,
        Self::NotX,
        Self::NegD,
        Self::NegX,
        Self::DPlusOne,
        Self::XPlusOne,
        Self::DMinusOne,
        Self::XMinusOne,
        Self::DPlusX,
        Self::DMinusX,
        Self::XMinusD,
        Self::DAndX,
        Self::DOrX,
    ];

    /// Returns the six ALU control bits (`c1..c6`).
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Zero => 0b10_1010,
            Self::One => 0b11_1111,
            Self::MinusOne => 0b11_1010,
            Self::D => 0b00_1100,
            Self::X => 0b11_0000,
            Self::NotD => 0b00_1101,
            Self::NotX => 0b11_0001,
            Self::NegD => 0b00_1111,
            Self::NegX => 0b11_0011,
            Self::DPlusOne => 0b01_1111,
            Self::XPlusOne => 0b11_0111,
            Self::DMinusOne => 0b00_1110,
            Self::XMinusOne => 0b11_0010,
            Self::DPlusX => 0b00_0010,
            Self::DMinusX => 0b01_0011,
            Self::XMinusD => 0b00_0111,
            Self::DAndX => 0b00_0000,
            Self::DOrX => 0b01_0101,
        }
    }

    /// Looks up the operation assigned to six ALU control bits.
    ///
    /// `None` means the pattern is not part of the instruction set.
    #[must_use]
    pub fn from_bits(bits: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.bits() == bits)
    }

    /// Returns true if the operation reads the second operand (`A` or `M`).
    #[must_use]
    pub const fn uses_operand(self) -> bool {
        matches!(
            self,
            Self::X
                | Self::NotX
                | Self::NegX
                | Self::XPlusOne
                | Self::XMinusOne
                | Self::DPlusX
                | Self::DMinusX
                | Self::XMinusD
                | Self::DAndX
                | Self::DOrX
        )
    }
}

/// Source of the ALU's second operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Operand {
    /// The A register itself.
    A,
    /// The memory word addressed by the A register.
    M,
}

/// A computation: an ALU operation plus its operand source.
///
/// Only built through [`Comp::new`], [`Comp::from_mnemonic`], or
/// [`Comp::from_bits`], so operations that ignore `X` always carry `A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct Comp {
    op: AluOp,
    operand: Operand,
}

/// Every accepted computation spelling. The first spelling listed for a
/// given `(op, operand)` pair is the canonical one.
pub const COMP_MNEMONICS: &[(&str, AluOp, Operand)] = &[
    ("0", AluOp::Zero, Operand::A),
    ("1", AluOp::One, Operand::A),
    ("-1", AluOp::MinusOne, Operand::A),
    ("D", AluOp::D, Operand::A),
    ("A", AluOp::X, Operand::A),
    ("M", AluOp::X, Operand::M),
    ("!D", AluOp::NotD, Operand::A),
    ("!A", AluOp::NotX, Operand::A),
    ("!M", AluOp::NotX, Operand::M),
    ("-D", AluOp::NegD, Operand::A),
    ("-A", AluOp::NegX, Operand::A),
    ("-M", AluOp::NegX, Operand::M),
    ("D+1", AluOp::DPlusOne, Operand::A),
    ("A+1", AluOp::XPlusOne, Operand::A),
    ("M+1", AluOp::XPlusOne, Operand::M),
    ("D-1", AluOp::DMinusOne, Operand::A),
    ("A-1", AluOp::XMinusOne, Operand::A),
    ("M-1", AluOp::XMinusOne, Operand::M),
    ("D+A", AluOp::DPlusX, Operand::A),
    ("D+M", AluOp::DPlusX, Operand::M),
    ("A+D", AluOp::DPlusX, Operand::A),
    ("M+D", AluOp::DPlusX, Operand::M),
    ("D-A", AluOp::DMinusX, Operand::A),
    ("D-M", AluOp::DMinusX, Operand::M),
    ("A-D", AluOp::XMinusD, Operand::A),
    ("M-D", AluOp::XMinusD, Operand::M),
    ("D&A", AluOp::DAndX, Operand::A),
    ("D&M", AluOp::DAndX, Operand::M),
    ("A&D", AluOp::DAndX, Operand::A),
    ("M&D", AluOp::DAndX, Operand::M),
    ("D|A", AluOp::DOrX, Operand::A),
    ("D|M", AluOp::DOrX, Operand::M),
    ("A|D", AluOp::DOrX, Operand::A),
    ("M|D", AluOp::DOrX, Operand::M),
];

impl Comp {
    /// Builds a computation, rejecting `M` for operations that ignore `X`.
    #[must_use]
    pub const fn new(op: AluOp, operand: Operand) -> Option<Self> {
        if !op.uses_operand() && matches!(operand, Operand::M) {
            return None;
        }
        Some(Self { op, operand })
    }

    /// Resolves an exact computation mnemonic such as `D+M` or `!A`.
    #[must_use]
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        COMP_MNEMONICS.iter().find_map(|(name, op, operand)| {
            (*name == mnemonic).then_some(Self {
                op: *op,
                operand: *operand,
            })
        })
    }

    /// The ALU operation.
    #[must_use]
    pub const fn op(self) -> AluOp {
        self.op
    }

    /// Where `X` is read from.
    #[must_use]
    pub const fn operand(self) -> Operand {
        self.operand
    }

    /// Returns the canonical spelling of this computation.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match (self.op, self.operand) {
            (AluOp::Zero, _) => "0",
            (AluOp::One, _) => "1",
            (AluOp::MinusOne, _) => "-1",
            (AluOp::D, _) => "D",
            (AluOp::NotD, _) => "!D",
            (AluOp::NegD, _) => "-D",
            (AluOp::DPlusOne, _) => "D+1",
            (AluOp::DMinusOne, _) => "D-1",
            (AluOp::X, Operand::A) => "A",
            (AluOp::X, Operand::M) => "M",
            (AluOp::NotX, Operand::A) => "!A",
            (AluOp::NotX, Operand::M) => "!M",
            (AluOp::NegX, Operand::A) => "-A",
            (AluOp::NegX, Operand::M) => "-M",
            (AluOp::XPlusOne, Operand::A) => "A+1",
            (AluOp::XPlusOne, Operand::M) => "M+1",
            (AluOp::XMinusOne, Operand::A) => "A-1",
            (AluOp::XMinusOne, Operand::M) => "M-1",
            (AluOp::DPlusX, Operand::A) => "D+A",
            (AluOp::DPlusX, Operand::M) => "D+M",
            (AluOp::DMinusX, Operand::A) => "D-A",
            (AluOp::DMinusX, Operand::M) => "D-M",
            (AluOp::XMinusD, Operand::A) => "A-D",
            (AluOp::XMinusD, Operand::M) => "M-D",
            (AluOp::DAndX, Operand::A) => "D&A",
            (AluOp::DAndX, Operand::M) => "D&M",
            (AluOp::DOrX, Operand::A) => "D|A",
            (AluOp::DOrX, Operand::M) => "D|M",
        }
    }

    /// Returns the seven `a c1..c6` bits, `a` in the most significant place.
    #[must_use]
    #[allow(clippy::cast_lossless)]
    pub const fn bits(self) -> u16 {
        let a = match self.operand {
            Operand::A => 0,
            Operand::M => 1 << 6,
        };
        a | self.op.bits() as u16
    }

    /// Decodes the `a` bit and the six ALU control bits.
    #[must_use]
    pub fn from_bits(memory: bool, control: u8) -> Option<Self> {
        let op = AluOp::from_bits(control)?;
        let operand = if memory { Operand::M } else { Operand::A };
        Self::new(op, operand)
    }
}

#[cfg(feature = "serde")]
impl TryFrom<String> for Comp {
    type Error = String;

    fn try_from(mnemonic: String) -> Result<Self, Self::Error> {
        Self::from_mnemonic(&mnemonic).ok_or_else(|| format!("unknown computation: {mnemonic}"))
    }
}

#[cfg(feature = "serde")]
impl From<Comp> for String {
    fn from(comp: Comp) -> Self {
        comp.mnemonic().to_string()
    }
}

/// Destination set: any combination of the A register, D register, and
/// memory at `A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dest(u8);

impl Dest {
    /// No destination; the computed value is discarded.
    pub const NONE: Self = Self(0);
    /// The A register (`d1`, bit 5).
    pub const A: Self = Self(0b100);
    /// The D register (`d2`, bit 4).
    pub const D: Self = Self(0b010);
    /// Memory at address `A` (`d3`, bit 3).
    pub const M: Self = Self(0b001);

    /// Returns the three destination bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Builds a destination from the low three bits of `bits`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_bits(bits: u16) -> Self {
        Self((bits & FIELD_MASK) as u8)
    }

    /// Returns the union of two destination sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns true if every flag in `other` is also set here.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if no destination is selected.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Parses a destination written as letters from `A`, `D`, `M`.
    ///
    /// Order does not matter; repeating a letter or using any other
    /// character is rejected. The empty string is the empty set.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        text.chars().try_fold(Self::NONE, |acc, ch| {
            let flag = match ch {
                'A' => Self::A,
                'D' => Self::D,
                'M' => Self::M,
                _ => return None,
            };
            (!acc.contains(flag)).then_some(acc.union(flag))
        })
    }

    /// Renders the canonical spelling (`A`, `M`, `D` order), empty if none.
    #[must_use]
    pub fn mnemonic(self) -> String {
        [(Self::A, 'A'), (Self::M, 'M'), (Self::D, 'D')]
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, letter)| *letter)
            .collect()
    }
}

impl std::ops::BitOr for Dest {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Jump conditions, tested against the computed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Jump {
    /// Jump if the value is greater than zero.
    Jgt,
    /// Jump if the value equals zero.
    Jeq,
    /// Jump if the value is greater than or equal to zero.
    Jge,
    /// Jump if the value is less than zero.
    Jlt,
    /// Jump if the value is not zero.
    Jne,
    /// Jump if the value is less than or equal to zero.
    Jle,
    /// Jump unconditionally.
    Jmp,
}

/// Flag for "value > 0" (`j3`, bit 0).
pub const JUMP_IF_POSITIVE: u8 = 0b001;
/// Flag for "value = 0" (`j2`, bit 1).
pub const JUMP_IF_ZERO: u8 = 0b010;
/// Flag for "value < 0" (`j1`, bit 2).
pub const JUMP_IF_NEGATIVE: u8 = 0b100;

impl Jump {
    /// Every jump condition, in bit order.
    pub const ALL: [Self; 7] = [
        Self::Jgt,
        Self::Jeq,
        Self::Jge,
        Self::Jlt,
        Self::Jne,
        Self::Jle,
        Self::Jmp,
    ];

    /// Returns the three jump bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Jgt => JUMP_IF_POSITIVE,
            Self::Jeq => JUMP_IF_ZERO,
            Self::Jge => JUMP_IF_POSITIVE | JUMP_IF_ZERO,
            Self::Jlt => JUMP_IF_NEGATIVE,
            Self::Jne => JUMP_IF_POSITIVE | JUMP_IF_NEGATIVE,
            Self::Jle => JUMP_IF_ZERO | JUMP_IF_NEGATIVE,
            Self::Jmp => JUMP_IF_POSITIVE | JUMP_IF_ZERO | JUMP_IF_NEGATIVE,
        }
    }

    /// Decodes the three jump bits. `None` means "no jump".
    #[must_use]
    pub fn from_bits(bits: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|jump| jump.bits() == bits)
    }

    /// Returns the mnemonic (`JGT`, `JMP`, ...).
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Jgt => "JGT",
            Self::Jeq => "JEQ",
            Self::Jge => "JGE",
            Self::Jlt => "JLT",
            Self::Jne => "JNE",
            Self::Jle => "JLE",
            Self::Jmp => "JMP",
        }
    }

    /// Resolves an exact jump mnemonic.
    #[must_use]
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|jump| jump.mnemonic() == mnemonic)
    }
}

/// Assembles a compute word from its three fields.
#[must_use]
pub fn encode_compute(comp: Comp, dest: Dest, jump: Option<Jump>) -> u16 {
    let jump_bits = jump.map_or(0, Jump::bits);
    COMPUTE_PREFIX
        | (comp.bits() << COMP_SHIFT)
        | (u16::from(dest.bits()) << DEST_SHIFT)
        | u16::from(jump_bits)
}

/// Encodes an address instruction. `None` if `value` would set bit 15.
#[must_use]
pub const fn encode_address(value: u16) -> Option<u16> {
    if value > MAX_ADDRESS_VALUE {
        None
    } else {
        Some(value)
    }
}
