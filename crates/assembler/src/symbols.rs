//! Symbol table and the two resolution passes.
//!
//! Pass 1 binds every label to the slot of the instruction that follows it.
//! Pass 2 resolves each address instruction: literals stand for themselves,
//! known names take their bound address, and any other name becomes a new
//! variable at the next free RAM address starting from 16.

use std::collections::HashMap;

use hack_isa::{Dest, MAX_ADDRESS, PREDEFINED_SYMBOLS, VARIABLE_BASE};
use thiserror::Error;
use tracing::debug;

use crate::parser::{AddressTarget, InstructionKind, InstructionStream};

/// Where a binding came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// One of the fixed register and I/O names.
    Predefined,
    /// Defined by a `(NAME)` instruction.
    Label,
    /// Allocated on first use by an address instruction.
    Variable,
}

/// A bound symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    /// The bound address.
    pub address: u16,
    /// Where the binding came from.
    pub kind: SymbolKind,
    /// Line of the label definition or first variable reference.
    pub defined_at: Option<usize>,
}

/// Error during symbol resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct SymbolError {
    /// Source line where the error occurred.
    pub line: usize,
    /// Kind of error.
    pub kind: SymbolErrorKind,
}

/// Classification of symbol errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolErrorKind {
    /// A label defined twice in one file.
    #[error("duplicate label '{name}' (first defined at line {first_definition})")]
    DuplicateLabel {
        /// The label name.
        name: String,
        /// Line of the first definition.
        first_definition: usize,
    },
    /// A label that reuses a predefined name.
    #[error("duplicate label '{0}' (predefined symbol)")]
    PredefinedLabel(String),
    /// A label past the end of the addressable instruction memory.
    #[error("label '{name}' would bind to {address}, beyond the largest address 32767")]
    LabelOverflow {
        /// The label name.
        name: String,
        /// The slot it would bind to.
        address: usize,
    },
    /// No RAM left for a new variable.
    #[error("no address left for variable '{0}'")]
    VariableOverflow(String),
}

/// Name-to-address bindings for one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    entries: HashMap<String, Symbol>,
    next_variable: u16,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Creates a table seeded with the predefined symbols.
    #[must_use]
    pub fn new() -> Self {
        let entries = PREDEFINED_SYMBOLS
            .iter()
            .map(|&(name, address)| {
                let symbol = Symbol {
                    address,
                    kind: SymbolKind::Predefined,
                    defined_at: None,
                };
                (name.to_string(), symbol)
            })
            .collect();
        Self {
            entries,
            next_variable: VARIABLE_BASE,
        }
    }

    /// Looks up a name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.entries.get(name)
    }

    /// Returns the address bound to `name`.
    #[must_use]
    pub fn address_of(&self, name: &str) -> Option<u16> {
        self.get(name).map(|symbol| symbol.address)
    }

    /// Address the next new variable will receive.
    #[must_use]
    pub const fn next_variable(&self) -> u16 {
        self.next_variable
    }

    /// Iterates all bindings in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Symbol)> {
        self.entries.iter().map(|(name, symbol)| (name.as_str(), symbol))
    }

    /// Bindings of one kind, ordered by address then name.
    #[must_use]
    pub fn of_kind(&self, kind: SymbolKind) -> Vec<(&str, &Symbol)> {
        let mut found: Vec<_> = self.iter().filter(|(_, s)| s.kind == kind).collect();
        found.sort_by(|a, b| a.1.address.cmp(&b.1.address).then(a.0.cmp(b.0)));
        found
    }

    /// Binds a label to `slot`.
    ///
    /// # Errors
    ///
    /// Fails if the name is already bound or `slot` is not addressable.
    pub fn define_label(&mut self, name: &str, slot: usize, line: usize) -> Result<u16, SymbolError> {
        let fail = |kind| SymbolError { line, kind };

        if let Some(existing) = self.entries.get(name) {
            return Err(fail(match existing.kind {
                SymbolKind::Predefined => SymbolErrorKind::PredefinedLabel(name.to_string()),
                SymbolKind::Label | SymbolKind::Variable => SymbolErrorKind::DuplicateLabel {
                    name: name.to_string(),
                    first_definition: existing.defined_at.unwrap_or_default(),
                },
            }));
        }

        let address = u16::try_from(slot)
            .ok()
            .filter(|address| *address <= MAX_ADDRESS)
            .ok_or_else(|| {
                fail(SymbolErrorKind::LabelOverflow {
                    name: name.to_string(),
                    address: slot,
                })
            })?;

        self.entries.insert(
            name.to_string(),
            Symbol {
                address,
                kind: SymbolKind::Label,
                defined_at: Some(line),
            },
        );
        debug!(line, label = name, address, "bound label");
        Ok(address)
    }

    /// Returns the address bound to `name`, allocating a new variable if
    /// the name is unknown.
    ///
    /// # Errors
    ///
    /// Fails if every address up to 32767 is already handed out.
    pub fn resolve_or_allocate(&mut self, name: &str, line: usize) -> Result<u16, SymbolError> {
        if let Some(address) = self.address_of(name) {
            return Ok(address);
        }

        let address = self.next_variable;
        if address > MAX_ADDRESS {
            return Err(SymbolError {
                line,
                kind: SymbolErrorKind::VariableOverflow(name.to_string()),
            });
        }
        self.next_variable += 1;

        self.entries.insert(
            name.to_string(),
            Symbol {
                address,
                kind: SymbolKind::Variable,
                defined_at: Some(line),
            },
        );
        debug!(line, variable = name, address, "allocated variable");
        Ok(address)
    }
}

/// An instruction whose address operand has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedKind {
    /// Load of a resolved 15-bit value.
    Address(u16),
    /// Compute instruction, fields as parsed.
    Compute {
        /// Destination set.
        dest: Dest,
        /// Computation mnemonic.
        comp: String,
        /// Jump mnemonic, if any.
        jump: Option<String>,
    },
    /// Label definition; emits nothing.
    Label(String),
}

/// A resolved instruction with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInstruction {
    /// The resolved instruction.
    pub kind: ResolvedKind,
    /// Output slot (see [`crate::parser::Instruction::slot`]).
    pub slot: usize,
    /// 1-indexed source line.
    pub line: usize,
    /// Canonical source text.
    pub text: String,
}

/// Output of both resolution passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Instructions in source order.
    pub instructions: Vec<ResolvedInstruction>,
    /// Final symbol table.
    pub symbols: SymbolTable,
}

/// Runs both resolution passes over one file's stream.
///
/// # Errors
///
/// Returns a `SymbolError` for a duplicate label or when labels or
/// variables run past address 32767. Unknown names never fail; they become
/// variables.
pub fn resolve(stream: &InstructionStream) -> Result<Resolution, SymbolError> {
    let mut symbols = SymbolTable::new();

    for instruction in stream {
        if let InstructionKind::Label(name) = &instruction.kind {
            symbols.define_label(name, instruction.slot, instruction.line)?;
        }
    }

    let instructions = stream
        .iter()
        .map(|instruction| {
            let kind = match &instruction.kind {
                InstructionKind::Address(AddressTarget::Literal(value)) => {
                    ResolvedKind::Address(*value)
                }
                InstructionKind::Address(AddressTarget::Symbol(name)) => {
                    ResolvedKind::Address(symbols.resolve_or_allocate(name, instruction.line)?)
                }
                InstructionKind::Compute { dest, comp, jump } => ResolvedKind::Compute {
                    dest: *dest,
                    comp: comp.clone(),
                    jump: jump.clone(),
                },
                InstructionKind::Label(name) => ResolvedKind::Label(name.clone()),
            };
            Ok(ResolvedInstruction {
                kind,
                slot: instruction.slot,
                line: instruction.line,
                text: instruction.text.clone(),
            })
        })
        .collect::<Result<Vec<_>, SymbolError>>()?;

    Ok(Resolution {
        instructions,
        symbols,
    })
}
