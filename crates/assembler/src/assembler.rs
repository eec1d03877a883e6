//! Top-level assembler pipeline.
//!
//! Wires the stages together for one file:
//!
//! 1. **Normalize and parse** every line into an [`InstructionStream`]
//! 2. **Resolve** labels (pass 1), then literals and variables (pass 2)
//! 3. **Encode** each address/compute instruction into a word
//!
//! [`assemble_batch`] runs that pipeline over many files. Each file gets
//! its own stream and symbol table, and a failure in one file never stops
//! the others.

use std::fmt;
use std::path::{Path, PathBuf};

use hack_isa::{decode_memory_region, MemoryRegion};
use tracing::{debug, info};

use crate::emitter::{format_word, write_hack_file, OUTPUT_EXTENSION};
use crate::encoder::encode_program;
use crate::errors::AssembleError;
use crate::parser::InstructionStream;
use crate::source::{SourceContent, SourceLine};
use crate::symbols::{resolve, ResolvedKind, SymbolKind, SymbolTable};

/// Settings for a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembleOptions {
    /// Directory receiving `.hack` files. `None` writes next to each input.
    pub out_dir: Option<PathBuf>,
    /// Whether the caller wants listings printed.
    pub listing: bool,
    /// Assemble without writing any output.
    pub check_only: bool,
}

/// An entry in the slot-to-source listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Output slot of the word.
    pub slot: usize,
    /// The emitted word.
    pub word: u16,
    /// 1-indexed source line.
    pub line: usize,
    /// Canonical source text.
    pub source: String,
}

impl fmt::Display for ListingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:05}: {}  {} ; line {}",
            self.slot,
            format_word(self.word),
            self.source,
            self.line
        )
    }
}

/// A non-fatal finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleWarning {
    /// Kind of warning.
    pub kind: AssembleWarningKind,
    /// Line the warning refers to.
    pub line: usize,
}

/// Classification of assembly warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssembleWarningKind {
    /// A variable was allocated past general-purpose RAM.
    VariableOutsideRam {
        /// The variable name.
        name: String,
        /// Its address.
        address: u16,
        /// The region it landed in.
        region: MemoryRegion,
    },
}

impl fmt::Display for AssembleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            AssembleWarningKind::VariableOutsideRam {
                name,
                address,
                region,
            } => {
                let area = match region {
                    MemoryRegion::Screen => "screen memory",
                    MemoryRegion::Keyboard => "the keyboard register",
                    MemoryRegion::Registers | MemoryRegion::Ram | MemoryRegion::Unmapped => {
                        "unmapped memory"
                    }
                };
                write!(f, "variable '{name}' allocated at {address}, inside {area}")
            }
        }
    }
}

/// Output of assembling one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleResult {
    /// Machine words in slot order.
    pub words: Vec<u16>,
    /// One entry per word.
    pub listing: Vec<ListingEntry>,
    /// Non-fatal findings.
    pub warnings: Vec<AssembleWarning>,
    /// Final symbol table.
    pub symbols: SymbolTable,
}

/// Assembles the lines of one file.
///
/// # Errors
///
/// Returns the first parse, symbol, or encoding error. Nothing is produced
/// for a file that fails.
pub fn assemble_lines(lines: &[SourceLine]) -> Result<AssembleResult, AssembleError> {
    let stream = InstructionStream::from_lines(lines)?;
    debug!(
        instructions = stream.len(),
        words = stream.slot_count(),
        "parsed"
    );

    let resolution = resolve(&stream)?;
    let encoded = encode_program(&resolution.instructions)?;

    let sources = resolution
        .instructions
        .iter()
        .filter(|instruction| !matches!(instruction.kind, ResolvedKind::Label(_)));
    let listing = encoded
        .iter()
        .zip(sources)
        .map(|(encoded, instruction)| ListingEntry {
            slot: encoded.slot,
            word: encoded.word,
            line: encoded.line,
            source: instruction.text.clone(),
        })
        .collect();

    Ok(AssembleResult {
        words: encoded.iter().map(|encoded| encoded.word).collect(),
        listing,
        warnings: variable_warnings(&resolution.symbols),
        symbols: resolution.symbols,
    })
}

fn variable_warnings(symbols: &SymbolTable) -> Vec<AssembleWarning> {
    symbols
        .of_kind(SymbolKind::Variable)
        .into_iter()
        .filter_map(|(name, symbol)| {
            (!MemoryRegion::Ram.contains(symbol.address)).then(|| AssembleWarning {
                kind: AssembleWarningKind::VariableOutsideRam {
                    name: name.to_string(),
                    address: symbol.address,
                    region: decode_memory_region(symbol.address),
                },
                line: symbol.defined_at.unwrap_or_default(),
            })
        })
        .collect()
}

/// Assembles loaded source, tagging errors with its path.
///
/// # Errors
///
/// See [`assemble_lines`].
pub fn assemble_source(source: &SourceContent) -> Result<AssembleResult, AssembleError> {
    assemble_lines(&source.lines).map_err(|e| e.in_file(&source.file_path))
}

/// Reads and assembles one file.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read, otherwise see
/// [`assemble_lines`].
pub fn assemble_file(path: &Path) -> Result<AssembleResult, AssembleError> {
    let source = SourceContent::load(path).map_err(|e| AssembleError::io(path, &e))?;
    assemble_source(&source)
}

/// Output path for `input`: its extension replaced by `.hack`, moved into
/// `out_dir` when one is given.
#[must_use]
pub fn output_path(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    let renamed = input.with_extension(OUTPUT_EXTENSION);
    match (out_dir, renamed.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => renamed,
    }
}

/// What happened to one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Assembled; `output` is `None` in check-only mode.
    Assembled {
        /// Where the image was written.
        output: Option<PathBuf>,
        /// The assembled program.
        result: AssembleResult,
    },
    /// Assembly or output failed.
    Failed(AssembleError),
}

/// Per-file result of a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    /// The input path.
    pub input: PathBuf,
    /// What happened.
    pub status: FileStatus,
}

impl FileOutcome {
    /// Returns the error if this file failed.
    #[must_use]
    pub const fn error(&self) -> Option<&AssembleError> {
        match &self.status {
            FileStatus::Failed(error) => Some(error),
            FileStatus::Assembled { .. } => None,
        }
    }

    /// Returns the assembled program if this file succeeded.
    #[must_use]
    pub const fn result(&self) -> Option<&AssembleResult> {
        match &self.status {
            FileStatus::Assembled { result, .. } => Some(result),
            FileStatus::Failed(_) => None,
        }
    }
}

/// Results of a batch run, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// One outcome per input.
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    /// Number of inputs that failed.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    /// Returns true if every input assembled.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failed_count() == 0
    }

    /// Iterates the failed inputs with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &AssembleError)> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.error().map(|error| (outcome.input.as_path(), error)))
    }
}

/// Assembles each input independently and writes its `.hack` image.
#[must_use]
pub fn assemble_batch(inputs: &[PathBuf], options: &AssembleOptions) -> BatchReport {
    let outcomes = inputs
        .iter()
        .map(|input| {
            let status = match assemble_one(input, options) {
                Ok((output, result)) => FileStatus::Assembled { output, result },
                Err(error) => {
                    debug!(input = %input.display(), %error, "assembly failed");
                    FileStatus::Failed(error)
                }
            };
            FileOutcome {
                input: input.clone(),
                status,
            }
        })
        .collect();
    BatchReport { outcomes }
}

fn assemble_one(
    input: &Path,
    options: &AssembleOptions,
) -> Result<(Option<PathBuf>, AssembleResult), AssembleError> {
    let result = assemble_file(input)?;

    if options.check_only {
        info!(input = %input.display(), words = result.words.len(), "checked");
        return Ok((None, result));
    }

    let output = output_path(input, options.out_dir.as_deref());
    write_hack_file(&output, &result.words).map_err(|e| AssembleError::io(&output, &e))?;
    info!(
        input = %input.display(),
        output = %output.display(),
        words = result.words.len(),
        "assembled"
    );
    Ok((Some(output), result))
}
