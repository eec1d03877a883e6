//! Two-pass assembler library for the Hack 16-bit computer.

use clap as _;
use tracing_subscriber as _;

/// Top-level per-file pipeline and batch driver.
pub mod assembler;
/// `.hack` text rendering and parsing.
pub mod emitter;
/// Word encoding for resolved instructions.
pub mod encoder;
/// Unified error type with source locations.
pub mod errors;
/// Whitespace, comment, and character-set normalization.
pub mod normalize;
/// Instruction parser and instruction stream.
pub mod parser;
/// Source loading and directory discovery.
pub mod source;
/// Symbol table and label/variable resolution.
pub mod symbols;
