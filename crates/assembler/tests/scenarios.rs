//! End-to-end assembly scenarios through the library API.

use std::fs;
use std::path::{Path, PathBuf};

use clap as _;
use hack_assembler::assembler::{assemble_batch, assemble_lines, AssembleOptions, AssembleResult};
use hack_assembler::emitter::{parse_hack_text, render_words};
use hack_assembler::errors::{AssembleError, AssembleErrorKind};
use hack_assembler::source::SourceContent;
use hack_assembler::symbols::{SymbolErrorKind, SymbolKind};
use hack_isa::{disassemble, Decoder};
use proptest::prelude::*;
use rstest::rstest;
use thiserror as _;
use tracing as _;
use tracing_subscriber as _;

fn assemble(text: &str) -> Result<AssembleResult, AssembleError> {
    assemble_lines(&SourceContent::from_text(Path::new("test.asm"), text).lines)
}

fn create_temp_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

const ADD: &str = "\
// Computes R0 = 2 + 3
@2
D=A
@3
D=D+A
@0
M=D
";

const MAX: &str = "\
// R2 = max(R0, R1)
   @R0
   D=M              // D = first number
   @R1
   D=D-M            // D = first - second
   @OUTPUT_FIRST
   D;JGT            // if D>0 goto output_first
   @R1
   D=M              // D = second
   @OUTPUT_D
   0;JMP            // goto output_d
(OUTPUT_FIRST)
   @R0
   D=M              // D = first
(OUTPUT_D)
   @R2
   M=D              // M[2] = D (greatest number)
(INFINITE_LOOP)
   @INFINITE_LOOP
   0;JMP            // infinite loop
";

#[test]
fn scenario_add_program() {
    let result = assemble(ADD).unwrap();
    assert_eq!(
        render_words(&result.words),
        "0000000000000010\n\
         1110110000010000\n\
         0000000000000011\n\
         1110000010010000\n\
         0000000000000000\n\
         1110001100001000"
    );
}

#[test]
fn scenario_labels_bind_to_slots() {
    let result = assemble(MAX).unwrap();
    assert_eq!(result.words.len(), 16);
    assert_eq!(result.symbols.address_of("OUTPUT_FIRST"), Some(10));
    assert_eq!(result.symbols.address_of("OUTPUT_D"), Some(12));
    assert_eq!(result.symbols.address_of("INFINITE_LOOP"), Some(14));
    assert_eq!(result.words[4], 10);
    assert_eq!(result.words[8], 12);
    assert_eq!(result.words[14], 14);
    assert_eq!(result.words[5], 0b1110_0011_0000_0001);
    assert!(result.symbols.of_kind(SymbolKind::Variable).is_empty());
}

#[test]
fn scenario_duplicate_label_fails_without_output() {
    let err = assemble("(LOOP)\n@LOOP\n0;JMP\n(LOOP)\n").unwrap_err();
    assert_eq!(err.line(), Some(4));
    assert!(matches!(
        err.kind,
        AssembleErrorKind::Symbol(SymbolErrorKind::DuplicateLabel { ref name, first_definition: 1 })
            if name == "LOOP"
    ));
}

#[test]
fn scenario_io_symbols_are_not_variables() {
    let result = assemble("@SCREEN\nD=A\n@KBD\nD=M\n@pos\nM=D\n").unwrap();
    assert_eq!(result.words[0], 16384);
    assert_eq!(result.words[2], 24576);
    assert_eq!(result.words[4], 16);
    let variables = result.symbols.of_kind(SymbolKind::Variable);
    assert_eq!(variables.len(), 1);
    assert_eq!(variables[0].0, "pos");
}

#[test]
fn scenario_batch_continues_after_failure() {
    let dir = tempfile::tempdir().unwrap();
    let broken = create_temp_file(dir.path(), "Broken.asm", "@2\nD=A\nD=D?A\n");
    let add = create_temp_file(dir.path(), "Add.asm", ADD);

    let report = assemble_batch(&[broken, add], &AssembleOptions::default());

    assert_eq!(report.failed_count(), 1);
    let (path, error) = report.failures().next().unwrap();
    assert!(path.ends_with("Broken.asm"));
    assert!(error.format_for_stderr().ends_with("Broken.asm:3: error: illegal character '?'"));
    assert!(!dir.path().join("Broken.hack").exists());

    let text = fs::read_to_string(dir.path().join("Add.hack")).unwrap();
    assert_eq!(parse_hack_text(&text).unwrap(), assemble(ADD).unwrap().words);
}

#[test]
fn variables_and_labels_share_one_table() {
    let source = "\
@i
M=1
@sum
M=0
(LOOP)
@i
D=M
@100
D=D-A
@END
D;JGT
@i
D=M
@sum
M=D+M
@i
M=M+1
@LOOP
0;JMP
(END)
@END
0;JMP
";
    let result = assemble(source).unwrap();
    assert_eq!(result.symbols.address_of("i"), Some(16));
    assert_eq!(result.symbols.address_of("sum"), Some(17));
    assert_eq!(result.symbols.address_of("LOOP"), Some(4));
    assert_eq!(result.symbols.address_of("END"), Some(18));
    assert_eq!(result.words[8], 18);
    assert_eq!(result.words[16], 4);
}

#[rstest]
#[case("D=D&&A", "unknown computation: D&&A")]
#[case("0;JUMP", "invalid jump: JUMP")]
#[case("@", "address instruction has no operand")]
#[case("(OPEN", "label is missing its closing ')': (OPEN")]
#[case("@40000", "literal 40000 exceeds the largest address 32767")]
#[case("Q=D", "invalid destination: Q")]
#[case("D=A / 2", "illegal character '/'")]
fn fatal_errors_name_the_offender(#[case] line: &str, #[case] message: &str) {
    let err = assemble(&format!("@1\n{line}\n")).unwrap_err();
    assert_eq!(err.format_for_stderr(), format!("line 2: error: {message}"));
}

#[test]
fn whitespace_and_comments_do_not_change_output() {
    let noisy = "  @ 2 // two\n\tD = A\r\n\n// gap\n @3\nD = D + A // add\n";
    let clean = "@2\nD=A\n@3\nD=D+A\n";
    assert_eq!(assemble(noisy).unwrap().words, assemble(clean).unwrap().words);
}

#[test]
fn assembled_words_disassemble_cleanly() {
    let result = assemble(MAX).unwrap();
    let rows = disassemble(&result.words);
    assert!(rows.iter().all(|row| !row.is_illegal));
    assert_eq!(rows[1].text, "D=M");
    assert_eq!(rows[5].text, "D;JGT");
}

fn comp_mnemonic() -> impl Strategy<Value = &'static str> {
    prop::sample::select(
        hack_isa::COMP_MNEMONICS
            .iter()
            .map(|(name, _, _)| *name)
            .collect::<Vec<_>>(),
    )
}

fn jump_mnemonic() -> impl Strategy<Value = Option<&'static str>> {
    prop::option::of(prop::sample::select(vec![
        "JGT", "JEQ", "JGE", "JLT", "JNE", "JLE", "JMP",
    ]))
}

fn dest_letters() -> impl Strategy<Value = String> {
    prop::sample::subsequence(vec!['A', 'D', 'M'], 0..=3)
        .prop_shuffle()
        .prop_map(|letters| letters.into_iter().collect())
}

proptest! {
    #[test]
    fn property_literals_assemble_to_themselves(value in 0u16..=0x7FFF) {
        let result = assemble(&format!("@{value}\n")).unwrap();
        prop_assert_eq!(result.words, vec![value]);
    }

    #[test]
    fn property_compute_round_trips_through_decoder(
        dest in dest_letters(),
        comp in comp_mnemonic(),
        jump in jump_mnemonic(),
    ) {
        let mut line = String::new();
        if !dest.is_empty() {
            line.push_str(&dest);
            line.push('=');
        }
        line.push_str(comp);
        if let Some(jump) = jump {
            line.push(';');
            line.push_str(jump);
        }

        let word = assemble(&line).unwrap().words[0];
        let decoded = Decoder::decode(word).word().expect("assembled word should decode");
        let reassembled = assemble(&decoded.to_string()).unwrap().words[0];
        prop_assert_eq!(reassembled, word);
    }

    #[test]
    fn property_destination_order_is_irrelevant(dest in dest_letters()) {
        prop_assume!(!dest.is_empty());
        let reversed: String = dest.chars().rev().collect();
        let forward = assemble(&format!("{dest}=D+1")).unwrap().words;
        let backward = assemble(&format!("{reversed}=D+1")).unwrap().words;
        prop_assert_eq!(forward, backward);
    }
}
