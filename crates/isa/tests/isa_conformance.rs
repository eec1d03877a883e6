//! ISA conformance: encoding table values, decode robustness, and
//! encode/decode round trips.

#![allow(clippy::pedantic, clippy::nursery, clippy::unusual_byte_groupings)]

use hack_isa::{
    disassemble, encode_address, encode_compute, AluOp, Comp, DecodedWord, Decoder, Dest, Jump,
    Operand, COMP_MNEMONICS,
};
use proptest::prelude::*;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

#[rstest]
#[case("0", 0b0_101010)]
#[case("1", 0b0_111111)]
#[case("-1", 0b0_111010)]
#[case("D", 0b0_001100)]
#[case("A", 0b0_110000)]
#[case("M", 0b1_110000)]
#[case("!D", 0b0_001101)]
#[case("!A", 0b0_110001)]
#[case("!M", 0b1_110001)]
#[case("-D", 0b0_001111)]
#[case("-A", 0b0_110011)]
#[case("-M", 0b1_110011)]
#[case("D+1", 0b0_011111)]
#[case("A+1", 0b0_110111)]
#[case("M+1", 0b1_110111)]
#[case("D-1", 0b0_001110)]
#[case("A-1", 0b0_110010)]
#[case("M-1", 0b1_110010)]
#[case("D+A", 0b0_000010)]
#[case("D+M", 0b1_000010)]
#[case("D-A", 0b0_010011)]
#[case("D-M", 0b1_010011)]
#[case("A-D", 0b0_000111)]
#[case("M-D", 0b1_000111)]
#[case("D&A", 0b0_000000)]
#[case("D&M", 0b1_000000)]
#[case("D|A", 0b0_010101)]
#[case("D|M", 0b1_010101)]
fn computation_bits_match_reference_table(#[case] mnemonic: &str, #[case] bits: u16) {
    let comp = Comp::from_mnemonic(mnemonic).expect("mnemonic should be in the table");
    assert_eq!(comp.bits(), bits, "{mnemonic}");
}

#[rstest]
#[case("D+A", "A+D")]
#[case("D+M", "M+D")]
#[case("D&A", "A&D")]
#[case("D|M", "M|D")]
fn commutative_spellings_share_bits(#[case] left: &str, #[case] right: &str) {
    assert_eq!(
        Comp::from_mnemonic(left).map(Comp::bits),
        Comp::from_mnemonic(right).map(Comp::bits)
    );
}

#[rstest]
#[case(Jump::Jgt, 0b001)]
#[case(Jump::Jeq, 0b010)]
#[case(Jump::Jge, 0b011)]
#[case(Jump::Jlt, 0b100)]
#[case(Jump::Jne, 0b101)]
#[case(Jump::Jle, 0b110)]
#[case(Jump::Jmp, 0b111)]
fn jump_bits_match_reference_table(#[case] jump: Jump, #[case] bits: u8) {
    assert_eq!(jump.bits(), bits);
}

#[test]
fn every_spelling_disassembles_to_a_table_spelling() {
    for (name, _, _) in COMP_MNEMONICS {
        let comp = Comp::from_mnemonic(name).unwrap();
        let word = encode_compute(comp, Dest::NONE, None);
        let rows = disassemble(&[word]);
        assert!(!rows[0].is_illegal, "{name}");
        assert_eq!(Comp::from_mnemonic(&rows[0].text), Some(comp));
    }
}

fn any_comp() -> impl Strategy<Value = Comp> {
    prop::sample::select(COMP_MNEMONICS.to_vec())
        .prop_map(|(name, _, _)| Comp::from_mnemonic(name).unwrap())
}

fn any_jump() -> impl Strategy<Value = Option<Jump>> {
    prop::option::of(prop::sample::select(Jump::ALL.to_vec()))
}

proptest! {
    #[test]
    fn property_decode_never_panics(word in any::<u16>()) {
        if let Some(decoded) = Decoder::decode(word).word() {
            prop_assert_eq!(decoded.encode(), word);
        }
    }

    #[test]
    fn property_address_words_round_trip(value in 0u16..=0x7FFF) {
        let word = encode_address(value).expect("15-bit value should encode");
        prop_assert_eq!(word, value);
        prop_assert_eq!(word & 0x8000, 0);
        prop_assert_eq!(Decoder::decode(word).word(), Some(DecodedWord::Address(value)));
    }

    #[test]
    fn property_compute_words_round_trip(comp in any_comp(), dest_bits in 0u16..8, jump in any_jump()) {
        let dest = Dest::from_bits(dest_bits);
        let word = encode_compute(comp, dest, jump);
        prop_assert_eq!(word >> 13, 0b111);
        prop_assert_eq!(
            Decoder::decode(word).word(),
            Some(DecodedWord::Compute { comp, dest, jump })
        );
    }

    #[test]
    fn property_a_bit_tracks_memory_operand(op in prop::sample::select(AluOp::ALL.to_vec())) {
        let a_form = Comp::new(op, Operand::A).expect("A form always exists");
        let a_word = encode_compute(a_form, Dest::NONE, None);
        prop_assert_eq!(a_word & (1 << 12), 0);
        if let Some(m_form) = Comp::new(op, Operand::M) {
            let m_word = encode_compute(m_form, Dest::NONE, None);
            prop_assert_eq!(a_word ^ m_word, 1 << 12);
        }
    }
}
