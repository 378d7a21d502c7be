use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::op::Opcode;

/// Instruction names as written in source. A mnemonic is not an opcode:
/// MOV, ADD, SUB and MUL each own two opcode bytes, and the operand's
/// syntactic form decides which one gets emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum Mnemonic {
    NOP,
    MOV,
    ADD,
    SUB,
    MUL,
    NOT,
    BRK,
    LDA,
    ADC,
    STA,
    LDX,
    INX,
    CMY,
    BNE,
    #[strum(to_string = "STA_X")]
    STAX,
    DEY,
    LDY,
    JSR,
    RTS,
    JMP,
}

/// Syntactic shape of a source operand, before any symbol resolution.
/// Pass 1 and pass 2 both derive the shape from the token alone, so
/// label offsets and emitted widths can never drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandForm {
    None,
    /// `#`-prefixed literal.
    Immediate,
    /// `0x` literal, label, define, or builtin name.
    Address,
    /// Plain decimal, emitted as one raw byte.
    Byte,
}

impl Mnemonic {
    pub fn parse(s: &str) -> Option<Self> {
        s.parse::<Self>().ok()
    }

    /// Select the opcode variant for a src operand of the given form.
    /// `None` means the mnemonic has no encoding for that form.
    pub fn opcode(self, src: OperandForm) -> Option<Opcode> {
        use crate::mnemonic::{Mnemonic as M, OperandForm as F};
        use crate::op::Opcode as O;
        match (self, src) {
            (M::NOP, F::None) => Some(O::NOP),
            (M::BRK, F::None) => Some(O::BRK),
            (M::NOT, F::None) => Some(O::NOT),
            (M::INX, F::None) => Some(O::INX),
            (M::DEY, F::None) => Some(O::DEY),
            (M::STAX, F::None) => Some(O::STAX),
            (M::RTS, F::None) => Some(O::RTS),
            (M::LDA, F::Byte) => Some(O::LDA),
            (M::ADC, F::Byte) => Some(O::ADC),
            (M::STA, F::Byte) => Some(O::STA),
            (M::LDX, F::Byte) => Some(O::LDX),
            (M::LDY, F::Byte) => Some(O::LDY),
            (M::CMY, F::Byte) => Some(O::CMY),
            (M::BNE, F::Address) => Some(O::BNE),
            (M::JMP, F::Address) => Some(O::JMP),
            (M::JSR, F::Address) => Some(O::JSR),
            (M::MOV, F::Immediate) => Some(O::MOVI),
            (M::MOV, F::Address) => Some(O::MOV),
            (M::ADD, F::Immediate) => Some(O::ADDI),
            (M::ADD, F::Address) => Some(O::ADD),
            (M::SUB, F::Immediate) => Some(O::SUBI),
            (M::SUB, F::Address) => Some(O::SUB),
            (M::MUL, F::Immediate) => Some(O::MULI),
            (M::MUL, F::Address) => Some(O::MUL),
            _ => None,
        }
    }

    /// Only MOV copies into a second operand.
    pub fn takes_dst(self) -> bool {
        self == Mnemonic::MOV
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Mnemonic::parse("mov"), Some(Mnemonic::MOV));
        assert_eq!(Mnemonic::parse("Lda"), Some(Mnemonic::LDA));
        assert_eq!(Mnemonic::parse("sta_x"), Some(Mnemonic::STAX));
        assert_eq!(Mnemonic::parse("hoge"), None);
    }

    #[test]
    fn operand_form_picks_the_variant() {
        assert_eq!(Mnemonic::MOV.opcode(OperandForm::Immediate), Some(Opcode::MOVI));
        assert_eq!(Mnemonic::MOV.opcode(OperandForm::Address), Some(Opcode::MOV));
        assert_eq!(Mnemonic::ADD.opcode(OperandForm::Immediate), Some(Opcode::ADDI));
        assert_eq!(Mnemonic::ADD.opcode(OperandForm::Address), Some(Opcode::ADD));
    }

    #[test]
    fn forms_without_an_encoding_are_rejected() {
        // The zero-page store has no 16-bit form, branches have no
        // one-byte form, and arithmetic has no raw-byte form.
        assert_eq!(Mnemonic::STA.opcode(OperandForm::Address), None);
        assert_eq!(Mnemonic::BNE.opcode(OperandForm::Byte), None);
        assert_eq!(Mnemonic::ADD.opcode(OperandForm::Byte), None);
        assert_eq!(Mnemonic::CMY.opcode(OperandForm::Immediate), None);
        assert_eq!(Mnemonic::NOP.opcode(OperandForm::Byte), None);
    }
}
