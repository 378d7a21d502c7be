use color_print::cformat;
use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Deserialize, Serialize};
use strum::Display;

/// How an instruction locates its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Implicit,
    /// Works on the ACC cell, no operand bytes.
    Accumulator,
    /// Operand value sits inline right after the opcode byte.
    Immediate,
    /// One byte after the opcode, a low-page address.
    ZeroPage,
    /// Two bytes after the opcode, a little-endian 16-bit address.
    Absolute,
}

/// One-byte operation selectors. NOP must stay at 0x00: zero-filled
/// memory, and any byte without a table entry, decodes as NOP so a
/// program running off its own end never executes garbage.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Default,
    FromPrimitive,
    IntoPrimitive,
    Display,
)]
#[repr(u8)]
pub enum Opcode {
    #[default]
    NOP = 0x00,
    MOV = 0x01,
    MOVI = 0x02,
    ADD = 0x03,
    ADDI = 0x04,
    SUB = 0x05,
    SUBI = 0x06,
    MUL = 0x07,
    MULI = 0x08,
    NOT = 0x09,
    BRK = 0x0A,
    LDA = 0x0B,
    ADC = 0x0C,
    STA = 0x0D,
    LDX = 0x0E,
    INX = 0x0F,
    CMY = 0x10,
    BNE = 0x11,
    #[strum(to_string = "STA_X")]
    STAX = 0x12,
    DEY = 0x13,
    LDY = 0x14,
    JSR = 0x15,
    RTS = 0x16,
    JMP = 0x17,
}

/// Addressing mode and total encoded width of one opcode. The encoder
/// emits exactly `size` bytes per instruction and pass 1 advances label
/// offsets by the same number; the two passes must never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub mode: Mode,
    pub size: u16,
}

impl Opcode {
    /// The sentinel `Run()` stops on.
    pub const HALT: Opcode = Opcode::BRK;

    pub fn descriptor(self) -> Descriptor {
        use Mode::*;
        let (mode, size) = match self {
            Opcode::NOP => (Implicit, 1),
            Opcode::MOV => (Absolute, 5),
            Opcode::MOVI => (Immediate, 5),
            Opcode::ADD => (Absolute, 3),
            Opcode::ADDI => (Immediate, 3),
            Opcode::SUB => (Absolute, 3),
            Opcode::SUBI => (Immediate, 3),
            Opcode::MUL => (Absolute, 3),
            Opcode::MULI => (Immediate, 3),
            Opcode::NOT => (Accumulator, 1),
            Opcode::BRK => (Implicit, 1),
            Opcode::LDA => (Immediate, 2),
            Opcode::ADC => (Immediate, 2),
            Opcode::STA => (ZeroPage, 2),
            Opcode::LDX => (Immediate, 2),
            Opcode::INX => (Implicit, 1),
            Opcode::CMY => (Immediate, 2),
            Opcode::BNE => (Absolute, 3),
            Opcode::STAX => (Implicit, 1),
            Opcode::DEY => (Implicit, 1),
            Opcode::LDY => (Immediate, 2),
            Opcode::JSR => (Absolute, 3),
            Opcode::RTS => (Implicit, 1),
            Opcode::JMP => (Absolute, 3),
        };
        Descriptor { mode, size }
    }

    pub fn cformat(self) -> String {
        cformat!("<red>{:<5}</>", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Opcode; 24] = [
        Opcode::NOP,
        Opcode::MOV,
        Opcode::MOVI,
        Opcode::ADD,
        Opcode::ADDI,
        Opcode::SUB,
        Opcode::SUBI,
        Opcode::MUL,
        Opcode::MULI,
        Opcode::NOT,
        Opcode::BRK,
        Opcode::LDA,
        Opcode::ADC,
        Opcode::STA,
        Opcode::LDX,
        Opcode::INX,
        Opcode::CMY,
        Opcode::BNE,
        Opcode::STAX,
        Opcode::DEY,
        Opcode::LDY,
        Opcode::JSR,
        Opcode::RTS,
        Opcode::JMP,
    ];

    #[test]
    fn byte_roundtrip() {
        for op in ALL {
            let byte: u8 = op.into();
            assert_eq!(op, Opcode::from(byte));
        }
    }

    #[test]
    fn unknown_bytes_decode_as_nop() {
        assert_eq!(Opcode::from(0x18), Opcode::NOP);
        assert_eq!(Opcode::from(0xFF), Opcode::NOP);
    }

    #[test]
    fn zero_is_nop_and_halt_is_not() {
        assert_eq!(Opcode::from(0x00), Opcode::NOP);
        assert_ne!(u8::from(Opcode::HALT), 0x00);
    }

    #[test]
    fn sizes_agree_with_modes() {
        for op in ALL {
            let d = op.descriptor();
            match d.mode {
                Mode::Implicit | Mode::Accumulator => assert_eq!(d.size, 1, "{op}"),
                Mode::ZeroPage => assert_eq!(d.size, 2, "{op}"),
                // One byte for LDA-family operands, two for 16-bit
                // immediates, plus two more for a MOV dst field.
                Mode::Immediate => assert!(matches!(d.size, 2 | 3 | 5), "{op}"),
                Mode::Absolute => assert!(matches!(d.size, 3 | 5), "{op}"),
            }
        }
    }

    #[test]
    fn mov_variants_carry_two_fields() {
        assert_eq!(Opcode::MOV.descriptor().size, 5);
        assert_eq!(Opcode::MOVI.descriptor().size, 5);
        assert_eq!(Opcode::ADD.descriptor().size, 3);
        assert_eq!(Opcode::ADDI.descriptor().size, 3);
    }
}
