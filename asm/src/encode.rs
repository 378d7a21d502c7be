use arch::mnemonic::{Mnemonic, OperandForm};
use arch::op::Opcode;

use crate::error::Error;
use crate::lexer::{Token, TokenKind};
use crate::parser::Instr;
use crate::symbol::SymbolTable;

/// Fixed capacity of the assembled image.
pub const IMAGE_SIZE: usize = 2048;

/// Syntactic shape of an operand token. Derived from the token alone,
/// never from symbol values, so pass 1 can run it before any label is
/// known.
pub(crate) fn operand_form(tok: Option<&Token>) -> Result<OperandForm, Error> {
    let Some(tok) = tok else {
        return Ok(OperandForm::None);
    };
    match tok.kind {
        TokenKind::Imm => Ok(OperandForm::Immediate),
        TokenKind::Hex | TokenKind::Ident | TokenKind::Reg(_) | TokenKind::Port(_) => {
            Ok(OperandForm::Address)
        }
        TokenKind::Int => Ok(OperandForm::Byte),
        // Floats are lexed but have no encoding.
        _ => Err(Error::MalformedOperand(tok.clone())),
    }
}

/// Pick the opcode variant for one statement. Shared by pass 1 (width
/// simulation) and pass 2 (emission); this sharing is what keeps label
/// offsets and emitted widths identical.
pub(crate) fn select_opcode(mnemonic: Mnemonic, mtok: &Token, instr: &Instr) -> Result<Opcode, Error> {
    let form = operand_form(instr.src.as_ref())?;
    let opcode = mnemonic.opcode(form).ok_or_else(|| {
        Error::MalformedOperand(instr.src.clone().unwrap_or_else(|| mtok.clone()))
    })?;
    match &instr.dst {
        Some(dst) if !mnemonic.takes_dst() => return Err(Error::MalformedOperand(dst.clone())),
        None if mnemonic.takes_dst() => return Err(Error::MalformedOperand(mtok.clone())),
        _ => {}
    }
    Ok(opcode)
}

/// Pass 2: write instructions into a zero-filled image from offset 0.
pub(crate) fn encode(instrs: &[Instr], symbols: &SymbolTable) -> Result<(Vec<u8>, usize), Error> {
    let mut image = vec![0u8; IMAGE_SIZE];
    let mut at = 0usize;

    for instr in instrs {
        let Some(mtok) = instr.mnemonic.as_ref() else {
            continue;
        };
        let TokenKind::Mnemonic(mnemonic) = mtok.kind else {
            continue;
        };

        let opcode = select_opcode(mnemonic, mtok, instr)?;
        let size = usize::from(opcode.descriptor().size);
        if at + size > IMAGE_SIZE {
            return Err(Error::ProgramTooLarge(mtok.clone()));
        }

        let start = at;
        image[at] = opcode.into();
        at += 1;
        if let Some(src) = &instr.src {
            at += emit_operand(&mut image[at..], src, symbols)?;
        }
        if let Some(dst) = &instr.dst {
            at += emit_operand(&mut image[at..], dst, symbols)?;
        }
        debug_assert_eq!(at - start, size, "emitted width diverged from the size table");
    }

    Ok((image, at))
}

/// Emit one operand: `#` literals and resolved addresses as 16-bit
/// little-endian, plain decimals as one raw byte in [0,255].
fn emit_operand(out: &mut [u8], tok: &Token, symbols: &SymbolTable) -> Result<usize, Error> {
    let emit16 = |out: &mut [u8], v: u16| {
        out[..2].copy_from_slice(&v.to_le_bytes());
        2
    };
    match tok.kind {
        TokenKind::Imm => {
            let v = parse_with_prefix(&tok.lit[1..]).ok_or_else(|| Error::InvalidLiteral(tok.clone()))?;
            Ok(emit16(out, v))
        }
        TokenKind::Hex => {
            let v = parse_with_prefix(&tok.lit).ok_or_else(|| Error::InvalidAddress(tok.clone()))?;
            Ok(emit16(out, v))
        }
        TokenKind::Ident => {
            let v = symbols
                .get(&tok.lit)
                .ok_or_else(|| Error::UndefinedSymbol(tok.clone()))?;
            Ok(emit16(out, v))
        }
        TokenKind::Reg(r) => Ok(emit16(out, r.addr())),
        TokenKind::Port(p) => Ok(emit16(out, p.addr())),
        TokenKind::Int => {
            let v = tok
                .lit
                .parse::<u8>()
                .map_err(|_| Error::InvalidLiteral(tok.clone()))?;
            out[0] = v;
            Ok(1)
        }
        _ => Err(Error::MalformedOperand(tok.clone())),
    }
}

/// `0x`/`0o`/`0b` prefixed or plain decimal, to u16.
pub(crate) fn parse_with_prefix(s: &str) -> Option<u16> {
    if s.len() < 2 {
        return s.parse::<u16>().ok();
    }
    let (prefix, num) = s.split_at(2);
    match prefix {
        "0x" | "0X" => u16::from_str_radix(num, 16).ok(),
        "0o" => u16::from_str_radix(num, 8).ok(),
        "0b" => u16::from_str_radix(num, 2).ok(),
        _ => s.parse::<u16>().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_radixes() {
        assert_eq!(parse_with_prefix("35"), Some(35));
        assert_eq!(parse_with_prefix("0x23"), Some(35));
        assert_eq!(parse_with_prefix("0X23"), Some(35));
        assert_eq!(parse_with_prefix("0o43"), Some(35));
        assert_eq!(parse_with_prefix("0b100011"), Some(35));
        assert_eq!(parse_with_prefix("5"), Some(5));
        assert_eq!(parse_with_prefix("65535"), Some(65535));
        assert_eq!(parse_with_prefix("65536"), None);
        assert_eq!(parse_with_prefix("-1"), None);
        assert_eq!(parse_with_prefix("0xZZ"), None);
    }
}
