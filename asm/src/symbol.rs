use indexmap::IndexMap;

use arch::mnemonic::Mnemonic;
use arch::reg::BUILTINS;

use crate::encode::{select_opcode, IMAGE_SIZE};
use crate::error::Error;
use crate::parser::{Instr, Stmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Builtin,
    Label,
    Define,
}

/// Uppercase-normalized name to resolved 16-bit value, in insertion
/// order. Built once by pass 1 and read-only afterwards.
#[derive(Debug)]
pub struct SymbolTable {
    map: IndexMap<String, (SymbolKind, u16)>,
}

impl SymbolTable {
    fn seeded() -> Self {
        let mut map = IndexMap::new();
        for (name, addr) in BUILTINS.iter() {
            map.insert((*name).to_string(), (SymbolKind::Builtin, *addr));
        }
        SymbolTable { map }
    }

    pub fn get(&self, name: &str) -> Option<u16> {
        self.map.get(&name.to_ascii_uppercase()).map(|&(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SymbolKind, u16)> {
        self.map.iter().map(|(k, &(kind, v))| (k.as_str(), kind, v))
    }

    fn insert(&mut self, name: String, kind: SymbolKind, value: u16, tok: &crate::lexer::Token) -> Result<(), Error> {
        if Mnemonic::parse(&name).is_some() {
            return Err(Error::ReservedName(tok.clone()));
        }
        match self.map.get(&name) {
            Some((SymbolKind::Builtin, _)) => Err(Error::ReservedName(tok.clone())),
            Some(_) => Err(Error::DuplicateLabel(tok.clone())),
            None => {
                self.map.insert(name, (kind, value));
                Ok(())
            }
        }
    }
}

/// Pass 1: collect labels and defines, strip them from the statement
/// stream, and bind each label to the byte offset of the next emitted
/// instruction. Offsets come from the same variant-selection and size
/// table the encoder uses, so multi-byte operands ahead of a label can
/// never skew it.
pub fn resolve(stmts: &[Stmt]) -> Result<(Vec<Instr>, SymbolTable), Error> {
    let mut symbols = SymbolTable::seeded();
    let mut stripped = Vec::new();
    let mut offset: u32 = 0;
    let mut in_code = false;

    for stmt in stmts {
        match stmt {
            Stmt::Define { name, value } => {
                if in_code {
                    return Err(Error::DefineAfterInstruction(name.clone()));
                }
                let val = crate::encode::parse_with_prefix(&value.lit)
                    .ok_or_else(|| Error::InvalidDefineValue(value.clone()))?;
                symbols.insert(name.lit.to_ascii_uppercase(), SymbolKind::Define, val, name)?;
            }
            Stmt::Instr(instr) => {
                if let Some(label) = &instr.label {
                    let name = label.lit.strip_suffix(':').unwrap_or(&label.lit);
                    symbols.insert(name.to_ascii_uppercase(), SymbolKind::Label, offset as u16, label)?;
                }
                if let (Some(mnemonic), Some(mtok)) = (instr.mnemonic_kind(), instr.mnemonic.as_ref()) {
                    let opcode = select_opcode(mnemonic, mtok, instr)?;
                    offset += u32::from(opcode.descriptor().size);
                    if offset > IMAGE_SIZE as u32 {
                        return Err(Error::ProgramTooLarge(mtok.clone()));
                    }
                    in_code = true;
                    stripped.push(instr.clone());
                }
            }
        }
    }

    Ok((stripped, symbols))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn try_table(source: &str) -> Result<SymbolTable, Error> {
        let stmts = Parser::new(source).parse()?;
        resolve(&stmts).map(|(_, t)| t)
    }

    #[test]
    fn builtins_are_seeded() {
        let t = try_table("").unwrap();
        assert_eq!(t.get("ACC"), Some(0x0100));
        assert_eq!(t.get("acc"), Some(0x0100));
        assert_eq!(t.get("P3"), Some(0x0116));
        assert_eq!(t.get("EDX"), Some(0x011E));
        assert_eq!(t.get("nothing"), None);
    }

    #[test]
    fn label_offsets_follow_instruction_widths() {
        // LDA(2) STA(2) LDY(2) | JSR(3) CMY(2) BNE(3) BRK(1) | DEY RTS
        let t = try_table(
            "LDA 34\nSTA 15\nLDY 35\nloop:\nJSR decrementY\nCMY 30\nBNE loop\nBRK\ndecrementY:\nDEY\nRTS",
        )
        .unwrap();
        assert_eq!(t.get("loop"), Some(6));
        assert_eq!(t.get("decrementY"), Some(15));
    }

    #[test]
    fn wide_operands_before_a_label_are_accounted() {
        // MOVI is five bytes; the label after it must land at 5.
        let t = try_table("#define foo 0x200\nMOV #500 foo\nafter:\nBRK").unwrap();
        assert_eq!(t.get("after"), Some(5));
    }

    #[test]
    fn labels_are_case_normalized() {
        let t = try_table("DecrementY:\nDEY").unwrap();
        assert_eq!(t.get("decrementy"), Some(0));
        assert_eq!(t.get("DECREMENTY"), Some(0));
    }

    #[test]
    fn reserved_and_duplicate_names_are_distinct_errors() {
        assert!(matches!(try_table("add:\nNOP"), Err(Error::ReservedName(_))));
        assert!(matches!(try_table("sta_x:\nNOP"), Err(Error::ReservedName(_))));
        assert!(matches!(try_table("acc:\nNOP"), Err(Error::ReservedName(_))));
        assert!(matches!(try_table("p0:\nNOP"), Err(Error::ReservedName(_))));
        assert!(matches!(
            try_table("twice:\nNOP\ntwice:\nNOP"),
            Err(Error::DuplicateLabel(_))
        ));
        assert!(matches!(
            try_table("#define foo 1\nfoo:\nNOP"),
            Err(Error::DuplicateLabel(_))
        ));
    }

    #[test]
    fn define_ordering() {
        assert!(try_table("#define foo 1\n#define bar 2\nNOP").is_ok());
        assert!(matches!(
            try_table("NOP\n#define foo 1"),
            Err(Error::DefineAfterInstruction(_))
        ));
        // A label alone is not an instruction yet.
        assert!(try_table("start:\n#define foo 1\nNOP").is_ok());
    }

    #[test]
    fn define_values_take_either_radix() {
        let t = try_table("#define a 35\n#define b 0x23\nNOP").unwrap();
        assert_eq!(t.get("a"), Some(35));
        assert_eq!(t.get("b"), Some(35));
    }
}
