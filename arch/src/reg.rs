use bimap::BiMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Accumulator cell, two bytes little-endian.
pub const ACC: u16 = 0x0100;

/// Input ports.
pub const P0: u16 = 0x0110;
pub const P1: u16 = 0x0112;
pub const P2: u16 = 0x0114;
pub const P3: u16 = 0x0116;

/// General-purpose 16-bit cells.
pub const EAX: u16 = 0x0118;
pub const EBX: u16 = 0x011A;
pub const ECX: u16 = 0x011C;
pub const EDX: u16 = 0x011E;

/// Instruction-visible registers. These live inside ordinary memory;
/// the CPU's pc/sp and scratch registers do not and have no name here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum Reg {
    ACC,
    EAX,
    EBX,
    ECX,
    EDX,
}

impl Reg {
    pub fn parse(s: &str) -> Option<Self> {
        s.parse::<Self>().ok()
    }

    pub fn addr(self) -> u16 {
        match self {
            Reg::ACC => ACC,
            Reg::EAX => EAX,
            Reg::EBX => EBX,
            Reg::ECX => ECX,
            Reg::EDX => EDX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum Port {
    P0,
    P1,
    P2,
    P3,
}

impl Port {
    pub fn parse(s: &str) -> Option<Self> {
        s.parse::<Self>().ok()
    }

    pub fn addr(self) -> u16 {
        match self {
            Port::P0 => P0,
            Port::P1 => P1,
            Port::P2 => P2,
            Port::P3 => P3,
        }
    }
}

/// Every name the assembler pre-seeds into its symbol table, both ways:
/// the encoder resolves name to address, the emulator trace names
/// addresses back.
pub static BUILTINS: Lazy<BiMap<&'static str, u16>> = Lazy::new(|| {
    let mut map = BiMap::new();
    map.insert("ACC", ACC);
    map.insert("P0", P0);
    map.insert("P1", P1);
    map.insert("P2", P2);
    map.insert("P3", P3);
    map.insert("EAX", EAX);
    map.insert("EBX", EBX);
    map.insert("ECX", ECX);
    map.insert("EDX", EDX);
    map
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Reg::parse("acc"), Some(Reg::ACC));
        assert_eq!(Reg::parse("Eax"), Some(Reg::EAX));
        assert_eq!(Port::parse("p2"), Some(Port::P2));
        assert_eq!(Reg::parse("p0"), None);
        assert_eq!(Port::parse("hoge"), None);
    }

    #[test]
    fn builtins_match_the_enums() {
        for reg in [Reg::ACC, Reg::EAX, Reg::EBX, Reg::ECX, Reg::EDX] {
            assert_eq!(BUILTINS.get_by_left(reg.to_string().as_str()), Some(&reg.addr()));
        }
        for port in [Port::P0, Port::P1, Port::P2, Port::P3] {
            assert_eq!(BUILTINS.get_by_left(port.to_string().as_str()), Some(&port.addr()));
        }
        assert_eq!(BUILTINS.get_by_right(&ACC), Some(&"ACC"));
    }
}
