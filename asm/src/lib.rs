//! Two-pass assembler for the FVM-2000 fictional processor.
//!
//! Pass 1 resolves labels and `#define`s by simulating instruction
//! widths; pass 2 emits the fixed-size binary image the execution
//! engine decodes. Both passes share one opcode table, so the byte at
//! which a label lands is always the byte the engine fetches.

pub mod encode;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod symbol;

use log::debug;

pub use encode::IMAGE_SIZE;
pub use error::Error;
pub use symbol::{SymbolKind, SymbolTable};

/// A finished assembly: the fixed-size image, how much of it is
/// occupied, and the symbol table that produced it.
#[derive(Debug)]
pub struct Assembly {
    pub image: Vec<u8>,
    pub len: usize,
    pub symbols: SymbolTable,
}

/// Translate source text into a 2048-byte binary image. Byte 0 is the
/// first opcode. Aborts on the first error; there is no partial output.
pub fn assemble(source: &str) -> Result<Assembly, Error> {
    let stmts = parser::Parser::new(source).parse()?;
    let (instrs, symbols) = symbol::resolve(&stmts)?;
    debug!("pass 1: {} instructions, {} symbols", instrs.len(), symbols.len());
    let (image, len) = encode::encode(&instrs, &symbols)?;
    debug!("pass 2: {len} bytes emitted");
    Ok(Assembly { image, len, symbols })
}
