use color_print::cprintln;
use thiserror::Error;

use crate::lexer::Token;

/// Assembly-time failures. Every variant names the token that caused
/// it; assembly aborts on the first one and never returns partial
/// output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("expected instruction, found {0}")]
    ExpectedInstruction(Token),

    #[error("expected src address or const, found {0}")]
    ExpectedSrc(Token),

    #[error("expected dst address, found {0}")]
    ExpectedDst(Token),

    #[error("unexpected token {0}")]
    UnexpectedToken(Token),

    #[error("expected name after #define, found {0}")]
    ExpectedDefineName(Token),

    #[error("invalid address value {0}")]
    InvalidDefineValue(Token),

    #[error("cannot use reserved name {0}")]
    ReservedName(Token),

    #[error("label already defined {0}")]
    DuplicateLabel(Token),

    #[error("defines must come before instructions {0}")]
    DefineAfterInstruction(Token),

    #[error("invalid numeric literal {0}")]
    InvalidLiteral(Token),

    #[error("invalid address {0}")]
    InvalidAddress(Token),

    #[error("undefined symbol {0}")]
    UndefinedSymbol(Token),

    #[error("operand not encodable for this instruction: {0}")]
    MalformedOperand(Token),

    #[error("program does not fit the output image, at {0}")]
    ProgramTooLarge(Token),
}

impl Error {
    pub fn token(&self) -> &Token {
        match self {
            Error::ExpectedInstruction(t)
            | Error::ExpectedSrc(t)
            | Error::ExpectedDst(t)
            | Error::UnexpectedToken(t)
            | Error::ExpectedDefineName(t)
            | Error::InvalidDefineValue(t)
            | Error::ReservedName(t)
            | Error::DuplicateLabel(t)
            | Error::DefineAfterInstruction(t)
            | Error::InvalidLiteral(t)
            | Error::InvalidAddress(t)
            | Error::UndefinedSymbol(t)
            | Error::MalformedOperand(t)
            | Error::ProgramTooLarge(t) => t,
        }
    }

    /// Print a compiler-style diagnostic with the offending source line.
    pub fn print_diag(&self, source: &str) {
        cprintln!("<red,bold>error</>: {}", self);
        let tok = self.token();
        if let Some(line) = source.lines().nth(tok.line.saturating_sub(1)) {
            cprintln!("      <blue>|</>");
            cprintln!(" <blue>{:>4} |</> {}", tok.line, line);
            cprintln!("      <blue>|</> {}<red,bold>^</>", " ".repeat(tok.col.saturating_sub(1)));
        }
    }
}
