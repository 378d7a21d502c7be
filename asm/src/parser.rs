use arch::mnemonic::Mnemonic;

use crate::error::Error;
use crate::lexer::{Scanner, Token, TokenKind};

/// One logical source line.
#[derive(Debug, Clone)]
pub enum Stmt {
    Instr(Instr),
    Define { name: Token, value: Token },
}

/// `[label:] [mnemonic [src [, dst]]]`
#[derive(Debug, Clone, Default)]
pub struct Instr {
    pub label: Option<Token>,
    pub mnemonic: Option<Token>,
    pub src: Option<Token>,
    pub dst: Option<Token>,
}

impl Instr {
    pub fn mnemonic_kind(&self) -> Option<Mnemonic> {
        match self.mnemonic.as_ref().map(|t| t.kind) {
            Some(TokenKind::Mnemonic(m)) => Some(m),
            _ => None,
        }
    }
}

/// Turns the token stream into statements, stopping at the first
/// structural violation. One token of pushback; whitespace never
/// surfaces; blank lines are skipped without producing a statement.
pub struct Parser<'a> {
    scanner: Scanner<'a>,
    buf: Option<Token>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Parser {
            scanner: Scanner::new(source),
            buf: None,
        }
    }

    fn scan(&mut self) -> Token {
        if let Some(tok) = self.buf.take() {
            return tok;
        }
        loop {
            let tok = self.scanner.next_token();
            if tok.kind != TokenKind::Whitespace {
                return tok;
            }
        }
    }

    fn unscan(&mut self, tok: Token) {
        self.buf = Some(tok);
    }

    pub fn parse(mut self) -> Result<Vec<Stmt>, Error> {
        let mut stmts = Vec::new();
        loop {
            let tok = self.scan();
            match tok.kind {
                TokenKind::Eof => return Ok(stmts),
                TokenKind::Eol => continue,
                TokenKind::Define => stmts.push(self.parse_define()?),
                _ => {
                    self.unscan(tok);
                    stmts.push(Stmt::Instr(self.parse_instr()?));
                }
            }
        }
    }

    /// `#define NAME VALUE`
    fn parse_define(&mut self) -> Result<Stmt, Error> {
        let name = self.scan();
        match name.kind {
            TokenKind::Ident => {}
            TokenKind::Mnemonic(_) | TokenKind::Reg(_) | TokenKind::Port(_) => {
                return Err(Error::ReservedName(name))
            }
            _ => return Err(Error::ExpectedDefineName(name)),
        }
        let value = self.scan();
        if !matches!(value.kind, TokenKind::Int | TokenKind::Hex) {
            return Err(Error::InvalidDefineValue(value));
        }
        let end = self.scan();
        if !end.kind.is_end() {
            return Err(Error::UnexpectedToken(end));
        }
        Ok(Stmt::Define { name, value })
    }

    fn parse_instr(&mut self) -> Result<Instr, Error> {
        let mut st = Instr::default();

        let mut tok = self.scan();
        if tok.kind == TokenKind::Label {
            st.label = Some(tok);
            tok = self.scan();
        }

        // Bare label line.
        if tok.kind.is_end() {
            return Ok(st);
        }

        if !matches!(tok.kind, TokenKind::Mnemonic(_)) {
            return Err(Error::ExpectedInstruction(tok));
        }
        st.mnemonic = Some(tok);

        let tok = self.scan();
        if tok.kind.is_end() {
            return Ok(st);
        }
        if !tok.kind.is_src() {
            return Err(Error::ExpectedSrc(tok));
        }
        st.src = Some(tok);

        let mut tok = self.scan();
        if tok.kind.is_end() {
            return Ok(st);
        }
        // The delimiting comma is optional.
        if tok.kind == TokenKind::Comma {
            tok = self.scan();
        }
        if !tok.kind.is_dst() {
            return Err(Error::ExpectedDst(tok));
        }
        st.dst = Some(tok);

        let tok = self.scan();
        if !tok.kind.is_end() {
            return Err(Error::UnexpectedToken(tok));
        }
        Ok(st)
    }
}
