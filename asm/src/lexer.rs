use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use arch::mnemonic::Mnemonic;
use arch::reg::{Port, Reg};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    Eol,
    Whitespace,
    Illegal,
    Comma,
    /// Identifier with a trailing `:`, a label definition.
    Label,
    /// Bare identifier, a label or define reference.
    Ident,
    /// The `#define` directive.
    Define,
    Int,
    Float,
    /// `#`-prefixed integer literal.
    Imm,
    /// `0x`-prefixed address literal.
    Hex,
    Reg(Reg),
    Port(Port),
    Mnemonic(Mnemonic),
}

impl TokenKind {
    pub fn is_const(self) -> bool {
        matches!(self, TokenKind::Int | TokenKind::Float | TokenKind::Imm)
    }

    /// Anything that names or resolves to an address.
    pub fn is_addr(self) -> bool {
        matches!(
            self,
            TokenKind::Hex | TokenKind::Ident | TokenKind::Reg(_) | TokenKind::Port(_)
        )
    }

    pub fn is_src(self) -> bool {
        self.is_const() || self.is_addr()
    }

    /// Constants can never be written to.
    pub fn is_dst(self) -> bool {
        self.is_addr()
    }

    pub fn is_end(self) -> bool {
        matches!(self, TokenKind::Eof | TokenKind::Eol)
    }
}

/// One lexeme with its 1-based source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lit: String,
    pub line: usize,
    pub col: usize,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` (line {}, col {})", self.lit, self.line, self.col)
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == ':'
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == ':'
}

fn is_number_start(ch: char) -> bool {
    ch.is_ascii_digit() || matches!(ch, '.' | '+' | '-')
}

/// Single-pass scanner producing one token per call. Whitespace
/// coalesces, newlines advance the line counter, EOF repeats forever.
pub struct Scanner<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    col: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Scanner {
            chars: source.chars().peekable(),
            line: 1,
            col: 1,
        }
    }

    fn read(&mut self) -> Option<char> {
        let ch = self.chars.next();
        if ch.is_some() {
            self.col += 1;
        }
        ch
    }

    fn read_while(&mut self, lexeme: &mut String, pred: fn(char) -> bool) {
        while let Some(&ch) = self.chars.peek() {
            if !pred(ch) {
                break;
            }
            lexeme.push(ch);
            self.read();
        }
    }

    pub fn next_token(&mut self) -> Token {
        let line = self.line;
        let col = self.col;
        let token = |kind, lit: String| Token { kind, lit, line, col };

        let ch = match self.read() {
            None => return token(TokenKind::Eof, "EOF".to_string()),
            Some(ch) => ch,
        };

        match ch {
            ' ' | '\t' | '\r' => {
                let mut lexeme = String::from(ch);
                self.read_while(&mut lexeme, |c| matches!(c, ' ' | '\t' | '\r'));
                token(TokenKind::Whitespace, lexeme)
            }
            '\n' => {
                self.line += 1;
                self.col = 1;
                Token {
                    kind: TokenKind::Eol,
                    lit: "\n".to_string(),
                    line,
                    col,
                }
            }
            ',' => token(TokenKind::Comma, ",".to_string()),
            '#' => {
                let (kind, lexeme) = self.scan_hash();
                token(kind, lexeme)
            }
            ch if is_ident_start(ch) => {
                let mut lexeme = String::from(ch);
                self.read_while(&mut lexeme, is_ident_char);
                token(classify_ident(&lexeme), lexeme)
            }
            ch if is_number_start(ch) => {
                let (kind, lexeme) = self.scan_number(ch);
                token(kind, lexeme)
            }
            ch => token(TokenKind::Illegal, ch.to_string()),
        }
    }

    /// `0x` hex, or greedy sign/digit/`.` classified int-then-float by
    /// successive parse attempts.
    fn scan_number(&mut self, first: char) -> (TokenKind, String) {
        let mut lexeme = String::from(first);
        if first == '0' {
            if let Some(x) = self.chars.next_if(|c| matches!(*c, 'x' | 'X')) {
                self.col += 1;
                lexeme.push(x);
                self.read_while(&mut lexeme, |c| c.is_ascii_hexdigit());
                let kind = if lexeme.len() > 2 {
                    TokenKind::Hex
                } else {
                    TokenKind::Illegal
                };
                return (kind, lexeme);
            }
        }
        self.read_while(&mut lexeme, is_number_start);
        let kind = if lexeme.parse::<i64>().is_ok() {
            TokenKind::Int
        } else if lexeme.parse::<f64>().is_ok() {
            TokenKind::Float
        } else {
            TokenKind::Illegal
        };
        (kind, lexeme)
    }

    /// `#define`, or an immediate literal like `#500` / `#0x1F4`.
    fn scan_hash(&mut self) -> (TokenKind, String) {
        match self.chars.peek() {
            Some(&ch) if ch.is_ascii_alphabetic() => {
                let mut lexeme = String::from('#');
                self.read_while(&mut lexeme, |c| c.is_ascii_alphanumeric());
                if lexeme[1..].eq_ignore_ascii_case("define") {
                    (TokenKind::Define, lexeme)
                } else {
                    (TokenKind::Illegal, lexeme)
                }
            }
            Some(&ch) if is_number_start(ch) => {
                self.read();
                let (kind, number) = self.scan_number(ch);
                let lexeme = format!("#{number}");
                match kind {
                    TokenKind::Int | TokenKind::Hex => (TokenKind::Imm, lexeme),
                    _ => (TokenKind::Illegal, lexeme),
                }
            }
            _ => (TokenKind::Illegal, "#".to_string()),
        }
    }
}

/// Recognized names case-fold to their keyword kind; a single trailing
/// `:` marks a label; everything else identifier-shaped is a reference.
fn classify_ident(lexeme: &str) -> TokenKind {
    if let Some(name) = lexeme.strip_suffix(':') {
        if !name.is_empty() && !name.contains(':') {
            return TokenKind::Label;
        }
        return TokenKind::Illegal;
    }
    if lexeme.contains(':') {
        return TokenKind::Illegal;
    }
    if let Some(m) = Mnemonic::parse(lexeme) {
        return TokenKind::Mnemonic(m);
    }
    if let Some(r) = Reg::parse(lexeme) {
        return TokenKind::Reg(r);
    }
    if let Some(p) = Port::parse(lexeme) {
        return TokenKind::Port(p);
    }
    TokenKind::Ident
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut scanner = Scanner::new(source);
        let mut out = Vec::new();
        loop {
            let tok = scanner.next_token();
            let done = tok.kind == TokenKind::Eof;
            out.push(tok.kind);
            if done {
                return out;
            }
        }
    }

    #[test]
    fn keywords_case_fold() {
        use TokenKind::*;
        assert_eq!(
            kinds("mov EAX, p0"),
            vec![
                Mnemonic(arch::mnemonic::Mnemonic::MOV),
                Whitespace,
                Reg(arch::reg::Reg::EAX),
                Comma,
                Whitespace,
                Port(arch::reg::Port::P0),
                Eof
            ]
        );
    }

    #[test]
    fn labels_and_references() {
        use TokenKind::*;
        assert_eq!(
            kinds("loop: jsr decrementY"),
            vec![
                Label,
                Whitespace,
                Mnemonic(arch::mnemonic::Mnemonic::JSR),
                Whitespace,
                Ident,
                Eof
            ]
        );
        // A reserved name still lexes as a label; the resolver rejects it.
        assert_eq!(kinds("add:")[0], Label);
        assert_eq!(kinds(":")[0], Illegal);
        assert_eq!(kinds("a:b")[0], Illegal);
    }

    #[test]
    fn numbers_classify_by_successive_parses() {
        use TokenKind::*;
        assert_eq!(kinds("35")[0], Int);
        assert_eq!(kinds("-1")[0], Int);
        assert_eq!(kinds("1.5")[0], Float);
        assert_eq!(kinds("-1.5")[0], Float);
        assert_eq!(kinds("1.1.1")[0], Illegal);
        assert_eq!(kinds("1.1-")[0], Illegal);
        assert_eq!(kinds("0x744")[0], Hex);
        assert_eq!(kinds("0x")[0], Illegal);
    }

    #[test]
    fn hash_forms() {
        use TokenKind::*;
        assert_eq!(kinds("#define")[0], Define);
        assert_eq!(kinds("#DEFINE")[0], Define);
        assert_eq!(kinds("#500")[0], Imm);
        assert_eq!(kinds("#0x1F4")[0], Imm);
        assert_eq!(kinds("#foo")[0], Illegal);
        assert_eq!(kinds("#")[0], Illegal);
    }

    #[test]
    fn positions_are_one_based() {
        let mut scanner = Scanner::new("  label:\nadd 1");
        let ws = scanner.next_token();
        assert_eq!((ws.line, ws.col), (1, 1));
        let label = scanner.next_token();
        assert_eq!((label.kind, label.line, label.col), (TokenKind::Label, 1, 3));
        let eol = scanner.next_token();
        assert_eq!(eol.kind, TokenKind::Eol);
        let add = scanner.next_token();
        assert_eq!((add.line, add.col), (2, 1));
        let ws = scanner.next_token();
        assert_eq!(ws.kind, TokenKind::Whitespace);
        let one = scanner.next_token();
        assert_eq!((one.kind, one.line, one.col), (TokenKind::Int, 2, 5));
    }

    #[test]
    fn eof_is_sticky() {
        let mut scanner = Scanner::new("");
        assert_eq!(scanner.next_token().kind, TokenKind::Eof);
        assert_eq!(scanner.next_token().kind, TokenKind::Eof);
        assert_eq!(scanner.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn whitespace_coalesces() {
        let toks = kinds(" \t \t x");
        assert_eq!(toks, vec![TokenKind::Whitespace, TokenKind::Ident, TokenKind::Eof]);
    }
}
