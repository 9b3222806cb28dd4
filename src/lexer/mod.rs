//! # Lexical Analyzer
//!
//! Streams tokens with source positions, one token of lookahead at a time.
//!
//! ## Scanning rules
//!
//! At each position the scanner first skips ASCII whitespace, then attempts,
//! in order: the three two-character symbols (`>=`, `<=`, `:=` — matched
//! before their single-character prefixes so `:=` is never split into `:`
//! and `=`), single-character punctuation (`+ - * / = , . < > # ( ) ;` —
//! note `:` is deliberately absent: it's only ever valid as the lead-in to
//! `:=`), identifiers/keywords, and digit runs. Anything else, including a
//! lone `:`, is a [`CompileErrorKind::UnexpectedCharacter`].
//!
//! On end-of-file, repeated [`Lexer::peek`] yields [`TokenKind::Eos`];
//! [`Lexer::advance`] past it is a no-op that keeps returning it.

pub mod cursor;
pub mod token;

#[cfg(test)]
mod tests;

use crate::error::{CompileError, CompileErrorKind, Span};
use cursor::Cursor;
pub use token::{Token, TokenKind};

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    current: Token,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Result<Self, CompileError> {
        let mut cursor = Cursor::new(source);
        let current = scan_token(&mut cursor)?;
        Ok(Self { cursor, current })
    }

    /// Inspect the current token without consuming it.
    pub fn peek(&self) -> &Token {
        &self.current
    }

    /// Consume the current token and scan the next one, returning the
    /// consumed token.
    pub fn advance(&mut self) -> Result<Token, CompileError> {
        if self.current.kind == TokenKind::Eos {
            return Ok(self.current.clone());
        }
        let next = scan_token(&mut self.cursor)?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    /// True if the current token's *shape* matches `kind` (payloads on
    /// `Identifier`/`Number` are ignored).
    pub fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    /// Consume the current token iff its shape matches `kind`.
    pub fn accept(&mut self, kind: &TokenKind) -> Result<Option<Token>, CompileError> {
        if self.check(kind) {
            Ok(Some(self.advance()?))
        } else {
            Ok(None)
        }
    }

    /// As [`Lexer::accept`], but raises a [`CompileErrorKind::UnexpectedToken`]
    /// on mismatch.
    pub fn expect(&mut self, kind: &TokenKind) -> Result<Token, CompileError> {
        match self.accept(kind)? {
            Some(tok) => Ok(tok),
            None => Err(CompileError::new(
                CompileErrorKind::UnexpectedToken,
                format!(
                    "expected {}, found {}",
                    kind.describe(),
                    self.current.kind.describe()
                ),
                self.current.span,
            )),
        }
    }

    /// Convenience for the common case of expecting an identifier; returns
    /// its spelling.
    pub fn expect_identifier(&mut self) -> Result<(String, Span), CompileError> {
        let tok = self.expect(&TokenKind::Identifier(String::new()))?;
        match tok.kind {
            TokenKind::Identifier(name) => Ok((name, tok.span)),
            _ => unreachable!(),
        }
    }

    pub fn expect_number(&mut self) -> Result<(i64, Span), CompileError> {
        let tok = self.expect(&TokenKind::Number(0))?;
        match tok.kind {
            TokenKind::Number(value) => Ok((value, tok.span)),
            _ => unreachable!(),
        }
    }
}

fn scan_token(cursor: &mut Cursor) -> Result<Token, CompileError> {
    loop {
        while matches!(cursor.peek(), Some(c) if c.is_ascii_whitespace()) {
            cursor.advance();
        }
        if cursor.is_at_end() {
            let (line, col) = cursor.current_pos();
            return Ok(Token {
                kind: TokenKind::Eos,
                span: Span::new(line, col, col),
            });
        }

        let (line, col) = cursor.current_pos();
        let ch = cursor.peek().unwrap();

        // Two-character symbols must be tried before their single-char
        // prefixes, or `:=` would be split into `:` and `=`.
        if let Some(next) = cursor.peek_next() {
            let two = match (ch, next) {
                ('>', '=') => Some(TokenKind::Geq),
                ('<', '=') => Some(TokenKind::Leq),
                (':', '=') => Some(TokenKind::Assign),
                _ => None,
            };
            if let Some(kind) = two {
                cursor.advance();
                cursor.advance();
                return Ok(Token {
                    kind,
                    span: Span::new(line, col, col + 1),
                });
            }
        }

        if let Some(kind) = single_char_symbol(ch) {
            cursor.advance();
            return Ok(Token {
                kind,
                span: Span::new(line, col, col),
            });
        }

        if ch.is_ascii_alphabetic() || ch == '_' {
            return Ok(lex_word(cursor, line, col));
        }

        if ch.is_ascii_digit() {
            return lex_number(cursor, line, col);
        }

        cursor.advance();
        return Err(CompileError::new(
            CompileErrorKind::UnexpectedCharacter,
            format!("unexpected character '{ch}'"),
            Span::new(line, col, col),
        ));
    }
}

fn single_char_symbol(ch: char) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match ch {
        '+' => Plus,
        '-' => Minus,
        '*' => Star,
        '/' => Slash,
        '=' => Eq,
        '#' => Hash,
        '<' => Lt,
        '>' => Gt,
        '(' => LParen,
        ')' => RParen,
        ',' => Comma,
        '.' => Dot,
        ';' => Semicolon,
        _ => return None,
    })
}

fn lex_word(cursor: &mut Cursor, line: usize, col: usize) -> Token {
    let mut word = String::new();
    while matches!(cursor.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
        word.push(cursor.advance().unwrap());
    }
    let end_col = col + word.len() - 1;
    let kind = TokenKind::keyword(&word).unwrap_or(TokenKind::Identifier(word));
    Token {
        kind,
        span: Span::new(line, col, end_col),
    }
}

fn lex_number(cursor: &mut Cursor, line: usize, col: usize) -> Result<Token, CompileError> {
    let mut digits = String::new();
    while matches!(cursor.peek(), Some(c) if c.is_ascii_digit()) {
        digits.push(cursor.advance().unwrap());
    }
    let end_col = col + digits.len() - 1;
    let span = Span::new(line, col, end_col);
    let value = digits.parse::<i64>().map_err(|_| {
        CompileError::new(
            CompileErrorKind::IntegerOverflow,
            format!("integer literal '{digits}' does not fit in 64 bits"),
            span,
        )
    })?;
    Ok(Token {
        kind: TokenKind::Number(value),
        span,
    })
}
