use super::*;
use crate::error::CompileErrorKind;

fn lex_all(input: &str) -> Result<Vec<TokenKind>, CompileError> {
    let mut lexer = Lexer::new(input)?;
    let mut kinds = Vec::new();
    loop {
        let tok = lexer.advance()?;
        let is_eos = tok.kind == TokenKind::Eos;
        kinds.push(tok.kind);
        if is_eos {
            break;
        }
    }
    Ok(kinds)
}

#[test]
fn empty_input() {
    assert_eq!(lex_all("").unwrap(), vec![TokenKind::Eos]);
}

#[test]
fn keywords_vs_identifiers() {
    assert_eq!(
        lex_all("var xyz procedure").unwrap(),
        vec![
            TokenKind::Var,
            TokenKind::Identifier("xyz".into()),
            TokenKind::Procedure,
            TokenKind::Eos,
        ]
    );
}

#[test]
fn assign_is_not_split_into_colon_equals() {
    assert_eq!(
        lex_all("x := 1").unwrap(),
        vec![
            TokenKind::Identifier("x".into()),
            TokenKind::Assign,
            TokenKind::Number(1),
            TokenKind::Eos,
        ]
    );
}

#[test]
fn two_char_relational_operators() {
    assert_eq!(
        lex_all("a <= b >= c").unwrap(),
        vec![
            TokenKind::Identifier("a".into()),
            TokenKind::Leq,
            TokenKind::Identifier("b".into()),
            TokenKind::Geq,
            TokenKind::Identifier("c".into()),
            TokenKind::Eos,
        ]
    );
}

#[test]
fn strict_lt_gt_stay_single_char() {
    assert_eq!(
        lex_all("a < b > c").unwrap(),
        vec![
            TokenKind::Identifier("a".into()),
            TokenKind::Lt,
            TokenKind::Identifier("b".into()),
            TokenKind::Gt,
            TokenKind::Identifier("c".into()),
            TokenKind::Eos,
        ]
    );
}

#[test]
fn number_literal() {
    assert_eq!(
        lex_all("12345").unwrap(),
        vec![TokenKind::Number(12345), TokenKind::Eos]
    );
}

#[test]
fn unexpected_character_is_lex_error() {
    let err = lex_all("x := 1 @ 2").unwrap_err();
    assert_eq!(err.kind, CompileErrorKind::UnexpectedCharacter);
}

#[test]
fn a_lone_colon_is_not_valid_punctuation() {
    // `:` only ever appears as the first half of `:=`; on its own it isn't
    // one of the single-char symbols the grammar defines.
    let err = lex_all("x : 1").unwrap_err();
    assert_eq!(err.kind, CompileErrorKind::UnexpectedCharacter);
}

#[test]
fn line_and_column_tracking() {
    let mut lexer = Lexer::new("a\nbb").unwrap();
    let first = lexer.advance().unwrap();
    assert_eq!(first.span.line, 1);
    assert_eq!(first.span.col_start, 1);
    let second = lexer.advance().unwrap();
    assert_eq!(second.span.line, 2);
    assert_eq!(second.span.col_start, 1);
    assert_eq!(second.span.col_end, 2);
}

#[test]
fn repeated_peek_and_advance_past_eos_is_a_no_op() {
    let mut lexer = Lexer::new("").unwrap();
    assert_eq!(lexer.peek().kind, TokenKind::Eos);
    lexer.advance().unwrap();
    lexer.advance().unwrap();
    assert_eq!(lexer.peek().kind, TokenKind::Eos);
}
