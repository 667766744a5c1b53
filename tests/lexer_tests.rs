//! Scanner behaviour seen through the public API

use so_lang::{Diagnostics, Error, Scanner, TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    Scanner::new(source)
        .scan_tokens()
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn test_function_declaration_tokens() {
    assert_eq!(
        kinds("fn add() -> int {\n return a + b\n}"),
        vec![
            TokenKind::Fn,
            TokenKind::Identifier,
            TokenKind::LeftParen,
            TokenKind::RightParen,
            TokenKind::Arrow,
            TokenKind::Identifier,
            TokenKind::LeftBrace,
            TokenKind::Newline,
            TokenKind::Return,
            TokenKind::Identifier,
            TokenKind::Plus,
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::RightBrace,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_domain_declaration_tokens() {
    let tokens = Scanner::new("account vault(signer, writable): Pubkey")
        .scan_tokens()
        .unwrap();
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Account,
            TokenKind::Identifier,
            TokenKind::LeftParen,
            TokenKind::Signer,
            TokenKind::Comma,
            TokenKind::Writable,
            TokenKind::RightParen,
            TokenKind::Colon,
            // keyword matching is case-sensitive
            TokenKind::Identifier,
            TokenKind::Eof,
        ]
    );
    assert!(tokens[0].kind.is_domain_keyword());
    assert!(!tokens[0].kind.is_keyword());
    assert!(!TokenKind::Let.is_domain_keyword());
}

#[test]
fn test_positions_are_one_based() {
    let tokens = Scanner::new("let a = 1\n  print(a)").scan_tokens().unwrap();
    let print = tokens.iter().find(|t| t.kind == TokenKind::Print).unwrap();
    assert_eq!((print.line, print.column), (2, 3));
    assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
}

#[test]
fn test_string_literal_carries_contents() {
    let tokens = Scanner::new("print(\"hello world\")").scan_tokens().unwrap();
    assert_eq!(
        tokens[2].kind,
        TokenKind::String("hello world".to_string())
    );
    assert_eq!(tokens[2].lexeme, "\"hello world\"");
}

#[test]
fn test_every_bad_character_is_reported() {
    let mut diagnostics = Diagnostics::new();
    Scanner::new("let a = 1 $\nlet b = ? 2").tokenize(&mut diagnostics);

    let positions: Vec<_> = diagnostics
        .errors()
        .iter()
        .map(|e| e.position().unwrap())
        .collect();
    assert_eq!(positions, vec![(1, 11), (2, 9)]);
}

#[test]
fn test_scan_tokens_aborts_with_all_errors() {
    let err = Scanner::new("$ % ^").scan_tokens().unwrap_err();
    match err {
        Error::Aborted { errors, .. } => {
            assert_eq!(errors.len(), 3);
            assert_eq!(
                errors[0].to_string(),
                "Error at line 1, column 1: Unexpected character '$'"
            );
        }
        other => panic!("expected abort, got {:?}", other),
    }
}

#[test]
fn test_domain_words_are_identifiers_when_layer_disabled() {
    let tokens = Scanner::new("transfer require emit")
        .with_domain_keywords(false)
        .scan_tokens()
        .unwrap();
    assert!(tokens[..3].iter().all(|t| t.kind == TokenKind::Identifier));
}

#[test]
fn test_comment_only_source() {
    assert_eq!(kinds("// nothing here"), vec![TokenKind::Eof]);
}
