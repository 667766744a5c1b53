use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single token from the source code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The type of token
    pub kind: TokenKind,
    /// Original text of the token
    pub lexeme: String,
    /// Line number where token appears (1-indexed)
    pub line: usize,
    /// Column number where token starts (1-indexed)
    pub column: usize,
}

impl Token {
    /// Creates a new token with the given properties
    pub fn new(kind: TokenKind, lexeme: String, line: usize, column: usize) -> Self {
        Token {
            kind,
            lexeme,
            line,
            column,
        }
    }
}

/// All possible token types in So Lang
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    // Literals
    /// Numeric literal (digits with at most one decimal point)
    Number,
    /// String literal, carrying the unescaped contents
    String(String),
    /// Identifier
    Identifier,

    // Generic keywords
    /// `let`
    Let,
    /// `fn`
    Fn,
    /// `if`
    If,
    /// `else`
    Else,
    /// `return`
    Return,
    /// `print`
    Print,

    // Domain keywords
    /// `program`
    Program,
    /// `instruction`
    Instruction,
    /// `account`
    Account,
    /// `state`
    State,
    /// `pubkey`
    Pubkey,
    /// `signer`
    Signer,
    /// `writable`
    Writable,
    /// `init`
    Init,
    /// `seeds`
    Seeds,
    /// `bump`
    Bump,
    /// `transfer`
    Transfer,
    /// `require`
    Require,
    /// `emit`
    Emit,

    // Operators
    /// Assignment operator (=)
    Assign,
    /// Equality operator (==)
    Eq,
    /// Plus operator (+)
    Plus,
    /// Minus operator (-)
    Minus,
    /// Star operator (*)
    Star,
    /// Slash operator (/)
    Slash,
    /// Less than operator (<)
    Lt,
    /// Greater than operator (>)
    Gt,
    /// Arrow operator (->)
    Arrow,

    // Delimiters
    /// Left parenthesis (
    LeftParen,
    /// Right parenthesis )
    RightParen,
    /// Left brace {
    LeftBrace,
    /// Right brace }
    RightBrace,
    /// Comma delimiter
    Comma,
    /// Semicolon delimiter
    Semicolon,
    /// Colon (type annotations)
    Colon,
    /// At symbol (@)
    At,
    /// Hash symbol (#)
    Hash,
    /// Newline (statement separator)
    Newline,

    // Special
    /// End of file marker
    Eof,
}

lazy_static! {
    static ref GENERIC_KEYWORDS: HashMap<&'static str, TokenKind> = {
        let mut m = HashMap::new();
        m.insert("let", TokenKind::Let);
        m.insert("fn", TokenKind::Fn);
        m.insert("if", TokenKind::If);
        m.insert("else", TokenKind::Else);
        m.insert("return", TokenKind::Return);
        m.insert("print", TokenKind::Print);
        m
    };
    static ref DOMAIN_KEYWORDS: HashMap<&'static str, TokenKind> = {
        let mut m = HashMap::new();
        m.insert("program", TokenKind::Program);
        m.insert("instruction", TokenKind::Instruction);
        m.insert("account", TokenKind::Account);
        m.insert("state", TokenKind::State);
        m.insert("pubkey", TokenKind::Pubkey);
        m.insert("signer", TokenKind::Signer);
        m.insert("writable", TokenKind::Writable);
        m.insert("init", TokenKind::Init);
        m.insert("seeds", TokenKind::Seeds);
        m.insert("bump", TokenKind::Bump);
        m.insert("transfer", TokenKind::Transfer);
        m.insert("require", TokenKind::Require);
        m.insert("emit", TokenKind::Emit);
        m
    };
}

impl TokenKind {
    /// Check if token is a generic (base language) keyword
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Let
                | TokenKind::Fn
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::Return
                | TokenKind::Print
        )
    }

    /// Check if token belongs to the domain declaration layer
    pub fn is_domain_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Program
                | TokenKind::Instruction
                | TokenKind::Account
                | TokenKind::State
                | TokenKind::Pubkey
                | TokenKind::Signer
                | TokenKind::Writable
                | TokenKind::Init
                | TokenKind::Seeds
                | TokenKind::Bump
                | TokenKind::Transfer
                | TokenKind::Require
                | TokenKind::Emit
        )
    }

    /// Tokens that separate statements
    pub fn is_separator(&self) -> bool {
        matches!(self, TokenKind::Newline | TokenKind::Semicolon)
    }

    /// Look up a word in the keyword tables.
    ///
    /// Generic keywords are matched first; the domain layer is only consulted
    /// when `domain` is set. Matching is case-sensitive.
    pub fn keyword(word: &str, domain: bool) -> Option<TokenKind> {
        if let Some(kind) = GENERIC_KEYWORDS.get(word) {
            return Some(kind.clone());
        }
        if domain {
            return DOMAIN_KEYWORDS.get(word).cloned();
        }
        None
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TokenKind::Number => write!(f, "number"),
            TokenKind::String(_) => write!(f, "string"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Assign => write!(f, "'='"),
            TokenKind::Eq => write!(f, "'=='"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::Arrow => write!(f, "'->'"),
            TokenKind::LeftParen => write!(f, "'('"),
            TokenKind::RightParen => write!(f, "')'"),
            TokenKind::LeftBrace => write!(f, "'{{'"),
            TokenKind::RightBrace => write!(f, "'}}'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::At => write!(f, "'@'"),
            TokenKind::Hash => write!(f, "'#'"),
            TokenKind::Newline => write!(f, "newline"),
            TokenKind::Eof => write!(f, "end of file"),
            keyword => write!(f, "'{}'", format!("{:?}", keyword).to_lowercase()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_detection() {
        assert_eq!(TokenKind::keyword("let", true), Some(TokenKind::Let));
        assert_eq!(TokenKind::keyword("print", false), Some(TokenKind::Print));
        assert_eq!(TokenKind::keyword("program", true), Some(TokenKind::Program));
        assert_eq!(TokenKind::keyword("program", false), None);
        assert_eq!(TokenKind::keyword("Let", true), None);
        assert_eq!(TokenKind::keyword("not_a_keyword", true), None);
    }

    #[test]
    fn test_is_keyword() {
        assert!(TokenKind::If.is_keyword());
        assert!(!TokenKind::If.is_domain_keyword());
        assert!(TokenKind::Transfer.is_domain_keyword());
        assert!(!TokenKind::Number.is_keyword());
        assert!(!TokenKind::Identifier.is_keyword());
    }

    #[test]
    fn test_display_keyword() {
        assert_eq!(TokenKind::Instruction.to_string(), "'instruction'");
        assert_eq!(TokenKind::LeftBrace.to_string(), "'{'");
    }
}
