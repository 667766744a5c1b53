use super::token::{Token, TokenKind};
use crate::error::{Diagnostics, Phase, Result};

/// Scanner for So Lang source text
pub struct Scanner {
    /// Source code as character vector
    source: Vec<char>,
    /// Accumulated tokens
    tokens: Vec<Token>,
    /// Start position of current token
    start: usize,
    /// Current position in source
    current: usize,
    /// Current line number (1-indexed)
    line: usize,
    /// Current column number (1-indexed)
    column: usize,
    /// Line where the current token started
    start_line: usize,
    /// Column where the current token started
    start_column: usize,
    /// Whether domain keywords are recognized
    domain_keywords: bool,
    /// Optional cap on the number of emitted tokens
    max_tokens: Option<usize>,
    /// Set once the token cap was hit
    overflowed: bool,
}

impl Scanner {
    /// Creates a new scanner from source code, with the domain keyword layer enabled
    pub fn new(source: &str) -> Self {
        Scanner {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
            domain_keywords: true,
            max_tokens: None,
            overflowed: false,
        }
    }

    /// Enables or disables the domain keyword layer
    pub fn with_domain_keywords(mut self, enabled: bool) -> Self {
        self.domain_keywords = enabled;
        self
    }

    /// Caps the number of tokens (the end marker is always appended)
    pub fn with_max_tokens(mut self, max_tokens: Option<usize>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Scans all tokens, failing if any lexical error was found
    pub fn scan_tokens(&mut self) -> Result<Vec<Token>> {
        let mut diagnostics = Diagnostics::new();
        let tokens = self.tokenize(&mut diagnostics);
        diagnostics.check(Phase::Lexing)?;
        Ok(tokens)
    }

    /// Scans all tokens, recording lexical errors into `diagnostics`.
    ///
    /// Always returns a best-effort token stream terminated by [`TokenKind::Eof`].
    pub fn tokenize(&mut self, diagnostics: &mut Diagnostics) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.start_line = self.line;
            self.start_column = self.column;
            self.scan_token(diagnostics);
        }

        self.tokens.push(Token::new(
            TokenKind::Eof,
            String::new(),
            self.line,
            self.column,
        ));

        tracing::debug!(count = self.tokens.len(), "tokenized source");
        std::mem::take(&mut self.tokens)
    }

    fn scan_token(&mut self, diagnostics: &mut Diagnostics) {
        let c = self.advance();

        match c {
            ' ' | '\r' | '\t' => {}

            '\n' => {
                self.add_token(TokenKind::Newline, diagnostics);
                self.line += 1;
                self.column = 1;
            }

            '/' => {
                if self.peek() == '/' {
                    self.skip_line_comment();
                } else {
                    self.add_token(TokenKind::Slash, diagnostics);
                }
            }

            '(' => self.add_token(TokenKind::LeftParen, diagnostics),
            ')' => self.add_token(TokenKind::RightParen, diagnostics),
            '{' => self.add_token(TokenKind::LeftBrace, diagnostics),
            '}' => self.add_token(TokenKind::RightBrace, diagnostics),
            ',' => self.add_token(TokenKind::Comma, diagnostics),
            ';' => self.add_token(TokenKind::Semicolon, diagnostics),
            ':' => self.add_token(TokenKind::Colon, diagnostics),
            '@' => self.add_token(TokenKind::At, diagnostics),
            '#' => self.add_token(TokenKind::Hash, diagnostics),

            '+' => self.add_token(TokenKind::Plus, diagnostics),
            '-' => {
                if self.match_char('>') {
                    self.add_token(TokenKind::Arrow, diagnostics);
                } else {
                    self.add_token(TokenKind::Minus, diagnostics);
                }
            }
            '*' => self.add_token(TokenKind::Star, diagnostics),
            '<' => self.add_token(TokenKind::Lt, diagnostics),
            '>' => self.add_token(TokenKind::Gt, diagnostics),
            '=' => {
                if self.match_char('=') {
                    self.add_token(TokenKind::Eq, diagnostics);
                } else {
                    self.add_token(TokenKind::Assign, diagnostics);
                }
            }

            '"' => self.scan_string(diagnostics),

            c if c.is_ascii_digit() => self.scan_number(diagnostics),

            c if c.is_ascii_alphabetic() || c == '_' => {
                self.scan_identifier_or_keyword(diagnostics)
            }

            _ => {
                diagnostics.lex_error(
                    self.start_line,
                    self.start_column,
                    format!("Unexpected character '{}'", c),
                );
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while !self.is_at_end() && self.peek() != '\n' {
            self.advance();
        }
    }

    /// Reads a string literal. A missing closing quote consumes the rest of
    /// the input without reporting an error.
    fn scan_string(&mut self, diagnostics: &mut Diagnostics) {
        let mut value = String::new();

        while !self.is_at_end() && self.peek() != '"' {
            if self.peek() == '\\' {
                self.advance();
                if self.is_at_end() {
                    break;
                }
                let escaped = self.advance();
                match escaped {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    '\\' => value.push('\\'),
                    '"' => value.push('"'),
                    '\n' => {
                        self.line += 1;
                        self.column = 1;
                        value.push('\n');
                    }
                    other => value.push(other),
                }
            } else {
                let c = self.advance();
                if c == '\n' {
                    self.line += 1;
                    self.column = 1;
                }
                value.push(c);
            }
        }

        if !self.is_at_end() {
            self.advance(); // Closing "
        }

        self.add_token(TokenKind::String(value), diagnostics);
    }

    fn scan_number(&mut self, diagnostics: &mut Diagnostics) {
        let mut has_dot = false;
        while self.peek().is_ascii_digit() || (self.peek() == '.' && !has_dot) {
            if self.peek() == '.' {
                has_dot = true;
            }
            self.advance();
        }

        self.add_token(TokenKind::Number, diagnostics);
    }

    fn scan_identifier_or_keyword(&mut self, diagnostics: &mut Diagnostics) {
        while self.peek().is_ascii_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        let kind =
            TokenKind::keyword(&text, self.domain_keywords).unwrap_or(TokenKind::Identifier);

        self.add_token(kind, diagnostics);
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        self.column += 1;
        c
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source[self.current]
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            false
        } else {
            self.current += 1;
            self.column += 1;
            true
        }
    }

    fn add_token(&mut self, kind: TokenKind, diagnostics: &mut Diagnostics) {
        if let Some(max) = self.max_tokens {
            if self.tokens.len() >= max {
                if !self.overflowed {
                    self.overflowed = true;
                    diagnostics.lex_error(self.start_line, self.start_column, "Too many tokens");
                }
                return;
            }
        }

        let lexeme: String = self.source[self.start..self.current].iter().collect();
        self.tokens.push(Token::new(
            kind,
            lexeme,
            self.start_line,
            self.start_column,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Scanner::new(source)
            .scan_tokens()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_let() {
        let source = "let x = 5 + 3";
        let mut scanner = Scanner::new(source);
        let tokens = scanner.scan_tokens().unwrap();

        assert_eq!(tokens.len(), 7); // let x = 5 + 3 EOF
        assert_eq!(tokens[0].kind, TokenKind::Let);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[2].kind, TokenKind::Assign);
        assert_eq!(tokens[3].kind, TokenKind::Number);
        assert_eq!(tokens[3].lexeme, "5");
        assert_eq!(tokens[4].kind, TokenKind::Plus);
        assert_eq!(tokens[6].kind, TokenKind::Eof);
    }

    #[test]
    fn test_lookahead_operators() {
        assert_eq!(
            kinds("a == b = c -> d - e"),
            vec![
                TokenKind::Identifier,
                TokenKind::Eq,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Identifier,
                TokenKind::Arrow,
                TokenKind::Identifier,
                TokenKind::Minus,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_newline_is_significant() {
        let tokens = Scanner::new("let a = 1\nlet b = 2").scan_tokens().unwrap();
        assert_eq!(tokens[4].kind, TokenKind::Newline);
        assert_eq!(tokens[5].kind, TokenKind::Let);
        assert_eq!(tokens[5].line, 2);
        assert_eq!(tokens[5].column, 1);
    }

    #[test]
    fn test_comment() {
        let source = "// This is a comment\nprint(1)";
        let tokens = Scanner::new(source).scan_tokens().unwrap();

        assert_eq!(tokens[0].kind, TokenKind::Newline);
        assert_eq!(tokens[1].kind, TokenKind::Print);
    }

    #[test]
    fn test_string_escapes() {
        let tokens = Scanner::new(r#""a\nb\"c\qd""#).scan_tokens().unwrap();
        assert_eq!(
            tokens[0].kind,
            TokenKind::String("a\nb\"cqd".to_string())
        );
        assert_eq!(tokens[0].lexeme, r#""a\nb\"c\qd""#);
    }

    #[test]
    fn test_unterminated_string_is_lenient() {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new("print(\"oops").tokenize(&mut diagnostics);

        assert!(!diagnostics.has_errors());
        assert_eq!(tokens[2].kind, TokenKind::String("oops".to_string()));
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn test_escaped_newline_advances_line() {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new("print(\"a\\\nb\")\n$").tokenize(&mut diagnostics);

        assert_eq!(tokens[2].kind, TokenKind::String("a\nb".to_string()));
        assert_eq!(diagnostics.errors()[0].position(), Some((3, 1)));
    }

    #[test]
    fn test_number_single_dot() {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new("1.5.2").tokenize(&mut diagnostics);

        assert_eq!(tokens[0].lexeme, "1.5");
        // the second dot is not part of the number
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(tokens[1].lexeme, "2");
    }

    #[test]
    fn test_unexpected_character_continues() {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new("let x = 5 $ 3").tokenize(&mut diagnostics);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.errors()[0].position(), Some((1, 11)));
        assert_eq!(tokens.len(), 6);
    }

    #[test]
    fn test_domain_keywords_layer() {
        assert_eq!(kinds("program")[0], TokenKind::Program);
        let tokens = Scanner::new("program")
            .with_domain_keywords(false)
            .scan_tokens()
            .unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_domain_punctuation() {
        assert_eq!(
            kinds("@ # :"),
            vec![
                TokenKind::At,
                TokenKind::Hash,
                TokenKind::Colon,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_max_tokens() {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new("a b c d e")
            .with_max_tokens(Some(3))
            .tokenize(&mut diagnostics);

        assert_eq!(tokens.len(), 4); // three identifiers + EOF
        assert_eq!(diagnostics.len(), 1);
    }
}
