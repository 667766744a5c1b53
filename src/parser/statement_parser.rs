use super::ast::{BinaryOp, ElseBranch, Expression, Program, Statement};
use crate::error::{Diagnostics, Phase, Result};
use crate::lexer::{Token, TokenKind};

/// Recursive-descent parser for So Lang.
///
/// One token of lookahead, no backtracking. Missing tokens are recorded as
/// syntax diagnostics and the parser keeps going with a partially built node,
/// so a single run reports every error in the file.
pub struct Parser {
    pub(super) tokens: Vec<Token>,
    pub(super) current: usize,
    pub(super) diagnostics: Diagnostics,
}

impl Parser {
    /// Creates a new parser over a token stream
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            let (line, column) = tokens
                .last()
                .map(|t| (t.line, t.column + t.lexeme.len()))
                .unwrap_or((1, 1));
            tokens.push(Token::new(TokenKind::Eof, String::new(), line, column));
        }
        Parser {
            tokens,
            current: 0,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Parses the tokens into an AST, failing if any syntax error was found
    pub fn parse(&mut self) -> Result<Program> {
        let mut diagnostics = Diagnostics::new();
        let program = self.parse_program(&mut diagnostics);
        diagnostics.check(Phase::Parsing)?;
        Ok(program)
    }

    /// Parses the whole token stream, recording syntax errors into `diagnostics`.
    ///
    /// Always returns a (possibly partial) program.
    pub fn parse_program(&mut self, diagnostics: &mut Diagnostics) -> Program {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if self.match_kind(&TokenKind::Newline) || self.match_kind(&TokenKind::Semicolon) {
                continue;
            }
            if let Some(stmt) = self.parse_statement_guarded() {
                statements.push(stmt);
            }
        }

        tracing::debug!(statements = statements.len(), "parsed program");
        diagnostics.append(std::mem::take(&mut self.diagnostics));
        Program { statements }
    }

    // ============================================================================
    // Statements
    // ============================================================================

    /// Parses one statement and guarantees progress: a statement that
    /// consumes nothing is reported and its first token skipped.
    pub(super) fn parse_statement_guarded(&mut self) -> Option<Statement> {
        let before = self.current;
        let stmt = self.parse_statement();
        if self.current == before {
            let token = self.peek().clone();
            self.error_at(&token, format!("Unexpected token {}", token.kind));
            self.advance();
            self.skip_separators();
        }
        stmt
    }

    /// Parses a single statement, then consumes trailing separators
    pub(super) fn parse_statement(&mut self) -> Option<Statement> {
        let stmt = match self.peek().kind {
            TokenKind::Fn => Some(self.parse_function()),
            TokenKind::Let => Some(self.parse_let()),
            TokenKind::Print => Some(self.parse_print()),
            TokenKind::If => Some(self.parse_if()),
            TokenKind::Return => Some(self.parse_return()),

            TokenKind::Program => Some(self.parse_program_decl()),
            TokenKind::Instruction => Some(self.parse_instruction_decl()),
            TokenKind::Account => Some(self.parse_account_decl()),
            TokenKind::State => Some(self.parse_state_decl()),
            TokenKind::Transfer => Some(self.parse_transfer()),
            TokenKind::Require => Some(self.parse_require()),
            TokenKind::Emit => Some(self.parse_emit()),

            _ => self.parse_expression().map(Statement::Expression),
        };

        self.skip_separators();
        stmt
    }

    fn parse_function(&mut self) -> Statement {
        self.advance(); // consume 'fn'

        let name = self.expect_name("Expected function name after 'fn'");
        if self.match_kind(&TokenKind::LeftParen) {
            // Parameters are not captured
            self.skip_balanced_parens();
        }
        if self.match_kind(&TokenKind::Arrow) {
            // Return type annotation is not captured either
            self.advance();
        }

        let body = self.parse_block();
        Statement::FuncDecl { name, body }
    }

    fn parse_let(&mut self) -> Statement {
        self.advance(); // consume 'let'

        let name = self.expect_name("Expected variable name after 'let'");
        let value = if self.match_kind(&TokenKind::Assign) {
            let value = self.parse_expression();
            if value.is_none() {
                let token = self.peek().clone();
                self.error_at(&token, "Expected expression after '='");
            }
            value
        } else {
            None
        };

        Statement::VarDecl { name, value }
    }

    fn parse_print(&mut self) -> Statement {
        self.advance(); // consume 'print'

        let mut value = None;
        if self.expect(&TokenKind::LeftParen, "Expected '(' after 'print'") {
            value = self.parse_expression();
            self.expect(&TokenKind::RightParen, "Expected ')' after print argument");
        }

        Statement::Print { value }
    }

    fn parse_if(&mut self) -> Statement {
        self.advance(); // consume 'if'

        let condition = self.parse_expression();
        let then_branch = self.parse_block();

        let else_branch = if self.match_kind(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                Some(ElseBranch::If(Box::new(self.parse_if())))
            } else {
                Some(ElseBranch::Block(self.parse_block()))
            }
        } else {
            None
        };

        Statement::If {
            condition,
            then_branch,
            else_branch,
        }
    }

    fn parse_return(&mut self) -> Statement {
        self.advance(); // consume 'return'

        let value = match self.peek().kind {
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Eof => {
                None
            }
            _ => self.parse_expression(),
        };

        Statement::Return { value }
    }

    /// Parses `{ statements }`. A missing `{` is reported and yields an empty block.
    pub(super) fn parse_block(&mut self) -> Vec<Statement> {
        let mut statements = Vec::new();

        if !self.expect(&TokenKind::LeftBrace, "Expected '{'") {
            return statements;
        }

        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            if self.match_kind(&TokenKind::Newline) || self.match_kind(&TokenKind::Semicolon) {
                continue;
            }
            if let Some(stmt) = self.parse_statement_guarded() {
                statements.push(stmt);
            }
        }

        self.expect(&TokenKind::RightBrace, "Expected '}'");
        statements
    }

    // ============================================================================
    // Expressions
    // ============================================================================

    /// Parses an expression: a primary, optionally followed by one operator
    /// and one more primary. There is no precedence and no chaining.
    pub(super) fn parse_expression(&mut self) -> Option<Expression> {
        self.parse_binary()
    }

    fn parse_binary(&mut self) -> Option<Expression> {
        let left = self.parse_primary();

        let op = match self.peek().kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Eq => BinaryOp::Eq,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::Gt => BinaryOp::Gt,
            _ => return left,
        };
        let op_token = self.advance();
        if left.is_none() {
            self.error_at(
                &op_token,
                format!("Expected expression before '{}'", op.symbol()),
            );
        }

        let right = self.parse_primary();
        Some(Expression::Binary {
            op,
            left: left.map(Box::new),
            right: right.map(Box::new),
        })
    }

    pub(super) fn parse_primary(&mut self) -> Option<Expression> {
        let token = self.peek().clone();

        match token.kind {
            TokenKind::Number => {
                self.advance();
                Some(Expression::Number(token.lexeme))
            }
            TokenKind::String(value) => {
                self.advance();
                Some(Expression::String(value))
            }
            TokenKind::Identifier => {
                self.advance();
                if self.match_kind(&TokenKind::LeftParen) {
                    // Call arguments are discarded
                    self.skip_balanced_parens();
                    Some(Expression::Call {
                        name: token.lexeme,
                    })
                } else {
                    Some(Expression::Identifier(token.lexeme))
                }
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expression();
                self.expect(&TokenKind::RightParen, "Expected ')' after expression");
                expr
            }
            _ => None,
        }
    }

    // ============================================================================
    // Token helpers
    // ============================================================================

    /// Skips tokens up to and including the `)` matching an already consumed `(`
    pub(super) fn skip_balanced_parens(&mut self) {
        let mut depth = 1usize;
        while !self.is_at_end() {
            match self.peek().kind {
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
        let token = self.peek().clone();
        self.error_at(&token, "Expected ')'");
    }

    pub(super) fn skip_separators(&mut self) {
        while self.peek().kind.is_separator() {
            self.advance();
        }
    }

    /// Consumes an identifier and returns its text, or reports `message`
    pub(super) fn expect_name(&mut self, message: &str) -> String {
        if self.check(&TokenKind::Identifier) {
            self.advance().lexeme
        } else {
            let token = self.peek().clone();
            self.error_at(&token, message);
            String::new()
        }
    }

    /// Consumes `kind` or reports `message`; returns whether it matched
    pub(super) fn expect(&mut self, kind: &TokenKind, message: &str) -> bool {
        if self.match_kind(kind) {
            true
        } else {
            let token = self.peek().clone();
            self.error_at(&token, message);
            false
        }
    }

    pub(super) fn error_at(&mut self, token: &Token, message: impl Into<String>) {
        self.diagnostics.syntax_error(token.line, token.column, message);
    }

    pub(super) fn match_kind(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    pub(super) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub(super) fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.current.min(last)]
    }

    pub(super) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }
}
