//! Domain declaration grammar (program / instruction / account / state and
//! the transfer, require and emit statements).
//!
//! These productions share the expression and block parsers of the base
//! grammar and are dispatched from [`Parser::parse_statement`].

use super::ast::{
    AccountConstraints, AccountDecl, InstructionDecl, ProgramDecl, StateDecl, StateField,
    Statement,
};
use super::statement_parser::Parser;
use crate::lexer::TokenKind;

impl Parser {
    /// `program NAME ("ID")? { declarations }`
    pub(super) fn parse_program_decl(&mut self) -> Statement {
        self.advance(); // consume 'program'

        let name = self.expect_decl_name("Expected program name after 'program'");

        let mut program_id = None;
        if self.match_kind(&TokenKind::LeftParen) {
            program_id = self.match_string();
            if program_id.is_none() {
                let token = self.peek().clone();
                self.error_at(&token, "Expected program id string");
            }
            self.expect(&TokenKind::RightParen, "Expected ')' after program id");
        } else if let Some(id) = self.match_string() {
            program_id = Some(id);
        }

        let body = self.parse_block();
        Statement::ProgramDecl(ProgramDecl {
            name,
            program_id,
            body,
        })
    }

    /// `instruction NAME ( ...params... ) (-> TYPE)? { body }`
    pub(super) fn parse_instruction_decl(&mut self) -> Statement {
        self.advance(); // consume 'instruction'

        let name = self.expect_decl_name("Expected instruction name after 'instruction'");
        if self.match_kind(&TokenKind::LeftParen) {
            self.skip_balanced_parens();
        }
        if self.match_kind(&TokenKind::Arrow) {
            self.advance();
        }

        let body = self.parse_block();
        Statement::InstructionDecl(InstructionDecl { name, body })
    }

    /// `account NAME ( constraint, ... ) (: TYPE)?`
    ///
    /// Unknown tokens inside the constraint list are skipped.
    pub(super) fn parse_account_decl(&mut self) -> Statement {
        self.advance(); // consume 'account'

        let mut account = AccountDecl {
            name: self.expect_decl_name("Expected account name after 'account'"),
            ..AccountDecl::default()
        };

        if self.match_kind(&TokenKind::LeftParen) {
            self.parse_account_constraints(&mut account);
        }

        if self.match_kind(&TokenKind::Colon) {
            let token = self.peek().clone();
            match token.kind {
                TokenKind::Pubkey | TokenKind::Identifier => {
                    self.advance();
                    account.account_type = Some(token.lexeme);
                }
                _ => self.error_at(&token, "Expected account type after ':'"),
            }
        }

        Statement::AccountDecl(account)
    }

    fn parse_account_constraints(&mut self, account: &mut AccountDecl) {
        let AccountDecl {
            constraints,
            seeds,
            bump,
            ..
        } = account;
        let AccountConstraints {
            signer,
            writable,
            init,
        } = constraints;

        while !self.check(&TokenKind::RightParen) && !self.is_at_end() {
            match self.peek().kind {
                TokenKind::Signer => *signer = true,
                TokenKind::Writable => *writable = true,
                TokenKind::Init => *init = true,
                TokenKind::Seeds => {
                    self.advance();
                    if self.match_kind(&TokenKind::LeftParen) {
                        self.parse_seed_list(seeds);
                    }
                    continue;
                }
                TokenKind::Bump => {
                    self.advance();
                    *bump = Some(self.parse_bump_value());
                    continue;
                }
                _ => {}
            }
            self.advance();
        }

        self.expect(&TokenKind::RightParen, "Expected ')' after account constraints");
    }

    /// Seed expressions up to the closing `)` of `seeds(`
    fn parse_seed_list(&mut self, seeds: &mut Vec<super::ast::Expression>) {
        loop {
            while self.check(&TokenKind::Comma) || self.check(&TokenKind::Newline) {
                self.advance();
            }
            if self.check(&TokenKind::RightParen) || self.is_at_end() {
                break;
            }
            match self.parse_expression() {
                Some(seed) => seeds.push(seed),
                None => {
                    let token = self.advance();
                    self.error_at(&token, format!("Unexpected token {} in seeds", token.kind));
                }
            }
        }
        self.expect(&TokenKind::RightParen, "Expected ')' after seeds");
    }

    /// Value after `bump`: empty for a bare `bump`, the literal text for `bump = N`
    fn parse_bump_value(&mut self) -> String {
        if !self.match_kind(&TokenKind::Assign) {
            return String::new();
        }
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Number | TokenKind::Identifier => {
                self.advance();
                token.lexeme
            }
            _ => {
                self.error_at(&token, "Expected bump value after '='");
                String::new()
            }
        }
    }

    /// `state NAME { field: TYPE, ... }`
    pub(super) fn parse_state_decl(&mut self) -> Statement {
        self.advance(); // consume 'state'

        let name = self.expect_decl_name("Expected state name after 'state'");
        let mut fields = Vec::new();

        if self.expect(&TokenKind::LeftBrace, "Expected '{' after state name") {
            loop {
                while matches!(
                    self.peek().kind,
                    TokenKind::Comma | TokenKind::Newline | TokenKind::Semicolon
                ) {
                    self.advance();
                }
                if self.check(&TokenKind::RightBrace) || self.is_at_end() {
                    break;
                }

                let Some(field_name) = self.match_word() else {
                    let token = self.advance();
                    self.error_at(&token, "Expected field name");
                    continue;
                };
                if !self.expect(&TokenKind::Colon, "Expected ':' after field name") {
                    continue;
                }
                match self.match_word() {
                    Some(ty) => fields.push(StateField {
                        name: field_name,
                        ty,
                    }),
                    None => {
                        let token = self.peek().clone();
                        self.error_at(&token, "Expected field type");
                    }
                }
            }
            self.expect(&TokenKind::RightBrace, "Expected '}' after state fields");
        }

        Statement::StateDecl(StateDecl { name, fields })
    }

    /// `transfer(from, to, amount?)`
    pub(super) fn parse_transfer(&mut self) -> Statement {
        self.advance(); // consume 'transfer'

        let (mut from, mut to, mut amount) = (None, None, None);
        if self.expect(&TokenKind::LeftParen, "Expected '(' after 'transfer'") {
            from = self.parse_expression();
            if self.expect(&TokenKind::Comma, "Expected ',' after transfer source") {
                to = self.parse_expression();
                if self.match_kind(&TokenKind::Comma) {
                    amount = self.parse_expression();
                }
            }
            self.expect(&TokenKind::RightParen, "Expected ')' after transfer arguments");
        }

        Statement::Transfer { from, to, amount }
    }

    /// `require(condition, "message"?)`
    pub(super) fn parse_require(&mut self) -> Statement {
        self.advance(); // consume 'require'

        let (mut condition, mut message) = (None, None);
        if self.expect(&TokenKind::LeftParen, "Expected '(' after 'require'") {
            condition = self.parse_expression();
            if self.match_kind(&TokenKind::Comma) {
                message = self.match_string();
                if message.is_none() {
                    // Only literal messages are kept
                    self.parse_expression();
                }
            }
            self.expect(&TokenKind::RightParen, "Expected ')' after require arguments");
        }

        Statement::Require { condition, message }
    }

    /// `emit NAME(value?)`
    pub(super) fn parse_emit(&mut self) -> Statement {
        self.advance(); // consume 'emit'

        let event = self.expect_decl_name("Expected event name after 'emit'");
        let mut value = None;
        if self.match_kind(&TokenKind::LeftParen) {
            if !self.check(&TokenKind::RightParen) {
                value = self.parse_expression();
            }
            self.expect(&TokenKind::RightParen, "Expected ')' after event value");
        }

        Statement::Emit { event, value }
    }

    fn match_string(&mut self) -> Option<String> {
        match self.peek().kind.clone() {
            TokenKind::String(value) => {
                self.advance();
                Some(value)
            }
            _ => None,
        }
    }

    /// Declaration name: an identifier or a domain keyword used as a name
    /// (`instruction init()`, `account state`)
    fn expect_decl_name(&mut self, message: &str) -> String {
        if self.peek().kind.is_domain_keyword() {
            return self.advance().lexeme;
        }
        self.expect_name(message)
    }

    /// Identifier or keyword text (keywords are valid field names and types)
    fn match_word(&mut self) -> Option<String> {
        let kind = &self.peek().kind;
        if *kind == TokenKind::Identifier || kind.is_keyword() || kind.is_domain_keyword() {
            Some(self.advance().lexeme)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::ast::{Expression, Program};
    use super::*;
    use crate::error::Diagnostics;
    use crate::lexer::Scanner;

    fn parse(source: &str) -> (Program, Diagnostics) {
        let tokens = Scanner::new(source).scan_tokens().unwrap();
        let mut parser = Parser::new(tokens);
        let mut diagnostics = Diagnostics::new();
        let program = parser.parse_program(&mut diagnostics);
        (program, diagnostics)
    }

    #[test]
    fn test_program_with_id_and_instruction() {
        let source = r#"program Counter("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS") {
    instruction increment() {
        print(1)
    }
}"#;
        let (program, diags) = parse(source);
        assert!(diags.is_empty(), "{:?}", diags.errors());

        match &program.statements[0] {
            Statement::ProgramDecl(decl) => {
                assert_eq!(decl.name, "Counter");
                assert_eq!(
                    decl.program_id.as_deref(),
                    Some("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS")
                );
                let instructions: Vec<_> = decl.instructions().collect();
                assert_eq!(instructions.len(), 1);
                assert_eq!(instructions[0].name, "increment");
                assert_eq!(instructions[0].body.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_account_constraints() {
        let (program, diags) = parse("account user(signer, writable, init) : UserData");
        assert!(diags.is_empty());
        assert_eq!(
            program.statements[0],
            Statement::AccountDecl(AccountDecl {
                name: "user".to_string(),
                constraints: AccountConstraints {
                    signer: true,
                    writable: true,
                    init: true,
                },
                seeds: vec![],
                bump: None,
                account_type: Some("UserData".to_string()),
            })
        );
    }

    #[test]
    fn test_account_seeds_and_bump() {
        let (program, diags) =
            parse(r#"account vault(seeds("vault", owner), bump = 254) : pubkey"#);
        assert!(diags.is_empty(), "{:?}", diags.errors());
        match &program.statements[0] {
            Statement::AccountDecl(account) => {
                assert_eq!(
                    account.seeds,
                    vec![
                        Expression::String("vault".to_string()),
                        Expression::Identifier("owner".to_string())
                    ]
                );
                assert_eq!(account.bump.as_deref(), Some("254"));
                assert_eq!(account.account_type.as_deref(), Some("pubkey"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bare_bump_and_unknown_constraint() {
        let (program, diags) = parse("account pda(mystery, bump)");
        assert!(diags.is_empty());
        match &program.statements[0] {
            Statement::AccountDecl(account) => {
                assert_eq!(account.bump.as_deref(), Some(""));
                assert_eq!(account.constraints, AccountConstraints::default());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_account_missing_type() {
        let (_, diags) = parse("account user(signer) : 5");
        assert_eq!(
            diags.errors()[0].to_string(),
            "Error at line 1, column 24: Expected account type after ':'"
        );
    }

    #[test]
    fn test_state_fields() {
        let (program, diags) =
            parse("state Counter {\n  count: u64,\n  authority: pubkey\n  state: bool\n}");
        assert!(diags.is_empty(), "{:?}", diags.errors());
        match &program.statements[0] {
            Statement::StateDecl(state) => {
                assert_eq!(state.name, "Counter");
                let fields: Vec<_> = state
                    .fields
                    .iter()
                    .map(|f| (f.name.as_str(), f.ty.as_str()))
                    .collect();
                assert_eq!(
                    fields,
                    vec![("count", "u64"), ("authority", "pubkey"), ("state", "bool")]
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_transfer_require_emit() {
        let source = "transfer(from, to, 100)\nrequire(x < 10, \"too big\")\nemit Moved(amount)";
        let (program, diags) = parse(source);
        assert!(diags.is_empty(), "{:?}", diags.errors());
        assert_eq!(program.statements.len(), 3);

        assert_eq!(
            program.statements[0],
            Statement::Transfer {
                from: Some(Expression::Identifier("from".to_string())),
                to: Some(Expression::Identifier("to".to_string())),
                amount: Some(Expression::Number("100".to_string())),
            }
        );
        match &program.statements[1] {
            Statement::Require { condition, message } => {
                assert!(condition.is_some());
                assert_eq!(message.as_deref(), Some("too big"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            program.statements[2],
            Statement::Emit {
                event: "Moved".to_string(),
                value: Some(Expression::Identifier("amount".to_string())),
            }
        );
    }

    #[test]
    fn test_require_non_literal_message_ignored() {
        let (program, diags) = parse("require(ok, reason)");
        assert!(diags.is_empty());
        assert!(matches!(
            &program.statements[0],
            Statement::Require { message: None, .. }
        ));
    }

    #[test]
    fn test_transfer_two_arguments() {
        let (program, diags) = parse("transfer(a, b)");
        assert!(diags.is_empty());
        assert!(matches!(
            &program.statements[0],
            Statement::Transfer { amount: None, .. }
        ));
    }

    #[test]
    fn test_empty_program() {
        let (program, diags) = parse("program Foo {}");
        assert!(diags.is_empty());
        assert_eq!(
            program.statements[0],
            Statement::ProgramDecl(ProgramDecl {
                name: "Foo".to_string(),
                program_id: None,
                body: vec![],
            })
        );
    }

    #[test]
    fn test_domain_keywords_as_declaration_names() {
        let (program, diags) =
            parse("program state {\n instruction init() {\n  account bump(signer)\n }\n}");
        assert!(diags.is_empty(), "{:?}", diags.errors());
        let Statement::ProgramDecl(decl) = &program.statements[0] else {
            panic!("expected program declaration");
        };
        assert_eq!(decl.name, "state");
        let instruction = decl.instructions().next().unwrap();
        assert_eq!(instruction.name, "init");
        let account = instruction.own_accounts().next().unwrap();
        assert_eq!(account.name, "bump");
        assert!(account.constraints.signer);
    }
}
