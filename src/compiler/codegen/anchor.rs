//! Anchor lowering
//!
//! Layout of the emitted file:
//!
//! ```text
//! imports
//! declare_id!
//! #[program] module with one handler per instruction
//! one #[derive(Accounts)] context per instruction
//! #[account] state structs, #[event] structs, #[error_code] enum
//! ```

use super::{
    escape_string, for_each_statement, render_expr, render_opt, rust_field_type, statement_label,
    CodeGenerator, DomainLayout,
};
use crate::parser::{AccountDecl, Expression, InstructionDecl, Program, StateDecl, Statement};

/// Data size assumed when the account type has no matching state declaration
const DEFAULT_ACCOUNT_SIZE: usize = 32;

/// Discriminator prefix Anchor reserves in every account
const DISCRIMINATOR_SIZE: usize = 8;

impl CodeGenerator {
    pub(super) fn emit_anchor_unit(&mut self, program: &Program) {
        let layout = DomainLayout::collect(program);

        self.line("use anchor_lang::prelude::*;");
        self.line("use anchor_spl::token::{self, Token, TokenAccount, Mint};");
        self.line("use anchor_spl::associated_token::AssociatedToken;");
        self.blank();

        if let Some(id) = self.ctx.program_id.clone() {
            self.line(format!("declare_id!(\"{}\");", id));
            self.blank();
        }

        for stmt in &layout.loose {
            tracing::warn!(
                construct = statement_label(stmt),
                "statement outside an instruction is not emitted for Anchor"
            );
        }

        let module = self
            .ctx
            .classification
            .program_name
            .clone()
            .unwrap_or_else(|| "program".to_string());

        self.line("#[program]");
        self.open(format!("pub mod {} {{", module));
        self.line("use super::*;");
        for (index, instruction) in layout.instructions.iter().enumerate() {
            self.ctx.instruction_index = index;
            self.blank();
            self.anchor_handler(instruction);
        }
        self.close("}");

        for instruction in &layout.instructions {
            self.blank();
            self.anchor_context(instruction, &layout);
        }

        for state in &layout.states {
            self.blank();
            self.line("#[account]");
            self.state_struct(state);
        }

        for event in &layout.events {
            self.blank();
            self.line("#[event]");
            self.open(format!("pub struct {} {{", event));
            self.line("pub value: u64,");
            self.close("}");
        }

        for function in &layout.functions {
            self.blank();
            self.rust_statement(function);
        }

        if layout.has_require {
            let message = layout
                .require_message
                .as_deref()
                .unwrap_or("Custom error message");
            self.blank();
            self.line("#[error_code]");
            self.open("pub enum ErrorCode {");
            self.line(format!("#[msg(\"{}\")]", escape_string(message)));
            self.line("CustomError,");
            self.close("}");
        }
    }

    fn anchor_handler(&mut self, instruction: &InstructionDecl) {
        self.open(format!(
            "pub fn {}(ctx: Context<{}Context>) -> Result<()> {{",
            instruction.name, instruction.name
        ));
        self.block(&instruction.body);
        self.line("Ok(())");
        self.close("}");
    }

    fn anchor_context<'a>(&mut self, instruction: &'a InstructionDecl, layout: &DomainLayout<'a>) {
        let accounts = layout.accounts_for(instruction);

        let mut uses_transfer = false;
        for_each_statement(&instruction.body, &mut |stmt| {
            if matches!(stmt, Statement::Transfer { .. }) {
                uses_transfer = true;
            }
        });
        let needs_authority = uses_transfer && !accounts.iter().any(|a| a.name == "authority");
        let needs_system = accounts.iter().any(|a| a.constraints.init);
        // `init` accounts name `payer` as the rent payer
        let needs_payer = needs_system && !accounts.iter().any(|a| a.name == "payer");

        self.line("#[derive(Accounts)]");
        if accounts.is_empty() && !uses_transfer {
            self.line(format!("pub struct {}Context {{}}", instruction.name));
            return;
        }

        self.open(format!("pub struct {}Context<'info> {{", instruction.name));
        for account in &accounts {
            let attributes = account_attributes(account, layout);
            if !attributes.is_empty() {
                self.line(format!("#[account({})]", attributes.join(", ")));
            }
            match account_data_type(account) {
                Some(ty) => self.line(format!("pub {}: Account<'info, {}>,", account.name, ty)),
                None => {
                    self.line("/// CHECK: declared without a data type");
                    self.line(format!("pub {}: AccountInfo<'info>,", account.name));
                }
            }
        }
        if needs_payer {
            self.line("#[account(mut)]");
            self.line("pub payer: Signer<'info>,");
        }
        if needs_authority {
            self.line("pub authority: Signer<'info>,");
        }
        if uses_transfer {
            self.line("pub token_program: Program<'info, Token>,");
        }
        if needs_system {
            self.line("pub system_program: Program<'info, System>,");
        }
        self.close("}");
    }

    /// `#[derive(...)] pub struct` for a state declaration (shared with Native)
    pub(super) fn state_struct(&mut self, state: &StateDecl) {
        self.line("#[derive(Clone, Debug, PartialEq)]");
        self.open(format!("pub struct {} {{", state.name));
        for field in &state.fields {
            self.line(format!("pub {}: {},", field.name, rust_field_type(&field.ty)));
        }
        self.close("}");
    }

    pub(super) fn anchor_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Transfer { from, to, amount } => {
                let from = account_ref(from.as_ref(), "from");
                let to = account_ref(to.as_ref(), "to");
                let amount = amount
                    .as_ref()
                    .map(render_expr)
                    .unwrap_or_else(|| "amount".to_string());

                self.open("token::transfer(");
                self.open("CpiContext::new(");
                self.line("ctx.accounts.token_program.to_account_info(),");
                self.open("token::Transfer {");
                self.line(format!("from: ctx.accounts.{}.to_account_info(),", from));
                self.line(format!("to: ctx.accounts.{}.to_account_info(),", to));
                self.line("authority: ctx.accounts.authority.to_account_info(),");
                self.close("},");
                self.close("),");
                self.line(format!("{},", amount));
                self.close(")?;");
            }

            Statement::Require { condition, .. } => self.line(format!(
                "require!({}, ErrorCode::CustomError);",
                render_opt(condition.as_ref())
            )),

            Statement::Emit { event, value } => {
                let value = value
                    .as_ref()
                    .map(render_expr)
                    .unwrap_or_else(|| "0".to_string());
                self.line(format!("emit!({} {{ value: {} }});", event, value));
            }

            // Hoisted into the context structs and state definitions
            Statement::AccountDecl(_) | Statement::StateDecl(_) => {}

            other => self.skip_unsupported(other),
        }
    }
}

/// Account name for a transfer side: identifiers name a context account
pub(super) fn account_ref(expr: Option<&Expression>, fallback: &str) -> String {
    match expr {
        Some(Expression::Identifier(name)) => name.clone(),
        Some(other) => render_expr(other),
        None => fallback.to_string(),
    }
}

/// Typed accounts use `Account<'info, T>`; untyped and `pubkey` ones fall back to `AccountInfo`
fn account_data_type(account: &AccountDecl) -> Option<&str> {
    match account.account_type.as_deref() {
        None | Some("pubkey") | Some("Pubkey") => None,
        Some(ty) => Some(ty),
    }
}

fn account_attributes(account: &AccountDecl, layout: &DomainLayout) -> Vec<String> {
    let mut attributes = Vec::new();
    let constraints = account.constraints;

    if constraints.signer {
        attributes.push("signer".to_string());
    }
    // `init` already implies a mutable account
    if constraints.writable && !constraints.init {
        attributes.push("mut".to_string());
    }
    if constraints.init {
        attributes.push("init".to_string());
        attributes.push("payer = payer".to_string());
        attributes.push(format!("space = {}", account_space(account, layout)));
    }
    if !account.seeds.is_empty() {
        let seeds: Vec<String> = account.seeds.iter().map(seed_expr).collect();
        attributes.push(format!("seeds = [{}]", seeds.join(", ")));
    }
    match account.bump.as_deref() {
        Some("") => attributes.push("bump".to_string()),
        Some(bump) => attributes.push(format!("bump = {}", bump)),
        None => {}
    }

    attributes
}

/// `8 + size` where size comes from the account's state declaration
fn account_space(account: &AccountDecl, layout: &DomainLayout) -> String {
    let size = account
        .account_type
        .as_deref()
        .and_then(|ty| layout.state(ty))
        .map(|state| state.fields.iter().map(|f| field_size(&f.ty)).sum::<usize>())
        .unwrap_or(DEFAULT_ACCOUNT_SIZE);

    format!("{} + {}", DISCRIMINATOR_SIZE, size)
}

fn field_size(ty: &str) -> usize {
    match rust_field_type(ty) {
        "Pubkey" => 32,
        "u32" => 4,
        "u8" | "bool" => 1,
        "String" => 4 + 64,
        _ => 8,
    }
}

fn seed_expr(seed: &Expression) -> String {
    match seed {
        Expression::String(value) => format!("b\"{}\"", escape_string(value)),
        Expression::Identifier(name) => format!("{}.key().as_ref()", name),
        Expression::Number(n) => format!("&{}u64.to_le_bytes()", n),
        other => format!("{}.as_ref()", render_expr(other)),
    }
}
