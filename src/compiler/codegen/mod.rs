//! # Source Emitter
//!
//! Walks a parsed [`Program`] once and writes equivalent source text for one
//! [`EmissionProfile`]. Each profile has its own module for the root layout and
//! the constructs only it understands; expressions and the generic statement
//! kinds are shared.
//!
//! ```text
//! Program ──► CodeGenerator ──► C | Rust | Anchor | Native source
//! ```
//!
//! Generation never fails: missing children render as empty text, and domain
//! declarations reaching a non-domain profile are dropped with a warning.

mod anchor;
mod c;
mod native;
mod rust;

use super::profile::EmissionProfile;
use crate::error::{Error, Result};
use crate::parser::{
    AccountDecl, ElseBranch, Expression, InstructionDecl, Program, StateDecl, Statement,
    UnitClassification,
};
use std::io::Write;

/// Native dispatch reads a single tag byte, so at most 256 instructions fit
pub const MAX_NATIVE_INSTRUCTIONS: usize = 256;

/// Everything the generator needs to know besides the node being lowered
#[derive(Debug, Clone)]
pub struct GenContext {
    /// Profile being emitted
    pub profile: EmissionProfile,
    /// Result of the detection pass
    pub classification: UnitClassification,
    /// Program identifier for `declare_id!`, if one is known
    pub program_id: Option<String>,
    /// Inside a user function body (affects bare `return`)
    pub in_function: bool,
    /// Index of the instruction currently being lowered
    pub instruction_index: usize,
}

impl GenContext {
    /// Creates a context for `profile` with no program identifier
    pub fn new(profile: EmissionProfile, classification: UnitClassification) -> Self {
        Self {
            profile,
            classification,
            program_id: None,
            in_function: false,
            instruction_index: 0,
        }
    }

    /// Sets the identifier used for `declare_id!`
    pub fn with_program_id(mut self, program_id: Option<String>) -> Self {
        self.program_id = program_id;
        self
    }
}

/// Source emitter for every profile
pub struct CodeGenerator {
    ctx: GenContext,
    /// Text written so far
    out: String,
    /// Indentation level (four spaces each)
    indent: usize,
}

impl CodeGenerator {
    /// Creates a generator for the given context
    pub fn new(ctx: GenContext) -> Self {
        Self {
            ctx,
            out: String::new(),
            indent: 0,
        }
    }

    /// Lowers the whole program and returns the emitted text
    pub fn generate(mut self, program: &Program) -> String {
        tracing::debug!(profile = %self.ctx.profile, "generating code");
        match self.ctx.profile {
            EmissionProfile::C => self.emit_c_unit(program),
            EmissionProfile::Rust => self.emit_rust_unit(program),
            EmissionProfile::Anchor => self.emit_anchor_unit(program),
            EmissionProfile::Native => self.emit_native_unit(program),
        }
        self.out
    }

    /// Lowers the program straight into a writer
    pub fn generate_to<W: Write>(self, program: &Program, writer: &mut W) -> Result<()> {
        let code = self.generate(program);
        writer
            .write_all(code.as_bytes())
            .map_err(|e| Error::io("<output>", &e))
    }

    // ============================================================================
    // Shared statement lowering
    // ============================================================================

    pub(super) fn block(&mut self, statements: &[Statement]) {
        for stmt in statements {
            self.statement(stmt);
        }
    }

    fn statement(&mut self, stmt: &Statement) {
        match self.ctx.profile {
            EmissionProfile::C => self.c_statement(stmt),
            _ => self.rust_statement(stmt),
        }
    }

    /// `if`/`else if`/`else` chain; only the header syntax differs per profile
    fn if_chain(
        &mut self,
        condition: Option<&Expression>,
        then_branch: &[Statement],
        else_branch: Option<&ElseBranch>,
    ) {
        let header = self.if_header(condition);
        self.open(format!("{} {{", header));
        self.block(then_branch);

        let mut next = else_branch;
        while let Some(branch) = next {
            next = None;
            match branch {
                ElseBranch::Block(block) => {
                    self.reopen("} else {");
                    self.block(block);
                }
                ElseBranch::If(nested) => match nested.as_ref() {
                    Statement::If {
                        condition,
                        then_branch,
                        else_branch,
                    } => {
                        let header = self.if_header(condition.as_ref());
                        self.reopen(format!("}} else {} {{", header));
                        self.block(then_branch);
                        next = else_branch.as_ref();
                    }
                    other => {
                        self.reopen("} else {");
                        self.statement(other);
                    }
                },
            }
        }

        self.close("}");
    }

    fn if_header(&self, condition: Option<&Expression>) -> String {
        let condition = render_opt(condition);
        match self.ctx.profile {
            EmissionProfile::C => format!("if ({})", condition),
            _ => format!("if {}", condition),
        }
    }

    /// Runs `f` with the function flag set, restoring it afterwards
    fn in_function_body(&mut self, f: impl FnOnce(&mut Self)) {
        let previous = self.ctx.in_function;
        self.ctx.in_function = true;
        f(self);
        self.ctx.in_function = previous;
    }

    fn skip_unsupported(&self, stmt: &Statement) {
        tracing::warn!(
            profile = %self.ctx.profile,
            construct = statement_label(stmt),
            "construct is not supported by this profile; nothing emitted"
        );
    }

    // ============================================================================
    // Output helpers
    // ============================================================================

    fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.indent {
                self.out.push_str("    ");
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Writes a line and indents what follows
    fn open(&mut self, text: impl AsRef<str>) {
        self.line(text);
        self.indent += 1;
    }

    /// Dedents, then writes a line
    fn close(&mut self, text: impl AsRef<str>) {
        self.indent = self.indent.saturating_sub(1);
        self.line(text);
    }

    /// Dedents for one line (`} else {`) and indents again
    fn reopen(&mut self, text: impl AsRef<str>) {
        self.close(text);
        self.indent += 1;
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// Renders an expression; the syntax is identical in every profile
pub(crate) fn render_expr(expr: &Expression) -> String {
    match expr {
        Expression::Number(text) => text.clone(),
        Expression::String(value) => format!("\"{}\"", escape_string(value)),
        Expression::Identifier(name) => name.clone(),
        Expression::Call { name } => format!("{}()", name),
        Expression::Binary { op, left, right } => format!(
            "{} {} {}",
            render_opt(left.as_deref()),
            op,
            render_opt(right.as_deref())
        ),
    }
}

/// Renders an optional expression, empty when absent
pub(crate) fn render_opt(expr: Option<&Expression>) -> String {
    expr.map(render_expr).unwrap_or_default()
}

/// Re-escapes a string literal's contents for C and Rust source
pub(crate) fn escape_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            c => escaped.push(c),
        }
    }
    escaped
}

fn statement_label(stmt: &Statement) -> &'static str {
    match stmt {
        Statement::VarDecl { .. } => "let",
        Statement::FuncDecl { .. } => "fn",
        Statement::If { .. } => "if",
        Statement::Return { .. } => "return",
        Statement::Print { .. } => "print",
        Statement::Expression(_) => "expression",
        Statement::ProgramDecl(_) => "program",
        Statement::InstructionDecl(_) => "instruction",
        Statement::AccountDecl(_) => "account",
        Statement::StateDecl(_) => "state",
        Statement::Transfer { .. } => "transfer",
        Statement::Require { .. } => "require",
        Statement::Emit { .. } => "emit",
    }
}

// ============================================================================
// Domain layout
// ============================================================================

/// Domain declarations gathered from the tree, grouped for emission.
///
/// Accounts declared directly in a program body (or at top level) are shared
/// by every instruction; accounts inside an instruction belong to it alone.
#[derive(Debug, Default)]
pub(crate) struct DomainLayout<'a> {
    pub shared_accounts: Vec<&'a AccountDecl>,
    pub instructions: Vec<&'a InstructionDecl>,
    pub states: Vec<&'a StateDecl>,
    /// Top-level user functions
    pub functions: Vec<&'a Statement>,
    /// Top-level statements outside any instruction
    pub loose: Vec<&'a Statement>,
    /// Distinct event names in first-use order
    pub events: Vec<String>,
    /// True if any `require` appears
    pub has_require: bool,
    /// First literal `require` message
    pub require_message: Option<String>,
}

impl<'a> DomainLayout<'a> {
    pub fn collect(program: &'a Program) -> Self {
        let mut layout = DomainLayout::default();
        layout.group(&program.statements);

        for_each_statement(&program.statements, &mut |stmt| match stmt {
            Statement::Emit { event, .. } => {
                if !layout.events.contains(event) {
                    layout.events.push(event.clone());
                }
            }
            Statement::Require { message, .. } => {
                layout.has_require = true;
                if layout.require_message.is_none() {
                    layout.require_message = message.clone();
                }
            }
            _ => {}
        });

        layout
    }

    fn group(&mut self, statements: &'a [Statement]) {
        for stmt in statements {
            match stmt {
                Statement::ProgramDecl(decl) => self.group(&decl.body),
                Statement::InstructionDecl(decl) => self.instructions.push(decl),
                Statement::AccountDecl(decl) => self.shared_accounts.push(decl),
                Statement::StateDecl(decl) => self.states.push(decl),
                Statement::FuncDecl { .. } => self.functions.push(stmt),
                _ => self.loose.push(stmt),
            }
        }
    }

    /// Shared accounts followed by the instruction's own
    pub fn accounts_for(&self, instruction: &'a InstructionDecl) -> Vec<&'a AccountDecl> {
        let mut accounts = self.shared_accounts.clone();
        accounts.extend(instruction.own_accounts());
        accounts
    }

    /// State declaration with the given name
    pub fn state(&self, name: &str) -> Option<&'a StateDecl> {
        self.states.iter().copied().find(|s| s.name == name)
    }
}

/// Pre-order walk over statements and every nested body
pub(crate) fn for_each_statement<'a>(
    statements: &'a [Statement],
    f: &mut impl FnMut(&'a Statement),
) {
    for stmt in statements {
        f(stmt);
        match stmt {
            Statement::ProgramDecl(decl) => for_each_statement(&decl.body, f),
            Statement::InstructionDecl(decl) => for_each_statement(&decl.body, f),
            Statement::FuncDecl { body, .. } => for_each_statement(body, f),
            Statement::If {
                then_branch,
                else_branch,
                ..
            } => {
                for_each_statement(then_branch, f);
                match else_branch {
                    Some(ElseBranch::Block(block)) => for_each_statement(block, f),
                    Some(ElseBranch::If(nested)) => {
                        for_each_statement(std::slice::from_ref(nested.as_ref()), f)
                    }
                    None => {}
                }
            }
            _ => {}
        }
    }
}

/// Rust type for a source-level state field type
pub(crate) fn rust_field_type(ty: &str) -> &'static str {
    match ty {
        "pubkey" | "Pubkey" => "Pubkey",
        "u64" => "u64",
        "u32" => "u32",
        "u8" => "u8",
        "bool" => "bool",
        "string" | "String" => "String",
        _ => "u64",
    }
}
