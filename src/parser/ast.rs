use serde::{Deserialize, Serialize};
use std::fmt;

/// Complete So Lang compilation unit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    /// Top-level statements in source order
    pub statements: Vec<Statement>,
}

/// Statements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// Variable declaration: `let x = expr`
    VarDecl {
        /// Name of the variable
        name: String,
        /// Initializer, if one was written
        value: Option<Expression>,
    },

    /// Function declaration: `fn name(...) { ... }`
    FuncDecl {
        /// Function name
        name: String,
        /// Statements in the function body
        body: Vec<Statement>,
    },

    /// If statement
    If {
        /// Condition expression
        condition: Option<Expression>,
        /// Statements executed when the condition holds
        then_branch: Vec<Statement>,
        /// Optional `else` block or chained `else if`
        else_branch: Option<ElseBranch>,
    },

    /// Return statement
    Return {
        /// Optional value to return
        value: Option<Expression>,
    },

    /// Print statement: `print(expr)`
    Print {
        /// Value to print
        value: Option<Expression>,
    },

    /// Expression statement
    Expression(Expression),

    // ============================================================================
    // Domain declarations
    // ============================================================================
    /// `program NAME ("ID")? { ... }`
    ProgramDecl(ProgramDecl),

    /// `instruction NAME (...) { ... }`
    InstructionDecl(InstructionDecl),

    /// `account NAME (constraints) (: TYPE)?`
    AccountDecl(AccountDecl),

    /// `state NAME { field: TYPE, ... }`
    StateDecl(StateDecl),

    /// `transfer(from, to, amount)`
    Transfer {
        /// Source account
        from: Option<Expression>,
        /// Destination account
        to: Option<Expression>,
        /// Amount (or extra argument)
        amount: Option<Expression>,
    },

    /// `require(condition, "message")`
    Require {
        /// Condition that must hold
        condition: Option<Expression>,
        /// Optional literal diagnostic message
        message: Option<String>,
    },

    /// `emit EVENT(value)`
    Emit {
        /// Event name
        event: String,
        /// Optional payload
        value: Option<Expression>,
    },
}

/// What follows an `else`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElseBranch {
    /// `else { ... }`
    Block(Vec<Statement>),
    /// `else if ...` (always a [`Statement::If`])
    If(Box<Statement>),
}

/// Program declaration payload
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgramDecl {
    /// Program (module) name
    pub name: String,
    /// Literal program identifier, if declared
    pub program_id: Option<String>,
    /// Declarations inside the program body
    pub body: Vec<Statement>,
}

impl ProgramDecl {
    /// Instructions declared directly in the program body
    pub fn instructions(&self) -> impl Iterator<Item = &InstructionDecl> {
        self.body.iter().filter_map(|stmt| match stmt {
            Statement::InstructionDecl(instruction) => Some(instruction),
            _ => None,
        })
    }

    /// Accounts declared directly in the program body (shared by every instruction)
    pub fn shared_accounts(&self) -> impl Iterator<Item = &AccountDecl> {
        accounts_in(&self.body)
    }

    /// State declarations in the program body
    pub fn states(&self) -> impl Iterator<Item = &StateDecl> {
        self.body.iter().filter_map(|stmt| match stmt {
            Statement::StateDecl(state) => Some(state),
            _ => None,
        })
    }
}

/// Instruction declaration payload
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InstructionDecl {
    /// Instruction name
    pub name: String,
    /// Instruction body
    pub body: Vec<Statement>,
}

impl InstructionDecl {
    /// Accounts declared inside this instruction
    pub fn own_accounts(&self) -> impl Iterator<Item = &AccountDecl> {
        accounts_in(&self.body)
    }
}

fn accounts_in(statements: &[Statement]) -> impl Iterator<Item = &AccountDecl> {
    statements.iter().filter_map(|stmt| match stmt {
        Statement::AccountDecl(account) => Some(account),
        _ => None,
    })
}

/// Account declaration payload
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AccountDecl {
    /// Account name
    pub name: String,
    /// Boolean constraints
    pub constraints: AccountConstraints,
    /// PDA seed expressions, in order
    pub seeds: Vec<Expression>,
    /// Bump: `Some("")` for a bare `bump`, `Some(n)` for `bump = n`
    pub bump: Option<String>,
    /// Declared account type (`: TYPE`)
    pub account_type: Option<String>,
}

/// Constraint flags attached to an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountConstraints {
    /// Account must sign the transaction
    pub signer: bool,
    /// Account is mutable
    pub writable: bool,
    /// Account is created by the instruction
    pub init: bool,
}

/// State (account data layout) declaration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StateDecl {
    /// Struct name
    pub name: String,
    /// Fields in declaration order
    pub fields: Vec<StateField>,
}

/// A single state field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateField {
    /// Field name
    pub name: String,
    /// Source-level type name (`pubkey`, `u64`, `bool`, ...)
    pub ty: String,
}

/// Expressions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Numeric literal, kept as written
    Number(String),
    /// String literal (unescaped contents)
    String(String),
    /// Variable reference
    Identifier(String),
    /// Call with its argument list discarded: `name(...)`
    Call {
        /// Callee name
        name: String,
    },
    /// Single-level binary operation
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        left: Option<Box<Expression>>,
        /// Right operand
        right: Option<Box<Expression>>,
    },
}

/// Binary operators (no precedence: expressions are one level deep)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Addition (+)
    Add,
    /// Subtraction (-)
    Sub,
    /// Multiplication (*)
    Mul,
    /// Division (/)
    Div,
    /// Equality (==)
    Eq,
    /// Less than (<)
    Lt,
    /// Greater than (>)
    Gt,
}

impl BinaryOp {
    /// Source symbol, emitted verbatim in every target
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl Statement {
    /// True for the domain (program/instruction/account/...) kinds
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            Statement::ProgramDecl(_)
                | Statement::InstructionDecl(_)
                | Statement::AccountDecl(_)
                | Statement::StateDecl(_)
                | Statement::Transfer { .. }
                | Statement::Require { .. }
                | Statement::Emit { .. }
        )
    }
}
