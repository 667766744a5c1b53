//! So Lang Parser Module
//!
//! Recursive-descent parser turning tokens into a typed AST. The base grammar
//! lives in `statement_parser`; the program / instruction / account layer in
//! `domain`. `classify` is a separate read-only pass over the finished tree.

mod ast;
mod classify;
mod domain;
mod statement_parser;

pub use ast::{
    AccountConstraints,
    AccountDecl,
    BinaryOp,
    ElseBranch,
    Expression,
    InstructionDecl,
    Program,
    // Domain declarations
    ProgramDecl,
    StateDecl,
    StateField,
    Statement,
};
pub use classify::{classify, UnitClassification};
pub use statement_parser::Parser;
