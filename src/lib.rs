//! # So Lang - a small language compiled to C, Rust and Solana programs
//!
//! So Lang is a tiny imperative language (`let`, `fn`, `if`/`else`, `return`,
//! `print`) with an optional declaration layer for Solana programs
//! (`program`, `instruction`, `account`, `state`, `transfer`, `require`,
//! `emit`). The compiler translates one source file into another source
//! file: plain C, plain Rust, an Anchor program, or a native
//! `solana_program` entrypoint.
//!
//! ## Quick Start
//!
//! ```rust
//! use so_lang::{CompileOptions, Compiler, EmissionProfile, Target};
//!
//! # fn main() -> so_lang::Result<()> {
//! let source = "let x = 5 + 3\nprint(x)";
//!
//! let compiler = Compiler::new(CompileOptions::default().with_target(Target::Rust));
//! let output = compiler.compile(source)?;
//!
//! assert_eq!(output.profile, EmissionProfile::Rust);
//! assert!(output.code.contains("let x = 5 + 3;"));
//! assert!(output.code.contains("println!(\"{}\", x);"));
//! # Ok(())
//! # }
//! ```
//!
//! ### Solana Programs
//!
//! Units containing domain declarations are detected automatically and
//! emitted as native Solana programs unless a framework is requested:
//!
//! ```rust
//! use so_lang::{CompileOptions, Compiler, DomainFramework};
//!
//! # fn main() -> so_lang::Result<()> {
//! let source = r#"
//! program vault {
//!     instruction deposit() {
//!         account user(signer, writable)
//!         require(amount > 0, "empty deposit")
//!     }
//! }
//! "#;
//!
//! let options = CompileOptions::default().with_framework(DomainFramework::Anchor);
//! let output = Compiler::new(options).compile(source)?;
//!
//! assert!(output.code.contains("#[account(signer, mut)]"));
//! assert!(output.code.contains("require!(amount > 0, ErrorCode::CustomError);"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Source → Scanner → Tokens → Parser → AST → classify → CodeGenerator → Source
//! ```
//!
//! ### Main Components
//!
//! - [`Scanner`] - Tokenizes source code, newline-sensitive
//! - [`Parser`] - Recursive-descent parser producing a typed AST
//! - [`parser::classify`] - Detects whether a unit uses the domain layer
//! - [`EmissionProfile`] - C, Rust, Anchor or Native output
//! - [`Compiler`] - Drives the phases and program identity resolution
//!
//! ## Error Handling
//!
//! Lexing and parsing keep going after an error so every problem in a file
//! is reported at once; the compiler then stops with [`Error::Aborted`]:
//!
//! ```rust
//! use so_lang::{CompileOptions, Compiler, Error};
//!
//! let err = Compiler::new(CompileOptions::default())
//!     .compile("if x < 3 print(x) }")
//!     .unwrap_err();
//!
//! match err {
//!     Error::Aborted { errors, .. } => {
//!         assert_eq!(errors[0].to_string(), "Error at line 1, column 10: Expected '{'");
//!     }
//!     other => panic!("unexpected error: {}", other),
//! }
//! ```

/// Version of the So Lang compiler
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod compiler;
pub mod error;
pub mod lexer;
pub mod parser;

// Re-export main types
pub use compiler::{
    CompileOptions, CompileOutput, Compiler, DomainFramework, EmissionProfile, IdentityResolver,
    KeygenResolver, Target,
};
pub use error::{Diagnostics, Error, ErrorSeverity, Phase, Result};
pub use lexer::{Scanner, Token, TokenKind};
pub use parser::{BinaryOp, Expression, Parser, Program, Statement, UnitClassification};
