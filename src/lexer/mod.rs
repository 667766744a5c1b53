//! Lexical analysis for So Lang
//!
//! Converts source text into a stream of tokens. Newlines are significant
//! (they separate statements); `//` comments and other whitespace are dropped.

mod scanner;
mod token;

pub use scanner::Scanner;
pub use token::{Token, TokenKind};
