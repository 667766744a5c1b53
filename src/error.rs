//! Error types for the So Lang compiler

use std::fmt;
use thiserror::Error;

/// Compiler errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Front-end diagnostics
    /// Lexical error encountered while scanning
    ///
    /// **Triggered by:** a character outside the language alphabet, or a token budget overflow
    /// **Example:** `let x = 5 $ 3` (`$` is not a So Lang character)
    #[error("Error at line {line}, column {col}: {message}")]
    LexError {
        /// Line number where error occurred
        line: usize,
        /// Column number where error occurred
        col: usize,
        /// Error description
        message: String,
    },

    /// Syntax error encountered during parsing
    ///
    /// **Triggered by:** a missing expected token (brace, paren, name)
    /// **Example:** `if x < 3 print(x) }` (missing `{`)
    #[error("Error at line {line}, column {col}: {message}")]
    SyntaxError {
        /// Line number where error occurred
        line: usize,
        /// Column number where error occurred
        col: usize,
        /// Error description
        message: String,
    },

    /// A phase finished with diagnostics and the run stopped before the next phase
    #[error("{phase} failed with {} error(s)", .errors.len())]
    Aborted {
        /// Phase that produced the diagnostics
        phase: Phase,
        /// Every diagnostic recorded during that phase
        errors: Vec<Error>,
    },

    // Program identity errors
    /// The external key generation tool could not be started
    #[error("Tool not found: {tool} (is the Solana CLI installed?)")]
    ToolNotFound {
        /// Tool binary name
        tool: String,
    },

    /// The identity resolver ran but could not produce an identifier
    #[error("Identity resolution failed for {name}: {reason}")]
    IdentityError {
        /// Program name being resolved
        name: String,
        /// Failure reason
        reason: String,
    },

    /// An identifier does not look like a base58 public key
    #[error("Invalid program id {id}: {reason}")]
    InvalidProgramId {
        /// Offending identifier
        id: String,
        /// What is wrong with it
        reason: String,
    },

    // Environment errors
    /// File system error
    #[error("I/O error on {path}: {message}")]
    Io {
        /// Path involved in the failing operation
        path: String,
        /// Underlying error text
        message: String,
    },

    /// Compiler error
    #[error("Compiler error: {0}")]
    CompilerError(String),
}

/// Pipeline phase, used when reporting an abort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Tokenization
    Lexing,
    /// Parsing
    Parsing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Lexing => write!(f, "Lexical analysis"),
            Phase::Parsing => write!(f, "Syntax analysis"),
        }
    }
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Fatal error that stops the run
    Fatal,
    /// Recoverable error that may be retried
    Recoverable,
    /// Warning that doesn't prevent code generation
    Warning,
}

impl Error {
    /// Create a compiler error with a message
    pub fn compiler(msg: impl Into<String>) -> Self {
        Error::CompilerError(msg.into())
    }

    /// Create an I/O error tied to a path
    pub fn io(path: impl Into<String>, err: &std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Classify error severity
    pub fn classify(&self) -> ErrorSeverity {
        match self {
            Error::LexError { .. } => ErrorSeverity::Fatal,
            Error::SyntaxError { .. } => ErrorSeverity::Fatal,
            Error::Aborted { .. } => ErrorSeverity::Fatal,
            Error::CompilerError(_) => ErrorSeverity::Fatal,

            Error::Io { .. } => ErrorSeverity::Recoverable,

            Error::ToolNotFound { .. } => ErrorSeverity::Warning,
            Error::IdentityError { .. } => ErrorSeverity::Warning,
            Error::InvalidProgramId { .. } => ErrorSeverity::Warning,
        }
    }

    /// Source position of a front-end diagnostic, if it has one
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            Error::LexError { line, col, .. } | Error::SyntaxError { line, col, .. } => {
                Some((*line, *col))
            }
            _ => None,
        }
    }
}

/// Result type for So Lang operations
pub type Result<T> = std::result::Result<T, Error>;

/// Accumulates diagnostics across a phase instead of stopping at the first one.
///
/// Replaces a process-wide "has error" flag: each phase records into the
/// accumulator it was handed and the driver inspects it between phases.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    errors: Vec<Error>,
}

impl Diagnostics {
    /// Creates an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a lexical error
    pub fn lex_error(&mut self, line: usize, col: usize, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(line, col, %message, "lexical error");
        self.errors.push(Error::LexError { line, col, message });
    }

    /// Records a syntax error
    pub fn syntax_error(&mut self, line: usize, col: usize, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(line, col, %message, "syntax error");
        self.errors.push(Error::SyntaxError { line, col, message });
    }

    /// True once any error was recorded (never cleared)
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Number of recorded errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// True when nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Recorded errors in source order
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Moves every error recorded in `other` into this accumulator
    pub fn append(&mut self, mut other: Diagnostics) {
        self.errors.append(&mut other.errors);
    }

    /// Fails with [`Error::Aborted`] for `phase` if anything was recorded
    pub fn check(&self, phase: Phase) -> Result<()> {
        if self.has_errors() {
            Err(Error::Aborted {
                phase,
                errors: self.errors.clone(),
            })
        } else {
            Ok(())
        }
    }
}
