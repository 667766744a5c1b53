//! # So Lang Compiler - source to C, Rust, Anchor or native Solana
//!
//! Drives the whole pipeline for one compilation unit.
//!
//! ## Architecture
//!
//! ```text
//! Source → Tokens → AST → Classify → Profile → (Program id) → Emitted source (+ IDL)
//! ```
//!
//! Lexing and parsing record every diagnostic they find; the driver stops
//! after the first phase that reported anything. Identity problems are only
//! warnings: the unit is emitted without a `declare_id!` line.
//!
//! ## Usage
//!
//! ```ignore
//! use so_lang::compiler::{Compiler, CompileOptions, Target};
//!
//! let source = "let x = 5 + 3\nprint(x)";
//! let compiler = Compiler::new(CompileOptions::default().with_target(Target::Rust));
//! let output = compiler.compile(source)?;
//! std::fs::write(output.default_filename(), output.code)?;
//! ```

pub mod anchor_idl;
pub mod codegen;
pub mod identity;
pub mod profile;

pub use anchor_idl::{AnchorIdl, IdlGenerator};
pub use codegen::{CodeGenerator, GenContext, MAX_NATIVE_INSTRUCTIONS};
pub use identity::{validate_program_id, IdentityResolver, KeygenResolver};
pub use profile::{DomainFramework, EmissionProfile, Target};

use crate::error::{Diagnostics, Error, Phase, Result};
use crate::lexer::{Scanner, Token};
use crate::parser::{classify, Parser, Program, UnitClassification};

/// Program name used for identity resolution when the unit declares none
pub const DEFAULT_PROGRAM_NAME: &str = "program";

/// Compilation options
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Dialect for non-domain units
    pub target: Target,
    /// Explicit domain framework (overrides detection)
    pub framework: Option<DomainFramework>,
    /// Treat the unit as a domain program even without domain declarations
    pub force_domain: bool,
    /// Maximum number of tokens accepted from the scanner
    pub max_tokens: Option<usize>,
    /// Recognize the domain keyword layer while scanning
    pub domain_keywords: bool,
    /// Produce an Anchor IDL alongside domain output
    pub emit_idl: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            target: Target::C,
            framework: None,
            force_domain: false,
            max_tokens: None,
            domain_keywords: true,
            emit_idl: false,
        }
    }
}

impl CompileOptions {
    /// Sets the dialect for non-domain units
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    /// Forces a domain framework
    pub fn with_framework(mut self, framework: DomainFramework) -> Self {
        self.framework = Some(framework);
        self
    }

    /// Treats the unit as a domain program
    pub fn with_force_domain(mut self, force_domain: bool) -> Self {
        self.force_domain = force_domain;
        self
    }

    /// Caps the token stream
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Enables or disables the domain keyword layer
    pub fn with_domain_keywords(mut self, enabled: bool) -> Self {
        self.domain_keywords = enabled;
        self
    }

    /// Requests an Anchor IDL
    pub fn with_idl(mut self, emit_idl: bool) -> Self {
        self.emit_idl = emit_idl;
        self
    }
}

/// Compilation result with metadata
#[derive(Debug)]
pub struct CompileOutput {
    /// Emitted source text
    pub code: String,
    /// Profile the code was emitted for
    pub profile: EmissionProfile,
    /// Result of the detection pass
    pub classification: UnitClassification,
    /// Program identifier written to `declare_id!`, if any
    pub program_id: Option<String>,
    /// Non-fatal problems (identity resolution, invalid ids)
    pub warnings: Vec<Error>,
    /// Anchor IDL JSON, when requested for a domain unit
    pub idl: Option<String>,
    /// Number of tokens scanned (including the end marker)
    pub token_count: usize,
}

impl CompileOutput {
    /// Output file name for the resolved profile
    pub fn default_filename(&self) -> &'static str {
        self.profile.default_filename()
    }
}

/// So Lang compiler
pub struct Compiler {
    options: CompileOptions,
    resolver: Option<Box<dyn IdentityResolver>>,
}

impl Compiler {
    /// Create a new compiler with options and no identity resolver
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            resolver: None,
        }
    }

    /// Uses `resolver` for domain units that declare no program id
    pub fn with_resolver(mut self, resolver: Box<dyn IdentityResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Options in effect
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Scans `source`, failing with [`Error::Aborted`] on lexical errors
    pub fn tokenize(&self, source: &str) -> Result<Vec<Token>> {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new(source)
            .with_domain_keywords(self.options.domain_keywords)
            .with_max_tokens(self.options.max_tokens)
            .tokenize(&mut diagnostics);
        diagnostics.check(Phase::Lexing)?;
        Ok(tokens)
    }

    /// Scans and parses `source`
    pub fn parse(&self, source: &str) -> Result<Program> {
        let tokens = self.tokenize(source)?;
        Parser::new(tokens).parse()
    }

    /// Compile source text to the resolved profile's source
    pub fn compile(&self, source: &str) -> Result<CompileOutput> {
        // Phase 1: Lex
        let tokens = self.tokenize(source)?;
        let token_count = tokens.len();
        tracing::debug!(tokens = token_count, "lexical analysis complete");

        // Phase 2: Parse
        let mut diagnostics = Diagnostics::new();
        let program = Parser::new(tokens).parse_program(&mut diagnostics);
        diagnostics.check(Phase::Parsing)?;

        self.compile_ast(&program, token_count)
    }

    /// Compile an already-parsed program
    pub fn compile_ast(&self, program: &Program, token_count: usize) -> Result<CompileOutput> {
        // Phase 3: Classify and pick a profile
        let classification = classify(program);
        let profile = EmissionProfile::resolve(
            self.options.target,
            self.options.framework,
            self.options.force_domain,
            &classification,
        );
        tracing::debug!(%profile, is_domain = classification.is_domain, "resolved profile");

        if profile == EmissionProfile::Native {
            let instructions = codegen::DomainLayout::collect(program).instructions.len();
            if instructions > MAX_NATIVE_INSTRUCTIONS {
                return Err(Error::compiler(format!(
                    "native dispatch supports at most {} instructions, found {}",
                    MAX_NATIVE_INSTRUCTIONS, instructions
                )));
            }
        }

        // Phase 4: Program identity (domain profiles only)
        let mut warnings = Vec::new();
        let program_id = if profile.is_domain() {
            self.program_id(&classification, &mut warnings)
        } else {
            None
        };

        // Phase 5: Emit
        let ctx =
            GenContext::new(profile, classification.clone()).with_program_id(program_id.clone());
        let code = CodeGenerator::new(ctx).generate(program);

        // Phase 6: IDL
        let idl = if self.options.emit_idl && profile.is_domain() {
            let generator =
                IdlGenerator::new(program, &classification).with_address(program_id.clone());
            Some(generator.generate_json()?)
        } else {
            None
        };

        Ok(CompileOutput {
            code,
            profile,
            classification,
            program_id,
            warnings,
            idl,
            token_count,
        })
    }

    /// Declared id if present, otherwise whatever the resolver produces.
    ///
    /// Failures are recorded as warnings and yield no id.
    fn program_id(
        &self,
        classification: &UnitClassification,
        warnings: &mut Vec<Error>,
    ) -> Option<String> {
        let id = match (&classification.program_id, &self.resolver) {
            (Some(id), _) => id.clone(),
            (None, Some(resolver)) => {
                let name = classification
                    .program_name
                    .as_deref()
                    .unwrap_or(DEFAULT_PROGRAM_NAME);
                match resolver.resolve_identity(name) {
                    Ok(id) => id,
                    Err(err) => {
                        tracing::warn!("program id not resolved: {}", err);
                        warnings.push(err);
                        return None;
                    }
                }
            }
            (None, None) => return None,
        };

        if let Err(err) = validate_program_id(&id) {
            tracing::warn!("{}", err);
            warnings.push(err);
        }
        Some(id)
    }
}
