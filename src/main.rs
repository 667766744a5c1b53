//! `so-lang` command line driver
//!
//! Compiles one `.so` source file to C, Rust, or a Solana program and writes
//! the result next to the working directory.

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use so_lang::{
    CompileOptions, CompileOutput, Compiler, Diagnostics, DomainFramework, EmissionProfile, Error,
    KeygenResolver, Parser, Target,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser, Debug)]
#[command(
    name = "so-lang",
    version,
    about = "So Lang Compiler v2.0 with Solana Support"
)]
struct Cli {
    /// Source file to compile
    input: PathBuf,

    /// Compile to Rust
    #[arg(long)]
    rust: bool,

    /// Force Solana program compilation
    #[arg(long)]
    solana: bool,

    /// Use Anchor framework (implies --solana --rust)
    #[arg(long, conflicts_with = "native_solana")]
    anchor: bool,

    /// Use native Solana (implies --solana --rust)
    #[arg(long)]
    native_solana: bool,

    /// Output file (defaults to output.c / output.rs / lib.rs)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write an Anchor IDL (domain units only)
    #[arg(long, value_name = "FILE")]
    idl: Option<PathBuf>,

    /// Never call solana-keygen; emit without declare_id! unless the source has one
    #[arg(long)]
    no_program_id: bool,

    /// Directory caching generated program keypairs
    #[arg(long, value_name = "DIR", default_value = "keypairs")]
    keypair_dir: PathBuf,

    /// Print the token stream as JSON and exit
    #[arg(long)]
    dump_tokens: bool,

    /// Print the syntax tree as JSON and exit
    #[arg(long)]
    dump_ast: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> CompileOptions {
        let mut options = CompileOptions::default()
            .with_force_domain(self.solana)
            .with_idl(self.idl.is_some());
        if self.rust {
            options = options.with_target(Target::Rust);
        }
        if self.anchor {
            options = options.with_framework(DomainFramework::Anchor);
        } else if self.native_solana {
            options = options.with_framework(DomainFramework::Native);
        }
        options
    }
}

fn main() {
    if let Err(err) = real_main() {
        eprintln!("❌ {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn real_main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("Could not open file: {}", cli.input.display()))?;

    let mut compiler = Compiler::new(cli.options());
    if !cli.no_program_id {
        compiler = compiler.with_resolver(Box::new(KeygenResolver::new(&cli.keypair_dir)));
    }

    println!("So Lang Compiler v{} with Solana Support", so_lang::VERSION);
    println!("Compiling: {}", cli.input.display());

    // Phase 1: Lex
    let tokens = report_front_end(compiler.tokenize(&source))?;
    println!("✓ Lexical analysis complete ({} tokens)", tokens.len());
    let token_count = tokens.len();

    if cli.dump_tokens {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
        return Ok(());
    }

    // Phase 2: Parse
    let mut diagnostics = Diagnostics::new();
    let program = Parser::new(tokens).parse_program(&mut diagnostics);
    report_front_end(diagnostics.check(so_lang::Phase::Parsing))?;

    if cli.dump_ast {
        println!("{}", serde_json::to_string_pretty(&program)?);
        return Ok(());
    }

    // Phase 3: Emit
    let output = compiler.compile_ast(&program, token_count)?;
    if output.classification.is_domain {
        println!("✓ Detected Solana program");
        if let Some(name) = &output.classification.program_name {
            println!("  Program name: {}", name);
        }
    }
    println!("✓ Syntax analysis complete");
    for warning in &output.warnings {
        eprintln!("Warning: {}", warning);
    }

    let output_file = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(output.default_filename()));
    fs::write(&output_file, &output.code)
        .with_context(|| format!("Could not create output file: {}", output_file.display()))?;
    println!("✓ Code generation complete");
    println!("Generated: {}", output_file.display());

    if let (Some(path), Some(idl)) = (&cli.idl, &output.idl) {
        fs::write(path, idl)
            .with_context(|| format!("Could not create output file: {}", path.display()))?;
        println!("Generated IDL: {}", path.display());
    }

    print_next_steps(&cli, &output, &output_file);
    Ok(())
}

/// Prints every front-end diagnostic and turns an abort into a short error
fn report_front_end<T>(result: so_lang::Result<T>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(Error::Aborted { phase, errors }) => {
            for error in &errors {
                eprintln!("{}", error);
            }
            anyhow::bail!("{} failed with {} error(s)", phase, errors.len())
        }
        Err(other) => Err(other.into()),
    }
}

fn print_next_steps(cli: &Cli, output: &CompileOutput, output_file: &Path) {
    match output.profile {
        EmissionProfile::Anchor | EmissionProfile::Native => {
            println!("\nSolana Program Details:");
            if let Some(id) = &output.program_id {
                println!("  Program ID: {}", id);
            }
            println!("  Framework: {}", output.profile);
            if !cli.no_program_id && output.classification.program_id.is_none() {
                let name = output
                    .classification
                    .program_name
                    .as_deref()
                    .unwrap_or(so_lang::compiler::DEFAULT_PROGRAM_NAME);
                println!(
                    "  Keypair: {}",
                    KeygenResolver::new(&cli.keypair_dir)
                        .keypair_path(name)
                        .display()
                );
            }

            println!("\nNext steps:");
            if output.profile == EmissionProfile::Anchor {
                println!("  1. Create Anchor project: anchor init my_project");
                println!("  2. Replace programs/my_project/src/lib.rs with generated code");
                println!("  3. Build: anchor build");
                println!("  4. Deploy: anchor deploy");
            } else {
                println!("  1. Create Cargo project with solana-program dependency");
                println!("  2. Build: cargo build-bpf");
                println!("  3. Deploy: solana program deploy target/deploy/program.so");
            }
        }
        EmissionProfile::Rust => {
            println!("To build: rustc {} -o program", output_file.display());
        }
        EmissionProfile::C => {
            println!("To build: gcc {} -o program", output_file.display());
        }
    }
}
