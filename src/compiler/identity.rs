//! Program identity resolution
//!
//! A domain program needs a base58 public identifier for `declare_id!`. When
//! the source does not declare one, the compiler asks an [`IdentityResolver`].
//! The default resolver shells out to `solana-keygen`, caching one keypair
//! file per program name.

use crate::error::{Error, Result};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Shortest base58 public key text accepted
pub const MIN_PROGRAM_ID_LEN: usize = 32;

/// Longest base58 public key text accepted
pub const MAX_PROGRAM_ID_LEN: usize = 44;

/// Produces the public identifier for a named program
pub trait IdentityResolver {
    /// Returns the base58 identifier for `program_name`
    fn resolve_identity(&self, program_name: &str) -> Result<String>;
}

/// Resolver backed by the `solana-keygen` command line tool
#[derive(Debug, Clone)]
pub struct KeygenResolver {
    /// Directory holding `NAME-keypair.json` files
    cache_dir: PathBuf,
    /// Key generation binary
    keygen: String,
}

impl Default for KeygenResolver {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("keypairs"),
            keygen: "solana-keygen".to_string(),
        }
    }
}

impl KeygenResolver {
    /// Creates a resolver caching keypairs under `cache_dir`
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ..Self::default()
        }
    }

    /// Uses a different key generation binary
    pub fn with_keygen(mut self, keygen: impl Into<String>) -> Self {
        self.keygen = keygen.into();
        self
    }

    /// Path of the cached keypair for `program_name`
    pub fn keypair_path(&self, program_name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}-keypair.json", program_name))
    }

    fn run(&self, args: &[&str], program_name: &str) -> Result<String> {
        let output = Command::new(&self.keygen)
            .args(args)
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => Error::ToolNotFound {
                    tool: self.keygen.clone(),
                },
                _ => Error::IdentityError {
                    name: program_name.to_string(),
                    reason: e.to_string(),
                },
            })?;

        if !output.status.success() {
            return Err(Error::IdentityError {
                name: program_name.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn ensure_keypair(&self, path: &Path, program_name: &str) -> Result<()> {
        if path.exists() {
            tracing::debug!(path = %path.display(), "reusing cached keypair");
            return Ok(());
        }

        std::fs::create_dir_all(&self.cache_dir)
            .map_err(|e| Error::io(self.cache_dir.display().to_string(), &e))?;

        let outfile = path.to_string_lossy();
        self.run(
            &["new", "--no-passphrase", "--outfile", &outfile],
            program_name,
        )?;
        tracing::info!(path = %path.display(), "generated program keypair");
        Ok(())
    }
}

impl IdentityResolver for KeygenResolver {
    fn resolve_identity(&self, program_name: &str) -> Result<String> {
        let path = self.keypair_path(program_name);
        self.ensure_keypair(&path, program_name)?;

        let id = self.run(&["pubkey", &path.to_string_lossy()], program_name)?;
        if id.is_empty() {
            return Err(Error::IdentityError {
                name: program_name.to_string(),
                reason: "keygen printed no public key".to_string(),
            });
        }
        Ok(id)
    }
}

/// Checks that `id` looks like a base58 public key (length and alphabet)
pub fn validate_program_id(id: &str) -> Result<()> {
    if id.len() < MIN_PROGRAM_ID_LEN || id.len() > MAX_PROGRAM_ID_LEN {
        return Err(Error::InvalidProgramId {
            id: id.to_string(),
            reason: format!(
                "expected {}-{} characters, got {}",
                MIN_PROGRAM_ID_LEN,
                MAX_PROGRAM_ID_LEN,
                id.len()
            ),
        });
    }

    bs58::decode(id)
        .into_vec()
        .map_err(|e| Error::InvalidProgramId {
            id: id.to_string(),
            reason: e.to_string(),
        })?;

    Ok(())
}
