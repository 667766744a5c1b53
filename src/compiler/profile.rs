//! Emission profile selection

use crate::parser::UnitClassification;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Target dialect plus domain framework the generator writes for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionProfile {
    /// Plain C with a `main` entry point
    C,
    /// Plain Rust with a `main` entry point
    Rust,
    /// Anchor framework program
    Anchor,
    /// Native Solana program with a hand-written entrypoint
    Native,
}

/// Dialect used when the unit is not a domain program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// C output (default)
    #[default]
    C,
    /// Rust output
    Rust,
}

/// Framework used for domain programs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainFramework {
    /// Anchor (`#[program]` module, `#[derive(Accounts)]` contexts)
    Anchor,
    /// Native `solana_program` entrypoint
    Native,
}

impl EmissionProfile {
    /// Picks the profile for a unit.
    ///
    /// An explicit framework always wins. Otherwise a forced or detected
    /// domain unit is emitted as a native program, and anything else uses
    /// the plain target.
    pub fn resolve(
        target: Target,
        framework: Option<DomainFramework>,
        force_domain: bool,
        classification: &UnitClassification,
    ) -> Self {
        match framework {
            Some(DomainFramework::Anchor) => EmissionProfile::Anchor,
            Some(DomainFramework::Native) => EmissionProfile::Native,
            None if force_domain || classification.is_domain => EmissionProfile::Native,
            None => match target {
                Target::C => EmissionProfile::C,
                Target::Rust => EmissionProfile::Rust,
            },
        }
    }

    /// True for the profiles that lower domain declarations
    pub fn is_domain(&self) -> bool {
        matches!(self, EmissionProfile::Anchor | EmissionProfile::Native)
    }

    /// Output file name used when none is given
    pub fn default_filename(&self) -> &'static str {
        match self {
            EmissionProfile::C => "output.c",
            EmissionProfile::Rust => "output.rs",
            EmissionProfile::Anchor => "lib.rs",
            EmissionProfile::Native => "program.rs",
        }
    }
}

impl fmt::Display for EmissionProfile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EmissionProfile::C => write!(f, "C"),
            EmissionProfile::Rust => write!(f, "Rust"),
            EmissionProfile::Anchor => write!(f, "Anchor"),
            EmissionProfile::Native => write!(f, "Native Solana"),
        }
    }
}
