//! Anchor IDL Generation from So Lang programs
//!
//! Builds an Anchor-compatible IDL from the parsed program so TypeScript and
//! JavaScript clients can call the generated Anchor program.
//!
//! ## IDL Format (Legacy - pre Anchor 0.30)
//! ```json
//! {
//!   "version": "0.1.0",
//!   "name": "program_name",
//!   "instructions": [...],
//!   "accounts": [...],
//!   "events": [...],
//!   "errors": [...],
//!   "metadata": { "address": "..." }
//! }
//! ```
//!
//! ## Usage
//! ```ignore
//! use so_lang::compiler::anchor_idl::IdlGenerator;
//! use so_lang::parser::classify;
//!
//! let classification = classify(&program);
//! let idl_json = IdlGenerator::new(&program, &classification).generate_json()?;
//! std::fs::write("target/idl/program.json", idl_json)?;
//! ```

use super::codegen::DomainLayout;
use crate::error::{Error, Result};
use crate::parser::{AccountDecl, InstructionDecl, Program, UnitClassification};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// First custom error code Anchor assigns
pub const CUSTOM_ERROR_BASE: u32 = 6000;

/// Anchor IDL structure (Legacy format)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorIdl {
    /// IDL format version (e.g., "0.1.0")
    pub version: String,
    /// Program name
    pub name: String,
    /// List of program instructions/entry points
    pub instructions: Vec<IdlInstruction>,
    /// Account type definitions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<IdlAccountDef>,
    /// Event definitions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<IdlEvent>,
    /// Error code definitions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<IdlError>,
    /// Program metadata (e.g., deployed address)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<IdlMetadata>,
}

/// Instruction definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlInstruction {
    /// Instruction name (camelCase)
    pub name: String,
    /// Required accounts for this instruction
    pub accounts: Vec<IdlAccountMeta>,
    /// Instruction arguments/parameters
    pub args: Vec<IdlArg>,
    /// Instruction discriminator bytes (first 8 bytes of instruction data)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Vec<u8>>,
}

/// Account metadata for instruction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdlAccountMeta {
    /// Account name
    pub name: String,
    /// Whether the account is mutable (writable)
    pub is_mut: bool,
    /// Whether the account must sign the transaction
    pub is_signer: bool,
}

/// Argument definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlArg {
    /// Argument name
    pub name: String,
    /// Argument type
    #[serde(rename = "type")]
    pub ty: IdlType,
}

/// Account definition (data layout)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlAccountDef {
    /// Account type name
    pub name: String,
    /// Account type structure
    #[serde(rename = "type")]
    pub ty: IdlTypeDefTy,
}

/// Type definition inner structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum IdlTypeDefTy {
    /// Struct type with named fields
    #[serde(rename = "struct")]
    Struct {
        /// Struct field definitions
        fields: Vec<IdlField>,
    },
}

/// Field definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlField {
    /// Field name
    pub name: String,
    /// Field type
    #[serde(rename = "type")]
    pub ty: IdlType,
}

/// Event definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlEvent {
    /// Event name
    pub name: String,
    /// Event fields
    pub fields: Vec<IdlEventField>,
}

/// Event field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlEventField {
    /// Field name
    pub name: String,
    /// Field type
    #[serde(rename = "type")]
    pub ty: IdlType,
    /// Whether the field is indexed
    pub index: bool,
}

/// Supported IDL types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdlType {
    /// Primitive type: "u8", "u32", "u64", "bool", "string", "publicKey"
    Primitive(String),
    /// Custom type reference (user-defined)
    Defined {
        /// Type name
        defined: String,
    },
}

/// Error definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlError {
    /// Error code (6000+ for custom errors)
    pub code: u32,
    /// Error name (PascalCase)
    pub name: String,
    /// Optional error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

/// Metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlMetadata {
    /// Deployed program address (base58 encoded public key)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// IDL Generator - walks a parsed program and builds its Anchor IDL
pub struct IdlGenerator<'a> {
    program: &'a Program,
    classification: &'a UnitClassification,
    name: Option<String>,
    version: String,
    address: Option<String>,
}

impl<'a> IdlGenerator<'a> {
    /// Create a new IDL generator for a parsed program
    pub fn new(program: &'a Program, classification: &'a UnitClassification) -> Self {
        Self {
            program,
            classification,
            name: None,
            version: "0.1.0".to_string(),
            address: classification.program_id.clone(),
        }
    }

    /// Set program name (defaults to the declared program name).
    /// Returns self for method chaining.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Set IDL version string (default: "0.1.0").
    /// Returns self for method chaining.
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Set the deployed program address (defaults to the declared id).
    /// Returns self for method chaining.
    pub fn with_address(mut self, address: Option<String>) -> Self {
        if address.is_some() {
            self.address = address;
        }
        self
    }

    /// Generate the IDL structure
    pub fn generate(&self) -> AnchorIdl {
        let layout = DomainLayout::collect(self.program);

        let instructions = layout
            .instructions
            .iter()
            .map(|instruction| self.instruction(instruction, &layout))
            .collect();

        let accounts = layout
            .states
            .iter()
            .map(|state| IdlAccountDef {
                name: state.name.clone(),
                ty: IdlTypeDefTy::Struct {
                    fields: state
                        .fields
                        .iter()
                        .map(|field| IdlField {
                            name: camel_case(&field.name),
                            ty: idl_type(&field.ty),
                        })
                        .collect(),
                },
            })
            .collect();

        let events = layout
            .events
            .iter()
            .map(|event| IdlEvent {
                name: event.clone(),
                fields: vec![IdlEventField {
                    name: "value".to_string(),
                    ty: IdlType::Primitive("u64".to_string()),
                    index: false,
                }],
            })
            .collect();

        let errors = if layout.has_require {
            vec![IdlError {
                code: CUSTOM_ERROR_BASE,
                name: "CustomError".to_string(),
                msg: Some(
                    layout
                        .require_message
                        .clone()
                        .unwrap_or_else(|| "Custom error message".to_string()),
                ),
            }]
        } else {
            Vec::new()
        };

        AnchorIdl {
            version: self.version.clone(),
            name: self
                .name
                .clone()
                .or_else(|| self.classification.program_name.clone())
                .unwrap_or_else(|| "program".to_string()),
            instructions,
            accounts,
            events,
            errors,
            metadata: self.address.clone().map(|address| IdlMetadata {
                address: Some(address),
            }),
        }
    }

    /// Generate IDL as pretty-printed JSON string.
    /// Convenience method that calls generate() and serializes the result.
    pub fn generate_json(&self) -> Result<String> {
        let idl = self.generate();
        serde_json::to_string_pretty(&idl)
            .map_err(|e| Error::compiler(format!("JSON serialization failed: {}", e)))
    }

    fn instruction<'b>(
        &self,
        instruction: &'b InstructionDecl,
        layout: &DomainLayout<'b>,
    ) -> IdlInstruction {
        IdlInstruction {
            name: camel_case(&instruction.name),
            accounts: layout
                .accounts_for(instruction)
                .into_iter()
                .map(account_meta)
                .collect(),
            args: Vec::new(),
            discriminator: Some(instruction_discriminator(&instruction.name).to_vec()),
        }
    }
}

fn account_meta(account: &AccountDecl) -> IdlAccountMeta {
    IdlAccountMeta {
        name: camel_case(&account.name),
        is_mut: account.constraints.writable || account.constraints.init,
        is_signer: account.constraints.signer,
    }
}

/// Anchor's instruction discriminator: `sha256("global:<name>")[..8]`
pub fn instruction_discriminator(name: &str) -> [u8; 8] {
    let hash = Sha256::digest(format!("global:{}", name).as_bytes());
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&hash[..8]);
    discriminator
}

fn idl_type(ty: &str) -> IdlType {
    let primitive = match ty {
        "pubkey" | "Pubkey" => "publicKey",
        "u64" => "u64",
        "u32" => "u32",
        "u8" => "u8",
        "bool" => "bool",
        "string" | "String" => "string",
        other if other.starts_with(char::is_uppercase) => {
            return IdlType::Defined {
                defined: other.to_string(),
            }
        }
        _ => "u64",
    };
    IdlType::Primitive(primitive.to_string())
}

/// Convert to camelCase
fn camel_case(s: &str) -> String {
    let mut result = String::new();
    let mut first_word = true;

    for word in s.split([' ', '_', '-']) {
        if word.is_empty() {
            continue;
        }

        for (i, c) in word.chars().enumerate() {
            if i == 0 && !first_word {
                result.push(c.to_ascii_uppercase());
            } else if i == 0 {
                result.push(c.to_ascii_lowercase());
            } else {
                result.push(c);
            }
        }
        first_word = false;
    }

    result
}

/// Generate Anchor IDL JSON for a parsed program.
/// Convenience function that classifies the program and returns pretty-printed JSON.
pub fn generate_idl(program: &Program, name: Option<&str>) -> Result<String> {
    let classification = crate::parser::classify(program);
    let mut generator = IdlGenerator::new(program, &classification);
    if let Some(name) = name {
        generator = generator.with_name(name);
    }
    generator.generate_json()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Scanner;
    use crate::parser::{classify, Parser};

    fn parse(source: &str) -> Program {
        let tokens = Scanner::new(source).scan_tokens().unwrap();
        Parser::new(tokens).parse().unwrap()
    }

    const COUNTER: &str = r#"program counter("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS") {
    state Counter { count: u64, authority: pubkey }
    account payer(signer, writable)
    instruction initialize() {
        account counter(init) : Counter
    }
    instruction increment_count() {
        account counter(writable) : Counter
        require(count < 100, "limit reached")
        emit Incremented(count)
    }
}"#;

    #[test]
    fn test_basic_idl_generation() {
        let program = parse(COUNTER);
        let classification = classify(&program);
        let idl = IdlGenerator::new(&program, &classification).generate();

        assert_eq!(idl.name, "counter");
        assert_eq!(idl.version, "0.1.0");
        assert_eq!(idl.instructions.len(), 2);
        assert_eq!(idl.instructions[1].name, "incrementCount");

        let accounts = &idl.instructions[0].accounts;
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].name, "payer");
        assert!(accounts[0].is_signer && accounts[0].is_mut);
        assert!(accounts[1].is_mut && !accounts[1].is_signer);

        assert_eq!(idl.accounts.len(), 1);
        assert_eq!(idl.events[0].name, "Incremented");
        assert_eq!(idl.errors[0].code, 6000);
        assert_eq!(idl.errors[0].msg.as_deref(), Some("limit reached"));
        assert_eq!(
            idl.metadata.and_then(|m| m.address).as_deref(),
            Some("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS")
        );
    }

    #[test]
    fn test_instruction_discriminator() {
        // Well-known discriminator of Anchor's `initialize`
        assert_eq!(
            instruction_discriminator("initialize"),
            [175, 175, 109, 31, 13, 152, 155, 237]
        );
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("init_demo"), "initDemo");
        assert_eq!(camel_case("complete_task"), "completeTask");
        assert_eq!(camel_case("hello-world"), "helloWorld");
        assert_eq!(camel_case("alreadyCamel"), "alreadyCamel");
    }

    #[test]
    fn test_idl_types() {
        assert_eq!(idl_type("pubkey"), IdlType::Primitive("publicKey".to_string()));
        assert_eq!(idl_type("string"), IdlType::Primitive("string".to_string()));
        assert_eq!(
            idl_type("Settings"),
            IdlType::Defined {
                defined: "Settings".to_string()
            }
        );
    }

    #[test]
    fn test_idl_json_serialization() {
        let program = parse(COUNTER);
        let json = generate_idl(&program, Some("renamed")).unwrap();

        assert!(json.contains("\"name\": \"renamed\""));
        assert!(json.contains("\"initialize\""));
        assert!(json.contains("\"isMut\": true"));
        assert!(json.contains("\"isSigner\": false"));
        assert!(json.contains("\"kind\": \"struct\""));
        assert!(json.contains("\"publicKey\""));
    }

    #[test]
    fn test_version_and_address() {
        let program = parse(COUNTER);
        let classification = classify(&program);
        let idl = IdlGenerator::new(&program, &classification)
            .with_version("1.2.0")
            .with_address(Some("Addr".to_string()))
            .generate();

        assert_eq!(idl.version, "1.2.0");
        assert_eq!(idl.metadata.and_then(|m| m.address).as_deref(), Some("Addr"));
    }
}
