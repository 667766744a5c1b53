//! Native Solana lowering
//!
//! Everything runs inside one `process_instruction` entrypoint. Instructions
//! become arms of a single `match` on the first byte of the instruction data,
//! numbered in declaration order. The driver rejects units with more than
//! [`MAX_NATIVE_INSTRUCTIONS`](super::MAX_NATIVE_INSTRUCTIONS) instructions.

use super::anchor::account_ref;
use super::{escape_string, render_expr, render_opt, CodeGenerator, DomainLayout};
use crate::parser::{AccountDecl, InstructionDecl, Program, Statement};

impl CodeGenerator {
    pub(super) fn emit_native_unit(&mut self, program: &Program) {
        let layout = DomainLayout::collect(program);

        self.open("use solana_program::{");
        self.line("account_info::{next_account_info, AccountInfo},");
        self.line("entrypoint,");
        self.line("entrypoint::ProgramResult,");
        self.line("msg,");
        self.line("program::{invoke, invoke_signed},");
        self.line("program_error::ProgramError,");
        self.line("pubkey::Pubkey,");
        self.line("system_instruction,");
        self.close("};");
        self.blank();

        self.line("entrypoint!(process_instruction);");
        self.blank();

        if let Some(id) = self.ctx.program_id.clone() {
            self.line(format!("solana_program::declare_id!(\"{}\");", id));
            self.blank();
        }

        for state in &layout.states {
            self.state_struct(state);
            self.blank();
        }

        for function in &layout.functions {
            self.rust_statement(function);
            self.blank();
        }

        self.line("pub fn process_instruction(");
        self.indent += 1;
        self.line("program_id: &Pubkey,");
        self.line("accounts: &[AccountInfo],");
        self.line("instruction_data: &[u8],");
        self.close(") -> ProgramResult {");
        self.indent += 1;

        for stmt in &layout.loose {
            self.rust_statement(stmt);
        }

        if !layout.instructions.is_empty() {
            self.open("let (&tag, _rest) = instruction_data");
            self.line(".split_first()");
            self.line(".ok_or(ProgramError::InvalidInstructionData)?;");
            self.indent -= 1;
            self.blank();

            self.open("match tag {");
            for (index, instruction) in layout.instructions.iter().enumerate() {
                self.ctx.instruction_index = index;
                self.native_arm(instruction, &layout);
            }
            self.line("_ => return Err(ProgramError::InvalidInstructionData),");
            self.close("}");
        }

        self.line("Ok(())");
        self.close("}");
    }

    fn native_arm<'a>(&mut self, instruction: &'a InstructionDecl, layout: &DomainLayout<'a>) {
        self.open(format!("{} => {{", self.ctx.instruction_index));
        self.line(format!("msg!(\"Executing {}\");", instruction.name));

        let accounts = layout.accounts_for(instruction);
        if !accounts.is_empty() {
            self.line("let accounts_iter = &mut accounts.iter();");
            for account in accounts {
                self.account_binding(account);
            }
        }

        self.block(&instruction.body);
        self.close("}");
    }

    fn account_binding(&mut self, account: &AccountDecl) {
        self.line(format!(
            "let {} = next_account_info(accounts_iter)?;",
            account.name
        ));
        if account.constraints.signer {
            self.open(format!("if !{}.is_signer {{", account.name));
            self.line("return Err(ProgramError::MissingRequiredSignature);");
            self.close("}");
        }
        if account.constraints.writable {
            self.open(format!("if !{}.is_writable {{", account.name));
            self.line("return Err(ProgramError::InvalidAccountData);");
            self.close("}");
        }
    }

    pub(super) fn native_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Transfer { from, to, amount } => {
                let from = account_ref(from.as_ref(), "from");
                let to = account_ref(to.as_ref(), "to");
                let amount = amount
                    .as_ref()
                    .map(render_expr)
                    .unwrap_or_else(|| "amount".to_string());

                self.line(format!(
                    "let instruction = system_instruction::transfer({}.key, {}.key, {});",
                    from, to, amount
                ));
                self.line(format!(
                    "invoke(&instruction, &[{}.clone(), {}.clone()])?;",
                    from, to
                ));
            }

            Statement::Require { condition, message } => {
                self.open(format!("if !({}) {{", render_opt(condition.as_ref())));
                if let Some(message) = message {
                    self.line(format!("msg!(\"{}\");", escape_string(message)));
                }
                self.line("return Err(ProgramError::InvalidArgument);");
                self.close("}");
            }

            Statement::Emit { event, value } => match value {
                Some(expr) => self.line(format!(
                    "msg!(\"{}: {{}}\", {});",
                    event,
                    render_expr(expr)
                )),
                None => self.line(format!("msg!(\"{}\");", event)),
            },

            // Bound at the top of each instruction arm
            Statement::AccountDecl(_) | Statement::StateDecl(_) => {}

            other => self.skip_unsupported(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::GenContext;
    use super::*;
    use crate::compiler::EmissionProfile;
    use crate::lexer::Scanner;
    use crate::parser::{classify, Parser};

    fn emit(source: &str, program_id: Option<&str>) -> String {
        let tokens = Scanner::new(source).scan_tokens().unwrap();
        let program = Parser::new(tokens).parse().unwrap();
        let ctx = GenContext::new(EmissionProfile::Native, classify(&program))
            .with_program_id(program_id.map(str::to_string));
        CodeGenerator::new(ctx).generate(&program)
    }

    #[test]
    fn test_native_empty_program_shell() {
        let code = emit("program Foo {}", None);
        assert!(code.contains("entrypoint!(process_instruction);\n"));
        assert!(code.contains(
            "pub fn process_instruction(\n    program_id: &Pubkey,\n    accounts: &[AccountInfo],\n    instruction_data: &[u8],\n) -> ProgramResult {\n    Ok(())\n}\n"
        ));
        assert!(!code.contains("match tag"));
    }

    #[test]
    fn test_native_dispatch_numbers_instructions() {
        let source = "program Counter {\n instruction init() {}\n instruction bump_it() {}\n}";
        let code = emit(source, Some("Abc"));
        assert_eq!(code.matches("declare_id!(\"Abc\");").count(), 1);
        assert_eq!(code.matches("match tag {").count(), 1);
        assert!(code.contains("        0 => {\n            msg!(\"Executing init\");\n        }\n"));
        assert!(code.contains("        1 => {\n            msg!(\"Executing bump_it\");\n        }\n"));
        assert!(code.contains("_ => return Err(ProgramError::InvalidInstructionData),"));
    }

    #[test]
    fn test_native_account_checks() {
        let source = "program P {\n account payer(signer)\n instruction pay() {\n  account vault(writable)\n }\n}";
        let code = emit(source, None);
        let payer = code.find("let payer = next_account_info(accounts_iter)?;").unwrap();
        let vault = code.find("let vault = next_account_info(accounts_iter)?;").unwrap();
        assert!(payer < vault);
        assert!(code.contains("if !payer.is_signer {"));
        assert!(code.contains("return Err(ProgramError::MissingRequiredSignature);"));
        assert!(code.contains("if !vault.is_writable {"));
    }

    #[test]
    fn test_native_require_transfer_emit_print() {
        let source = "program Bank {\n instruction pay() {\n  require(x < 10, \"too big\")\n  transfer(src, dst, 5)\n  emit Paid(5)\n  print(x)\n  return\n }\n}";
        let code = emit(source, None);
        assert!(code.contains("if !(x < 10) {\n                msg!(\"too big\");\n                return Err(ProgramError::InvalidArgument);\n            }"));
        assert!(code.contains("let instruction = system_instruction::transfer(src.key, dst.key, 5);"));
        assert!(code.contains("invoke(&instruction, &[src.clone(), dst.clone()])?;"));
        assert!(code.contains("msg!(\"Paid: {}\", 5);"));
        assert!(code.contains("msg!(\"Debug: x\");"));
        assert!(code.contains("return Ok(());"));
    }

    #[test]
    fn test_native_state_struct_has_no_anchor_attribute() {
        let code = emit("program P {\n state Data { owner: pubkey }\n}", None);
        assert!(code.contains("#[derive(Clone, Debug, PartialEq)]\npub struct Data {\n    pub owner: Pubkey,\n}"));
        assert!(!code.contains("#[account]"));
    }
}
