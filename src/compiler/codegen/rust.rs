//! Plain Rust lowering, also used for the generic statements of the
//! Anchor and Native profiles

use super::{escape_string, render_expr, render_opt, CodeGenerator};
use crate::compiler::EmissionProfile;
use crate::parser::{Program, Statement};

impl CodeGenerator {
    pub(super) fn emit_rust_unit(&mut self, program: &Program) {
        for stmt in &program.statements {
            if matches!(stmt, Statement::FuncDecl { .. }) {
                self.rust_statement(stmt);
                self.blank();
            }
        }

        self.open("fn main() {");
        for stmt in &program.statements {
            if !matches!(stmt, Statement::FuncDecl { .. }) {
                self.rust_statement(stmt);
            }
        }
        self.close("}");
    }

    pub(super) fn rust_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::VarDecl { name, value } => match value {
                Some(expr) => self.line(format!("let {} = {};", name, render_expr(expr))),
                None => self.line(format!("let {} = 0;", name)),
            },

            Statement::FuncDecl { name, body } => {
                self.open(format!("fn {}() -> i32 {{", name));
                self.in_function_body(|gen| gen.block(body));
                self.line("0");
                self.close("}");
            }

            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => self.if_chain(condition.as_ref(), then_branch, else_branch.as_ref()),

            Statement::Return { value } => match value {
                Some(expr) => self.line(format!("return {};", render_expr(expr))),
                None if self.ctx.in_function => self.line("return 0;"),
                None if self.ctx.profile.is_domain() => self.line("return Ok(());"),
                None => self.line("return;"),
            },

            Statement::Print { value } => {
                if self.ctx.profile.is_domain() {
                    // Placeholder text; the value itself is not logged
                    let text = escape_string(&render_opt(value.as_ref()));
                    self.line(format!("msg!(\"Debug: {}\");", text));
                } else {
                    match value {
                        Some(expr) => {
                            self.line(format!("println!(\"{{}}\", {});", render_expr(expr)))
                        }
                        None => self.line("println!();"),
                    }
                }
            }

            Statement::Expression(expr) => self.line(format!("{};", render_expr(expr))),

            domain => match self.ctx.profile {
                EmissionProfile::Anchor => self.anchor_statement(domain),
                EmissionProfile::Native => self.native_statement(domain),
                _ => self.skip_unsupported(domain),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::GenContext;
    use super::*;
    use crate::lexer::Scanner;
    use crate::parser::{Parser, UnitClassification};

    fn emit(source: &str) -> String {
        let tokens = Scanner::new(source).scan_tokens().unwrap();
        let program = Parser::new(tokens).parse().unwrap();
        let ctx = GenContext::new(EmissionProfile::Rust, UnitClassification::default());
        CodeGenerator::new(ctx).generate(&program)
    }

    #[test]
    fn test_rust_let_and_print() {
        let code = emit("let x = 10 * y\nprint(42)");
        assert_eq!(
            code,
            "fn main() {\n    let x = 10 * y;\n    println!(\"{}\", 42);\n}\n"
        );
    }

    #[test]
    fn test_rust_function_tail_and_returns() {
        let code = emit("fn f() {\n return\n}\nreturn");
        assert!(code.starts_with("fn f() -> i32 {\n    return 0;\n    0\n}\n\nfn main() {\n"));
        assert!(code.contains("fn main() {\n    return;\n}"));
    }

    #[test]
    fn test_rust_if_header_has_no_parens() {
        let code = emit("if a == b {\n print(a)\n}");
        assert!(code.contains("    if a == b {\n"));
    }

    #[test]
    fn test_rust_skips_domain_constructs() {
        let code = emit("transfer(a, b, 1)\nemit Done(1)");
        assert_eq!(code, "fn main() {\n}\n");
    }
}
