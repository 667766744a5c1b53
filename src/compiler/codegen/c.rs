//! C lowering

use super::{render_expr, render_opt, CodeGenerator};
use crate::parser::{Expression, Program, Statement};

impl CodeGenerator {
    pub(super) fn emit_c_unit(&mut self, program: &Program) {
        self.line("#include <stdio.h>");
        self.line("#include <stdlib.h>");
        self.line("#include <string.h>");
        self.blank();

        // Functions are hoisted above main
        for stmt in &program.statements {
            if matches!(stmt, Statement::FuncDecl { .. }) {
                self.c_statement(stmt);
                self.blank();
            }
        }

        self.open("int main() {");
        for stmt in &program.statements {
            if !matches!(stmt, Statement::FuncDecl { .. }) {
                self.c_statement(stmt);
            }
        }
        self.line("return 0;");
        self.close("}");
    }

    pub(super) fn c_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::VarDecl { name, value } => match value {
                Some(Expression::String(_)) => {
                    self.line(format!("const char* {} = {};", name, render_opt(value.as_ref())))
                }
                Some(expr) => self.line(format!("int {} = {};", name, render_expr(expr))),
                None => self.line(format!("int {} = 0;", name)),
            },

            Statement::FuncDecl { name, body } => {
                self.open(format!("int {}() {{", name));
                self.in_function_body(|gen| gen.block(body));
                self.line("return 0;");
                self.close("}");
            }

            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => self.if_chain(condition.as_ref(), then_branch, else_branch.as_ref()),

            Statement::Return { value } => match value {
                Some(expr) => self.line(format!("return {};", render_expr(expr))),
                None => self.line("return 0;"),
            },

            Statement::Print { value } => match value {
                Some(Expression::String(_)) => {
                    self.line(format!("printf(\"%s\\n\", {});", render_opt(value.as_ref())))
                }
                Some(expr) => self.line(format!("printf(\"%d\\n\", {});", render_expr(expr))),
                None => self.line("printf(\"\\n\");"),
            },

            Statement::Expression(expr) => self.line(format!("{};", render_expr(expr))),

            domain => self.skip_unsupported(domain),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::GenContext;
    use super::*;
    use crate::compiler::EmissionProfile;
    use crate::lexer::Scanner;
    use crate::parser::{Parser, UnitClassification};

    fn emit(source: &str) -> String {
        let tokens = Scanner::new(source).scan_tokens().unwrap();
        let program = Parser::new(tokens).parse().unwrap();
        let ctx = GenContext::new(EmissionProfile::C, UnitClassification::default());
        CodeGenerator::new(ctx).generate(&program)
    }

    #[test]
    fn test_c_shell() {
        let code = emit("");
        assert_eq!(
            code,
            "#include <stdio.h>\n#include <stdlib.h>\n#include <string.h>\n\nint main() {\n    return 0;\n}\n"
        );
    }

    #[test]
    fn test_c_let_and_print() {
        let code = emit("let x = 5 + 3\nprint(x)\nprint(\"hi\")");
        assert!(code.contains("    int x = 5 + 3;\n"));
        assert!(code.contains("    printf(\"%d\\n\", x);\n"));
        assert!(code.contains("    printf(\"%s\\n\", \"hi\");\n"));
    }

    #[test]
    fn test_c_function_is_hoisted() {
        let code = emit("print(f())\nfn f() {\n return 7\n}");
        let func = code.find("int f() {").unwrap();
        let main = code.find("int main() {").unwrap();
        assert!(func < main);
        assert!(code.contains("    return 7;\n    return 0;\n}"));
    }

    #[test]
    fn test_c_if_else_chain() {
        let code =
            emit("if x < 1 {\n print(1)\n} else if x > 2 {\n print(2)\n} else {\n print(3)\n}");
        assert!(code.contains("    if (x < 1) {\n        printf(\"%d\\n\", 1);\n    } else if (x > 2) {\n"));
        assert!(code.contains("    } else {\n        printf(\"%d\\n\", 3);\n    }\n"));
    }

    #[test]
    fn test_c_skips_domain_constructs() {
        let code = emit("require(x < 1)\nprint(1)");
        assert!(!code.contains("require"));
        assert!(code.contains("printf"));
    }
}
