//! Domain detection over a finished AST

use super::ast::{ElseBranch, Program, Statement};
use serde::{Deserialize, Serialize};

/// What the detection pass learned about a compilation unit
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitClassification {
    /// True if any domain declaration appears anywhere in the tree
    pub is_domain: bool,
    /// Name of the first program declaration (pre-order)
    pub program_name: Option<String>,
    /// Literal identifier of that program declaration, if it had one
    pub program_id: Option<String>,
}

/// Walks the tree once and reports whether it uses the domain layer.
///
/// Descends into program, instruction and function bodies and into both
/// branches of `if` statements.
pub fn classify(program: &Program) -> UnitClassification {
    let mut classification = UnitClassification::default();
    visit_all(&program.statements, &mut classification);
    tracing::debug!(
        is_domain = classification.is_domain,
        program = ?classification.program_name,
        "classified unit"
    );
    classification
}

fn visit_all(statements: &[Statement], out: &mut UnitClassification) {
    for stmt in statements {
        visit(stmt, out);
    }
}

fn visit(stmt: &Statement, out: &mut UnitClassification) {
    if stmt.is_domain() {
        out.is_domain = true;
    }

    match stmt {
        Statement::ProgramDecl(decl) => {
            if out.program_name.is_none() {
                out.program_name = Some(decl.name.clone());
                out.program_id = decl.program_id.clone();
            }
            visit_all(&decl.body, out);
        }
        Statement::InstructionDecl(decl) => visit_all(&decl.body, out),
        Statement::FuncDecl { body, .. } => visit_all(body, out),
        Statement::If {
            then_branch,
            else_branch,
            ..
        } => {
            visit_all(then_branch, out);
            match else_branch {
                Some(ElseBranch::Block(block)) => visit_all(block, out),
                Some(ElseBranch::If(nested)) => visit(nested, out),
                None => {}
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Scanner;
    use crate::parser::Parser;

    fn classify_source(source: &str) -> UnitClassification {
        let tokens = Scanner::new(source).scan_tokens().unwrap();
        let program = Parser::new(tokens).parse().unwrap();
        classify(&program)
    }

    #[test]
    fn test_plain_unit() {
        let c = classify_source("let x = 1\nfn f() { print(x) }");
        assert_eq!(c, UnitClassification::default());
    }

    #[test]
    fn test_nested_require_in_else() {
        let c = classify_source("if x { print(1) } else { require(x > 0) }");
        assert!(c.is_domain);
        assert_eq!(c.program_name, None);
    }

    #[test]
    fn test_first_program_wins() {
        let c = classify_source("program A(\"IdA\") {\n program B {}\n}\nprogram C {}");
        assert!(c.is_domain);
        assert_eq!(c.program_name.as_deref(), Some("A"));
        assert_eq!(c.program_id.as_deref(), Some("IdA"));
    }

    #[test]
    fn test_domain_inside_function() {
        let c = classify_source("fn pay() {\n transfer(a, b, 1)\n}");
        assert!(c.is_domain);
    }
}
