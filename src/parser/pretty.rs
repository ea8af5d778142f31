//! Pretty printer: AST → C-like source
//!
//! Renders any subtree back into compilable-looking source, keeping each
//! operator's original lexeme and indenting statements. Exact whitespace is
//! not contractual, but re-scanning the output must yield the original token
//! sequence up to whitespace, which is what the round-trip tests lean on.
//! Used as a diagnostic aid and by the test suite.

use crate::parser::ast::{Expr, Stmt};
use crate::parser::token::TokenKind;
use crate::types::Type;

/// Render a whole program.
pub fn print_statements(statements: &[Stmt]) -> String {
    let mut printer = PrettyPrinter::new();
    for statement in statements {
        printer.stmt(statement);
    }
    printer.out
}

/// Render a single expression subtree.
pub fn print_expression(expression: &Expr) -> String {
    let mut printer = PrettyPrinter::new();
    printer.expr(expression);
    printer.out
}

struct PrettyPrinter {
    out: String,
    indent: usize,
}

impl PrettyPrinter {
    fn new() -> Self {
        PrettyPrinter {
            out: String::new(),
            indent: 0,
        }
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
    }

    fn type_source(ty: &Type, is_const: bool) -> String {
        let base = match ty {
            Type::Numeric(kind) => kind.name().to_string(),
            Type::Pointer(kind) => format!("{}*", kind.name()),
            Type::Function(_) => ty.to_string(),
        };
        if is_const {
            format!("const {base}")
        } else {
            base
        }
    }

    // ===== Statements =====

    fn stmt(&mut self, statement: &Stmt) {
        match statement {
            Stmt::Compound(items) => {
                self.write_indent();
                self.out.push_str("{\n");
                self.indent += 1;
                for item in items {
                    self.stmt(item);
                }
                self.indent -= 1;
                self.write_indent();
                self.out.push_str("}\n");
            }

            Stmt::Expression(expression) => {
                self.write_indent();
                self.expr(expression);
                self.out.push_str(";\n");
            }

            Stmt::Print(expression) => {
                self.write_indent();
                self.out.push_str("print ");
                self.expr(expression);
                self.out.push_str(";\n");
            }

            Stmt::VarDeclaration { .. } => {
                self.write_indent();
                self.declaration_inline(statement);
                self.out.push('\n');
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.write_indent();
                self.out.push_str("if (");
                self.expr(condition);
                self.out.push(')');
                self.nested_body(then_branch);
                if let Some(else_branch) = else_branch {
                    self.write_indent();
                    self.out.push_str("else");
                    self.nested_body(else_branch);
                }
            }

            Stmt::While { condition, body } => {
                self.write_indent();
                self.out.push_str("while (");
                self.expr(condition);
                self.out.push(')');
                self.nested_body(body);
            }

            Stmt::Do { body, condition } => {
                self.write_indent();
                self.out.push_str("do");
                self.nested_body(body);
                self.write_indent();
                self.out.push_str("while (");
                self.expr(condition);
                self.out.push_str(");\n");
            }

            Stmt::For {
                initialiser,
                condition,
                increment,
                body,
            } => {
                self.write_indent();
                self.out.push_str("for (");
                match initialiser {
                    Some(init) => self.declaration_inline(init),
                    None => self.out.push(';'),
                }
                if let Some(condition) = condition {
                    self.out.push(' ');
                    self.expr(condition);
                }
                self.out.push(';');
                if let Some(increment) = increment {
                    self.out.push(' ');
                    self.expr(increment);
                }
                self.out.push(')');
                self.nested_body(body);
            }

            Stmt::Switch {
                condition, body, ..
            } => {
                self.write_indent();
                self.out.push_str("switch (");
                self.expr(condition);
                self.out.push(')');
                self.nested_body(body);
            }

            Stmt::Labelled { value, body, .. } => {
                self.write_indent();
                match value {
                    Some(value) => {
                        self.out.push_str("case ");
                        self.expr(value);
                        self.out.push_str(":\n");
                    }
                    None => self.out.push_str("default:\n"),
                }
                self.indent += 1;
                self.stmt(body);
                self.indent -= 1;
            }

            Stmt::Break { .. } => {
                self.write_indent();
                self.out.push_str("break;\n");
            }

            Stmt::Continue { .. } => {
                self.write_indent();
                self.out.push_str("continue;\n");
            }
        }
    }

    /// Body of a control statement: compounds open on the same line,
    /// anything else goes on its own indented line.
    fn nested_body(&mut self, body: &Stmt) {
        if let Stmt::Compound(items) = body {
            self.out.push_str(" {\n");
            self.indent += 1;
            for item in items {
                self.stmt(item);
            }
            self.indent -= 1;
            self.write_indent();
            self.out.push_str("}\n");
        } else {
            self.out.push('\n');
            self.indent += 1;
            self.stmt(body);
            self.indent -= 1;
        }
    }

    /// Declaration or expression statement without indentation or trailing
    /// newline, as required inside a `for` header.
    fn declaration_inline(&mut self, statement: &Stmt) {
        match statement {
            Stmt::VarDeclaration {
                ty,
                is_const,
                declarators,
            } => {
                self.out.push_str(&Self::type_source(ty, *is_const));
                self.out.push(' ');
                for (i, (name, initialiser)) in declarators.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.out.push_str(&name.lexeme);
                    if let Some(initialiser) = initialiser {
                        self.out.push_str(" = ");
                        self.expr(initialiser);
                    }
                }
                self.out.push(';');
            }
            Stmt::Expression(expression) => {
                self.expr(expression);
                self.out.push(';');
            }
            // The parser only produces the two shapes above as for-initialisers
            other => {
                self.stmt(other);
            }
        }
    }

    // ===== Expressions =====

    fn expr(&mut self, expression: &Expr) {
        match expression {
            Expr::Literal(value) => self.out.push_str(&value.source_form()),

            Expr::Variable { name } => self.out.push_str(&name.lexeme),

            Expr::Grouping { inner } => {
                self.out.push('(');
                self.expr(inner);
                self.out.push(')');
            }

            Expr::Unary { op, operand } => {
                self.out.push_str(&op.lexeme);
                self.expr(operand);
            }

            Expr::Binary { left, op, right } => {
                self.expr(left);
                if op.kind == TokenKind::Comma {
                    self.out.push_str(", ");
                } else {
                    self.out.push(' ');
                    self.out.push_str(&op.lexeme);
                    self.out.push(' ');
                }
                self.expr(right);
            }

            Expr::Logical { left, op, right } => {
                self.expr(left);
                self.out.push(' ');
                self.out.push_str(&op.lexeme);
                self.out.push(' ');
                self.expr(right);
            }

            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.expr(condition);
                self.out.push_str(" ? ");
                self.expr(then_branch);
                self.out.push_str(" : ");
                self.expr(else_branch);
            }

            Expr::Assignment { name, op, value } => {
                self.out.push_str(&name.lexeme);
                self.out.push(' ');
                self.out.push_str(&op.lexeme);
                self.out.push(' ');
                self.expr(value);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.expr(callee);
                self.out.push('(');
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expr(argument);
                }
                self.out.push(')');
            }

            Expr::Cast {
                target,
                is_const,
                expr,
                ..
            } => {
                self.out.push('(');
                self.out.push_str(&Self::type_source(target, *is_const));
                self.out.push(')');
                self.expr(expr);
            }

            Expr::PostfixIncDec { name, op } => {
                self.out.push_str(&name.lexeme);
                self.out.push_str(&op.lexeme);
            }

            Expr::PrefixIncDec { name, op } => {
                self.out.push_str(&op.lexeme);
                self.out.push_str(&name.lexeme);
            }

            Expr::ArraySubscript { name, index } => {
                self.out.push_str(&name.lexeme);
                self.out.push('[');
                self.expr(index);
                self.out.push(']');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::BufferedErrorHandler;
    use crate::diagnostics::ErrorHandler;
    use crate::parser::parse::parse;
    use crate::parser::scanner::scan;

    fn parse_source(source: &str) -> Vec<Stmt> {
        let mut errors = BufferedErrorHandler::new();
        let tokens = scan(source, &mut errors);
        let statements = parse(&tokens, &mut errors);
        assert!(
            !errors.has_error(),
            "unexpected errors: {:?}",
            errors.diagnostics()
        );
        statements
    }

    fn assert_round_trip(source: &str) {
        let first = print_statements(&parse_source(source));
        let second = print_statements(&parse_source(&first));
        assert_eq!(first, second, "round trip diverged for {source:?}");
    }

    #[test]
    fn test_expression_rendering() {
        let statements = parse_source("x = (1 + 2) * 3;");
        assert_eq!(print_statements(&statements), "x = (1 + 2) * 3;\n");
    }

    #[test]
    fn test_literal_suffixes_survive() {
        let statements = parse_source("x = 1.0f + 2u;");
        assert_eq!(print_statements(&statements), "x = 1.0f + 2u;\n");
    }

    #[test]
    fn test_statement_indentation() {
        let statements = parse_source("if (x) { print x; }");
        assert_eq!(
            print_statements(&statements),
            "if (x) {\n    print x;\n}\n"
        );
    }

    #[test]
    fn test_round_trips() {
        assert_round_trip("(((12 + 4) * 5) + 3) > 20;");
        assert_round_trip("const int c = 1, d = 2;");
        assert_round_trip("double* p;");
        assert_round_trip("x = a ? b : c, y = ~a >> 2;");
        assert_round_trip("if (a) b = 1; else { b = 2; }");
        assert_round_trip("for (int i = 0; i < 3; i = i + 1) { print i; }");
        assert_round_trip("for (;;) break;");
        assert_round_trip("do x *= 2.0f; while (x < 10.0f);");
        assert_round_trip(
            "switch (x) { default: print 0; case 1: print 1; case 3: break; }",
        );
        assert_round_trip("y = sqrt((double)x);");
        assert_round_trip("values[i] + *p + &q;");
        assert_round_trip("x <<= 2; x |= 1; ++x; x--;");
    }
}
