//! Tree-walking interpreter
//!
//! Executes a type-checked statement list against a [`RuntimeEnvironment`],
//! writing `print` output to a caller-supplied stream. Runtime faults are
//! fatal to the `interpret` call and unwind to the entry point.

pub mod callable;
pub mod env;
pub mod errors;

mod engine;
mod expressions;
mod ops;

pub use callable::{register_maths, Callable, NativeFunction};
pub use env::{RuntimeEnvironment, Slot};
pub use errors::RuntimeError;

use std::io::Write;

use crate::parser::ast::Stmt;

/// Interpret a statement list. The type checker is assumed to have run;
/// only minimal defensive checks remain.
pub fn interpret(
    statements: &[Stmt],
    environment: &mut RuntimeEnvironment,
    output: &mut dyn Write,
) -> Result<(), RuntimeError> {
    let mut interpreter = engine::Interpreter::new(environment, output);
    interpreter.run(statements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{type_check, TypeEnvironment};
    use crate::diagnostics::BufferedErrorHandler;
    use crate::diagnostics::ErrorHandler;
    use crate::parser::parse::parse;
    use crate::parser::scanner::scan;
    use crate::parser::token::LiteralValue;
    use crate::types::{NumericKind, Type};

    /// Scan, parse, check and interpret, returning captured print output
    /// and the final environment.
    fn run_source(source: &str) -> (String, RuntimeEnvironment) {
        let mut errors = BufferedErrorHandler::new();
        let tokens = scan(source, &mut errors);
        let statements = parse(&tokens, &mut errors);

        let mut types = TypeEnvironment::new();
        let mut runtime = RuntimeEnvironment::new();
        register_maths(&mut types, &mut runtime);
        type_check(&statements, &mut types, &mut errors);
        assert!(
            !errors.has_error(),
            "front end rejected {source:?}: {:?}",
            errors.diagnostics()
        );

        let mut output = Vec::new();
        interpret(&statements, &mut runtime, &mut output).expect("runtime fault");
        (String::from_utf8(output).unwrap(), runtime)
    }

    fn run_output(source: &str) -> String {
        run_source(source).0
    }

    #[test]
    fn test_arithmetic_and_precedence() {
        let output = run_output("print (((12 + 4) * 5) + 3) > 20;");
        assert_eq!(output, "(bool)true\n");
    }

    #[test]
    fn test_scoping_and_shadowing() {
        let output = run_output("int x = 4; { int x = 7; print x; } print x;");
        assert_eq!(output, "(int32_t)7\n(int32_t)4\n");
    }

    #[test]
    fn test_switch_fall_through() {
        let output = run_output(
            "int x = 3; switch(x){ default: print 0; case 1: print 1; \
             case 3: print 3; case 5: print 5; break; case 7: print 7; }",
        );
        assert_eq!(output, "(int32_t)3\n(int32_t)5\n");
    }

    #[test]
    fn test_switch_default_taken() {
        let output =
            run_output("int x = 9; switch(x){ case 1: print 1; default: print 0; }");
        assert_eq!(output, "(int32_t)0\n");
    }

    #[test]
    fn test_switch_no_match_no_default() {
        let output = run_output("int x = 9; switch(x){ case 1: print 1; }");
        assert_eq!(output, "");
    }

    #[test]
    fn test_while_loop_with_break() {
        let output = run_output(
            "float x = 1.0f; while(true){ x *= 0.9f; print x; if(x < 0.1f) break; }",
        );
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "(float)0.9");

        // Monotonically decreasing, ending at the first value below 0.1
        let values: Vec<f32> = lines
            .iter()
            .map(|line| line.trim_start_matches("(float)").parse().unwrap())
            .collect();
        assert!(values.windows(2).all(|pair| pair[1] < pair[0]));
        assert!(*values.last().unwrap() < 0.1);
        assert!(values[..values.len() - 1].iter().all(|&x| x >= 0.1));
    }

    #[test]
    fn test_continue_skips_to_next_iteration() {
        let output = run_output(
            "for (int i = 0; i < 5; i = i + 1) { if (i % 2 == 0) continue; print i; }",
        );
        assert_eq!(output, "(int32_t)1\n(int32_t)3\n");
    }

    #[test]
    fn test_do_while_runs_body_at_least_once() {
        let output = run_output("int x = 10; do { print x; x = x + 1; } while (x < 5);");
        assert_eq!(output, "(int32_t)10\n");
    }

    #[test]
    fn test_prefix_postfix_inc_dec() {
        let output = run_output("int x = 5; print x++; print x; print ++x; print x--;");
        assert_eq!(
            output,
            "(int32_t)5\n(int32_t)6\n(int32_t)7\n(int32_t)7\n"
        );
    }

    #[test]
    fn test_short_circuit_does_not_evaluate_rhs() {
        let output = run_output(
            "int hits = 0; int r = true || (hits = 1); print hits; \
             r = false && (hits = 1); print hits; print r;",
        );
        assert_eq!(output, "(int32_t)0\n(int32_t)0\n(int32_t)0\n");
    }

    #[test]
    fn test_logical_results_are_int() {
        let output = run_output("print false || true; print true && false;");
        assert_eq!(output, "(int32_t)1\n(int32_t)0\n");
    }

    #[test]
    fn test_foreign_call() {
        let output = run_output("double x = 4.0; print sqrt(x);");
        assert_eq!(output, "(double)2\n");
    }

    #[test]
    fn test_foreign_call_two_arguments() {
        let output = run_output("print pow(2.0, 10.0); print fmax(1.5, -2.0);");
        assert_eq!(output, "(double)1024\n(double)1.5\n");
    }

    #[test]
    fn test_comma_and_conditional() {
        let output = run_output("int x = (1, 2, 3); print x; print x > 2 ? 10 : 20;");
        assert_eq!(output, "(int32_t)3\n(int32_t)10\n");
    }

    #[test]
    fn test_cast_conversion() {
        let output = run_output("double d = 2.9; print (int)d; print (double)1;");
        assert_eq!(output, "(int32_t)2\n(double)1\n");
    }

    #[test]
    fn test_compound_assignment_operators() {
        let output = run_output(
            "int x = 8; x += 2; x <<= 1; x |= 1; x -= 5; x %= 7; print x;",
        );
        // 8 → 10 → 20 → 21 → 16 → 2
        assert_eq!(output, "(int32_t)2\n");
    }

    #[test]
    fn test_unsigned_literal_flows_through() {
        let output = run_output("unsigned int m = 0xffu; print m >> 4;");
        assert_eq!(output, "(uint32_t)15\n");
    }

    #[test]
    fn test_host_reads_result_from_environment() {
        let (_, runtime) = run_source("int x = 6; x = x * 7;");
        assert_eq!(runtime.value_of("x"), Some(LiteralValue::Int32(42)));
    }

    #[test]
    fn test_runtime_fault_on_division_by_zero() {
        let mut errors = BufferedErrorHandler::new();
        let tokens = scan("int x = 1; int z = 0; print x / z;", &mut errors);
        let statements = parse(&tokens, &mut errors);
        let mut types = TypeEnvironment::new();
        type_check(&statements, &mut types, &mut errors);
        assert!(!errors.has_error());

        let mut runtime = RuntimeEnvironment::new();
        let mut output = Vec::new();
        let result = interpret(&statements, &mut runtime, &mut output);
        assert!(matches!(result, Err(RuntimeError::DivisionByZero { .. })));
    }

    #[test]
    fn test_host_registered_pointer_is_type_only() {
        // A host may register pointer-typed bindings for checking; touching
        // them at runtime is a fault
        let mut errors = BufferedErrorHandler::new();
        let tokens = scan("double y = v[0];", &mut errors);
        let statements = parse(&tokens, &mut errors);

        let mut types = TypeEnvironment::new();
        types.define_host("v", Type::Pointer(NumericKind::Double), false);
        type_check(&statements, &mut types, &mut errors);
        assert!(!errors.has_error(), "{:?}", errors.diagnostics());

        let mut runtime = RuntimeEnvironment::new();
        let mut output = Vec::new();
        let result = interpret(&statements, &mut runtime, &mut output);
        assert!(matches!(
            result,
            Err(RuntimeError::UnsupportedOperation { .. })
        ));
    }
}
