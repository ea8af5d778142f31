//! Runtime fault types
//!
//! Runtime faults are fatal to the current `interpret` call: the error
//! unwinds to the entry point without mutating any enclosing-scope binding.
//! After a clean type check most of these are unreachable; the interpreter
//! keeps only minimal defensive checks.

use thiserror::Error;

/// Fatal faults raised while executing a program.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Undefined variable '{name}' at line {line}")]
    UndefinedVariable { name: String, line: usize },

    #[error("Redeclaration of '{name}' at line {line}")]
    Redeclaration { name: String, line: usize },

    #[error("Invalid operand to '{op}' at line {line}")]
    InvalidOperand { op: String, line: usize },

    #[error("Unsupported operation: {message} at line {line}")]
    UnsupportedOperation { message: String, line: usize },

    #[error("Expected {expected} arguments but got {got} at line {line}")]
    ArityMismatch {
        expected: usize,
        got: usize,
        line: usize,
    },

    #[error("Called object is not a function at line {line}")]
    NotCallable { line: usize },

    #[error("Cannot use function '{name}' as a value at line {line}")]
    CallableAsValue { name: String, line: usize },

    #[error("Division by zero at line {line}")]
    DivisionByZero { line: usize },

    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}
