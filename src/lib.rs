//! # Introduction
//!
//! `minic` parses, type-checks and interprets short fragments of a C-subset
//! expression/statement language, so that an embedding code-generation
//! framework can analyse snippets (e.g. neuron update rules) written in a
//! familiar syntax and trust them before emitting target code.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Scanner → Tokens → Parser → AST → TypeChecker → Interpreter
//! ```
//!
//! 1. [`parser::scanner`] — characters to tokens, with C numeric literal
//!    parsing (suffixes, hex floats, octal rejection).
//! 2. [`parser::parse`] — recursive descent over the C-subset grammar with
//!    statement-level error recovery.
//! 3. [`check`] — lattice-driven validation: integer promotion, usual
//!    arithmetic conversions, const correctness, pointer rules and
//!    break/continue contexts.
//! 4. [`interpreter`] — tree walk over the checked AST against a runtime
//!    environment of values and host-registered callables.
//!
//! The stages communicate diagnostics through a [`diagnostics::ErrorHandler`];
//! the host decides between stages whether to continue by consulting the
//! handler's has-error bit. [`parser::pretty`] renders any subtree back to
//! C-like source.
//!
//! ## Supported subset
//!
//! Types: the numeric lattice `bool`, `char`, `short`, `int` (signed and
//! unsigned), `float`, `double`, plus single-level pointers and
//! host-registered foreign functions. Control flow: `if/else`, `while`,
//! `do/while`, `for`, `switch/case/default` with C fall-through, `break`,
//! `continue`. Expressions: full C precedence including the comma operator,
//! conditional, casts, compound assignment and increment/decrement. A debug
//! `print` statement writes `(<type>)<value>` lines.
//!
//! ## Embedding
//!
//! ```no_run
//! use minic::check::{type_check, TypeEnvironment};
//! use minic::diagnostics::{ConsoleErrorHandler, ErrorHandler};
//! use minic::interpreter::{interpret, register_maths, RuntimeEnvironment};
//! use minic::parser::{parse::parse, scanner::scan};
//!
//! let mut errors = ConsoleErrorHandler::new();
//! let tokens = scan("print sqrt(2.0);", &mut errors);
//! let statements = parse(&tokens, &mut errors);
//!
//! let mut types = TypeEnvironment::new();
//! let mut runtime = RuntimeEnvironment::new();
//! register_maths(&mut types, &mut runtime);
//!
//! type_check(&statements, &mut types, &mut errors);
//! if !errors.has_error() {
//!     let mut stdout = std::io::stdout();
//!     interpret(&statements, &mut runtime, &mut stdout).unwrap();
//! }
//! ```

pub mod check;
pub mod diagnostics;
pub mod interpreter;
pub mod parser;
pub mod types;
