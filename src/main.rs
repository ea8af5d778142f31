//! Command-line driver
//!
//! Thin host around the library pipeline: reads a source file (or an inline
//! `--eval` string), wires the default maths callables into both
//! environments, and runs scan → parse → type check → interpret, stopping
//! at the first stage that reported diagnostics.

use std::process::ExitCode;

use clap::Parser;

use minic::check::{type_check, TypeEnvironment};
use minic::diagnostics::{ConsoleErrorHandler, ErrorHandler};
use minic::interpreter::{interpret, register_maths, RuntimeEnvironment};
use minic::parser::{parse::parse, pretty, scanner::scan};

#[derive(Debug, Parser)]
#[command(version, about = "Parse, type-check and interpret a C-subset fragment")]
struct Args {
    /// Source file to run
    input: Option<String>,

    /// Interpret an inline source string instead of a file
    #[arg(short, long, value_name = "SOURCE", conflicts_with = "input")]
    eval: Option<String>,

    /// Pretty-print the parsed program before interpreting
    #[arg(long)]
    print_ast: bool,

    /// Stop after type checking
    #[arg(long)]
    check_only: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let source = match (&args.input, &args.eval) {
        (_, Some(source)) => source.clone(),
        (Some(path), None) => match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(error) => {
                eprintln!("Failed to read '{path}': {error}");
                return ExitCode::FAILURE;
            }
        },
        (None, None) => {
            eprintln!("No input: pass a source file or --eval '<source>'");
            return ExitCode::FAILURE;
        }
    };

    let mut errors = ConsoleErrorHandler::new();

    let tokens = scan(&source, &mut errors);
    if errors.has_error() {
        return ExitCode::FAILURE;
    }

    let statements = parse(&tokens, &mut errors);
    if errors.has_error() {
        return ExitCode::FAILURE;
    }

    if args.print_ast {
        print!("{}", pretty::print_statements(&statements));
    }

    let mut types = TypeEnvironment::new();
    let mut runtime = RuntimeEnvironment::new();
    register_maths(&mut types, &mut runtime);

    type_check(&statements, &mut types, &mut errors);
    if errors.has_error() {
        return ExitCode::FAILURE;
    }

    if args.check_only {
        return ExitCode::SUCCESS;
    }

    let mut stdout = std::io::stdout();
    if let Err(fault) = interpret(&statements, &mut runtime, &mut stdout) {
        eprintln!("{fault}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
