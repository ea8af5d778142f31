//! Error reporting collaborator
//!
//! The scanner, parser and type checker never decide policy when something
//! goes wrong: they report through an [`ErrorHandler`] and carry on. The host
//! consults the handler's has-error bit between pipeline stages to decide
//! whether to continue.

use crate::parser::token::{Token, TokenKind};

/// Receives diagnostics from the front-end stages.
pub trait ErrorHandler {
    /// Report a problem at a source line.
    fn error(&mut self, line: usize, message: &str);

    /// Report a problem pinpointed to a token.
    fn error_at(&mut self, token: &Token, message: &str);

    /// Whether any diagnostic has been reported.
    fn has_error(&self) -> bool;
}

/// Handler that writes `[line N] Error at 'lexeme': message` to stderr.
#[derive(Debug, Default)]
pub struct ConsoleErrorHandler {
    had_error: bool,
}

impl ConsoleErrorHandler {
    pub fn new() -> Self {
        ConsoleErrorHandler::default()
    }

    fn report(&mut self, line: usize, location: &str, message: &str) {
        eprintln!("[line {line}] Error{location}: {message}");
        self.had_error = true;
    }
}

impl ErrorHandler for ConsoleErrorHandler {
    fn error(&mut self, line: usize, message: &str) {
        self.report(line, "", message);
    }

    fn error_at(&mut self, token: &Token, message: &str) {
        if token.kind == TokenKind::EndOfFile {
            self.report(token.line, " at end", message);
        } else {
            self.report(token.line, &format!(" at '{}'", token.lexeme), message);
        }
    }

    fn has_error(&self) -> bool {
        self.had_error
    }
}

/// Handler that collects diagnostics in memory, for embedding hosts and for
/// asserting on exact messages in tests.
#[derive(Debug, Default)]
pub struct BufferedErrorHandler {
    diagnostics: Vec<(usize, String)>,
}

impl BufferedErrorHandler {
    pub fn new() -> Self {
        BufferedErrorHandler::default()
    }

    /// Collected `(line, message)` pairs in report order.
    pub fn diagnostics(&self) -> &[(usize, String)] {
        &self.diagnostics
    }

    /// Whether any collected message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.diagnostics
            .iter()
            .any(|(_, message)| message.contains(needle))
    }
}

impl ErrorHandler for BufferedErrorHandler {
    fn error(&mut self, line: usize, message: &str) {
        self.diagnostics.push((line, message.to_string()));
    }

    fn error_at(&mut self, token: &Token, message: &str) {
        let message = if token.kind == TokenKind::EndOfFile {
            format!("at end: {message}")
        } else {
            format!("at '{}': {message}", token.lexeme)
        };
        self.diagnostics.push((token.line, message));
    }

    fn has_error(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}
