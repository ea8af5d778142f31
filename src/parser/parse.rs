//! Main parser coordinator
//!
//! Recursive descent over the token stream. This module owns the [`Parser`]
//! state, the navigation helpers and the statement-level error recovery;
//! the productions live in sibling modules, each extending [`Parser`] with
//! an `impl` block:
//!
//! - `declarations`: declaration specifiers and init declarator lists
//! - `statements`: statement productions
//! - `expressions`: expression productions by precedence tier
//!
//! On a parse error the offending diagnostic goes to the [`ErrorHandler`]
//! and an opaque [`ParseAbort`] unwinds to the nearest block item, where
//! [`Parser::synchronise`] skips to a likely statement boundary and parsing
//! resumes. The returned statement list is therefore best-effort when the
//! handler has recorded errors.

use crate::diagnostics::ErrorHandler;
use crate::parser::ast::StatementList;
use crate::parser::token::{Token, TokenKind};

/// Parse a scanned token stream into a statement list.
///
/// Parsing continues past errors so a single pass can surface several
/// diagnostics; callers should consult the handler's has-error bit before
/// trusting the result.
pub fn parse(tokens: &[Token], errors: &mut dyn ErrorHandler) -> StatementList {
    if tokens.is_empty() {
        return StatementList::new();
    }

    let mut parser = Parser {
        tokens,
        current: 0,
        errors,
    };

    let mut statements = StatementList::new();
    while !parser.is_at_end() {
        match parser.parse_block_item() {
            Ok(statement) => statements.push(statement),
            Err(ParseAbort) => parser.synchronise(),
        }
    }
    statements
}

/// Sentinel unwound to the nearest block item on a parse error; the
/// diagnostic itself has already been reported.
pub(crate) struct ParseAbort;

pub(crate) type ParseResult<T> = Result<T, ParseAbort>;

pub(crate) struct Parser<'a> {
    tokens: &'a [Token],
    current: usize,
    errors: &'a mut dyn ErrorHandler,
}

impl<'a> Parser<'a> {
    /// Skip tokens until just past a `;` or just before a token that can
    /// begin a statement, then resume parsing.
    pub(crate) fn synchronise(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }

            match self.peek().kind {
                TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::TypeSpecifier => return,
                _ => {}
            }

            self.advance();
        }
    }

    // ===== Navigation helpers =====

    pub(crate) fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::EndOfFile
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.current + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    pub(crate) fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous().clone()
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    pub(crate) fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn match_any(&mut self, kinds: &[TokenKind]) -> bool {
        for &kind in kinds {
            if self.match_kind(kind) {
                return true;
            }
        }
        false
    }

    /// Consume a token of `kind` or report `message` and abort the current
    /// block item.
    pub(crate) fn consume(&mut self, kind: TokenKind, message: &str) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_at_current(message))
        }
    }

    pub(crate) fn error_at_current(&mut self, message: &str) -> ParseAbort {
        let token = self.peek().clone();
        self.errors.error_at(&token, message);
        ParseAbort
    }

    pub(crate) fn error_at(&mut self, token: &Token, message: &str) -> ParseAbort {
        self.errors.error_at(token, message);
        ParseAbort
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::BufferedErrorHandler;
    use crate::parser::scanner::scan;

    #[test]
    fn test_recovers_at_statement_boundary() {
        let mut errors = BufferedErrorHandler::new();
        let tokens = scan("int x = ; int y = 2;", &mut errors);
        let statements = parse(&tokens, &mut errors);

        // The bad declaration is reported but the good one survives
        assert!(errors.has_error());
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn test_multiple_diagnostics_in_one_pass() {
        let mut errors = BufferedErrorHandler::new();
        let tokens = scan("int = 1; float = 2;", &mut errors);
        parse(&tokens, &mut errors);

        assert!(errors.diagnostics().len() >= 2);
    }

    #[test]
    fn test_empty_source_parses_to_empty_program() {
        let mut errors = BufferedErrorHandler::new();
        let tokens = scan("", &mut errors);
        let statements = parse(&tokens, &mut errors);

        assert!(!errors.has_error());
        assert!(statements.is_empty());
    }
}
