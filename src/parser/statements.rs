//! Statement productions
//!
//! ```text
//! block-item := declaration | statement
//! statement  := compound | print | selection | iteration | jump | labelled
//!             | expression-statement
//! ```
//!
//! Compound statements run block items through the same recovery path as the
//! top level, so one malformed statement inside a block does not take the
//! rest of the block with it.

use crate::parser::ast::Stmt;
use crate::parser::parse::{ParseResult, Parser};
use crate::parser::token::TokenKind;

impl<'a> Parser<'a> {
    /// block-item := declaration | statement
    pub(crate) fn parse_block_item(&mut self) -> ParseResult<Stmt> {
        if self.check(TokenKind::TypeSpecifier) || self.check(TokenKind::TypeQualifier) {
            self.parse_declaration()
        } else {
            self.parse_statement()
        }
    }

    pub(crate) fn parse_statement(&mut self) -> ParseResult<Stmt> {
        if self.match_kind(TokenKind::Print) {
            return self.parse_print_statement();
        }
        if self.match_any(&[TokenKind::If, TokenKind::Switch]) {
            return self.parse_selection_statement();
        }
        if self.match_any(&[TokenKind::While, TokenKind::Do, TokenKind::For]) {
            return self.parse_iteration_statement();
        }
        if self.match_kind(TokenKind::LeftBrace) {
            return self.parse_compound_statement();
        }
        if self.match_kind(TokenKind::Break) {
            let keyword = self.previous().clone();
            self.consume(TokenKind::Semicolon, "Expect ';' after 'break'")?;
            return Ok(Stmt::Break { keyword });
        }
        if self.match_kind(TokenKind::Continue) {
            let keyword = self.previous().clone();
            self.consume(TokenKind::Semicolon, "Expect ';' after 'continue'")?;
            return Ok(Stmt::Continue { keyword });
        }
        if self.match_any(&[TokenKind::Case, TokenKind::Default]) {
            return self.parse_labelled_statement();
        }

        self.parse_expression_statement()
    }

    /// compound := "{" block-item* "}"
    ///
    /// The opening brace has already been consumed.
    fn parse_compound_statement(&mut self) -> ParseResult<Stmt> {
        let mut statements = Vec::new();

        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            match self.parse_block_item() {
                Ok(statement) => statements.push(statement),
                Err(_) => self.synchronise(),
            }
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after compound statement")?;

        Ok(Stmt::Compound(statements))
    }

    fn parse_print_statement(&mut self) -> ParseResult<Stmt> {
        let expression = self.parse_expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after expression")?;
        Ok(Stmt::Print(expression))
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Stmt> {
        let expression = self.parse_expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after expression")?;
        Ok(Stmt::Expression(expression))
    }

    /// selection := "if" "(" expr ")" statement ("else" statement)?
    ///            | "switch" "(" expr ")" statement
    ///
    /// The keyword has already been consumed.
    fn parse_selection_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        self.consume(
            TokenKind::LeftParen,
            &format!("Expect '(' after '{}'", keyword.lexeme),
        )?;
        let condition = self.parse_expression()?;
        self.consume(
            TokenKind::RightParen,
            &format!("Expect ')' after '{}' condition", keyword.lexeme),
        )?;

        if keyword.kind == TokenKind::If {
            let then_branch = Box::new(self.parse_statement()?);
            let else_branch = if self.match_kind(TokenKind::Else) {
                Some(Box::new(self.parse_statement()?))
            } else {
                None
            };

            Ok(Stmt::If {
                condition,
                then_branch,
                else_branch,
            })
        } else {
            let body = Box::new(self.parse_statement()?);
            Ok(Stmt::Switch {
                keyword,
                condition,
                body,
            })
        }
    }

    /// iteration := "while" "(" expr ")" statement
    ///            | "do" statement "while" "(" expr ")" ";"
    ///            | "for" "(" (declaration | expr? ";") expr? ";" expr? ")" statement
    ///
    /// The keyword has already been consumed.
    fn parse_iteration_statement(&mut self) -> ParseResult<Stmt> {
        match self.previous().kind {
            TokenKind::While => {
                self.consume(TokenKind::LeftParen, "Expect '(' after 'while'")?;
                let condition = self.parse_expression()?;
                self.consume(TokenKind::RightParen, "Expect ')' after 'while' condition")?;
                let body = Box::new(self.parse_statement()?);

                Ok(Stmt::While { condition, body })
            }
            TokenKind::Do => {
                let body = Box::new(self.parse_statement()?);
                self.consume(TokenKind::While, "Expect 'while' after 'do' statement body")?;
                self.consume(TokenKind::LeftParen, "Expect '(' after 'while'")?;
                let condition = self.parse_expression()?;
                self.consume(TokenKind::RightParen, "Expect ')' after 'while' condition")?;
                self.consume(TokenKind::Semicolon, "Expect ';' after do-while")?;

                Ok(Stmt::Do { body, condition })
            }
            _ => self.parse_for_statement(),
        }
    }

    fn parse_for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'")?;

        let initialiser = if self.match_kind(TokenKind::Semicolon) {
            None
        } else if self.check(TokenKind::TypeSpecifier) || self.check(TokenKind::TypeQualifier) {
            // Declaration consumes its own terminating semicolon
            Some(Box::new(self.parse_declaration()?))
        } else {
            Some(Box::new(self.parse_expression_statement()?))
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after loop condition")?;

        let increment = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(TokenKind::RightParen, "Expect ')' after for clauses")?;

        let body = Box::new(self.parse_statement()?);

        Ok(Stmt::For {
            initialiser,
            condition,
            increment,
            body,
        })
    }

    /// labelled := "case" conditional ":" statement | "default" ":" statement
    ///
    /// The keyword has already been consumed.
    fn parse_labelled_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();

        let value = if keyword.kind == TokenKind::Case {
            Some(self.parse_conditional()?)
        } else {
            None
        };

        self.consume(
            TokenKind::Colon,
            &format!("Expect ':' after '{}'", keyword.lexeme),
        )?;
        let body = Box::new(self.parse_statement()?);

        Ok(Stmt::Labelled {
            keyword,
            value,
            body,
        })
    }
}
