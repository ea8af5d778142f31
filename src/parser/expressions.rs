//! Expression productions
//!
//! One method per precedence tier, from the comma operator at the bottom to
//! primaries at the top:
//!
//! ```text
//! expression > assignment > conditional > logical-or > logical-and >
//! bitwise-or > bitwise-xor > bitwise-and > equality > relational > shift >
//! additive > multiplicative > cast > unary > postfix > primary
//! ```
//!
//! The left-associative binary tiers share [`Parser::parse_binary_tier`].
//! Assignment targets and increment/decrement operands must fold (through
//! grouping) to a bare variable; anything else is diagnosed and the operand
//! expression is kept so parsing can continue.

use crate::parser::ast::Expr;
use crate::parser::parse::{ParseResult, Parser};
use crate::parser::token::{LiteralValue, Token, TokenKind};

/// Name token of an expression that folds (through grouping) to a bare
/// variable.
fn variable_name(expression: &Expr) -> Option<Token> {
    match expression.unwrap_grouping() {
        Expr::Variable { name } => Some(name.clone()),
        _ => None,
    }
}

const ASSIGNMENT_OPS: [TokenKind; 11] = [
    TokenKind::Equal,
    TokenKind::PlusEqual,
    TokenKind::MinusEqual,
    TokenKind::StarEqual,
    TokenKind::SlashEqual,
    TokenKind::PercentEqual,
    TokenKind::AmpersandEqual,
    TokenKind::PipeEqual,
    TokenKind::CaretEqual,
    TokenKind::ShiftLeftEqual,
    TokenKind::ShiftRightEqual,
];

impl<'a> Parser<'a> {
    /// expression := assignment ("," assignment)*
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Expr> {
        let mut expression = self.parse_assignment()?;

        while self.match_kind(TokenKind::Comma) {
            let op = self.previous().clone();
            let right = self.parse_assignment()?;
            expression = Expr::Binary {
                left: Box::new(expression),
                op,
                right: Box::new(right),
            };
        }

        Ok(expression)
    }

    /// assignment := conditional | unary ASSIGN-OP assignment
    pub(crate) fn parse_assignment(&mut self) -> ParseResult<Expr> {
        let expression = self.parse_conditional()?;

        if self.match_any(&ASSIGNMENT_OPS) {
            let op = self.previous().clone();
            let value = self.parse_assignment()?;

            if let Expr::Variable { name } = expression.unwrap_grouping() {
                return Ok(Expr::Assignment {
                    name: name.clone(),
                    op,
                    value: Box::new(value),
                });
            }

            // Report but keep the left operand so parsing continues
            let _ = self.error_at(&op, "Invalid assignment target");
        }

        Ok(expression)
    }

    /// conditional := logical-or ("?" expression ":" conditional)?
    pub(crate) fn parse_conditional(&mut self) -> ParseResult<Expr> {
        let expression = self.parse_logical_or()?;

        if self.match_kind(TokenKind::Question) {
            let question = self.previous().clone();
            let then_branch = self.parse_expression()?;
            self.consume(TokenKind::Colon, "Expect ':' in conditional expression")?;
            let else_branch = self.parse_conditional()?;

            return Ok(Expr::Conditional {
                condition: Box::new(expression),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
                question,
            });
        }

        Ok(expression)
    }

    fn parse_logical_or(&mut self) -> ParseResult<Expr> {
        let mut expression = self.parse_logical_and()?;

        while self.match_kind(TokenKind::PipePipe) {
            let op = self.previous().clone();
            let right = self.parse_logical_and()?;
            expression = Expr::Logical {
                left: Box::new(expression),
                op,
                right: Box::new(right),
            };
        }

        Ok(expression)
    }

    fn parse_logical_and(&mut self) -> ParseResult<Expr> {
        let mut expression = self.parse_bitwise_or()?;

        while self.match_kind(TokenKind::AmpersandAmpersand) {
            let op = self.previous().clone();
            let right = self.parse_bitwise_or()?;
            expression = Expr::Logical {
                left: Box::new(expression),
                op,
                right: Box::new(right),
            };
        }

        Ok(expression)
    }

    fn parse_bitwise_or(&mut self) -> ParseResult<Expr> {
        self.parse_binary_tier(&[TokenKind::Pipe], Self::parse_bitwise_xor)
    }

    fn parse_bitwise_xor(&mut self) -> ParseResult<Expr> {
        self.parse_binary_tier(&[TokenKind::Caret], Self::parse_bitwise_and)
    }

    fn parse_bitwise_and(&mut self) -> ParseResult<Expr> {
        self.parse_binary_tier(&[TokenKind::Ampersand], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> ParseResult<Expr> {
        self.parse_binary_tier(
            &[TokenKind::EqualEqual, TokenKind::NotEqual],
            Self::parse_relational,
        )
    }

    fn parse_relational(&mut self) -> ParseResult<Expr> {
        self.parse_binary_tier(
            &[
                TokenKind::Less,
                TokenKind::LessEqual,
                TokenKind::Greater,
                TokenKind::GreaterEqual,
            ],
            Self::parse_shift,
        )
    }

    fn parse_shift(&mut self) -> ParseResult<Expr> {
        self.parse_binary_tier(
            &[TokenKind::ShiftLeft, TokenKind::ShiftRight],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        self.parse_binary_tier(
            &[TokenKind::Plus, TokenKind::Minus],
            Self::parse_multiplicative,
        )
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        self.parse_binary_tier(
            &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
            Self::parse_cast,
        )
    }

    /// Left-associative binary tier: `next (OP next)*`.
    fn parse_binary_tier(
        &mut self,
        kinds: &[TokenKind],
        next: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut expression = next(self)?;

        while self.match_any(kinds) {
            let op = self.previous().clone();
            let right = next(self)?;
            expression = Expr::Binary {
                left: Box::new(expression),
                op,
                right: Box::new(right),
            };
        }

        Ok(expression)
    }

    /// cast := "(" type-name ")" cast | unary
    ///
    /// A `(` opens a cast only when the next token can begin a type name,
    /// which disambiguates casts from grouping.
    fn parse_cast(&mut self) -> ParseResult<Expr> {
        if self.check(TokenKind::LeftParen) {
            let begins_type = self
                .peek_ahead(1)
                .map(|t| {
                    t.kind == TokenKind::TypeSpecifier || t.kind == TokenKind::TypeQualifier
                })
                .unwrap_or(false);

            if begins_type {
                self.advance();
                let (target, is_const) = self.parse_type_name()?;
                let closing_paren =
                    self.consume(TokenKind::RightParen, "Expect ')' after cast type")?;
                let expr = self.parse_cast()?;

                return Ok(Expr::Cast {
                    target,
                    is_const,
                    closing_paren,
                    expr: Box::new(expr),
                });
            }
        }

        self.parse_unary()
    }

    /// unary := ("++"|"--") unary | ("+"|"-"|"~"|"!"|"*"|"&") cast | postfix
    fn parse_unary(&mut self) -> ParseResult<Expr> {
        if self.match_any(&[TokenKind::PlusPlus, TokenKind::MinusMinus]) {
            let op = self.previous().clone();
            let operand = self.parse_unary()?;

            if let Expr::Variable { name } = operand.unwrap_grouping() {
                return Ok(Expr::PrefixIncDec {
                    name: name.clone(),
                    op,
                });
            }

            let _ = self.error_at(&op, "Invalid operand for increment/decrement");
            return Ok(operand);
        }

        if self.match_any(&[
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Tilde,
            TokenKind::Not,
            TokenKind::Star,
            TokenKind::Ampersand,
        ]) {
            let op = self.previous().clone();
            let operand = self.parse_cast()?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }

        self.parse_postfix()
    }

    /// postfix := primary ( "(" arguments? ")" | "[" expression "]" | "++" | "--" )*
    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let mut expression = self.parse_primary()?;

        loop {
            if self.match_kind(TokenKind::LeftParen) {
                let mut arguments = Vec::new();
                if !self.check(TokenKind::RightParen) {
                    loop {
                        arguments.push(self.parse_assignment()?);
                        if !self.match_kind(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                let closing_paren =
                    self.consume(TokenKind::RightParen, "Expect ')' after arguments")?;

                expression = Expr::Call {
                    callee: Box::new(expression),
                    closing_paren,
                    arguments,
                };
            } else if self.match_kind(TokenKind::LeftBracket) {
                let bracket = self.previous().clone();
                let index = self.parse_expression()?;
                self.consume(TokenKind::RightBracket, "Expect ']' after subscript")?;

                match variable_name(&expression) {
                    Some(name) => {
                        expression = Expr::ArraySubscript {
                            name,
                            index: Box::new(index),
                        };
                    }
                    None => {
                        let _ = self.error_at(&bracket, "Subscript requires a named pointer");
                    }
                }
            } else if self.match_any(&[TokenKind::PlusPlus, TokenKind::MinusMinus]) {
                let op = self.previous().clone();
                match variable_name(&expression) {
                    Some(name) => expression = Expr::PostfixIncDec { name, op },
                    None => {
                        let _ = self.error_at(&op, "Invalid operand for increment/decrement");
                    }
                }
            } else {
                break;
            }
        }

        Ok(expression)
    }

    /// primary := IDENTIFIER | NUMBER | "true" | "false" | "(" expression ")"
    fn parse_primary(&mut self) -> ParseResult<Expr> {
        if self.match_kind(TokenKind::False) {
            return Ok(Expr::Literal(LiteralValue::Bool(false)));
        }
        if self.match_kind(TokenKind::True) {
            return Ok(Expr::Literal(LiteralValue::Bool(true)));
        }
        if self.match_kind(TokenKind::Number) {
            return Ok(Expr::Literal(self.previous().literal));
        }
        if self.match_kind(TokenKind::Identifier) {
            return Ok(Expr::Variable {
                name: self.previous().clone(),
            });
        }
        if self.match_kind(TokenKind::LeftParen) {
            let inner = self.parse_expression()?;
            self.consume(TokenKind::RightParen, "Expect ')' after expression")?;
            return Ok(Expr::Grouping {
                inner: Box::new(inner),
            });
        }

        Err(self.error_at_current("Expect expression"))
    }
}
