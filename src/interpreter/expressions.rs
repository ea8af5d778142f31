//! Expression evaluation
//!
//! Every expression reduces to a single literal payload. Numeric work is
//! delegated to [`ops`]; environment mutation (assignment, inc/dec) is
//! delegated to the runtime environment so the operator classification
//! stays in one place. Pointer-shaped expressions (`*p`, `&x`, subscripts,
//! pointer casts) type-check for the benefit of downstream code generators
//! but have no runtime value and fault if evaluated.

use std::rc::Rc;

use crate::interpreter::callable::Callable;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::env::{op_fault, Slot};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::ops;
use crate::parser::ast::Expr;
use crate::parser::token::{LiteralValue, Token, TokenKind};
use crate::types::Type;

impl<'a> Interpreter<'a> {
    pub(crate) fn evaluate(&mut self, expression: &Expr) -> Result<LiteralValue, RuntimeError> {
        match expression {
            Expr::Literal(value) => Ok(*value),

            Expr::Variable { name } => match self.env.get(name)? {
                Slot::Value(value) => Ok(value),
                Slot::Callable(_) => Err(RuntimeError::CallableAsValue {
                    name: name.lexeme.clone(),
                    line: name.line,
                }),
            },

            Expr::Grouping { inner } => self.evaluate(inner),

            Expr::Unary { op, operand } => match op.kind {
                TokenKind::Star | TokenKind::Ampersand => {
                    Err(RuntimeError::UnsupportedOperation {
                        message: "pointer operations cannot be evaluated".to_string(),
                        line: op.line,
                    })
                }
                _ => {
                    let value = self.evaluate(operand)?;
                    ops::unary(op.kind, value).map_err(|error| op_fault(error, op))
                }
            },

            Expr::Binary { left, op, right } => {
                // Comma evaluates left for effect and yields the right value
                if op.kind == TokenKind::Comma {
                    self.evaluate(left)?;
                    return self.evaluate(right);
                }

                let left_value = self.evaluate(left)?;
                let right_value = self.evaluate(right)?;
                ops::binary(op.kind, left_value, right_value)
                    .map_err(|error| op_fault(error, op))
            }

            Expr::Logical { left, op, right } => {
                let left_value = self.evaluate(left)?;

                let result = if op.kind == TokenKind::PipePipe {
                    if ops::is_truthy(left_value) {
                        true
                    } else {
                        ops::is_truthy(self.evaluate(right)?)
                    }
                } else if !ops::is_truthy(left_value) {
                    false
                } else {
                    ops::is_truthy(self.evaluate(right)?)
                };

                Ok(LiteralValue::Int32(result as i32))
            }

            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                if ops::is_truthy(self.evaluate(condition)?) {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }

            Expr::Assignment { name, op, value } => {
                let value = self.evaluate(value)?;
                self.env.assign(name, op, value)
            }

            Expr::Call {
                callee,
                closing_paren,
                arguments,
            } => self.evaluate_call(callee, closing_paren, arguments),

            Expr::Cast {
                target,
                closing_paren,
                expr,
                ..
            } => {
                let value = self.evaluate(expr)?;
                match target {
                    Type::Numeric(kind) => {
                        ops::convert(value, *kind).map_err(|_| RuntimeError::InvalidOperand {
                            op: format!("({target})"),
                            line: closing_paren.line,
                        })
                    }
                    _ => Err(RuntimeError::UnsupportedOperation {
                        message: "pointer casts cannot be evaluated".to_string(),
                        line: closing_paren.line,
                    }),
                }
            }

            Expr::PostfixIncDec { name, op } => self.env.postfix_inc_dec(name, op),

            Expr::PrefixIncDec { name, op } => self.env.prefix_inc_dec(name, op),

            Expr::ArraySubscript { name, .. } => Err(RuntimeError::UnsupportedOperation {
                message: "array subscripts cannot be evaluated".to_string(),
                line: name.line,
            }),
        }
    }

    fn evaluate_call(
        &mut self,
        callee: &Expr,
        closing_paren: &Token,
        arguments: &[Expr],
    ) -> Result<LiteralValue, RuntimeError> {
        let callable: Rc<dyn Callable> = match callee.unwrap_grouping() {
            Expr::Variable { name } => match self.env.get(name)? {
                Slot::Callable(callable) => callable,
                Slot::Value(_) => {
                    return Err(RuntimeError::NotCallable {
                        line: closing_paren.line,
                    });
                }
            },
            _ => {
                return Err(RuntimeError::NotCallable {
                    line: closing_paren.line,
                });
            }
        };

        // Arguments evaluate left to right
        let mut values = Vec::with_capacity(arguments.len());
        for argument in arguments {
            values.push(self.evaluate(argument)?);
        }

        if let Some(arity) = callable.arity() {
            if values.len() != arity {
                return Err(RuntimeError::ArityMismatch {
                    expected: arity,
                    got: values.len(),
                    line: closing_paren.line,
                });
            }
        }

        Ok(callable.call(&values))
    }
}
