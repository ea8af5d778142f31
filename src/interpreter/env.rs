//! Runtime environment
//!
//! The value-side twin of the typing environment: a stack of lexical scopes
//! mapping identifier lexemes to [`Slot`]s, each holding either a literal
//! value or a host-registered callable. Compound assignment and
//! increment/decrement read, apply and write back here, bundling the
//! operator kind into the environment contract so every mutation path flows
//! through one place.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::interpreter::callable::Callable;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::ops::{self, OpError};
use crate::parser::token::{LiteralValue, Token, TokenKind};

/// A binding: a plain value or a foreign callable.
#[derive(Clone)]
pub enum Slot {
    Value(LiteralValue),
    Callable(Rc<dyn Callable>),
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Value(value) => write!(f, "Value({value:?})"),
            Slot::Callable(callable) => match callable.arity() {
                Some(arity) => write!(f, "Callable(arity {arity})"),
                None => write!(f, "Callable(variadic)"),
            },
        }
    }
}

/// Lexically scoped identifier → [`Slot`] table.
#[derive(Debug, Default)]
pub struct RuntimeEnvironment {
    scopes: Vec<FxHashMap<String, Slot>>,
}

impl RuntimeEnvironment {
    /// Environment with a single outermost scope.
    pub fn new() -> Self {
        RuntimeEnvironment {
            scopes: vec![FxHashMap::default()],
        }
    }

    /// Register a host value in the outermost scope, replacing any previous
    /// registration under the same name.
    pub fn define_value(&mut self, name: &str, value: LiteralValue) {
        self.scopes[0].insert(name.to_string(), Slot::Value(value));
    }

    /// Register a host callable; the matching foreign-function type must be
    /// registered in the typing environment under the same name.
    pub fn define_callable(&mut self, name: &str, callable: Rc<dyn Callable>) {
        self.scopes[0].insert(name.to_string(), Slot::Callable(callable));
    }

    /// Value of a binding after interpretation, for hosts that read results
    /// back out of the environment.
    pub fn value_of(&self, name: &str) -> Option<LiteralValue> {
        self.scopes.iter().rev().find_map(|scope| {
            scope.get(name).and_then(|slot| match slot {
                Slot::Value(value) => Some(*value),
                Slot::Callable(_) => None,
            })
        })
    }

    pub(crate) fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub(crate) fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Declare a binding in the innermost scope. An absent initialiser
    /// leaves the binding holding an empty payload.
    pub(crate) fn define(
        &mut self,
        name: &Token,
        value: LiteralValue,
    ) -> Result<(), RuntimeError> {
        let scope = self.scopes.last_mut().expect("scope stack is never empty");
        if scope.contains_key(&name.lexeme) {
            return Err(RuntimeError::Redeclaration {
                name: name.lexeme.clone(),
                line: name.line,
            });
        }

        scope.insert(name.lexeme.clone(), Slot::Value(value));
        Ok(())
    }

    /// Look a binding up, walking the scopes outward.
    pub(crate) fn get(&self, name: &Token) -> Result<Slot, RuntimeError> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name.lexeme))
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.lexeme.clone(),
                line: name.line,
            })
    }

    /// Plain or compound assignment: applies the operator to the current
    /// value, writes back in place at the owning scope and returns the new
    /// value. Compound assignment to an uninitialised binding is a fault.
    pub(crate) fn assign(
        &mut self,
        name: &Token,
        op: &Token,
        value: LiteralValue,
    ) -> Result<LiteralValue, RuntimeError> {
        let slot = self.slot_mut(name)?;

        let current = match slot {
            Slot::Value(current) => *current,
            Slot::Callable(_) => {
                return Err(RuntimeError::UnsupportedOperation {
                    message: format!("cannot assign to function '{}'", name.lexeme),
                    line: name.line,
                });
            }
        };

        let new_value = match op.kind.compound_base() {
            None => value,
            Some(base) => {
                if !current.is_some() {
                    return Err(RuntimeError::UnsupportedOperation {
                        message: format!(
                            "compound assignment to uninitialised variable '{}'",
                            name.lexeme
                        ),
                        line: op.line,
                    });
                }
                ops::binary(base, current, value).map_err(|error| op_fault(error, op))?
            }
        };

        *slot = Slot::Value(new_value);
        Ok(new_value)
    }

    /// `++x` / `--x`: mutate and return the updated value.
    pub(crate) fn prefix_inc_dec(
        &mut self,
        name: &Token,
        op: &Token,
    ) -> Result<LiteralValue, RuntimeError> {
        let (_, new_value) = self.apply_inc_dec(name, op)?;
        Ok(new_value)
    }

    /// `x++` / `x--`: mutate and return the value prior to the update.
    pub(crate) fn postfix_inc_dec(
        &mut self,
        name: &Token,
        op: &Token,
    ) -> Result<LiteralValue, RuntimeError> {
        let (old_value, _) = self.apply_inc_dec(name, op)?;
        Ok(old_value)
    }

    fn apply_inc_dec(
        &mut self,
        name: &Token,
        op: &Token,
    ) -> Result<(LiteralValue, LiteralValue), RuntimeError> {
        let base = match op.kind {
            TokenKind::PlusPlus => TokenKind::Plus,
            TokenKind::MinusMinus => TokenKind::Minus,
            _ => {
                return Err(RuntimeError::UnsupportedOperation {
                    message: format!("invalid increment/decrement operator '{}'", op.lexeme),
                    line: op.line,
                });
            }
        };

        let slot = self.slot_mut(name)?;
        let current = match slot {
            Slot::Value(current) => *current,
            Slot::Callable(_) => {
                return Err(RuntimeError::UnsupportedOperation {
                    message: format!("cannot modify function '{}'", name.lexeme),
                    line: name.line,
                });
            }
        };

        let new_value = ops::binary(base, current, LiteralValue::Int32(1))
            .map_err(|error| op_fault(error, op))?;
        *slot = Slot::Value(new_value);
        Ok((current, new_value))
    }

    fn slot_mut(&mut self, name: &Token) -> Result<&mut Slot, RuntimeError> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(&name.lexeme))
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.lexeme.clone(),
                line: name.line,
            })
    }
}

/// Attach an operator token to a value-level failure.
pub(crate) fn op_fault(error: OpError, op: &Token) -> RuntimeError {
    match error {
        OpError::InvalidOperand => RuntimeError::InvalidOperand {
            op: op.lexeme.clone(),
            line: op.line,
        },
        OpError::Unsupported => RuntimeError::UnsupportedOperation {
            message: format!("operator {} is not defined for these operands", op.kind),
            line: op.line,
        },
        OpError::DivisionByZero => RuntimeError::DivisionByZero { line: op.line },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(kind: TokenKind, lexeme: &str) -> Token {
        Token::new(kind, lexeme, 1)
    }

    #[test]
    fn test_define_lookup_and_shadowing() {
        let mut env = RuntimeEnvironment::new();
        let x = token(TokenKind::Identifier, "x");

        env.define(&x, LiteralValue::Int32(4)).unwrap();
        assert!(matches!(
            env.get(&x).unwrap(),
            Slot::Value(LiteralValue::Int32(4))
        ));

        // Same-scope redeclaration fails, nested shadowing succeeds
        assert!(matches!(
            env.define(&x, LiteralValue::Int32(5)),
            Err(RuntimeError::Redeclaration { .. })
        ));

        env.push_scope();
        env.define(&x, LiteralValue::Int32(7)).unwrap();
        assert!(matches!(
            env.get(&x).unwrap(),
            Slot::Value(LiteralValue::Int32(7))
        ));
        env.pop_scope();
        assert!(matches!(
            env.get(&x).unwrap(),
            Slot::Value(LiteralValue::Int32(4))
        ));
    }

    #[test]
    fn test_assign_writes_at_owning_scope() {
        let mut env = RuntimeEnvironment::new();
        let x = token(TokenKind::Identifier, "x");
        let eq = token(TokenKind::Equal, "=");

        env.define(&x, LiteralValue::Int32(1)).unwrap();
        env.push_scope();
        env.assign(&x, &eq, LiteralValue::Int32(9)).unwrap();
        env.pop_scope();

        assert_eq!(env.value_of("x"), Some(LiteralValue::Int32(9)));
    }

    #[test]
    fn test_compound_assign_applies_operator() {
        let mut env = RuntimeEnvironment::new();
        let x = token(TokenKind::Identifier, "x");
        let plus_eq = token(TokenKind::PlusEqual, "+=");

        env.define(&x, LiteralValue::Int32(4)).unwrap();
        let result = env.assign(&x, &plus_eq, LiteralValue::Int32(3)).unwrap();
        assert_eq!(result, LiteralValue::Int32(7));
        assert_eq!(env.value_of("x"), Some(LiteralValue::Int32(7)));
    }

    #[test]
    fn test_plain_assign_initialises_empty_binding() {
        let mut env = RuntimeEnvironment::new();
        let x = token(TokenKind::Identifier, "x");
        let eq = token(TokenKind::Equal, "=");

        env.define(&x, LiteralValue::None).unwrap();
        env.assign(&x, &eq, LiteralValue::Double(2.5)).unwrap();
        assert_eq!(env.value_of("x"), Some(LiteralValue::Double(2.5)));
    }

    #[test]
    fn test_compound_assign_on_uninitialised_is_fault() {
        let mut env = RuntimeEnvironment::new();
        let x = token(TokenKind::Identifier, "x");
        let star_eq = token(TokenKind::StarEqual, "*=");

        env.define(&x, LiteralValue::None).unwrap();
        assert!(matches!(
            env.assign(&x, &star_eq, LiteralValue::Int32(2)),
            Err(RuntimeError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn test_prefix_and_postfix_inc_dec() {
        let mut env = RuntimeEnvironment::new();
        let x = token(TokenKind::Identifier, "x");
        let plus_plus = token(TokenKind::PlusPlus, "++");

        env.define(&x, LiteralValue::Int32(5)).unwrap();
        assert_eq!(
            env.postfix_inc_dec(&x, &plus_plus).unwrap(),
            LiteralValue::Int32(5)
        );
        assert_eq!(env.value_of("x"), Some(LiteralValue::Int32(6)));

        assert_eq!(
            env.prefix_inc_dec(&x, &plus_plus).unwrap(),
            LiteralValue::Int32(7)
        );
        assert_eq!(env.value_of("x"), Some(LiteralValue::Int32(7)));
    }
}
