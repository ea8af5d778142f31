//! Typing environment
//!
//! A stack of lexical scopes mapping identifier lexemes to `(type, const)`
//! bindings. Scopes are entered and left in LIFO order, so the stack shape
//! replaces the parent-pointer chain without changing lookup semantics:
//! `define` inserts into the innermost scope and rejects same-scope
//! redeclaration, `lookup` walks outward.
//!
//! Assignment and increment/decrement validation live here so the checker
//! and any host tooling share one operator-compatibility contract.

use rustc_hash::FxHashMap;

use crate::check::CheckAbort;
use crate::diagnostics::ErrorHandler;
use crate::parser::token::Token;
use crate::types::{FunctionType, Type};

#[derive(Debug, Clone)]
struct Binding {
    ty: Type,
    is_const: bool,
}

/// Lexically scoped identifier → `(type, is_const)` table.
#[derive(Debug, Default)]
pub struct TypeEnvironment {
    scopes: Vec<FxHashMap<String, Binding>>,
}

impl TypeEnvironment {
    /// Environment with a single outermost scope.
    pub fn new() -> Self {
        TypeEnvironment {
            scopes: vec![FxHashMap::default()],
        }
    }

    /// Register a host binding in the outermost scope, replacing any
    /// previous registration under the same name.
    pub fn define_host(&mut self, name: &str, ty: Type, is_const: bool) {
        self.scopes[0].insert(name.to_string(), Binding { ty, is_const });
    }

    /// Register a foreign-function signature; the matching callable must be
    /// registered in the runtime environment under the same name.
    pub fn define_function(&mut self, name: &str, signature: FunctionType) {
        self.define_host(name, Type::Function(signature), true);
    }

    pub(crate) fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub(crate) fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Declare a binding in the innermost scope; redeclaring at the same
    /// level is an error, shadowing an outer scope is fine.
    pub(crate) fn define(
        &mut self,
        name: &Token,
        ty: Type,
        is_const: bool,
        errors: &mut dyn ErrorHandler,
    ) -> Result<(), CheckAbort> {
        let scope = self.scopes.last_mut().expect("scope stack is never empty");
        if scope.contains_key(&name.lexeme) {
            errors.error_at(name, &format!("Redeclaration of '{}'", name.lexeme));
            return Err(CheckAbort);
        }

        scope.insert(name.lexeme.clone(), Binding { ty, is_const });
        Ok(())
    }

    /// Walk the scopes outward for a binding.
    pub(crate) fn lookup(&self, name: &str) -> Option<(Type, bool)> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .map(|binding| (binding.ty.clone(), binding.is_const))
    }

    /// Validate an assignment through the environment: the binding must
    /// exist and be mutable, and the operator must be defined for the
    /// target/value type pair.
    pub(crate) fn assign(
        &mut self,
        name: &Token,
        op: &Token,
        value_ty: &Type,
        value_is_const: bool,
        errors: &mut dyn ErrorHandler,
    ) -> Result<(), CheckAbort> {
        let (target_ty, target_is_const) = match self.lookup(&name.lexeme) {
            Some(binding) => binding,
            None => {
                errors.error_at(name, &format!("Undefined variable '{}'", name.lexeme));
                return Err(CheckAbort);
            }
        };

        if target_is_const {
            errors.error_at(
                name,
                &format!("Assignment of read-only variable '{}'", name.lexeme),
            );
            return Err(CheckAbort);
        }

        match op.kind.compound_base() {
            // Plain '='
            None => {
                if let Some(message) =
                    assignability_error(&target_ty, false, value_ty, value_is_const)
                {
                    errors.error_at(op, message);
                    return Err(CheckAbort);
                }
            }
            Some(base) => {
                let valid = if base.is_integer_only_op() {
                    target_ty.is_integral() && value_ty.is_integral()
                } else {
                    target_ty.is_numeric() && value_ty.is_numeric()
                };
                if !valid {
                    errors.error_at(
                        op,
                        &format!("Invalid operand types to operator {}", op.kind),
                    );
                    return Err(CheckAbort);
                }
            }
        }

        Ok(())
    }

    /// Validate a prefix/postfix increment or decrement and return the
    /// binding's type.
    pub(crate) fn inc_dec(
        &mut self,
        name: &Token,
        op: &Token,
        errors: &mut dyn ErrorHandler,
    ) -> Result<Type, CheckAbort> {
        let (ty, is_const) = match self.lookup(&name.lexeme) {
            Some(binding) => binding,
            None => {
                errors.error_at(name, &format!("Undefined variable '{}'", name.lexeme));
                return Err(CheckAbort);
            }
        };

        if is_const {
            errors.error_at(
                name,
                &format!(
                    "Increment/decrement of read-only variable '{}'",
                    name.lexeme
                ),
            );
            return Err(CheckAbort);
        }

        if !ty.is_numeric() {
            errors.error_at(op, "Invalid operand for increment/decrement");
            return Err(CheckAbort);
        }

        Ok(ty)
    }
}

/// Why `value` cannot initialise or be assigned to a `target` binding, or
/// `None` when the pair is compatible. Shared by declarations and plain
/// assignment.
pub(crate) fn assignability_error(
    target_ty: &Type,
    target_is_const: bool,
    value_ty: &Type,
    value_is_const: bool,
) -> Option<&'static str> {
    match (target_ty, value_ty) {
        (Type::Numeric(_), Type::Numeric(_)) => None,
        (Type::Pointer(target), Type::Pointer(value)) => {
            if target != value {
                Some("Incompatible pointer types")
            } else if value_is_const && !target_is_const {
                Some("Conversion from const pointer discards qualifier")
            } else {
                None
            }
        }
        (Type::Function(_), _) | (_, Type::Function(_)) => Some("Invalid use of function type"),
        _ => Some("Invalid conversion between pointer and non-pointer"),
    }
}
