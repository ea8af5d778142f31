//! Foreign callables
//!
//! Hosts expose functions to interpreted fragments by registering a
//! [`Callable`] into the runtime environment and the matching
//! [`FunctionType`] into the typing environment under the same name.
//! [`register_maths`] wires the default `double → double` maths set a
//! typical host wants available.

use std::rc::Rc;

use crate::check::TypeEnvironment;
use crate::interpreter::env::RuntimeEnvironment;
use crate::interpreter::ops;
use crate::parser::token::LiteralValue;
use crate::types::{FunctionType, NumericKind};

/// A host-supplied function callable from interpreted code.
pub trait Callable {
    /// Number of arguments the callable expects; `None` means variadic and
    /// bypasses arity checking.
    fn arity(&self) -> Option<usize>;

    /// Invoke with evaluated arguments. Arity has been checked by the
    /// interpreter unless the callable is variadic.
    fn call(&self, arguments: &[LiteralValue]) -> LiteralValue;
}

/// [`Callable`] wrapping a Rust closure.
pub struct NativeFunction {
    arity: Option<usize>,
    function: Box<dyn Fn(&[LiteralValue]) -> LiteralValue>,
}

impl NativeFunction {
    pub fn new(
        arity: Option<usize>,
        function: impl Fn(&[LiteralValue]) -> LiteralValue + 'static,
    ) -> Self {
        NativeFunction {
            arity,
            function: Box::new(function),
        }
    }
}

impl Callable for NativeFunction {
    fn arity(&self) -> Option<usize> {
        self.arity
    }

    fn call(&self, arguments: &[LiteralValue]) -> LiteralValue {
        (self.function)(arguments)
    }
}

fn argument(arguments: &[LiteralValue], index: usize) -> f64 {
    arguments
        .get(index)
        .copied()
        .map(ops::to_f64)
        .unwrap_or(0.0)
}

fn register_unary(
    types: &mut TypeEnvironment,
    runtime: &mut RuntimeEnvironment,
    name: &str,
    function: fn(f64) -> f64,
) {
    types.define_function(
        name,
        FunctionType::new(NumericKind::Double, vec![NumericKind::Double]),
    );
    runtime.define_callable(
        name,
        Rc::new(NativeFunction::new(Some(1), move |arguments| {
            LiteralValue::Double(function(argument(arguments, 0)))
        })),
    );
}

fn register_binary(
    types: &mut TypeEnvironment,
    runtime: &mut RuntimeEnvironment,
    name: &str,
    function: fn(f64, f64) -> f64,
) {
    types.define_function(
        name,
        FunctionType::new(
            NumericKind::Double,
            vec![NumericKind::Double, NumericKind::Double],
        ),
    );
    runtime.define_callable(
        name,
        Rc::new(NativeFunction::new(Some(2), move |arguments| {
            LiteralValue::Double(function(argument(arguments, 0), argument(arguments, 1)))
        })),
    );
}

/// Register the default maths set into both environments.
pub fn register_maths(types: &mut TypeEnvironment, runtime: &mut RuntimeEnvironment) {
    register_unary(types, runtime, "sqrt", f64::sqrt);
    register_unary(types, runtime, "exp", f64::exp);
    register_unary(types, runtime, "log", f64::ln);
    register_unary(types, runtime, "fabs", f64::abs);
    register_unary(types, runtime, "sin", f64::sin);
    register_unary(types, runtime, "cos", f64::cos);
    register_binary(types, runtime, "pow", f64::powf);
    register_binary(types, runtime, "fmax", f64::max);
    register_binary(types, runtime, "fmin", f64::min);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_function_invocation() {
        let double_it = NativeFunction::new(Some(1), |arguments| {
            LiteralValue::Double(ops::to_f64(arguments[0]) * 2.0)
        });

        assert_eq!(double_it.arity(), Some(1));
        assert_eq!(
            double_it.call(&[LiteralValue::Double(2.5)]),
            LiteralValue::Double(5.0)
        );
    }

    #[test]
    fn test_register_maths_populates_both_environments() {
        let mut types = TypeEnvironment::new();
        let mut runtime = RuntimeEnvironment::new();
        register_maths(&mut types, &mut runtime);

        assert!(types.lookup("sqrt").is_some());
        assert!(types.lookup("pow").is_some());
        // Callables are not plain values
        assert_eq!(runtime.value_of("sqrt"), None);
    }
}
