//! Numeric machinery over the literal payload union
//!
//! The typed C++ original got the usual arithmetic conversions for free from
//! the host language; here they are explicit. Every binary operation picks a
//! computation lane (the value-level image of the common-type rule: wider
//! float wins, otherwise the wider integer with unsigned preferred at equal
//! rank, small integers and `bool` promoted to `int`), converts both
//! operands into it and computes there with wrapping integer semantics.
//! Comparisons yield `Bool` payloads; `/` and `%` by integral zero are
//! faults rather than undefined behaviour.

use crate::parser::token::{LiteralValue, TokenKind};
use crate::types::NumericKind;

/// Failures surfaced by value-level operations; the caller attaches the
/// operator token and converts to a `RuntimeError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OpError {
    /// An operand carried no value.
    InvalidOperand,
    /// The operator is not defined for these operand variants.
    Unsupported,
    DivisionByZero,
}

/// Computation lane for a binary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lane {
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

fn lane_of(value: LiteralValue) -> Result<Lane, OpError> {
    match value {
        LiteralValue::None => Err(OpError::InvalidOperand),
        // bool promotes to int before arithmetic
        LiteralValue::Bool(_) | LiteralValue::Int32(_) => Ok(Lane::I32),
        LiteralValue::Uint32(_) => Ok(Lane::U32),
        LiteralValue::Int64(_) => Ok(Lane::I64),
        LiteralValue::Uint64(_) => Ok(Lane::U64),
        LiteralValue::Float(_) => Ok(Lane::F32),
        LiteralValue::Double(_) => Ok(Lane::F64),
    }
}

fn common_lane(a: Lane, b: Lane) -> Lane {
    use Lane::*;
    if a == F64 || b == F64 {
        F64
    } else if a == F32 || b == F32 {
        F32
    } else if a == U64 || b == U64 {
        U64
    } else if a == I64 || b == I64 {
        // i64 represents every u32 and i32 value
        I64
    } else if a == U32 || b == U32 {
        // unsigned wins at equal rank
        U32
    } else {
        I32
    }
}

// ===== Value conversions (C cast semantics) =====

pub(crate) fn to_f64(value: LiteralValue) -> f64 {
    match value {
        LiteralValue::None => 0.0,
        LiteralValue::Bool(b) => b as i32 as f64,
        LiteralValue::Float(x) => x as f64,
        LiteralValue::Double(x) => x,
        LiteralValue::Uint32(n) => n as f64,
        LiteralValue::Int32(n) => n as f64,
        LiteralValue::Uint64(n) => n as f64,
        LiteralValue::Int64(n) => n as f64,
    }
}

fn to_f32(value: LiteralValue) -> f32 {
    to_f64(value) as f32
}

fn to_i64(value: LiteralValue) -> i64 {
    match value {
        LiteralValue::None => 0,
        LiteralValue::Bool(b) => b as i64,
        LiteralValue::Float(x) => x as i64,
        LiteralValue::Double(x) => x as i64,
        LiteralValue::Uint32(n) => n as i64,
        LiteralValue::Int32(n) => n as i64,
        LiteralValue::Uint64(n) => n as i64,
        LiteralValue::Int64(n) => n,
    }
}

fn to_u64(value: LiteralValue) -> u64 {
    match value {
        LiteralValue::None => 0,
        LiteralValue::Bool(b) => b as u64,
        LiteralValue::Float(x) => x as u64,
        LiteralValue::Double(x) => x as u64,
        LiteralValue::Uint32(n) => n as u64,
        LiteralValue::Int32(n) => n as u64,
        LiteralValue::Uint64(n) => n,
        LiteralValue::Int64(n) => n as u64,
    }
}

fn to_i32(value: LiteralValue) -> i32 {
    to_i64(value) as i32
}

fn to_u32(value: LiteralValue) -> u32 {
    to_u64(value) as u32
}

/// Truthiness for conditions and logical operators: an empty payload is
/// falsy, everything else compares against zero.
pub(crate) fn is_truthy(value: LiteralValue) -> bool {
    match value {
        LiteralValue::None => false,
        LiteralValue::Bool(b) => b,
        LiteralValue::Float(x) => x != 0.0,
        LiteralValue::Double(x) => x != 0.0,
        LiteralValue::Uint32(n) => n != 0,
        LiteralValue::Int32(n) => n != 0,
        LiteralValue::Uint64(n) => n != 0,
        LiteralValue::Int64(n) => n != 0,
    }
}

macro_rules! float_binary {
    ($op:expr, $a:expr, $b:expr, $wrap:expr) => {
        match $op {
            TokenKind::Plus => $wrap($a + $b),
            TokenKind::Minus => $wrap($a - $b),
            TokenKind::Star => $wrap($a * $b),
            TokenKind::Slash => $wrap($a / $b),
            TokenKind::Greater => LiteralValue::Bool($a > $b),
            TokenKind::GreaterEqual => LiteralValue::Bool($a >= $b),
            TokenKind::Less => LiteralValue::Bool($a < $b),
            TokenKind::LessEqual => LiteralValue::Bool($a <= $b),
            TokenKind::EqualEqual => LiteralValue::Bool($a == $b),
            TokenKind::NotEqual => LiteralValue::Bool($a != $b),
            _ => return Err(OpError::Unsupported),
        }
    };
}

macro_rules! integer_binary {
    ($op:expr, $a:expr, $b:expr, $wrap:expr) => {
        match $op {
            TokenKind::Plus => $wrap($a.wrapping_add($b)),
            TokenKind::Minus => $wrap($a.wrapping_sub($b)),
            TokenKind::Star => $wrap($a.wrapping_mul($b)),
            TokenKind::Slash => {
                if $b == 0 {
                    return Err(OpError::DivisionByZero);
                }
                $wrap($a.wrapping_div($b))
            }
            TokenKind::Percent => {
                if $b == 0 {
                    return Err(OpError::DivisionByZero);
                }
                $wrap($a.wrapping_rem($b))
            }
            TokenKind::ShiftLeft => $wrap($a.wrapping_shl($b as u32)),
            TokenKind::ShiftRight => $wrap($a.wrapping_shr($b as u32)),
            TokenKind::Ampersand => $wrap($a & $b),
            TokenKind::Pipe => $wrap($a | $b),
            TokenKind::Caret => $wrap($a ^ $b),
            TokenKind::Greater => LiteralValue::Bool($a > $b),
            TokenKind::GreaterEqual => LiteralValue::Bool($a >= $b),
            TokenKind::Less => LiteralValue::Bool($a < $b),
            TokenKind::LessEqual => LiteralValue::Bool($a <= $b),
            TokenKind::EqualEqual => LiteralValue::Bool($a == $b),
            TokenKind::NotEqual => LiteralValue::Bool($a != $b),
            _ => return Err(OpError::Unsupported),
        }
    };
}

/// Apply a binary numeric operator. The type checker guarantees operand
/// compatibility; unexpected pairs still surface as errors rather than
/// panics.
pub(crate) fn binary(
    op: TokenKind,
    left: LiteralValue,
    right: LiteralValue,
) -> Result<LiteralValue, OpError> {
    let left_lane = lane_of(left)?;
    let right_lane = lane_of(right)?;

    // Shifts take the promoted left operand's type; everything else the
    // common type
    let lane = match op {
        TokenKind::ShiftLeft | TokenKind::ShiftRight => {
            if matches!(right_lane, Lane::F32 | Lane::F64) {
                return Err(OpError::Unsupported);
            }
            left_lane
        }
        _ => common_lane(left_lane, right_lane),
    };

    let result = match lane {
        Lane::F64 => {
            let (a, b) = (to_f64(left), to_f64(right));
            float_binary!(op, a, b, LiteralValue::Double)
        }
        Lane::F32 => {
            let (a, b) = (to_f32(left), to_f32(right));
            float_binary!(op, a, b, LiteralValue::Float)
        }
        Lane::U64 => {
            let (a, b) = (to_u64(left), to_u64(right));
            integer_binary!(op, a, b, LiteralValue::Uint64)
        }
        Lane::I64 => {
            let (a, b) = (to_i64(left), to_i64(right));
            integer_binary!(op, a, b, LiteralValue::Int64)
        }
        Lane::U32 => {
            let (a, b) = (to_u32(left), to_u32(right));
            integer_binary!(op, a, b, LiteralValue::Uint32)
        }
        Lane::I32 => {
            let (a, b) = (to_i32(left), to_i32(right));
            integer_binary!(op, a, b, LiteralValue::Int32)
        }
    };

    Ok(result)
}

/// Apply a unary numeric operator.
pub(crate) fn unary(op: TokenKind, value: LiteralValue) -> Result<LiteralValue, OpError> {
    if !value.is_some() {
        return Err(OpError::InvalidOperand);
    }

    match op {
        // Unary plus promotes bool, otherwise passes through
        TokenKind::Plus => Ok(match value {
            LiteralValue::Bool(b) => LiteralValue::Int32(b as i32),
            other => other,
        }),

        TokenKind::Minus => Ok(match value {
            LiteralValue::Bool(b) => LiteralValue::Int32(-(b as i32)),
            LiteralValue::Int32(n) => LiteralValue::Int32(n.wrapping_neg()),
            LiteralValue::Uint32(n) => LiteralValue::Uint32(n.wrapping_neg()),
            LiteralValue::Int64(n) => LiteralValue::Int64(n.wrapping_neg()),
            LiteralValue::Uint64(n) => LiteralValue::Uint64(n.wrapping_neg()),
            LiteralValue::Float(x) => LiteralValue::Float(-x),
            LiteralValue::Double(x) => LiteralValue::Double(-x),
            LiteralValue::None => unreachable!(),
        }),

        TokenKind::Not => Ok(LiteralValue::Bool(!is_truthy(value))),

        TokenKind::Tilde => match value {
            LiteralValue::Bool(b) => Ok(LiteralValue::Int32(!(b as i32))),
            LiteralValue::Int32(n) => Ok(LiteralValue::Int32(!n)),
            LiteralValue::Uint32(n) => Ok(LiteralValue::Uint32(!n)),
            LiteralValue::Int64(n) => Ok(LiteralValue::Int64(!n)),
            LiteralValue::Uint64(n) => Ok(LiteralValue::Uint64(!n)),
            _ => Err(OpError::Unsupported),
        },

        _ => Err(OpError::Unsupported),
    }
}

/// Convert a value to a target numeric type with C cast semantics. The
/// payload union has no 8/16-bit variants, so narrow casts wrap the value
/// and widen it back into the matching 32-bit payload.
pub(crate) fn convert(value: LiteralValue, target: NumericKind) -> Result<LiteralValue, OpError> {
    if !value.is_some() {
        return Err(OpError::InvalidOperand);
    }

    let converted = match target {
        NumericKind::Bool => LiteralValue::Bool(is_truthy(value)),
        NumericKind::Int8 => LiteralValue::Int32(to_i64(value) as i8 as i32),
        NumericKind::Uint8 => LiteralValue::Uint32(to_u64(value) as u8 as u32),
        NumericKind::Int16 => LiteralValue::Int32(to_i64(value) as i16 as i32),
        NumericKind::Uint16 => LiteralValue::Uint32(to_u64(value) as u16 as u32),
        NumericKind::Int32 => LiteralValue::Int32(to_i32(value)),
        NumericKind::Uint32 => LiteralValue::Uint32(to_u32(value)),
        NumericKind::Float => LiteralValue::Float(to_f32(value)),
        NumericKind::Double => LiteralValue::Double(to_f64(value)),
    };

    Ok(converted)
}

/// Equality for `switch` case matching: strict by payload variant and
/// value, with no numeric widening between variants. A `uint32_t`
/// discriminator therefore never matches an `int` case label.
pub(crate) fn values_equal(a: LiteralValue, b: LiteralValue) -> bool {
    match (a, b) {
        (LiteralValue::Bool(a), LiteralValue::Bool(b)) => a == b,
        (LiteralValue::Int32(a), LiteralValue::Int32(b)) => a == b,
        (LiteralValue::Uint32(a), LiteralValue::Uint32(b)) => a == b,
        (LiteralValue::Int64(a), LiteralValue::Int64(b)) => a == b,
        (LiteralValue::Uint64(a), LiteralValue::Uint64(b)) => a == b,
        _ => false,
    }
}
