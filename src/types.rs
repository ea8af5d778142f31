//! Numeric type lattice, pointer and foreign-function types
//!
//! Every numeric type is identified by a [`NumericKind`] indexing a static
//! descriptor table, so descriptors are process-wide, read-only and cheap to
//! copy around. Pointer types are one layer over the same ids and
//! foreign-function types bundle a return id with an argument id list.
//!
//! The promotion and common-type rules implement the C integer promotions
//! and usual arithmetic conversions over the lattice
//! `bool < int8/uint8 < int16/uint16 < int32/uint32 < float < double`.

use std::collections::BTreeSet;
use std::fmt;

/// Identifier of a numeric type in the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    Bool,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float,
    Double,
}

/// Descriptor of a numeric type: everything the checker needs to reason
/// about promotion, representability and printing.
#[derive(Debug)]
pub struct NumericType {
    /// C source name, e.g. `"unsigned int"`.
    pub name: &'static str,
    pub size_bytes: usize,
    /// Integer conversion rank; floats rank above every integer.
    pub rank: i32,
    pub min: f64,
    pub max: f64,
    /// Most negative finite value (differs from `min` for floats).
    pub lowest: f64,
    pub is_signed: bool,
    pub is_integral: bool,
}

static NUMERIC_TYPES: [NumericType; 9] = [
    NumericType {
        name: "bool",
        size_bytes: 1,
        rank: 0,
        min: 0.0,
        max: 1.0,
        lowest: 0.0,
        is_signed: false,
        is_integral: true,
    },
    NumericType {
        name: "char",
        size_bytes: 1,
        rank: 10,
        min: i8::MIN as f64,
        max: i8::MAX as f64,
        lowest: i8::MIN as f64,
        is_signed: true,
        is_integral: true,
    },
    NumericType {
        name: "unsigned char",
        size_bytes: 1,
        rank: 10,
        min: 0.0,
        max: u8::MAX as f64,
        lowest: 0.0,
        is_signed: false,
        is_integral: true,
    },
    NumericType {
        name: "short",
        size_bytes: 2,
        rank: 20,
        min: i16::MIN as f64,
        max: i16::MAX as f64,
        lowest: i16::MIN as f64,
        is_signed: true,
        is_integral: true,
    },
    NumericType {
        name: "unsigned short",
        size_bytes: 2,
        rank: 20,
        min: 0.0,
        max: u16::MAX as f64,
        lowest: 0.0,
        is_signed: false,
        is_integral: true,
    },
    NumericType {
        name: "int",
        size_bytes: 4,
        rank: 30,
        min: i32::MIN as f64,
        max: i32::MAX as f64,
        lowest: i32::MIN as f64,
        is_signed: true,
        is_integral: true,
    },
    NumericType {
        name: "unsigned int",
        size_bytes: 4,
        rank: 30,
        min: 0.0,
        max: u32::MAX as f64,
        lowest: 0.0,
        is_signed: false,
        is_integral: true,
    },
    NumericType {
        name: "float",
        size_bytes: 4,
        rank: 50,
        min: f32::MIN_POSITIVE as f64,
        max: f32::MAX as f64,
        lowest: f32::MIN as f64,
        is_signed: true,
        is_integral: false,
    },
    NumericType {
        name: "double",
        size_bytes: 8,
        rank: 60,
        min: f64::MIN_POSITIVE,
        max: f64::MAX,
        lowest: f64::MIN,
        is_signed: true,
        is_integral: false,
    },
];

impl NumericKind {
    /// Descriptor for this id.
    pub fn info(self) -> &'static NumericType {
        &NUMERIC_TYPES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn rank(self) -> i32 {
        self.info().rank
    }

    pub fn is_signed(self) -> bool {
        self.info().is_signed
    }

    pub fn is_integral(self) -> bool {
        self.info().is_integral
    }

    /// Unsigned counterpart of a signed integer type.
    fn to_unsigned(self) -> NumericKind {
        match self {
            NumericKind::Int8 => NumericKind::Uint8,
            NumericKind::Int16 => NumericKind::Uint16,
            NumericKind::Int32 => NumericKind::Uint32,
            other => other,
        }
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Signature of a host-registered callable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub return_kind: NumericKind,
    pub argument_kinds: Vec<NumericKind>,
    /// Variadic functions bypass arity checking.
    pub is_variadic: bool,
}

impl FunctionType {
    pub fn new(return_kind: NumericKind, argument_kinds: Vec<NumericKind>) -> Self {
        FunctionType {
            return_kind,
            argument_kinds,
            is_variadic: false,
        }
    }

    pub fn variadic(return_kind: NumericKind) -> Self {
        FunctionType {
            return_kind,
            argument_kinds: Vec::new(),
            is_variadic: true,
        }
    }
}

/// A type in the language: a numeric value, a pointer to a numeric value or
/// a foreign function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Numeric(NumericKind),
    Pointer(NumericKind),
    Function(FunctionType),
}

impl Type {
    pub fn as_numeric(&self) -> Option<NumericKind> {
        match self {
            Type::Numeric(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Numeric(_))
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    pub fn is_integral(&self) -> bool {
        matches!(self, Type::Numeric(kind) if kind.is_integral())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Numeric(kind) => write!(f, "{}", kind.name()),
            Type::Pointer(kind) => write!(f, "{}*", kind.name()),
            Type::Function(signature) => {
                write!(f, "{}<", signature.return_kind.name())?;
                for (i, arg) in signature.argument_kinds.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg.name())?;
                }
                write!(f, ">")
            }
        }
    }
}

/// Integer promotion: any rank below `int` promotes to `int`; `float` and
/// `double` are unchanged. Idempotent.
pub fn promote(kind: NumericKind) -> NumericKind {
    if kind.rank() < NumericKind::Int32.rank() {
        NumericKind::Int32
    } else {
        kind
    }
}

/// Usual arithmetic conversions: the single type both operands of a binary
/// numeric operator convert to. Commutative.
pub fn common_type(a: NumericKind, b: NumericKind) -> NumericKind {
    // Either operand floating picks the wider float
    if a == NumericKind::Double || b == NumericKind::Double {
        return NumericKind::Double;
    }
    if a == NumericKind::Float || b == NumericKind::Float {
        return NumericKind::Float;
    }

    let a = promote(a);
    let b = promote(b);
    if a == b {
        return a;
    }

    // Same signedness: greater rank wins
    if a.is_signed() == b.is_signed() {
        return if a.rank() > b.rank() { a } else { b };
    }

    let (signed_op, unsigned_op) = if a.is_signed() { (a, b) } else { (b, a) };

    // Unsigned operand of greater or equal rank converts the signed one
    if unsigned_op.rank() >= signed_op.rank() {
        unsigned_op
    }
    // Signed type that can represent every unsigned value wins
    else if signed_op.info().min <= unsigned_op.info().min
        && signed_op.info().max >= unsigned_op.info().max
    {
        signed_op
    }
    // Fall back to the unsigned counterpart of the signed operand
    else {
        signed_op.to_unsigned()
    }
}

/// Map a set of declaration type-specifier lexemes to a numeric type.
///
/// `long` is scanned as a specifier but deliberately has no mapping, so
/// `long` declarations are diagnosed as an unknown specifier combination.
pub fn numeric_type_from_specifiers(specifiers: &BTreeSet<&str>) -> Option<NumericKind> {
    let key: Vec<&str> = specifiers.iter().copied().collect();
    // BTreeSet iteration is sorted, so each combination has one key
    match key.as_slice() {
        ["bool"] => Some(NumericKind::Bool),
        ["char"] | ["char", "signed"] => Some(NumericKind::Int8),
        ["char", "unsigned"] => Some(NumericKind::Uint8),
        ["short"] | ["int", "short"] | ["short", "signed"] | ["int", "short", "signed"] => {
            Some(NumericKind::Int16)
        }
        ["short", "unsigned"] | ["int", "short", "unsigned"] => Some(NumericKind::Uint16),
        ["int"] | ["signed"] | ["int", "signed"] => Some(NumericKind::Int32),
        ["unsigned"] | ["int", "unsigned"] => Some(NumericKind::Uint32),
        ["float"] => Some(NumericKind::Float),
        ["double"] => Some(NumericKind::Double),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [NumericKind; 9] = [
        NumericKind::Bool,
        NumericKind::Int8,
        NumericKind::Uint8,
        NumericKind::Int16,
        NumericKind::Uint16,
        NumericKind::Int32,
        NumericKind::Uint32,
        NumericKind::Float,
        NumericKind::Double,
    ];

    #[test]
    fn test_promote_idempotent() {
        for kind in ALL_KINDS {
            assert_eq!(promote(promote(kind)), promote(kind));
        }
    }

    #[test]
    fn test_promotion_targets() {
        assert_eq!(promote(NumericKind::Bool), NumericKind::Int32);
        assert_eq!(promote(NumericKind::Int8), NumericKind::Int32);
        assert_eq!(promote(NumericKind::Uint16), NumericKind::Int32);
        assert_eq!(promote(NumericKind::Uint32), NumericKind::Uint32);
        assert_eq!(promote(NumericKind::Float), NumericKind::Float);
        assert_eq!(promote(NumericKind::Double), NumericKind::Double);
    }

    #[test]
    fn test_common_type_commutative() {
        for a in ALL_KINDS {
            for b in ALL_KINDS {
                assert_eq!(common_type(a, b), common_type(b, a), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_common_type_rules() {
        assert_eq!(
            common_type(NumericKind::Int32, NumericKind::Double),
            NumericKind::Double
        );
        assert_eq!(
            common_type(NumericKind::Float, NumericKind::Uint32),
            NumericKind::Float
        );
        assert_eq!(
            common_type(NumericKind::Float, NumericKind::Double),
            NumericKind::Double
        );
        // Small integers promote before conversion
        assert_eq!(
            common_type(NumericKind::Int8, NumericKind::Uint16),
            NumericKind::Int32
        );
        // Unsigned wins at equal rank
        assert_eq!(
            common_type(NumericKind::Int32, NumericKind::Uint32),
            NumericKind::Uint32
        );
        assert_eq!(
            common_type(NumericKind::Bool, NumericKind::Bool),
            NumericKind::Int32
        );
    }

    #[test]
    fn test_specifier_lookup() {
        let set = |items: &[&'static str]| items.iter().copied().collect::<BTreeSet<&str>>();

        assert_eq!(
            numeric_type_from_specifiers(&set(&["int"])),
            Some(NumericKind::Int32)
        );
        assert_eq!(
            numeric_type_from_specifiers(&set(&["unsigned", "int"])),
            Some(NumericKind::Uint32)
        );
        assert_eq!(
            numeric_type_from_specifiers(&set(&["signed", "short", "int"])),
            Some(NumericKind::Int16)
        );
        assert_eq!(
            numeric_type_from_specifiers(&set(&["unsigned", "char"])),
            Some(NumericKind::Uint8)
        );
        assert_eq!(
            numeric_type_from_specifiers(&set(&["bool"])),
            Some(NumericKind::Bool)
        );
        assert_eq!(numeric_type_from_specifiers(&set(&["long"])), None);
        assert_eq!(numeric_type_from_specifiers(&set(&["double", "int"])), None);
    }
}
