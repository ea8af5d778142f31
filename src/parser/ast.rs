//! Abstract syntax tree
//!
//! Expressions and statements are closed tagged variants; every pass over
//! the tree is a function matching on the tag, so a missing case is a
//! compile error rather than a forgotten visitor override. Nodes own their
//! children and are never mutated after parsing.

use crate::parser::token::{LiteralValue, Token};
use crate::types::Type;

/// Expression nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric or boolean constant.
    Literal(LiteralValue),

    /// Reference to a binding; the token carries the name and line.
    Variable { name: Token },

    /// Parenthesised expression, kept so the pretty printer can reproduce
    /// the source shape.
    Grouping { inner: Box<Expr> },

    /// `+x`, `-x`, `~x`, `!x`, `*p`, `&x`.
    Unary { op: Token, operand: Box<Expr> },

    /// Arithmetic, comparison, bitwise and comma operators.
    Binary {
        left: Box<Expr>,
        op: Token,
        right: Box<Expr>,
    },

    /// `&&` and `||`; distinct from `Binary` because the right operand is
    /// evaluated conditionally.
    Logical {
        left: Box<Expr>,
        op: Token,
        right: Box<Expr>,
    },

    /// `cond ? then : else`.
    Conditional {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
        /// The `?` token, for diagnostics.
        question: Token,
    },

    /// Plain or compound assignment to a named binding.
    Assignment {
        name: Token,
        op: Token,
        value: Box<Expr>,
    },

    /// Call of a host-registered foreign function.
    Call {
        callee: Box<Expr>,
        /// The `)` token, for diagnostics.
        closing_paren: Token,
        arguments: Vec<Expr>,
    },

    /// `(type)expr`.
    Cast {
        target: Type,
        is_const: bool,
        /// The `)` closing the type name, for diagnostics.
        closing_paren: Token,
        expr: Box<Expr>,
    },

    /// `x++` / `x--`.
    PostfixIncDec { name: Token, op: Token },

    /// `++x` / `--x`.
    PrefixIncDec { name: Token, op: Token },

    /// `p[index]` where `p` names a pointer binding.
    ArraySubscript { name: Token, index: Box<Expr> },
}

/// Statement nodes. A program is a [`StatementList`].
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Brace-delimited block; introduces a lexical scope.
    Compound(StatementList),

    /// Expression evaluated for its side effects.
    Expression(Expr),

    /// Debug `print expr;`.
    Print(Expr),

    /// One declaration with one or more init declarators,
    /// e.g. `const int a = 1, b;`.
    VarDeclaration {
        ty: Type,
        is_const: bool,
        declarators: Vec<(Token, Option<Expr>)>,
    },

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    While {
        condition: Expr,
        body: Box<Stmt>,
    },

    Do {
        body: Box<Stmt>,
        condition: Expr,
    },

    /// All three clauses optional; the initialiser is a declaration or an
    /// expression statement and scopes to the loop.
    For {
        initialiser: Option<Box<Stmt>>,
        condition: Option<Expr>,
        increment: Option<Expr>,
        body: Box<Stmt>,
    },

    Switch {
        /// The `switch` keyword, for diagnostics.
        keyword: Token,
        condition: Expr,
        body: Box<Stmt>,
    },

    /// `case value:` (`value` present) or `default:` (`value` absent).
    Labelled {
        keyword: Token,
        value: Option<Expr>,
        body: Box<Stmt>,
    },

    Break { keyword: Token },

    Continue { keyword: Token },
}

pub type StatementList = Vec<Stmt>;

impl Expr {
    /// Strip grouping layers; assignment targets and inc/dec operands must
    /// resolve to a bare variable after folding.
    pub fn unwrap_grouping(&self) -> &Expr {
        match self {
            Expr::Grouping { inner } => inner.unwrap_grouping(),
            other => other,
        }
    }
}
