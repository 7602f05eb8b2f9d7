//! Abstract syntax tree for Self expressions.
//!
//! The parser yields a stream of [`Expr`] nodes, one per top-level
//! statement. Unary, binary and keyword sends all collapse into a single
//! [`ExprKind::Message`] node — the evaluator treats every send
//! uniformly, and an absent receiver encodes the implicit-self
//! convention.

use crate::span::Span;

/// An expression node with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The forms an expression can take.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Integer literal.
    Integer(i64),
    /// Floating-point literal.
    Float(f64),
    /// String literal.
    Str(String),

    /// A message send. `receiver: None` is an implicit-self send; bare
    /// names like `x` are unary implicit sends.
    Message {
        receiver: Option<Box<Expr>>,
        selector: String,
        args: Vec<Expr>,
    },

    /// A literal object: `( |slots| body )`. With a body it denotes a
    /// method; with slots only, a plain data object.
    Object {
        slots: Vec<SlotDescriptor>,
        body: Vec<Expr>,
    },

    /// A block literal: `[ |slots| body ]`.
    Block {
        slots: Vec<SlotDescriptor>,
        body: Vec<Expr>,
    },

    /// A non-local return: `^ expr`, only as the last statement of a
    /// block body.
    Return(Box<Expr>),
}

/// What kind of slot a [`SlotDescriptor`] declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotDeclKind {
    /// `name = expr` — also methods, when the initializer has a body.
    Constant,
    /// `name <- expr` or bare `name`.
    Data,
    /// `:name`.
    Argument,
}

/// One slot declaration inside an object or block literal.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotDescriptor {
    /// Canonical selector: `x`, `+`, or `at:Put:`.
    pub name: String,
    /// Inline parameter names for keyword/operator selectors,
    /// e.g. `[x, y]` for `at: x Put: y = (…)`.
    pub params: Vec<String>,
    pub kind: SlotDeclKind,
    /// `*` suffix.
    pub is_parent: bool,
    /// Initializer expression; `None` for a bare data slot (`nil`) or a
    /// plain argument slot.
    pub init: Option<Expr>,
    pub span: Span,
}
