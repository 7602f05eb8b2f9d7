use crate::span::Span;

/// The kind of a lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Integer literal, e.g. `42`, `-7`.
    Integer(i64),
    /// Floating-point literal, e.g. `3.14`, `-0.5`.
    Float(f64),
    /// Single-quoted string literal (contents with escapes resolved).
    Str(String),

    /// An identifier, e.g. `factorial`, `x`, `_NumToString`.
    Identifier(String),
    /// A keyword (identifier + colon), e.g. `at:`, `Put:`, `_NumAdd:`.
    /// The case of the first character decides whether it can open a
    /// keyword message or only continue one.
    Keyword(String),
    /// An argument name (colon + identifier), e.g. `:x`.
    ArgName(String),

    /// A run of operator characters, e.g. `+`, `<-`, `!=`.
    Operator(String),

    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `|` — slot list delimiter.
    Pipe,
    /// `.` — statement / slot separator.
    Dot,
    /// `^` — non-local return.
    Caret,
    /// A stray `:` not forming an argument name.
    Colon,

    /// A double-quoted comment (text without delimiters). Skipped by
    /// the parser.
    Comment(String),

    /// End of input.
    Eof,
    /// An unrecognized character or malformed token.
    Error(String),
}

impl TokenKind {
    /// Human-readable name for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Identifier(_) => "identifier",
            Self::Keyword(_) => "keyword",
            Self::ArgName(_) => "argument name",
            Self::Operator(_) => "operator",
            Self::LParen => "`(`",
            Self::RParen => "`)`",
            Self::LBracket => "`[`",
            Self::RBracket => "`]`",
            Self::Pipe => "`|`",
            Self::Dot => "`.`",
            Self::Caret => "`^`",
            Self::Colon => "`:`",
            Self::Comment(_) => "comment",
            Self::Eof => "end of input",
            Self::Error(_) => "invalid token",
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Self::Comment(_))
    }
}

/// A token with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}
