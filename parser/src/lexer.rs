//! Streaming lexer for Self source text.
//!
//! The [`Lexer`] consumes bytes from any [`std::io::Read`] source — a
//! file, `stdin`, or an in-memory buffer — and implements [`Iterator`]
//! over [`Token`]s, tracking byte offset, line and column throughout.
//!
//! Surface summary:
//!
//! | Syntax                  | Token                                   |
//! |-------------------------|-----------------------------------------|
//! | `42`, `-7`, `3.14`      | number (minus only when a digit follows)|
//! | `'text'`                | string, escapes `\b \f \n \r \t \' \\ \uXXXX` |
//! | `"text"`                | comment (skipped by the parser)         |
//! | `name`, `at:`, `:arg`   | identifier / keyword / argument name    |
//! | runs of `-+*/%!=<>~&|,` | operator                                |
//! | `( ) [ ] \| . ^ :`      | punctuators                             |

use std::io::Read;

use crate::span::{Pos, Span};
use crate::token::{Token, TokenKind};

/// Characters that may appear in binary operators.
///
/// `|` is included but special-cased: a lone `|` is the slot-list pipe
/// delimiter, while `|` followed by another operator character lexes as
/// an operator run.
fn is_op_char(c: u8) -> bool {
    matches!(
        c,
        b'-' | b'+'
            | b'*'
            | b'/'
            | b'%'
            | b'!'
            | b'='
            | b'<'
            | b'>'
            | b'~'
            | b'&'
            | b'|'
            | b','
    )
}

// ═══════════════════════════════════════════════════════════════════
// Read buffer — one-byte-at-a-time abstraction over Read
// ═══════════════════════════════════════════════════════════════════

/// Bytes of lookahead kept in the buffer: enough for two maximum-length
/// UTF-8 characters, the deepest peek the lexer needs.
const LOOKAHEAD: usize = 8;

/// Wrapper that gives `peek()` / `peek_ahead()` / `advance()` over any
/// `Read`, with position tracking.
struct ReadBuf<R: Read> {
    reader: R,
    buf: [u8; LOOKAHEAD],
    /// Valid bytes in `buf` starting from index 0.
    filled: usize,
    reader_eof: bool,
    offset: usize,
    line: usize,
    column: usize,
}

impl<R: Read> ReadBuf<R> {
    fn new(reader: R) -> Self {
        let mut rb = Self {
            reader,
            buf: [0u8; LOOKAHEAD],
            filled: 0,
            reader_eof: false,
            offset: 0,
            line: 1,
            column: 1,
        };
        rb.fill();
        rb
    }

    /// Top up the buffer from the reader.
    fn fill(&mut self) {
        while !self.reader_eof && self.filled < LOOKAHEAD {
            let mut one = [0u8; 1];
            match self.reader.read(&mut one) {
                Ok(0) | Err(_) => self.reader_eof = true,
                Ok(_) => {
                    self.buf[self.filled] = one[0];
                    self.filled += 1;
                }
            }
        }
    }

    fn pos(&self) -> Pos {
        Pos::new(self.offset, self.line, self.column)
    }

    fn peek(&self) -> Option<u8> {
        if self.filled > 0 {
            Some(self.buf[0])
        } else {
            None
        }
    }

    /// Peek `n` bytes ahead (`peek_ahead(0)` == `peek()`).
    fn peek_ahead(&self, n: usize) -> Option<u8> {
        if n < self.filled {
            Some(self.buf[n])
        } else {
            None
        }
    }

    fn advance(&mut self) -> Option<u8> {
        if self.filled == 0 {
            return None;
        }
        let b = self.buf[0];
        for i in 0..(self.filled - 1) {
            self.buf[i] = self.buf[i + 1];
        }
        self.filled -= 1;
        self.fill();

        self.offset += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(b)
    }

    /// Decode the leading UTF-8 character without consuming it. Invalid
    /// sequences decode as the replacement character with length 1.
    fn peek_char(&self) -> Option<(char, usize)> {
        if self.filled == 0 {
            return None;
        }
        let b0 = self.buf[0];
        let (expected_len, first_bits) = match b0 {
            0x00..=0x7F => return Some((b0 as char, 1)),
            0xC0..=0xDF => (2, (b0 & 0x1F) as u32),
            0xE0..=0xEF => (3, (b0 & 0x0F) as u32),
            0xF0..=0xF7 => (4, (b0 & 0x07) as u32),
            _ => return Some(('\u{FFFD}', 1)),
        };
        if expected_len > self.filled {
            return Some(('\u{FFFD}', 1));
        }
        let mut codepoint = first_bits;
        for i in 1..expected_len {
            let cont = self.buf[i];
            if cont & 0xC0 != 0x80 {
                return Some(('\u{FFFD}', 1));
            }
            codepoint = (codepoint << 6) | (cont & 0x3F) as u32;
        }
        match char::from_u32(codepoint) {
            Some(ch) => Some((ch, expected_len)),
            None => Some(('\u{FFFD}', 1)),
        }
    }

    /// Consume one full UTF-8 character.
    fn advance_char(&mut self) -> Option<char> {
        let (ch, len) = self.peek_char()?;
        for _ in 0..len {
            self.advance();
        }
        Some(ch)
    }
}

// ═══════════════════════════════════════════════════════════════════
// Lexer
// ═══════════════════════════════════════════════════════════════════

/// A streaming lexer over any [`Read`].
///
/// ```rust
/// use parser::{Lexer, TokenKind};
///
/// let kinds: Vec<TokenKind> =
///     Lexer::from_str("3 + 4").map(|t| t.kind).collect();
/// ```
pub struct Lexer<R: Read> {
    rb: ReadBuf<R>,
    emitted_eof: bool,
}

impl<R: Read> Lexer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            rb: ReadBuf::new(reader),
            emitted_eof: false,
        }
    }
}

impl<'a> Lexer<&'a [u8]> {
    /// Create a lexer directly from a source string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(source: &'a str) -> Self {
        Self::new(source.as_bytes())
    }
}

impl<R: Read> Lexer<R> {
    fn pos(&self) -> Pos {
        self.rb.pos()
    }

    fn peek(&self) -> Option<u8> {
        self.rb.peek()
    }

    fn peek_ahead(&self, n: usize) -> Option<u8> {
        self.rb.peek_ahead(n)
    }

    fn advance(&mut self) -> Option<u8> {
        self.rb.advance()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    // ───────────────────────────────────────────────────────────
    //  Strings:  '...' with escapes
    // ───────────────────────────────────────────────────────────

    fn lex_string(&mut self) -> Token {
        let start = self.pos();
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.peek() {
                None => {
                    return Token::new(
                        TokenKind::Error("unterminated string".into()),
                        Span::new(start, self.pos()),
                    );
                }
                Some(b'\'') => {
                    self.advance();
                    break;
                }
                Some(b'\\') => {
                    self.advance();
                    match self.rb.advance_char() {
                        Some('b') => value.push('\u{0008}'),
                        Some('f') => value.push('\u{000C}'),
                        Some('n') => value.push('\n'),
                        Some('r') => value.push('\r'),
                        Some('t') => value.push('\t'),
                        Some('\'') => value.push('\''),
                        Some('\\') => value.push('\\'),
                        Some('u') => match self.lex_unicode_escape() {
                            Some(ch) => value.push(ch),
                            None => {
                                return Token::new(
                                    TokenKind::Error(
                                        "invalid unicode escape".into(),
                                    ),
                                    Span::new(start, self.pos()),
                                );
                            }
                        },
                        // Unknown escapes yield the escaped character.
                        Some(other) => value.push(other),
                        None => {
                            return Token::new(
                                TokenKind::Error(
                                    "unterminated string escape".into(),
                                ),
                                Span::new(start, self.pos()),
                            );
                        }
                    }
                }
                Some(_) => match self.rb.advance_char() {
                    Some(ch) => value.push(ch),
                    None => break,
                },
            }
        }
        Token::new(TokenKind::Str(value), Span::new(start, self.pos()))
    }

    /// Four big-endian hex digits after `\u`.
    fn lex_unicode_escape(&mut self) -> Option<char> {
        let mut codepoint: u32 = 0;
        for _ in 0..4 {
            let digit = match self.peek()? {
                b @ b'0'..=b'9' => (b - b'0') as u32,
                b @ b'a'..=b'f' => 10 + (b - b'a') as u32,
                b @ b'A'..=b'F' => 10 + (b - b'A') as u32,
                _ => return None,
            };
            self.advance();
            codepoint = (codepoint << 4) | digit;
        }
        char::from_u32(codepoint)
    }

    // ───────────────────────────────────────────────────────────
    //  Comments:  "..." (no nesting, no escapes)
    // ───────────────────────────────────────────────────────────

    fn lex_comment(&mut self) -> Token {
        let start = self.pos();
        self.advance(); // opening quote
        let mut text = String::new();
        loop {
            match self.peek() {
                None => {
                    return Token::new(
                        TokenKind::Error("unterminated comment".into()),
                        Span::new(start, self.pos()),
                    );
                }
                Some(b'"') => {
                    self.advance();
                    break;
                }
                Some(_) => {
                    if let Some(ch) = self.rb.advance_char() {
                        text.push(ch);
                    }
                }
            }
        }
        Token::new(TokenKind::Comment(text), Span::new(start, self.pos()))
    }

    // ───────────────────────────────────────────────────────────
    //  Numbers:  [-]digits[.digits]
    // ───────────────────────────────────────────────────────────

    /// The leading `-` is consumed only when the caller has already seen
    /// a digit right behind it.
    fn lex_number(&mut self) -> Token {
        let start = self.pos();
        let mut raw = String::new();

        if self.peek() == Some(b'-') {
            raw.push('-');
            self.advance();
        }

        while let Some(b) = self.peek() {
            if b.is_ascii_digit() {
                raw.push(b as char);
                self.advance();
            } else {
                break;
            }
        }

        // A dot is part of the number only when a digit follows; this
        // keeps `3.` usable as a statement separator and `3 foo` chains
        // unambiguous.
        let mut is_float = false;
        if self.peek() == Some(b'.')
            && matches!(self.peek_ahead(1), Some(d) if d.is_ascii_digit())
        {
            is_float = true;
            raw.push('.');
            self.advance();
            while let Some(b) = self.peek() {
                if b.is_ascii_digit() {
                    raw.push(b as char);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        let span = Span::new(start, self.pos());
        if is_float {
            match raw.parse::<f64>() {
                Ok(v) => Token::new(TokenKind::Float(v), span),
                Err(e) => Token::new(
                    TokenKind::Error(format!("invalid float: {}", e)),
                    span,
                ),
            }
        } else {
            match raw.parse::<i64>() {
                Ok(v) => Token::new(TokenKind::Integer(v), span),
                Err(e) => Token::new(
                    TokenKind::Error(format!("invalid integer: {}", e)),
                    span,
                ),
            }
        }
    }

    // ───────────────────────────────────────────────────────────
    //  Identifiers, keywords, argument names
    // ───────────────────────────────────────────────────────────

    fn is_ident_start(ch: char) -> bool {
        ch.is_alphabetic() || ch == '_'
    }

    fn lex_identifier_or_keyword(&mut self) -> Token {
        let start = self.pos();
        let mut name = String::new();

        while let Some((ch, _)) = self.rb.peek_char() {
            if ch.is_alphanumeric() || ch == '_' {
                self.rb.advance_char();
                name.push(ch);
            } else {
                break;
            }
        }

        if self.peek() == Some(b':') {
            name.push(':');
            self.advance();
            return Token::new(
                TokenKind::Keyword(name),
                Span::new(start, self.pos()),
            );
        }

        Token::new(TokenKind::Identifier(name), Span::new(start, self.pos()))
    }

    /// `:identifier` — an argument-slot name.
    fn lex_arg_name(&mut self) -> Token {
        let start = self.pos();
        self.advance(); // consume ':'
        let mut name = String::new();
        while let Some((ch, _)) = self.rb.peek_char() {
            if ch.is_alphanumeric() || ch == '_' {
                self.rb.advance_char();
                name.push(ch);
            } else {
                break;
            }
        }
        Token::new(TokenKind::ArgName(name), Span::new(start, self.pos()))
    }

    // ───────────────────────────────────────────────────────────
    //  Operators
    // ───────────────────────────────────────────────────────────

    fn lex_operator(&mut self) -> Token {
        let start = self.pos();
        let mut raw = String::new();
        while let Some(b) = self.peek() {
            if is_op_char(b) {
                raw.push(b as char);
                self.advance();
            } else {
                break;
            }
        }
        Token::new(TokenKind::Operator(raw), Span::new(start, self.pos()))
    }

    // ───────────────────────────────────────────────────────────
    //  Main dispatch
    // ───────────────────────────────────────────────────────────

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.pos();
        let b = match self.peek() {
            Some(b) => b,
            None => {
                self.emitted_eof = true;
                return Token::new(TokenKind::Eof, Span::point(start));
            }
        };

        match b {
            b'\'' => self.lex_string(),
            b'"' => self.lex_comment(),

            b'(' => {
                self.advance();
                Token::new(TokenKind::LParen, Span::new(start, self.pos()))
            }
            b')' => {
                self.advance();
                Token::new(TokenKind::RParen, Span::new(start, self.pos()))
            }
            b'[' => {
                self.advance();
                Token::new(TokenKind::LBracket, Span::new(start, self.pos()))
            }
            b']' => {
                self.advance();
                Token::new(TokenKind::RBracket, Span::new(start, self.pos()))
            }
            b'.' => {
                self.advance();
                Token::new(TokenKind::Dot, Span::new(start, self.pos()))
            }
            b'^' => {
                self.advance();
                Token::new(TokenKind::Caret, Span::new(start, self.pos()))
            }

            // A lone pipe delimits slot lists; a pipe that starts an
            // operator run stays an operator.
            b'|' => {
                if self.peek_ahead(1).is_some_and(is_op_char) {
                    self.lex_operator()
                } else {
                    self.advance();
                    Token::new(TokenKind::Pipe, Span::new(start, self.pos()))
                }
            }

            b'-' => {
                if matches!(self.peek_ahead(1), Some(d) if d.is_ascii_digit()) {
                    self.lex_number()
                } else {
                    self.lex_operator()
                }
            }

            b'0'..=b'9' => self.lex_number(),

            b':' => {
                let follows_ident = match self.peek_ahead(1) {
                    Some(next) if next < 0x80 => {
                        Self::is_ident_start(next as char)
                    }
                    // Multi-byte UTF-8 lead byte: treat as a letter.
                    Some(next) => next >= 0xC0,
                    None => false,
                };
                if follows_ident {
                    self.lex_arg_name()
                } else {
                    self.advance();
                    Token::new(TokenKind::Colon, Span::new(start, self.pos()))
                }
            }

            _ if is_op_char(b) => self.lex_operator(),

            _ => {
                if let Some((ch, _)) = self.rb.peek_char() {
                    if Self::is_ident_start(ch) {
                        return self.lex_identifier_or_keyword();
                    }
                    self.rb.advance_char();
                    Token::new(
                        TokenKind::Error(format!(
                            "unexpected character: {:?}",
                            ch
                        )),
                        Span::new(start, self.pos()),
                    )
                } else {
                    self.advance();
                    Token::new(
                        TokenKind::Error("unexpected byte".into()),
                        Span::new(start, self.pos()),
                    )
                }
            }
        }
    }
}

impl<R: Read> Iterator for Lexer<R> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.emitted_eof {
            return None;
        }
        let tok = self.next_token();
        if tok.is_eof() {
            self.emitted_eof = true;
        }
        Some(tok)
    }
}

// ═══════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tokens(src: &str) -> Vec<Token> {
        Lexer::from_str(src).collect()
    }

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokens(src).into_iter().map(|t| t.kind).collect()
    }

    // ── Numbers ───────────────────────────────────────────────

    #[test]
    fn lex_integer() {
        assert_eq!(kinds("42"), vec![TokenKind::Integer(42), TokenKind::Eof]);
    }

    #[test]
    fn lex_negative_integer() {
        assert_eq!(kinds("-7"), vec![TokenKind::Integer(-7), TokenKind::Eof]);
    }

    #[test]
    fn lex_float() {
        assert_eq!(kinds("3.14"), vec![TokenKind::Float(3.14), TokenKind::Eof]);
        assert_eq!(kinds("-0.5"), vec![TokenKind::Float(-0.5), TokenKind::Eof]);
    }

    #[test]
    fn dot_without_digit_is_separator() {
        assert_eq!(
            kinds("3."),
            vec![TokenKind::Integer(3), TokenKind::Dot, TokenKind::Eof]
        );
    }

    #[test]
    fn minus_without_digit_is_operator() {
        assert_eq!(
            kinds("3 - 4"),
            vec![
                TokenKind::Integer(3),
                TokenKind::Operator("-".into()),
                TokenKind::Integer(4),
                TokenKind::Eof,
            ]
        );
    }

    // ── Strings ───────────────────────────────────────────────

    #[test]
    fn lex_string() {
        assert_eq!(
            kinds("'hello'"),
            vec![TokenKind::Str("hello".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn lex_string_escapes() {
        assert_eq!(
            kinds(r"'a\nb\t\''"),
            vec![TokenKind::Str("a\nb\t'".into()), TokenKind::Eof]
        );
        assert_eq!(
            kinds(r"'\b\f\r\\'"),
            vec![
                TokenKind::Str("\u{0008}\u{000C}\r\\".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lex_unicode_escape() {
        assert_eq!(
            kinds(r"'\u0041\u00e9'"),
            vec![TokenKind::Str("Aé".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn unknown_escape_passes_through() {
        assert_eq!(
            kinds(r"'\q'"),
            vec![TokenKind::Str("q".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn bad_unicode_escape_is_error() {
        let k = kinds(r"'\uZZ00'");
        assert!(matches!(k[0], TokenKind::Error(_)));
    }

    #[test]
    fn unterminated_string_is_error() {
        let k = kinds("'abc");
        assert!(matches!(k[0], TokenKind::Error(_)));
    }

    // ── Comments ──────────────────────────────────────────────

    #[test]
    fn lex_comment() {
        assert_eq!(
            kinds(r#"1 "a note" 2"#),
            vec![
                TokenKind::Integer(1),
                TokenKind::Comment("a note".into()),
                TokenKind::Integer(2),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_comment_is_error() {
        let k = kinds(r#""open"#);
        assert!(matches!(k[0], TokenKind::Error(_)));
    }

    // ── Identifiers & keywords ────────────────────────────────

    #[test]
    fn lex_identifiers_and_keywords() {
        assert_eq!(
            kinds("factorial"),
            vec![TokenKind::Identifier("factorial".into()), TokenKind::Eof]
        );
        assert_eq!(
            kinds("at:"),
            vec![TokenKind::Keyword("at:".into()), TokenKind::Eof]
        );
        assert_eq!(
            kinds("Put:"),
            vec![TokenKind::Keyword("Put:".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn lex_primitive_selector() {
        assert_eq!(
            kinds("_NumAdd:"),
            vec![TokenKind::Keyword("_NumAdd:".into()), TokenKind::Eof]
        );
        assert_eq!(
            kinds("_Clone"),
            vec![TokenKind::Identifier("_Clone".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn lex_arg_name() {
        assert_eq!(
            kinds(":name"),
            vec![TokenKind::ArgName("name".into()), TokenKind::Eof]
        );
    }

    // ── Operators & punctuators ───────────────────────────────

    #[test]
    fn lex_operators() {
        assert_eq!(
            kinds("+"),
            vec![TokenKind::Operator("+".into()), TokenKind::Eof]
        );
        assert_eq!(
            kinds("<-"),
            vec![TokenKind::Operator("<-".into()), TokenKind::Eof]
        );
        assert_eq!(
            kinds("!="),
            vec![TokenKind::Operator("!=".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn lone_pipe_is_delimiter() {
        assert_eq!(
            kinds("( | x | )"),
            vec![
                TokenKind::LParen,
                TokenKind::Pipe,
                TokenKind::Identifier("x".into()),
                TokenKind::Pipe,
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn pipe_before_ident_is_delimiter() {
        assert_eq!(
            kinds("|x|"),
            vec![
                TokenKind::Pipe,
                TokenKind::Identifier("x".into()),
                TokenKind::Pipe,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn caret_and_brackets() {
        assert_eq!(
            kinds("[^42]"),
            vec![
                TokenKind::LBracket,
                TokenKind::Caret,
                TokenKind::Integer(42),
                TokenKind::RBracket,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keyword_then_expression() {
        assert_eq!(
            kinds("x: x + 1"),
            vec![
                TokenKind::Keyword("x:".into()),
                TokenKind::Identifier("x".into()),
                TokenKind::Operator("+".into()),
                TokenKind::Integer(1),
                TokenKind::Eof,
            ]
        );
    }

    // ── Spans ─────────────────────────────────────────────────

    #[test]
    fn span_tracking() {
        let toks = tokens("ab cd");
        assert_eq!(toks[0].span.start.offset, 0);
        assert_eq!(toks[0].span.start.column, 1);
        assert_eq!(toks[1].span.start.offset, 3);
        assert_eq!(toks[1].span.start.column, 4);
    }

    #[test]
    fn span_multiline() {
        let toks = tokens("a\nb");
        assert_eq!(toks[0].span.start.line, 1);
        assert_eq!(toks[1].span.start.line, 2);
        assert_eq!(toks[1].span.start.column, 1);
    }

    // ── Streaming ─────────────────────────────────────────────

    #[test]
    fn lex_from_cursor() {
        let stream = Cursor::new(b"3 factorial" as &[u8]);
        let toks: Vec<_> = Lexer::new(stream).map(|t| t.kind).collect();
        assert_eq!(
            toks,
            vec![
                TokenKind::Integer(3),
                TokenKind::Identifier("factorial".into()),
                TokenKind::Eof,
            ]
        );
    }
}
