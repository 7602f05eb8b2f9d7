use crate::ast::{Expr, ExprKind, SlotDeclKind, SlotDescriptor};
use crate::span::{Pos, Span};
use crate::token::{Token, TokenKind};

/// A parse failure. Displays as `SyntaxError: <message> at <offset>`
/// with a zero-based offset into the source.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SyntaxError: {} at {}", self.message, self.span.start)
    }
}

impl std::error::Error for ParseError {}

/// True for keyword parts that may open a keyword message (`at:`,
/// `_NumAdd:`); subsequent parts must be uppercase-initial (`Put:`).
fn is_first_part(keyword: &str) -> bool {
    !keyword.chars().next().is_some_and(|c| c.is_uppercase())
}

fn is_continuation_part(keyword: &str) -> bool {
    keyword.chars().next().is_some_and(|c| c.is_uppercase())
}

/// Recursive-descent parser over a token stream.
///
/// Implements [`Iterator`] over top-level statements: `message { "."
/// message } [ "." ]`. Comments are skipped wholesale.
pub struct Parser<I: Iterator<Item = Token>> {
    tokens: std::iter::Peekable<I>,
    last_span: Span,
    at_eof: bool,
}

impl<I: Iterator<Item = Token>> Parser<I> {
    pub fn new(tokens: I) -> Self {
        Self {
            tokens: tokens.peekable(),
            last_span: Span::point(Pos::origin()),
            at_eof: false,
        }
    }

    // ── Token plumbing ─────────────────────────────────────────

    fn skip_comments(&mut self) {
        while matches!(self.tokens.peek(), Some(t) if t.kind.is_comment()) {
            let tok = self.tokens.next().expect("peeked token exists");
            self.last_span = tok.span;
        }
    }

    fn peek_kind(&mut self) -> &TokenKind {
        self.skip_comments();
        match self.tokens.peek() {
            Some(tok) => &tok.kind,
            None => &TokenKind::Eof,
        }
    }

    fn peek_span(&mut self) -> Span {
        self.skip_comments();
        match self.tokens.peek() {
            Some(tok) => tok.span,
            None => self.last_span,
        }
    }

    fn advance(&mut self) -> Token {
        self.skip_comments();
        match self.tokens.next() {
            Some(tok) => {
                self.last_span = tok.span;
                if tok.is_eof() {
                    self.at_eof = true;
                }
                tok
            }
            None => {
                self.at_eof = true;
                Token::new(TokenKind::Eof, self.last_span)
            }
        }
    }

    fn check(&mut self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek_kind()) == std::mem::discriminant(kind)
    }

    fn expect(&mut self, expected: &TokenKind) -> Result<Token, ParseError> {
        let tok = self.advance();
        if std::mem::discriminant(&tok.kind) == std::mem::discriminant(expected)
        {
            Ok(tok)
        } else if let TokenKind::Error(message) = &tok.kind {
            Err(ParseError::new(message.clone(), tok.span))
        } else {
            Err(ParseError::new(
                format!(
                    "expected {}, found {}",
                    expected.name(),
                    tok.kind.name()
                ),
                tok.span,
            ))
        }
    }

    // ── message = binary { kw1 binary { kw2 binary } } ─────────

    pub fn parse_message(&mut self) -> Result<Expr, ParseError> {
        let mut expr: Option<Expr> = None;

        let opens_with_keyword = matches!(
            self.peek_kind(),
            TokenKind::Keyword(kw) if is_first_part(kw)
        );
        if !opens_with_keyword {
            expr = Some(self.parse_binary()?);
        }

        // Each lowercase-initial keyword group sends to the accumulated
        // receiver; the first group of a statement may be implicit.
        while matches!(
            self.peek_kind(),
            TokenKind::Keyword(kw) if is_first_part(kw)
        ) {
            let start =
                expr.as_ref().map(|e| e.span).unwrap_or(self.peek_span());
            let (selector, args, end) = self.parse_keyword_group()?;
            expr = Some(Expr::new(
                ExprKind::Message {
                    receiver: expr.map(Box::new),
                    selector,
                    args,
                },
                start.merge(end),
            ));
        }

        Ok(expr.expect("message always produces an expression"))
    }

    /// One keyword group: a lowercase-initial part plus uppercase
    /// continuations, each with a binary-level argument.
    fn parse_keyword_group(
        &mut self,
    ) -> Result<(String, Vec<Expr>, Span), ParseError> {
        let first = self.advance();
        let mut selector = match first.kind {
            TokenKind::Keyword(kw) => kw,
            _ => unreachable!("caller checked for a keyword"),
        };
        let mut args = Vec::new();
        let arg = self.parse_binary()?;
        let mut end = arg.span;
        args.push(arg);

        while matches!(
            self.peek_kind(),
            TokenKind::Keyword(kw) if is_continuation_part(kw)
        ) {
            let tok = self.advance();
            match tok.kind {
                TokenKind::Keyword(kw) => selector.push_str(&kw),
                _ => unreachable!(),
            }
            let arg = self.parse_binary()?;
            end = arg.span;
            args.push(arg);
        }

        Ok((selector, args, end))
    }

    // ── binary = unary { OP unary } — strict left-to-right ─────

    fn parse_binary(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        while let TokenKind::Operator(op) = self.peek_kind().clone() {
            self.advance();
            let right = self.parse_unary()?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Message {
                    receiver: Some(Box::new(left)),
                    selector: op,
                    args: vec![right],
                },
                span,
            );
        }
        Ok(left)
    }

    // ── unary = primary { NAME } ───────────────────────────────

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        while let TokenKind::Identifier(name) = self.peek_kind().clone() {
            let tok = self.advance();
            let span = expr.span.merge(tok.span);
            expr = Expr::new(
                ExprKind::Message {
                    receiver: Some(Box::new(expr)),
                    selector: name,
                    args: vec![],
                },
                span,
            );
        }
        Ok(expr)
    }

    // ── primary ────────────────────────────────────────────────

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Integer(v) => {
                let t = self.advance();
                Ok(Expr::new(ExprKind::Integer(v), t.span))
            }
            TokenKind::Float(v) => {
                let t = self.advance();
                Ok(Expr::new(ExprKind::Float(v), t.span))
            }
            TokenKind::Str(s) => {
                let t = self.advance();
                Ok(Expr::new(ExprKind::Str(s), t.span))
            }
            // A bare name is an implicit-self unary send.
            TokenKind::Identifier(name) => {
                let t = self.advance();
                Ok(Expr::new(
                    ExprKind::Message {
                        receiver: None,
                        selector: name,
                        args: vec![],
                    },
                    t.span,
                ))
            }
            TokenKind::LParen => self.parse_object(),
            TokenKind::LBracket => self.parse_block(),
            TokenKind::Caret => Err(ParseError::new(
                "`^` is only allowed as the last statement of a block",
                self.peek_span(),
            )),
            TokenKind::Keyword(_) => Err(ParseError::new(
                "keyword message must begin with a lowercase keyword part",
                self.peek_span(),
            )),
            TokenKind::Operator(_) => Err(ParseError::new(
                "binary message needs an explicit receiver",
                self.peek_span(),
            )),
            TokenKind::Error(message) => {
                let t = self.advance();
                Err(ParseError::new(message, t.span))
            }
            TokenKind::Eof => Err(ParseError::new(
                "unexpected end of input",
                self.peek_span(),
            )),
            other => {
                let t = self.advance();
                Err(ParseError::new(
                    format!("unexpected token: {}", other.name()),
                    t.span,
                ))
            }
        }
    }

    // ── object = "(" [slots] [body] ")",  block likewise ───────

    fn parse_object(&mut self) -> Result<Expr, ParseError> {
        let open = self.advance();
        let slots = self.parse_optional_slot_list()?;
        let body = self.parse_body()?;
        let close = self.expect(&TokenKind::RParen)?;
        Ok(Expr::new(
            ExprKind::Object { slots, body },
            open.span.merge(close.span),
        ))
    }

    fn parse_block(&mut self) -> Result<Expr, ParseError> {
        let open = self.advance();
        let slots = self.parse_optional_slot_list()?;
        let body = self.parse_body()?;
        let close = self.expect(&TokenKind::RBracket)?;
        Ok(Expr::new(
            ExprKind::Block { slots, body },
            open.span.merge(close.span),
        ))
    }

    // ── slots = "|" slot { "." slot } [ "." ] "|" ──────────────

    fn parse_optional_slot_list(
        &mut self,
    ) -> Result<Vec<SlotDescriptor>, ParseError> {
        if !self.check(&TokenKind::Pipe) {
            return Ok(Vec::new());
        }
        self.advance();

        let mut slots = Vec::new();
        loop {
            if self.check(&TokenKind::Pipe) {
                self.advance();
                break;
            }
            if self.check(&TokenKind::Eof) {
                return Err(ParseError::new(
                    "unterminated slot list",
                    self.peek_span(),
                ));
            }
            slots.push(self.parse_slot()?);
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.advance();
                }
                TokenKind::Pipe => {
                    self.advance();
                    break;
                }
                other => {
                    return Err(ParseError::new(
                        format!(
                            "expected `.` or `|` in slot list, found {}",
                            other.name()
                        ),
                        self.peek_span(),
                    ));
                }
            }
        }
        Ok(slots)
    }

    /// `slot = [":"] selector ["*"] [ ("=" message) | ("<-" message) ]`
    fn parse_slot(&mut self) -> Result<SlotDescriptor, ParseError> {
        let start = self.peek_span();
        match self.peek_kind().clone() {
            // Argument slot.
            TokenKind::ArgName(name) => {
                self.advance();
                let is_parent = self.eat_parent_star();
                if self.peek_is_operator("<-") {
                    return Err(ParseError::new(
                        "an argument slot cannot be a data slot",
                        self.peek_span(),
                    ));
                }
                let init = if self.peek_is_operator("=") {
                    self.advance();
                    Some(self.parse_message()?)
                } else {
                    None
                };
                let end = init.as_ref().map(|e| e.span).unwrap_or(start);
                Ok(SlotDescriptor {
                    name,
                    params: vec![],
                    kind: SlotDeclKind::Argument,
                    is_parent,
                    init,
                    span: start.merge(end),
                })
            }

            // Unary selector.
            TokenKind::Identifier(name) => {
                self.advance();
                let is_parent = self.eat_parent_star();
                match self.peek_kind().clone() {
                    TokenKind::Operator(op) if op == "=" => {
                        self.advance();
                        let init = self.parse_message()?;
                        let span = start.merge(init.span);
                        Ok(SlotDescriptor {
                            name,
                            params: vec![],
                            kind: SlotDeclKind::Constant,
                            is_parent,
                            init: Some(init),
                            span,
                        })
                    }
                    TokenKind::Operator(op) if op == "<-" => {
                        self.advance();
                        let init = self.parse_message()?;
                        let span = start.merge(init.span);
                        Ok(SlotDescriptor {
                            name,
                            params: vec![],
                            kind: SlotDeclKind::Data,
                            is_parent,
                            init: Some(init),
                            span,
                        })
                    }
                    // Bare name: empty data slot, initialized to nil.
                    TokenKind::Dot | TokenKind::Pipe => Ok(SlotDescriptor {
                        name,
                        params: vec![],
                        kind: SlotDeclKind::Data,
                        is_parent,
                        init: None,
                        span: start,
                    }),
                    other => Err(ParseError::new(
                        format!(
                            "expected `=`, `<-`, `.` or `|` after slot \
                             name, found {}",
                            other.name()
                        ),
                        self.peek_span(),
                    )),
                }
            }

            // Operator selector: `+ n = (…)`.
            TokenKind::Operator(op) => {
                self.advance();
                let mut params = Vec::new();
                if let TokenKind::Identifier(param) = self.peek_kind().clone()
                {
                    self.advance();
                    params.push(param);
                }
                self.finish_selector_slot(start, op, params)
            }

            // Keyword selector: `at: x Put: y = (…)`.
            TokenKind::Keyword(first) => {
                if !is_first_part(&first) {
                    return Err(ParseError::new(
                        "keyword slot must begin with a lowercase keyword \
                         part",
                        self.peek_span(),
                    ));
                }
                self.advance();
                let mut selector = first;
                let mut params = Vec::new();
                let mut part_count = 1usize;

                if let TokenKind::Identifier(param) = self.peek_kind().clone()
                {
                    self.advance();
                    params.push(param);
                }

                while matches!(
                    self.peek_kind(),
                    TokenKind::Keyword(kw) if is_continuation_part(kw)
                ) {
                    let tok = self.advance();
                    match tok.kind {
                        TokenKind::Keyword(kw) => selector.push_str(&kw),
                        _ => unreachable!(),
                    }
                    part_count += 1;
                    if let TokenKind::Identifier(param) =
                        self.peek_kind().clone()
                    {
                        self.advance();
                        params.push(param);
                    }
                }

                if !params.is_empty() && params.len() != part_count {
                    return Err(ParseError::new(
                        "inconsistent inline parameter lists across \
                         keyword parts",
                        self.peek_span(),
                    ));
                }

                self.finish_selector_slot(start, selector, params)
            }

            other => Err(ParseError::new(
                format!("unexpected token in slot list: {}", other.name()),
                self.peek_span(),
            )),
        }
    }

    /// Shared tail of operator- and keyword-selector slots: the `=` or
    /// `<-` marker plus the initializer.
    fn finish_selector_slot(
        &mut self,
        start: Span,
        name: String,
        params: Vec<String>,
    ) -> Result<SlotDescriptor, ParseError> {
        if self.peek_is_operator("<-") {
            if !params.is_empty() {
                return Err(ParseError::new(
                    "a data slot cannot take inline parameters",
                    self.peek_span(),
                ));
            }
            self.advance();
            let init = self.parse_message()?;
            let span = start.merge(init.span);
            return Ok(SlotDescriptor {
                name,
                params,
                kind: SlotDeclKind::Data,
                is_parent: false,
                init: Some(init),
                span,
            });
        }

        if !self.peek_is_operator("=") {
            return Err(ParseError::new(
                format!(
                    "expected `=` after slot selector, found {}",
                    self.peek_kind().name()
                ),
                self.peek_span(),
            ));
        }
        self.advance();
        let init = self.parse_message()?;
        let span = start.merge(init.span);
        Ok(SlotDescriptor {
            name,
            params,
            kind: SlotDeclKind::Constant,
            is_parent: false,
            init: Some(init),
            span,
        })
    }

    fn eat_parent_star(&mut self) -> bool {
        if self.peek_is_operator("*") {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek_is_operator(&mut self, op: &str) -> bool {
        matches!(self.peek_kind(), TokenKind::Operator(o) if o == op)
    }

    // ── body = { message "." } [ "^" message [ "." ] ] ─────────

    fn parse_body(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut body = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::RParen | TokenKind::RBracket | TokenKind::Eof => {
                    break;
                }
                TokenKind::Caret => {
                    let caret = self.advance();
                    let expr = self.parse_message()?;
                    let span = caret.span.merge(expr.span);
                    body.push(Expr::new(
                        ExprKind::Return(Box::new(expr)),
                        span,
                    ));
                    if self.check(&TokenKind::Dot) {
                        self.advance();
                    }
                    // A non-local return must be the last statement of
                    // a block body.
                    if !self.check(&TokenKind::RBracket) {
                        return Err(ParseError::new(
                            "`^` must be the last statement of a block",
                            self.peek_span(),
                        ));
                    }
                    break;
                }
                _ => {
                    body.push(self.parse_message()?);
                    if self.check(&TokenKind::Dot) {
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
        }
        Ok(body)
    }
}

/// Top-level statements: `message { "." message } [ "." ] END`.
impl<I: Iterator<Item = Token>> Iterator for Parser<I> {
    type Item = Result<Expr, ParseError>;

    fn next(&mut self) -> Option<Result<Expr, ParseError>> {
        if self.at_eof {
            return None;
        }
        while self.check(&TokenKind::Dot) {
            self.advance();
        }
        if self.check(&TokenKind::Eof) {
            self.at_eof = true;
            return None;
        }
        let expr = match self.parse_message() {
            Ok(expr) => expr,
            Err(err) => {
                self.at_eof = true;
                return Some(Err(err));
            }
        };
        if !self.check(&TokenKind::Dot) && !self.check(&TokenKind::Eof) {
            self.at_eof = true;
            return Some(Err(ParseError::new(
                format!(
                    "expected `.` between statements, found {}",
                    self.peek_kind().name()
                ),
                self.peek_span(),
            )));
        }
        Some(Ok(expr))
    }
}
