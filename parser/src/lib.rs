//! # parser
//!
//! A streaming lexer and recursive-descent parser for Self source text.
//!
//! ```text
//!  impl Read (file, stdin, &[u8], …)
//!      │
//!      ▼
//!  ┌────────┐    Token stream     ┌────────┐    Expr stream
//!  │ Lexer  │ ──────────────────▶ │ Parser │ ──────────────────▶
//!  └────────┘  (impl Iterator)    └────────┘  (impl Iterator)
//! ```
//!
//! The parser knows nothing about the runtime: it produces a plain AST.
//! Lowering to code nodes — including the parse-time evaluation of
//! computed slot initializers — lives in the `vm` crate, where the
//! evaluator is available.
//!
//! ```rust
//! use parser::{Lexer, Parser};
//!
//! let lexer = Lexer::from_str("3 + 4 * 2");
//! for result in Parser::new(lexer) {
//!     match result {
//!         Ok(expr) => println!("{:#?}", expr),
//!         Err(err) => eprintln!("{}", err),
//!     }
//! }
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod token;

pub use ast::{Expr, ExprKind, SlotDeclKind, SlotDescriptor};
pub use lexer::Lexer;
pub use parser::{ParseError, Parser};
pub use span::{Pos, Span};
pub use token::{Token, TokenKind};

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::lexer::Lexer;
    use crate::parser::{ParseError, Parser};

    fn parse(src: &str) -> Vec<Result<Expr, ParseError>> {
        Parser::new(Lexer::from_str(src)).collect()
    }

    fn parse_ok(src: &str) -> Vec<Expr> {
        parse(src)
            .into_iter()
            .map(|r| r.expect("parse error"))
            .collect()
    }

    fn parse_one(src: &str) -> Expr {
        let mut exprs = parse_ok(src);
        assert_eq!(exprs.len(), 1, "expected 1 expr, got {}", exprs.len());
        exprs.remove(0)
    }

    fn first_error(src: &str) -> ParseError {
        parse(src)
            .into_iter()
            .find_map(|r| r.err())
            .expect("expected a parse error")
    }

    // ── Literals ──────────────────────────────────────────────

    #[test]
    fn integer() {
        assert!(matches!(parse_one("42").kind, ExprKind::Integer(42)));
    }

    #[test]
    fn negative_float() {
        assert!(matches!(
            parse_one("-2.5").kind,
            ExprKind::Float(v) if (v + 2.5).abs() < 1e-12
        ));
    }

    #[test]
    fn string() {
        assert!(matches!(
            parse_one("'hi'").kind,
            ExprKind::Str(ref s) if s == "hi"
        ));
    }

    // ── Unary ─────────────────────────────────────────────────

    #[test]
    fn bare_name_is_implicit_send() {
        let e = parse_one("x");
        match &e.kind {
            ExprKind::Message {
                receiver,
                selector,
                args,
            } => {
                assert!(receiver.is_none());
                assert_eq!(selector, "x");
                assert!(args.is_empty());
            }
            _ => panic!("expected message"),
        }
    }

    #[test]
    fn unary_chain() {
        let e = parse_one("5 factorial printString");
        match &e.kind {
            ExprKind::Message {
                receiver, selector, ..
            } => {
                assert_eq!(selector, "printString");
                let receiver = receiver.as_ref().expect("explicit receiver");
                assert!(matches!(
                    receiver.kind,
                    ExprKind::Message { ref selector, .. }
                        if selector == "factorial"
                ));
            }
            _ => panic!("expected message"),
        }
    }

    // ── Binary: strict left-to-right, no precedence ───────────

    #[test]
    fn binary() {
        let e = parse_one("3 + 4");
        match &e.kind {
            ExprKind::Message {
                receiver,
                selector,
                args,
            } => {
                assert_eq!(selector, "+");
                assert!(matches!(
                    receiver.as_ref().unwrap().kind,
                    ExprKind::Integer(3)
                ));
                assert!(matches!(args[0].kind, ExprKind::Integer(4)));
            }
            _ => panic!("expected message"),
        }
    }

    #[test]
    fn binary_is_left_to_right_without_precedence() {
        // `1 + 2 * 3` must parse as `(1 + 2) * 3`.
        let e = parse_one("1 + 2 * 3");
        match &e.kind {
            ExprKind::Message {
                receiver,
                selector,
                args,
            } => {
                assert_eq!(selector, "*");
                assert!(matches!(args[0].kind, ExprKind::Integer(3)));
                match &receiver.as_ref().unwrap().kind {
                    ExprKind::Message { selector, .. } => {
                        assert_eq!(selector, "+");
                    }
                    _ => panic!("expected nested binary"),
                }
            }
            _ => panic!("expected message"),
        }
    }

    #[test]
    fn unary_binds_tighter_than_binary() {
        let e = parse_one("3 factorial + 4");
        match &e.kind {
            ExprKind::Message { selector, .. } => assert_eq!(selector, "+"),
            _ => panic!("expected message"),
        }
    }

    #[test]
    fn leading_operator_is_error() {
        let err = first_error("+ 3");
        assert!(err.message.contains("explicit receiver"));
    }

    // ── Keyword messages ──────────────────────────────────────

    #[test]
    fn keyword_message_with_continuation() {
        let e = parse_one("'abc' from: 1 To: 2");
        match &e.kind {
            ExprKind::Message {
                receiver,
                selector,
                args,
            } => {
                assert_eq!(selector, "from:To:");
                assert_eq!(args.len(), 2);
                assert!(matches!(
                    receiver.as_ref().unwrap().kind,
                    ExprKind::Str(_)
                ));
            }
            _ => panic!("expected message"),
        }
    }

    #[test]
    fn implicit_keyword_send() {
        let e = parse_one("x: 5");
        match &e.kind {
            ExprKind::Message {
                receiver,
                selector,
                args,
            } => {
                assert!(receiver.is_none());
                assert_eq!(selector, "x:");
                assert_eq!(args.len(), 1);
            }
            _ => panic!("expected message"),
        }
    }

    #[test]
    fn lowercase_keyword_chains_on_result() {
        // `5 min: 4 max: 7` = `(5 min: 4) max: 7` — a lowercase part
        // starts a fresh group.
        let e = parse_one("5 min: 4 max: 7");
        match &e.kind {
            ExprKind::Message {
                receiver, selector, ..
            } => {
                assert_eq!(selector, "max:");
                match &receiver.as_ref().unwrap().kind {
                    ExprKind::Message { selector, .. } => {
                        assert_eq!(selector, "min:");
                    }
                    _ => panic!("expected inner keyword message"),
                }
            }
            _ => panic!("expected message"),
        }
    }

    #[test]
    fn keyword_argument_is_binary_level() {
        let e = parse_one("true ifTrue: 1 + 2 False: 3");
        match &e.kind {
            ExprKind::Message {
                selector, args, ..
            } => {
                assert_eq!(selector, "ifTrue:False:");
                assert!(matches!(
                    args[0].kind,
                    ExprKind::Message { ref selector, .. } if selector == "+"
                ));
            }
            _ => panic!("expected message"),
        }
    }

    #[test]
    fn uppercase_keyword_cannot_open_a_message() {
        let err = first_error("Put: 3");
        assert!(err.message.contains("lowercase"));
    }

    // ── Objects ───────────────────────────────────────────────

    #[test]
    fn empty_object() {
        let e = parse_one("()");
        match &e.kind {
            ExprKind::Object { slots, body } => {
                assert!(slots.is_empty());
                assert!(body.is_empty());
            }
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn parenthesized_expression_is_object_with_body() {
        let e = parse_one("(3 + 4)");
        match &e.kind {
            ExprKind::Object { slots, body } => {
                assert!(slots.is_empty());
                assert_eq!(body.len(), 1);
            }
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn object_with_slots_only() {
        let e = parse_one("(| x <- 0. m = 3 |)");
        match &e.kind {
            ExprKind::Object { slots, body } => {
                assert_eq!(slots.len(), 2);
                assert!(body.is_empty());

                assert_eq!(slots[0].name, "x");
                assert_eq!(slots[0].kind, SlotDeclKind::Data);
                assert!(slots[0].init.is_some());

                assert_eq!(slots[1].name, "m");
                assert_eq!(slots[1].kind, SlotDeclKind::Constant);
            }
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn bare_slot_is_empty_data_slot() {
        let e = parse_one("(| a |)");
        match &e.kind {
            ExprKind::Object { slots, .. } => {
                assert_eq!(slots.len(), 1);
                assert_eq!(slots[0].kind, SlotDeclKind::Data);
                assert!(slots[0].init.is_none());
            }
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn parent_slot_star() {
        let e = parse_one("(| p* = traitsBlock |)");
        match &e.kind {
            ExprKind::Object { slots, .. } => {
                assert!(slots[0].is_parent);
                assert_eq!(slots[0].kind, SlotDeclKind::Constant);
            }
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn argument_slot() {
        let e = parse_one("(| :x. y | x)");
        match &e.kind {
            ExprKind::Object { slots, body } => {
                assert_eq!(slots[0].kind, SlotDeclKind::Argument);
                assert_eq!(slots[0].name, "x");
                assert_eq!(slots[1].kind, SlotDeclKind::Data);
                assert_eq!(body.len(), 1);
            }
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn keyword_slot_with_inline_params() {
        let e = parse_one("(| at: x Put: y = (x) |)");
        match &e.kind {
            ExprKind::Object { slots, .. } => {
                assert_eq!(slots[0].name, "at:Put:");
                assert_eq!(slots[0].params, vec!["x", "y"]);
                assert_eq!(slots[0].kind, SlotDeclKind::Constant);
            }
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn operator_slot() {
        let e = parse_one("(| + n = (n) |)");
        match &e.kind {
            ExprKind::Object { slots, .. } => {
                assert_eq!(slots[0].name, "+");
                assert_eq!(slots[0].params, vec!["n"]);
            }
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn inconsistent_inline_params_rejected() {
        let err = first_error("(| at: x Put: = 3 |)");
        assert!(err.message.contains("inconsistent inline parameter"));
    }

    #[test]
    fn data_slot_with_params_rejected() {
        let err = first_error("(| at: x <- 3 |)");
        assert!(err.message.contains("cannot take inline parameters"));
    }

    #[test]
    fn argument_slot_cannot_be_data() {
        let err = first_error("(| :x <- 3 |)");
        assert!(err.message.contains("argument slot"));
    }

    #[test]
    fn unterminated_object_is_error() {
        assert!(parse("(3 + 4").iter().any(|r| r.is_err()));
        assert!(parse("(| x <- 1").iter().any(|r| r.is_err()));
    }

    // ── Blocks ────────────────────────────────────────────────

    #[test]
    fn empty_block() {
        let e = parse_one("[]");
        match &e.kind {
            ExprKind::Block { slots, body } => {
                assert!(slots.is_empty());
                assert!(body.is_empty());
            }
            _ => panic!("expected block"),
        }
    }

    #[test]
    fn block_with_argument() {
        let e = parse_one("[ | :each | each printString ]");
        match &e.kind {
            ExprKind::Block { slots, body } => {
                assert_eq!(slots[0].kind, SlotDeclKind::Argument);
                assert_eq!(body.len(), 1);
            }
            _ => panic!("expected block"),
        }
    }

    #[test]
    fn return_must_end_block() {
        let e = parse_one("[^42]");
        match &e.kind {
            ExprKind::Block { body, .. } => {
                assert!(matches!(body[0].kind, ExprKind::Return(_)));
            }
            _ => panic!("expected block"),
        }

        let e = parse_one("[^42.]");
        assert!(matches!(e.kind, ExprKind::Block { .. }));

        let err = first_error("[^42. 1]");
        assert!(err.message.contains("last statement"));
    }

    #[test]
    fn return_in_method_body_is_error() {
        // The token after `^ expr [.]` must be `]`.
        assert!(parse("(^42)").iter().any(|r| r.is_err()));
    }

    #[test]
    fn return_nested_in_expression_is_error() {
        let err = first_error("[foo: ^1]");
        assert!(err.message.contains("^"));
    }

    // ── Statements ────────────────────────────────────────────

    #[test]
    fn multiple_statements() {
        let exprs = parse_ok("3 + 4. 5 factorial. ");
        assert_eq!(exprs.len(), 2);
    }

    #[test]
    fn missing_dot_between_statements() {
        // Two primaries in a row cannot form one message.
        assert!(parse("1 2").iter().any(|r| r.is_err()));
    }

    #[test]
    fn comments_are_skipped() {
        let exprs = parse_ok("\"doc\" 3 + \"inline\" 4");
        assert_eq!(exprs.len(), 1);
        assert!(matches!(
            exprs[0].kind,
            ExprKind::Message { ref selector, .. } if selector == "+"
        ));
    }

    // ── Error display ─────────────────────────────────────────

    #[test]
    fn error_displays_offset() {
        let err = first_error("(|");
        let text = err.to_string();
        assert!(text.starts_with("SyntaxError: "), "got {}", text);
        assert!(text.contains(" at "), "got {}", text);
    }
}
