use std::fmt;
use std::rc::Rc;

use crate::{ObjHandle, Value};

/// One node of a compiled method body.
///
/// Methods carry an ordered list of these; the evaluator walks them
/// recursively within the current activation.
#[derive(Clone)]
pub enum Code {
    /// A literal value, returned unchanged.
    Lit(Value),
    /// A method-literal wrapper: a parenthesized object with a body used
    /// as an expression. Evaluating it runs the wrapped method's code
    /// list inline in the current activation.
    Mth(ObjHandle),
    /// A block prototype: evaluating it clones the prototype and
    /// captures the current activation in the clone's `lexicalParent`.
    Blk(ObjHandle),
    /// A message send. A missing receiver is the implicit-self
    /// convention: the receiver defaults to the current activation.
    Msg {
        receiver: Option<Box<Code>>,
        selector: Rc<str>,
        args: Vec<Code>,
    },
    /// A non-local return, unwinding to the innermost enclosing regular
    /// method of the activation chain.
    Ret(Box<Code>),
}

/// Messages print in the tagged-list form `{selector receiver args…}`;
/// an implicit receiver is omitted.
impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lit(value) => write!(f, "{}", value),
            Self::Mth(method) => write!(f, "{}", method.borrow()),
            Self::Blk(proto) => write!(f, "{}", proto.borrow()),
            Self::Msg {
                receiver,
                selector,
                args,
            } => {
                write!(f, "{{{}", selector)?;
                if let Some(receiver) = receiver {
                    write!(f, " {}", receiver)?;
                }
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, "}}")
            }
            Self::Ret(expr) => write!(f, "^ {}", expr),
        }
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
