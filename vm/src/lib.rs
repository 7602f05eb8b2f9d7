//! # vm
//!
//! The runtime: special objects and primitive registry ([`Runtime`]),
//! the AST→code compiler, the tree-walk evaluator, the primitive suite,
//! and the bootstrap image.
//!
//! ```rust
//! use vm::Runtime;
//!
//! let mut rt = Runtime::new();
//! let value = rt.execute("3 + 4").unwrap();
//! assert!(value.same_value(&object::Value::Int(7)));
//! ```

pub mod bootstrap;
pub mod compile;
pub mod interpreter;
pub mod primitives;

use std::collections::HashMap;
use std::fmt;

use object::{lookup, LookupError, SpecialObjects, Value};
use parser::{Lexer, ParseError, Parser};

use interpreter::RuntimeError;
use primitives::PrimitiveDesc;

/// A failure surfaced by [`Runtime::execute`]: either the parser
/// rejected the source or evaluation failed (possibly at compile time,
/// while running a slot initializer).
#[derive(Debug)]
pub enum Error {
    Syntax(ParseError),
    Runtime(RuntimeError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(err) => write!(f, "{}", err),
            Self::Runtime(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Self::Syntax(err)
    }
}

impl From<RuntimeError> for Error {
    fn from(err: RuntimeError) -> Self {
        Self::Runtime(err)
    }
}

/// One interpreter instance: the special objects plus the primitive
/// registry. Instances are independent and single-threaded.
pub struct Runtime {
    pub specials: SpecialObjects,
    /// Registered primitives, keyed by selector.
    pub primitives: HashMap<&'static str, PrimitiveDesc>,
}

impl Runtime {
    /// Allocate and bootstrap a fresh interpreter.
    pub fn new() -> Self {
        let mut rt = Self {
            specials: SpecialObjects::new(),
            primitives: HashMap::new(),
        };
        rt.initialize();
        rt
    }

    /// Reset this instance: clears the special objects' slots (their
    /// identities survive), reloads the primitives, and re-evaluates
    /// the bootstrap image.
    pub fn initialize(&mut self) {
        bootstrap::initialize(self);
    }

    /// Parse `source` as a top-level program and run it with the lobby
    /// as self. The result is the last statement's value, or `nil` for
    /// an empty program.
    pub fn execute(&mut self, source: &str) -> Result<Value, Error> {
        let exprs: Vec<parser::Expr> =
            Parser::new(Lexer::from_str(source)).collect::<Result<_, _>>()?;
        let method = compile::Compiler::new(self).compile_program(&exprs)?;
        let lobby = Value::Obj(self.specials.lobby.clone());
        let result = interpreter::activate(self, &method, &[lobby])?;
        Ok(result)
    }

    /// Send `selector` to `args[0]` with the remaining arguments, like
    /// an explicit send: primitive dispatch, mutator assignment, method
    /// activation, or a plain slot read.
    pub fn send(
        &mut self,
        selector: &str,
        args: &[Value],
    ) -> Result<Value, RuntimeError> {
        let (receiver, rest) =
            args.split_first().ok_or(RuntimeError::TypeError {
                expected: "receiver",
                got: "empty argument list".to_string(),
            })?;
        interpreter::send_values(
            self,
            receiver.clone(),
            selector,
            rest.to_vec(),
            false,
        )
    }

    /// Expose slot lookup on any value.
    pub fn find_slot(
        &self,
        value: &Value,
        name: &str,
    ) -> Result<lookup::Found, LookupError> {
        lookup::find_slot(value, name, &self.specials)
    }

    /// The `nil` singleton as a value.
    pub fn nil(&self) -> Value {
        Value::Obj(self.specials.nil.clone())
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
