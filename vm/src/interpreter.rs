//! The tree-walk evaluator.
//!
//! Code nodes execute within a current *activation*: a method clone
//! whose argument slots have been populated. Activations are ordinary
//! objects, so the lexical chain (`(parent)` / `self` slots, all
//! parent-flagged) makes local-variable access, instance-slot access
//! and method calls one mechanism — slot lookup on the activation.
//!
//! Control flow rides Rust's call stack; non-local returns unwind it as
//! the [`RuntimeError::NonLocalReturn`] variant until the target
//! activation converts the unwind back into a normal return.

use std::fmt;
use std::rc::Rc;

use object::{
    find_slot, Code, LookupError, Obj, ObjHandle, Value, LEXICAL_PARENT_SLOT,
};

use crate::Runtime;

/// A runtime failure, one variant per distinguished kind.
#[derive(Debug, Clone)]
pub enum RuntimeError {
    /// Lookup found no slot for the selector.
    UnknownMessageSend(String),
    /// Lookup found more than one slot via distinct parent chains.
    AmbiguousMessageSend(String),
    /// A `_`-selector with no registered primitive.
    UnknownPrimitive(String),
    /// A mutator value referred to a missing data slot.
    MutatorWithoutDataSlot(String),
    /// Internal: unwinding towards `target`. Never escapes a
    /// well-formed program; caught by activation identity.
    NonLocalReturn { target: ObjHandle, value: Value },
    /// A primitive was applied to the wrong kind of operand.
    TypeError {
        expected: &'static str,
        got: String,
    },
}

impl RuntimeError {
    pub(crate) fn type_error(expected: &'static str, got: &Value) -> Self {
        Self::TypeError {
            expected,
            got: got.kind_name().to_string(),
        }
    }
}

impl From<LookupError> for RuntimeError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::Unknown(name) => Self::UnknownMessageSend(name),
            LookupError::Ambiguous(name) => Self::AmbiguousMessageSend(name),
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownMessageSend(name) => {
                write!(f, "UnknownMessageSend({})", name)
            }
            Self::AmbiguousMessageSend(name) => {
                write!(f, "AmbiguousMessageSend({})", name)
            }
            Self::UnknownPrimitive(name) => {
                write!(f, "UnknownPrimitive({})", name)
            }
            Self::MutatorWithoutDataSlot(name) => {
                write!(f, "MutatorWithoutDataSlot({})", name)
            }
            Self::NonLocalReturn { .. } => {
                write!(f, "non-local return escaped its defining method")
            }
            Self::TypeError { expected, got } => {
                write!(f, "TypeError: expected {}, got {}", expected, got)
            }
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Activate `method` with `args` = `[self_or_block, arg1, …]`.
///
/// Clones the method (slots independent, code shared), writes `arg_i`
/// into slot `i`, rebinds a block method's slot 0 to the captured
/// `lexicalParent` of the block object passed as `arg_0`, then runs the
/// code list. A [`RuntimeError::NonLocalReturn`] targeted at this
/// activation is converted into its carried value.
pub fn activate(
    rt: &mut Runtime,
    method: &ObjHandle,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    let _span = tracing::trace_span!("activate").entered();

    let activation = method.borrow().clone_object().handle();
    {
        let mut slots = activation.borrow_mut();
        for (i, arg) in args.iter().enumerate() {
            if let Some(slot) = slots.slots.get_mut(i) {
                slot.value = arg.clone();
            }
        }
    }

    // Lexical closure: a block method's `(parent)` becomes the
    // activation captured by the block object at clone time.
    let rebind = {
        let borrow = activation.borrow();
        if borrow.is_block_method() {
            args.first().and_then(|receiver| {
                let block = receiver.as_obj()?;
                let block = block.borrow();
                let (_, slot) = block.slot(LEXICAL_PARENT_SLOT)?;
                Some(slot.value.clone())
            })
        } else {
            None
        }
    };
    if let Some(lexical_parent) = rebind {
        activation.borrow_mut().slots[0].value = lexical_parent;
    }

    let code = activation.borrow().code.clone();
    let result = match &code {
        Some(code) => run_codes(rt, &activation, code),
        None => Ok(Value::Obj(rt.specials.nil.clone())),
    };

    match result {
        Err(RuntimeError::NonLocalReturn { target, value })
            if Rc::ptr_eq(&target, &activation) =>
        {
            Ok(value)
        }
        other => other,
    }
}

/// Evaluate a code list; the result is the last node's value, or `nil`
/// for an empty list.
pub fn run_codes(
    rt: &mut Runtime,
    activation: &ObjHandle,
    code: &[Code],
) -> Result<Value, RuntimeError> {
    let mut result = Value::Obj(rt.specials.nil.clone());
    for node in code {
        result = eval(rt, activation, node)?;
    }
    Ok(result)
}

/// Evaluate one code node within `activation`.
pub fn eval(
    rt: &mut Runtime,
    activation: &ObjHandle,
    code: &Code,
) -> Result<Value, RuntimeError> {
    match code {
        Code::Lit(value) => Ok(value.clone()),

        // A parenthesized object used as an expression: run its code
        // list inline, in the current activation.
        Code::Mth(method) => {
            let code = method.borrow().code.clone();
            match &code {
                Some(code) => run_codes(rt, activation, code),
                None => Ok(Value::Obj(rt.specials.nil.clone())),
            }
        }

        Code::Blk(proto) => {
            let mut block = proto.borrow().clone_object();
            if let Some((index, _)) = block.slot(LEXICAL_PARENT_SLOT) {
                block.slots[index].value = Value::Obj(activation.clone());
            }
            Ok(Value::Obj(block.handle()))
        }

        Code::Msg {
            receiver,
            selector,
            args,
        } => {
            let (receiver, implicit) = match receiver {
                Some(code) => (eval(rt, activation, code)?, false),
                None => (Value::Obj(activation.clone()), true),
            };
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval(rt, activation, arg)?);
            }
            send_values(rt, receiver, selector, values, implicit)
        }

        Code::Ret(expr) => {
            let value = eval(rt, activation, expr)?;
            let target = return_target(activation);
            Err(RuntimeError::NonLocalReturn { target, value })
        }
    }
}

/// Perform a message send with already-evaluated arguments.
///
/// Dispatch order: primitive registry for `_`-selectors, then slot
/// lookup; a mutator value assigns into its sibling data slot, a method
/// activates, anything else is returned as data.
pub fn send_values(
    rt: &mut Runtime,
    receiver: Value,
    selector: &str,
    args: Vec<Value>,
    implicit: bool,
) -> Result<Value, RuntimeError> {
    let _span = tracing::trace_span!("send", selector).entered();

    if selector.starts_with('_') {
        let desc = rt.primitives.get(selector).copied().ok_or_else(|| {
            RuntimeError::UnknownPrimitive(selector.to_string())
        })?;
        return (desc.func)(rt, &receiver, &args);
    }

    let found = find_slot(&receiver, selector, &rt.specials)?;
    match found.slot.value.clone() {
        // Mutator: assign into the sibling data slot of the same
        // receiver and return the stored value.
        Value::Mutator(data_name) => {
            let data = find_slot(&receiver, &data_name, &rt.specials)
                .map_err(|_| {
                    RuntimeError::MutatorWithoutDataSlot(selector.to_string())
                })?;
            let value = args.into_iter().next().ok_or(
                RuntimeError::TypeError {
                    expected: "assignment argument",
                    got: "none".to_string(),
                },
            )?;
            data.holder.borrow_mut().slots[data.slot_index].value =
                value.clone();
            Ok(value)
        }

        Value::Obj(method) if method.borrow().code.is_some() => {
            // `self` inside a method refers to the object the method
            // was found on: the evaluated receiver for explicit sends,
            // the enclosing instance for implicit ones.
            let self_arg = if implicit {
                find_slot(&receiver, "self", &rt.specials)?.slot.value
            } else {
                receiver
            };
            let mut call_args = Vec::with_capacity(args.len() + 1);
            call_args.push(self_arg);
            call_args.extend(args);
            activate(rt, &method, &call_args)
        }

        value => Ok(value),
    }
}

/// Walk the activation chain to the innermost enclosing regular method:
/// follow slot 0 while the current activation is a block method.
fn return_target(activation: &ObjHandle) -> ObjHandle {
    let mut current = activation.clone();
    loop {
        let next = {
            let borrow = current.borrow();
            if !borrow.is_block_method() {
                return current.clone();
            }
            match borrow.slots.first().map(|slot| &slot.value) {
                Some(Value::Obj(enclosing)) => enclosing.clone(),
                // Block never evaluated in a method context; treat the
                // block activation itself as the target.
                _ => return current.clone(),
            }
        };
        current = next;
    }
}

/// Build the synthetic top-level method around a compiled program: a
/// single parent-argument `self`, activated with the lobby.
pub fn top_level_method(code: Vec<Code>, nil: &ObjHandle) -> ObjHandle {
    use object::{Slot, SlotTags};
    Obj::method(
        vec![Slot::new(
            SlotTags::ARGUMENT | SlotTags::PARENT,
            "self",
            Value::Obj(nil.clone()),
        )],
        code,
    )
    .handle()
}
