//! The built-in primitive registry.
//!
//! Primitives are host functions reached by selectors starting with
//! `_`. They are invoked with the already-evaluated receiver and
//! arguments and never perform slot lookup or activate methods.

use object::{ObjHandle, Value, VectorHandle};

use crate::interpreter::RuntimeError;
use crate::Runtime;

pub mod general;
pub mod number;
pub mod string;
pub mod vector;

pub type PrimitiveFn =
    fn(&mut Runtime, &Value, &[Value]) -> Result<Value, RuntimeError>;

/// A registry entry: selector, argument count, host function.
#[derive(Clone, Copy)]
pub struct PrimitiveDesc {
    pub name: &'static str,
    pub arity: u8,
    pub func: PrimitiveFn,
}

impl PrimitiveDesc {
    pub const fn new(name: &'static str, arity: u8, func: PrimitiveFn) -> Self {
        Self { name, arity, func }
    }
}

/// The fixed primitive set installed by `Runtime::initialize`.
pub fn default_primitives() -> Vec<PrimitiveDesc> {
    vec![
        PrimitiveDesc::new("_NumAdd:", 1, number::num_add),
        PrimitiveDesc::new("_NumSub:", 1, number::num_sub),
        PrimitiveDesc::new("_NumMul:", 1, number::num_mul),
        PrimitiveDesc::new("_NumDiv:", 1, number::num_div),
        PrimitiveDesc::new("_NumMod:", 1, number::num_mod),
        PrimitiveDesc::new("_NumLt:", 1, number::num_lt),
        PrimitiveDesc::new("_NumToString", 0, number::num_to_string),
        PrimitiveDesc::new("_Equal:", 1, general::equal),
        PrimitiveDesc::new("_Clone", 0, general::clone),
        PrimitiveDesc::new("_ObjectToString", 0, general::object_to_string),
        PrimitiveDesc::new("_AddSlotsIfAbsent:", 1, general::add_slots_if_absent),
        PrimitiveDesc::new("_StringSize", 0, string::string_size),
        PrimitiveDesc::new("_StringAt:", 1, string::string_at),
        PrimitiveDesc::new("_StringConcat:", 1, string::string_concat),
        PrimitiveDesc::new("_StringFrom:To:", 2, string::string_from_to),
        PrimitiveDesc::new("_VectorClone:", 1, vector::vector_clone),
        PrimitiveDesc::new("_VectorSize", 0, vector::vector_size),
        PrimitiveDesc::new("_VectorAdd:", 1, vector::vector_add),
        PrimitiveDesc::new("_VectorAt:", 1, vector::vector_at),
        PrimitiveDesc::new("_VectorAt:Put:", 2, vector::vector_at_put),
        PrimitiveDesc::new("_VectorFrom:To:", 2, vector::vector_from_to),
    ]
}

// ── Shared operand helpers ─────────────────────────────────────────

pub(crate) fn bool_value(rt: &Runtime, b: bool) -> Value {
    if b {
        Value::Obj(rt.specials.true_obj.clone())
    } else {
        Value::Obj(rt.specials.false_obj.clone())
    }
}

pub(crate) fn nil_value(rt: &Runtime) -> Value {
    Value::Obj(rt.specials.nil.clone())
}

pub(crate) fn arg<'a>(
    args: &'a [Value],
    index: usize,
    expected: &'static str,
) -> Result<&'a Value, RuntimeError> {
    args.get(index).ok_or(RuntimeError::TypeError {
        expected,
        got: "missing argument".to_string(),
    })
}

pub(crate) fn expect_string(value: &Value) -> Result<&str, RuntimeError> {
    match value {
        Value::Str(s) => Ok(s),
        other => Err(RuntimeError::type_error("string", other)),
    }
}

pub(crate) fn expect_vector(
    value: &Value,
) -> Result<&VectorHandle, RuntimeError> {
    match value {
        Value::Vector(v) => Ok(v),
        other => Err(RuntimeError::type_error("vector", other)),
    }
}

pub(crate) fn expect_object(value: &Value) -> Result<&ObjHandle, RuntimeError> {
    match value {
        Value::Obj(o) => Ok(o),
        other => Err(RuntimeError::type_error("object", other)),
    }
}

/// A non-negative index operand.
pub(crate) fn expect_index(value: &Value) -> Result<usize, RuntimeError> {
    match value {
        Value::Int(n) if *n >= 0 => Ok(*n as usize),
        other => Err(RuntimeError::type_error("non-negative integer", other)),
    }
}
