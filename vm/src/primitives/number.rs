//! Arithmetic and comparison on `Int` and `Float` values.
//!
//! Mixed operands promote to float; `_NumDiv:` always yields a float.
//! Integer `+ - *` silently promote to float on i64 overflow.

use object::Value;

use crate::interpreter::RuntimeError;
use crate::primitives::{arg, bool_value};
use crate::Runtime;

/// Both operands, numerically.
enum Operands {
    Ints(i64, i64),
    Floats(f64, f64),
}

fn operands(receiver: &Value, rhs: &Value) -> Result<Operands, RuntimeError> {
    match (receiver, rhs) {
        (Value::Int(a), Value::Int(b)) => Ok(Operands::Ints(*a, *b)),
        (Value::Int(a), Value::Float(b)) => Ok(Operands::Floats(*a as f64, *b)),
        (Value::Float(a), Value::Int(b)) => Ok(Operands::Floats(*a, *b as f64)),
        (Value::Float(a), Value::Float(b)) => Ok(Operands::Floats(*a, *b)),
        (Value::Int(_), other) | (Value::Float(_), other) => {
            Err(RuntimeError::type_error("number", other))
        }
        (other, _) => Err(RuntimeError::type_error("number", other)),
    }
}

fn arith(
    receiver: &Value,
    args: &[Value],
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, RuntimeError> {
    let rhs = arg(args, 0, "number")?;
    match operands(receiver, rhs)? {
        Operands::Ints(a, b) => match int_op(a, b) {
            Some(n) => Ok(Value::Int(n)),
            None => Ok(Value::Float(float_op(a as f64, b as f64))),
        },
        Operands::Floats(a, b) => Ok(Value::Float(float_op(a, b))),
    }
}

pub fn num_add(
    _rt: &mut Runtime,
    receiver: &Value,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    arith(receiver, args, i64::checked_add, |a, b| a + b)
}

pub fn num_sub(
    _rt: &mut Runtime,
    receiver: &Value,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    arith(receiver, args, i64::checked_sub, |a, b| a - b)
}

pub fn num_mul(
    _rt: &mut Runtime,
    receiver: &Value,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    arith(receiver, args, i64::checked_mul, |a, b| a * b)
}

/// Division always produces a float.
pub fn num_div(
    _rt: &mut Runtime,
    receiver: &Value,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    let rhs = arg(args, 0, "number")?;
    let (a, b) = match operands(receiver, rhs)? {
        Operands::Ints(a, b) => (a as f64, b as f64),
        Operands::Floats(a, b) => (a, b),
    };
    Ok(Value::Float(a / b))
}

pub fn num_mod(
    _rt: &mut Runtime,
    receiver: &Value,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    let rhs = arg(args, 0, "number")?;
    match operands(receiver, rhs)? {
        Operands::Ints(_, 0) => Err(RuntimeError::TypeError {
            expected: "non-zero modulus",
            got: "0".to_string(),
        }),
        Operands::Ints(a, b) => Ok(Value::Int(a % b)),
        Operands::Floats(a, b) => Ok(Value::Float(a % b)),
    }
}

pub fn num_lt(
    rt: &mut Runtime,
    receiver: &Value,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    let rhs = arg(args, 0, "number")?;
    let less = match operands(receiver, rhs)? {
        Operands::Ints(a, b) => a < b,
        Operands::Floats(a, b) => a < b,
    };
    Ok(bool_value(rt, less))
}

pub fn num_to_string(
    _rt: &mut Runtime,
    receiver: &Value,
    _args: &[Value],
) -> Result<Value, RuntimeError> {
    match receiver {
        Value::Int(n) => Ok(Value::string(n.to_string())),
        Value::Float(x) => Ok(Value::string(x.to_string())),
        other => Err(RuntimeError::type_error("number", other)),
    }
}
