//! String operations. Indices are character-based; `_StringFrom:To:` is
//! half-open and clamps out-of-range bounds.

use object::Value;

use crate::interpreter::RuntimeError;
use crate::primitives::{arg, expect_index, expect_string};
use crate::Runtime;

pub fn string_size(
    _rt: &mut Runtime,
    receiver: &Value,
    _args: &[Value],
) -> Result<Value, RuntimeError> {
    let s = expect_string(receiver)?;
    Ok(Value::Int(s.chars().count() as i64))
}

/// One-character string at the given index.
pub fn string_at(
    _rt: &mut Runtime,
    receiver: &Value,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    let s = expect_string(receiver)?;
    let index = expect_index(arg(args, 0, "index")?)?;
    match s.chars().nth(index) {
        Some(ch) => Ok(Value::string(ch.to_string())),
        None => Err(RuntimeError::TypeError {
            expected: "index within string",
            got: index.to_string(),
        }),
    }
}

pub fn string_concat(
    _rt: &mut Runtime,
    receiver: &Value,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    let a = expect_string(receiver)?;
    let b = expect_string(arg(args, 0, "string")?)?;
    let mut out = String::with_capacity(a.len() + b.len());
    out.push_str(a);
    out.push_str(b);
    Ok(Value::string(out))
}

pub fn string_from_to(
    _rt: &mut Runtime,
    receiver: &Value,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    let s = expect_string(receiver)?;
    let from = expect_index(arg(args, 0, "index")?)?;
    let to = expect_index(arg(args, 1, "index")?)?;
    let out: String = s.chars().skip(from).take(to.saturating_sub(from)).collect();
    Ok(Value::string(out))
}
