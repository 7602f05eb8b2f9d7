//! Vector operations. Element cells are shared through the handle;
//! `_VectorAdd:` mutates the receiver in place and returns it.

use object::Value;

use crate::interpreter::RuntimeError;
use crate::primitives::{arg, expect_index, expect_vector, nil_value};
use crate::Runtime;

/// A fresh vector of `n` nils. The receiver only selects the trait, so
/// `traitsVector clone: 4` works without an existing vector.
pub fn vector_clone(
    rt: &mut Runtime,
    _receiver: &Value,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    let size = expect_index(arg(args, 0, "size")?)?;
    Ok(Value::vector(vec![nil_value(rt); size]))
}

pub fn vector_size(
    _rt: &mut Runtime,
    receiver: &Value,
    _args: &[Value],
) -> Result<Value, RuntimeError> {
    let v = expect_vector(receiver)?;
    Ok(Value::Int(v.borrow().len() as i64))
}

/// Push and return the receiver, so adds chain.
pub fn vector_add(
    _rt: &mut Runtime,
    receiver: &Value,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    let v = expect_vector(receiver)?;
    let element = arg(args, 0, "element")?;
    v.borrow_mut().push(element.clone());
    Ok(receiver.clone())
}

pub fn vector_at(
    _rt: &mut Runtime,
    receiver: &Value,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    let v = expect_vector(receiver)?;
    let index = expect_index(arg(args, 0, "index")?)?;
    v.borrow().get(index).cloned().ok_or(RuntimeError::TypeError {
        expected: "index within vector",
        got: index.to_string(),
    })
}

/// Store and return the stored value, mirroring mutator sends.
pub fn vector_at_put(
    _rt: &mut Runtime,
    receiver: &Value,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    let v = expect_vector(receiver)?;
    let index = expect_index(arg(args, 0, "index")?)?;
    let value = arg(args, 1, "element")?;
    let mut elements = v.borrow_mut();
    match elements.get_mut(index) {
        Some(cell) => {
            *cell = value.clone();
            Ok(value.clone())
        }
        None => Err(RuntimeError::TypeError {
            expected: "index within vector",
            got: index.to_string(),
        }),
    }
}

/// Fresh half-open slice with clamped bounds.
pub fn vector_from_to(
    _rt: &mut Runtime,
    receiver: &Value,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    let v = expect_vector(receiver)?;
    let from = expect_index(arg(args, 0, "index")?)?;
    let to = expect_index(arg(args, 1, "index")?)?;
    let elements = v.borrow();
    let from = from.min(elements.len());
    let to = to.clamp(from, elements.len());
    Ok(Value::vector(elements[from..to].to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rt() -> Runtime {
        Runtime::new()
    }

    #[test]
    fn clone_builds_nil_filled_vector() {
        let mut rt = rt();
        let nil = nil_value(&rt);
        let v = vector_clone(&mut rt, &nil.clone(), &[Value::Int(3)]).unwrap();
        match &v {
            Value::Vector(elements) => {
                let elements = elements.borrow();
                assert_eq!(elements.len(), 3);
                assert!(elements.iter().all(|e| e.same_value(&nil)));
            }
            other => panic!("expected vector, got {:?}", other),
        }
    }

    #[test]
    fn add_returns_receiver() {
        let mut rt = rt();
        let v = Value::vector(vec![]);
        let out = vector_add(&mut rt, &v, &[Value::Int(1)]).unwrap();
        assert!(out.same_value(&v));
        assert!(vector_size(&mut rt, &v, &[])
            .unwrap()
            .same_value(&Value::Int(1)));
    }

    #[test]
    fn at_put_stores_into_shared_cells() {
        let mut rt = rt();
        let v = Value::vector(vec![Value::Int(1), Value::Int(2)]);
        let stored =
            vector_at_put(&mut rt, &v, &[Value::Int(0), Value::Int(9)])
                .unwrap();
        assert!(stored.same_value(&Value::Int(9)));
        assert!(vector_at(&mut rt, &v, &[Value::Int(0)])
            .unwrap()
            .same_value(&Value::Int(9)));
    }

    #[test]
    fn at_out_of_range_fails() {
        let mut rt = rt();
        let v = Value::vector(vec![]);
        assert!(vector_at(&mut rt, &v, &[Value::Int(0)]).is_err());
    }

    #[test]
    fn from_to_slices_and_clamps() {
        let mut rt = rt();
        let v = Value::vector(vec![
            Value::Int(1),
            Value::Int(2),
            Value::Int(3),
        ]);
        let out =
            vector_from_to(&mut rt, &v, &[Value::Int(1), Value::Int(99)])
                .unwrap();
        match out {
            Value::Vector(elements) => {
                assert_eq!(elements.borrow().len(), 2)
            }
            other => panic!("expected vector, got {:?}", other),
        }
    }
}
