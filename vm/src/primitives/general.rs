//! Generic object primitives: equality, cloning, printing, and slot
//! extension.

use object::{Obj, SlotTags, Value};

use crate::interpreter::RuntimeError;
use crate::primitives::{arg, bool_value, expect_object};
use crate::Runtime;

/// Universal equality (see `Value::same_value`).
pub fn equal(
    rt: &mut Runtime,
    receiver: &Value,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    let other = arg(args, 0, "value")?;
    Ok(bool_value(rt, receiver.same_value(other)))
}

/// Clone the receiver.
///
/// Immediate values and the `nil` / `true` / `false` singletons clone
/// to themselves (`3 clone = 3`, `nil clone = nil`); vectors copy their
/// elements shallowly; objects get an independent slot vector. Cloning
/// a method yields a plain object clone — the code list is not carried
/// over.
pub fn clone(
    rt: &mut Runtime,
    receiver: &Value,
    _args: &[Value],
) -> Result<Value, RuntimeError> {
    match receiver {
        Value::Int(_)
        | Value::Float(_)
        | Value::Str(_)
        | Value::Mutator(_) => Ok(receiver.clone()),
        Value::Vector(elements) => {
            Ok(Value::vector(elements.borrow().clone()))
        }
        Value::Obj(handle) => {
            let singleton = [
                &rt.specials.nil,
                &rt.specials.true_obj,
                &rt.specials.false_obj,
            ]
            .into_iter()
            .any(|special| std::rc::Rc::ptr_eq(special, handle));
            if singleton {
                return Ok(receiver.clone());
            }
            let slots = handle.borrow().slots.clone();
            Ok(Value::Obj(Obj::with_slots(slots).handle()))
        }
    }
}

/// The printable form of the receiver, as a string.
pub fn object_to_string(
    _rt: &mut Runtime,
    receiver: &Value,
    _args: &[Value],
) -> Result<Value, RuntimeError> {
    Ok(Value::string(receiver.to_string()))
}

/// Add each slot of the argument object to the receiver unless a slot
/// of that name is already present, re-emitting paired mutators for
/// added data slots. Returns the receiver.
pub fn add_slots_if_absent(
    _rt: &mut Runtime,
    receiver: &Value,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    let target = expect_object(receiver)?;
    let source = expect_object(arg(args, 0, "object")?)?;

    let source_slots = source.borrow().slots.clone();
    {
        let mut target = target.borrow_mut();
        for slot in source_slots {
            if slot.is_data() {
                target.add_data_slot(
                    &*slot.name,
                    slot.tags & SlotTags::PARENT,
                    slot.value.clone(),
                );
            } else {
                // The source's own mutator slots land here and are
                // skipped when the data slot already re-emitted them.
                target.add_slot(slot);
            }
        }
    }
    Ok(receiver.clone())
}
