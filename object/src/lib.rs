//! # object
//!
//! The value model of the interpreter: tagged values, slots, prototype
//! objects, code nodes, the well-known special objects, and the
//! inheritance-aware slot lookup engine.
//!
//! Everything else in the system is built on these types: the parser's
//! compiler materializes [`Obj`]s and [`Code`] trees, and the evaluator
//! drives [`lookup::find_slot`] for every message send.

mod code;
pub mod lookup;
mod objects;
mod slot;
mod special;
mod value;

pub use code::Code;
pub use lookup::{find_slot, Found, LookupError};
pub use objects::{Obj, BLOCK_PARENT_SLOT, LEXICAL_PARENT_SLOT};
pub use slot::{Slot, SlotTags};
pub use special::SpecialObjects;
pub use value::{ObjHandle, Value, VectorHandle};

#[cfg(test)]
mod tests {
    use super::*;

    // ── Value equality ─────────────────────────────────────────────

    #[test]
    fn numeric_equality_crosses_int_and_float() {
        assert!(Value::Int(3).same_value(&Value::Float(3.0)));
        assert!(Value::Float(3.0).same_value(&Value::Int(3)));
        assert!(!Value::Int(3).same_value(&Value::Float(3.5)));
    }

    #[test]
    fn string_equality_is_by_content() {
        assert!(Value::string("abc").same_value(&Value::string("abc")));
        assert!(!Value::string("abc").same_value(&Value::string("abd")));
    }

    #[test]
    fn object_equality_is_by_identity() {
        let a = Obj::new().handle();
        let b = Obj::new().handle();
        assert!(Value::Obj(a.clone()).same_value(&Value::Obj(a.clone())));
        assert!(!Value::Obj(a).same_value(&Value::Obj(b)));
    }

    #[test]
    fn vector_equality_is_by_identity() {
        let a = Value::vector(vec![Value::Int(1)]);
        let b = Value::vector(vec![Value::Int(1)]);
        assert!(a.same_value(&a.clone()));
        assert!(!a.same_value(&b));
    }

    // ── Display forms ──────────────────────────────────────────────

    #[test]
    fn value_display() {
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::string("hi").to_string(), "hi");
        assert_eq!(
            Value::vector(vec![Value::Int(1), Value::Int(2)]).to_string(),
            "(1, 2)"
        );
    }

    #[test]
    fn message_code_display() {
        let send = Code::Msg {
            receiver: Some(Box::new(Code::Lit(Value::Int(3)))),
            selector: "+".into(),
            args: vec![Code::Lit(Value::Int(4))],
        };
        assert_eq!(send.to_string(), "{+ 3 4}");

        let implicit = Code::Msg {
            receiver: None,
            selector: "x".into(),
            args: vec![],
        };
        assert_eq!(implicit.to_string(), "{x}");
    }
}
