//! Runtime initialization.
//!
//! `initialize` resets the special objects in place (their handles stay
//! valid across re-initialization), reloads the primitive registry,
//! seeds the lobby's well-known constant slots, and then evaluates the
//! embedded Self bootstrap source that grows the traits and singletons
//! through `_AddSlotsIfAbsent:`.

use object::{Slot, Value};

use crate::primitives;
use crate::Runtime;

/// Self source evaluated at the end of initialization. Everything here
/// is ordinary user-level code: the traits gain their behavior through
/// the same slot machinery programs use.
const BOOTSTRAP_SOURCE: &str = r#"
"The root. Every trait and singleton chains back here."
lobby _AddSlotsIfAbsent: (|
    printString = (self _ObjectToString).
    "Constant, not a method: a number receiver's activation has no
     object parent and could not look the answer up."
    isNil = false.
    clone = (self _Clone).
    = x = (self _Equal: x).
    != x = ((self = x) not).
    & v = (((self _VectorClone: 0) _VectorAdd: self) _VectorAdd: v).
|).

nil _AddSlotsIfAbsent: (|
    parent* = lobby.
    printString = 'nil'.
    isNil = true.
    not = (true).
    ifTrue: t = (nil).
    ifFalse: f = (f value).
    ifTrue: t False: f = (f value).
    and: b = (false).
    or: b = (b value).
|).

true _AddSlotsIfAbsent: (|
    parent* = lobby.
    printString = 'true'.
    not = (false).
    ifTrue: t = (t value).
    ifFalse: f = (nil).
    ifTrue: t False: f = (t value).
    and: b = (b value).
    or: b = (true).
|).

false _AddSlotsIfAbsent: (|
    parent* = lobby.
    printString = 'false'.
    not = (true).
    ifTrue: t = (nil).
    ifFalse: f = (f value).
    ifTrue: t False: f = (f value).
    and: b = (false).
    or: b = (b value).
|).

traitsNumber _AddSlotsIfAbsent: (|
    parent* = lobby.
    + n = (self _NumAdd: n).
    - n = (self _NumSub: n).
    * n = (self _NumMul: n).
    / n = (self _NumDiv: n).
    % n = (self _NumMod: n).
    < n = (self _NumLt: n).
    > n = (n _NumLt: self).
    <= n = ((n _NumLt: self) not).
    >= n = ((self _NumLt: n) not).
    printString = (self _NumToString).
    to: limit Do: body = (self to: limit By: 1 Do: body).
    "Inclusive bounds, in either direction of travel."
    to: limit By: step Do: body = (
        | i |
        i: self.
        [(step < 0) ifTrue: [limit <= i] False: [i <= limit]]
            whileTrue: [body value: i. i: i + step].
        self).
|).

traitsString _AddSlotsIfAbsent: (|
    parent* = lobby.
    size = (self _StringSize).
    at: i = (self _StringAt: i).
    , s = (self _StringConcat: s).
    concat: s = (self _StringConcat: s).
    from: a To: b = (self _StringFrom: a To: b).
    printString = (self).
|).

traitsVector _AddSlotsIfAbsent: (|
    parent* = lobby.
    clone: n = (self _VectorClone: n).
    size = (self _VectorSize).
    add: v = (self _VectorAdd: v).
    at: i = (self _VectorAt: i).
    at: i Put: v = (self _VectorAt: i Put: v).
    from: a To: b = (self _VectorFrom: a To: b).
    do: body = (
        | i |
        i: 0.
        [i < self size] whileTrue: [body value: (self at: i). i: i + 1].
        self).
    collect: body = (
        | out |
        out: (self clone: 0).
        self do: [ | :each | out add: (body value: each) ].
        out).
    select: body = (
        | out |
        out: (self clone: 0).
        self do: [ | :each |
            (body value: each) ifTrue: [out add: each] False: [] ].
        out).
    join: sep = (
        | out. i |
        out: ''.
        i: 0.
        [i < self size] whileTrue: [
            (i = 0)
                ifTrue: [out: (self at: 0)]
                False: [out: ((out , sep) , (self at: i))].
            i: i + 1].
        out).
    & v = (self clone add: v).
    printString = (
        '(' , ((self collect: [ | :each | each printString ]) join: ', ')
            , ')').
|).

traitsBlock _AddSlotsIfAbsent: (|
    parent* = lobby.
    whileTrue: body = (
        self value ifTrue: [body value. self whileTrue: body] False: []).
    whileFalse: body = (
        self value ifTrue: [] False: [body value. self whileFalse: body]).
|).
"#;

/// Reset and bootstrap `rt`. Called by `Runtime::new` and available for
/// explicit re-initialization.
pub fn initialize(rt: &mut Runtime) {
    // Clear every special object in place; captured handles stay valid.
    for handle in [
        &rt.specials.nil,
        &rt.specials.true_obj,
        &rt.specials.false_obj,
        &rt.specials.number_traits,
        &rt.specials.string_traits,
        &rt.specials.vector_traits,
        &rt.specials.block_traits,
        &rt.specials.lobby,
    ] {
        let mut obj = handle.borrow_mut();
        obj.slots.clear();
        obj.code = None;
    }

    rt.primitives.clear();
    for desc in primitives::default_primitives() {
        rt.primitives.insert(desc.name, desc);
    }

    // Seed the lobby's well-known names so the bootstrap source (and
    // every later program) can reach the singletons and traits; the
    // `lobby` slot lets programs name the root itself.
    {
        let mut lobby = rt.specials.lobby.borrow_mut();
        let entries = [
            ("nil", &rt.specials.nil),
            ("true", &rt.specials.true_obj),
            ("false", &rt.specials.false_obj),
            ("traitsNumber", &rt.specials.number_traits),
            ("traitsString", &rt.specials.string_traits),
            ("traitsVector", &rt.specials.vector_traits),
            ("traitsBlock", &rt.specials.block_traits),
            ("lobby", &rt.specials.lobby),
        ];
        for (name, handle) in entries {
            lobby.add_slot(Slot::constant(name, Value::Obj((*handle).clone())));
        }
    }

    // A broken image is unrecoverable and a bug in this file.
    rt.execute(BOOTSTRAP_SOURCE)
        .expect("bootstrap source must evaluate");
}

#[cfg(test)]
mod tests {
    use object::Value;

    use crate::Runtime;

    fn exec(rt: &mut Runtime, src: &str) -> Value {
        rt.execute(src).expect("execution failed")
    }

    fn truthy(rt: &Runtime) -> Value {
        Value::Obj(rt.specials.true_obj.clone())
    }

    #[test]
    fn singletons_print_their_names() {
        let mut rt = Runtime::new();
        assert!(exec(&mut rt, "nil printString")
            .same_value(&Value::string("nil")));
        assert!(exec(&mut rt, "true printString")
            .same_value(&Value::string("true")));
        assert!(exec(&mut rt, "false printString")
            .same_value(&Value::string("false")));
    }

    #[test]
    fn is_nil() {
        let mut rt = Runtime::new();
        assert!(exec(&mut rt, "nil isNil").same_value(&truthy(&rt)));
        assert!(exec(&mut rt, "3 isNil")
            .same_value(&Value::Obj(rt.specials.false_obj.clone())));
    }

    #[test]
    fn boolean_operators() {
        let mut rt = Runtime::new();
        assert!(exec(&mut rt, "true not")
            .same_value(&Value::Obj(rt.specials.false_obj.clone())));
        assert!(exec(&mut rt, "false or: [true]").same_value(&truthy(&rt)));
        assert!(exec(&mut rt, "true and: [false]")
            .same_value(&Value::Obj(rt.specials.false_obj.clone())));
    }

    #[test]
    fn short_circuit_skips_the_block() {
        let mut rt = Runtime::new();
        // The block would fail if evaluated.
        assert!(exec(&mut rt, "false and: [boom]")
            .same_value(&Value::Obj(rt.specials.false_obj.clone())));
        assert!(exec(&mut rt, "true or: [boom]").same_value(&truthy(&rt)));
    }

    #[test]
    fn nil_behaves_like_false_in_conditionals() {
        let mut rt = Runtime::new();
        assert!(exec(&mut rt, "nil ifTrue: [1] False: [2]")
            .same_value(&Value::Int(2)));
        assert!(exec(&mut rt, "nil ifFalse: [7]").same_value(&Value::Int(7)));
    }

    #[test]
    fn comparisons() {
        let mut rt = Runtime::new();
        for src in ["3 < 4", "4 > 3", "3 <= 3", "4 >= 4", "3 = 3", "3 != 4"] {
            assert!(
                exec(&mut rt, src).same_value(&truthy(&rt)),
                "expected true for {src}"
            );
        }
    }

    #[test]
    fn counting_loop_is_inclusive() {
        let mut rt = Runtime::new();
        let src = "(| s <- 0. m = (1 to: 4 Do: [ | :i | s: s + i ]. s) |) m";
        assert!(exec(&mut rt, src).same_value(&Value::Int(10)));
    }

    #[test]
    fn counting_loop_steps_downward() {
        let mut rt = Runtime::new();
        let src = "(| s <- 0. m = (3 to: 1 By: 0 - 1 Do: [ | :i | \
                   s: s + i ]. s) |) m";
        assert!(exec(&mut rt, src).same_value(&Value::Int(6)));
    }

    #[test]
    fn string_behavior() {
        let mut rt = Runtime::new();
        assert!(exec(&mut rt, "'abc' size").same_value(&Value::Int(3)));
        assert!(exec(&mut rt, "'abc' at: 1").same_value(&Value::string("b")));
        assert!(exec(&mut rt, "'foo' , 'bar'")
            .same_value(&Value::string("foobar")));
        assert!(exec(&mut rt, "'foo' concat: 'bar'")
            .same_value(&Value::string("foobar")));
        assert!(exec(&mut rt, "'abc' printString")
            .same_value(&Value::string("abc")));
    }

    #[test]
    fn vector_behavior() {
        let mut rt = Runtime::new();
        assert!(exec(&mut rt, "(1 & 2 & 3) size").same_value(&Value::Int(3)));
        assert!(exec(&mut rt, "(1 & 2 & 3) at: 1")
            .same_value(&Value::Int(2)));
        assert!(exec(&mut rt, "((1 & 2) at: 0 Put: 9)")
            .same_value(&Value::Int(9)));
        assert!(
            exec(&mut rt, "((1 & 2 & 3 & 4) from: 1 To: 3) printString")
                .same_value(&Value::string("(2, 3)"))
        );
    }

    #[test]
    fn vector_iteration() {
        let mut rt = Runtime::new();
        assert!(exec(
            &mut rt,
            "((1 & 2 & 3) collect: [ | :e | e * 2 ]) printString"
        )
        .same_value(&Value::string("(2, 4, 6)")));
        assert!(exec(
            &mut rt,
            "((1 & 2 & 3 & 4) select: [ | :e | e < 3 ]) printString"
        )
        .same_value(&Value::string("(1, 2)")));
        assert!(exec(&mut rt, "('a' & 'b') join: '-'")
            .same_value(&Value::string("a-b")));
    }

    #[test]
    fn vector_clone_is_shallow_copy() {
        let mut rt = Runtime::new();
        let src =
            "(| v <- nil. m = (v: (1 & 2). v clone add: 3. v size) |) m";
        assert!(exec(&mut rt, src).same_value(&Value::Int(2)));
    }

    #[test]
    fn division_prints_without_fraction() {
        let mut rt = Runtime::new();
        assert!(exec(&mut rt, "(6 / 3) printString")
            .same_value(&Value::string("2")));
        assert!(exec(&mut rt, "(7 / 2) printString")
            .same_value(&Value::string("3.5")));
    }

    #[test]
    fn whole_image_survives_double_initialization() {
        let mut rt = Runtime::new();
        rt.initialize();
        assert!(exec(&mut rt, "3 + 4").same_value(&Value::Int(7)));
        assert!(exec(&mut rt, "(1 & 2) printString")
            .same_value(&Value::string("(1, 2)")));
    }
}
