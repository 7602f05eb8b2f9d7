use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::objects::Obj;

/// A strong, owning handle to a slot-bearing object.
///
/// Objects are shared by reference count. Cycles in the parent graph are
/// permitted; the lookup engine tolerates them with a per-call visited
/// chain, so no weak back-references are needed.
pub type ObjHandle = Rc<RefCell<Obj>>;

/// A handle to a growable vector of values with shared element cells.
pub type VectorHandle = Rc<RefCell<Vec<Value>>>;

/// A runtime value.
///
/// Numbers, strings and vectors do not carry their own slots; lookup on
/// them is routed to the shared trait objects in
/// [`SpecialObjects`](crate::SpecialObjects). `nil`, `true`, `false` and
/// methods are ordinary [`Obj`]s behind an [`ObjHandle`].
#[derive(Clone)]
pub enum Value {
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit IEEE float, produced by division and fractional literals.
    Float(f64),
    /// Immutable text.
    Str(Rc<str>),
    /// A slot-bearing object; a method when its code list is present.
    Obj(ObjHandle),
    /// Ordered, growable sequence of values.
    Vector(VectorHandle),
    /// The name of a sibling data slot. Only ever appears as a slot
    /// value; the evaluator recognizes it during message send and
    /// performs the sibling-slot assignment.
    Mutator(Rc<str>),
}

impl Value {
    /// Build a string value from anything string-like.
    pub fn string(text: impl AsRef<str>) -> Self {
        Self::Str(Rc::from(text.as_ref()))
    }

    /// Build a vector value from a list of elements.
    pub fn vector(elements: Vec<Value>) -> Self {
        Self::Vector(Rc::new(RefCell::new(elements)))
    }

    /// The object handle, if this value is an object.
    pub fn as_obj(&self) -> Option<&ObjHandle> {
        match self {
            Self::Obj(handle) => Some(handle),
            _ => None,
        }
    }

    /// True if this value is an object carrying a code list.
    pub fn is_method(&self) -> bool {
        match self {
            Self::Obj(handle) => handle.borrow().code.is_some(),
            _ => false,
        }
    }

    /// Universal equality: numbers compare numerically across `Int` and
    /// `Float`, strings by content, objects and vectors by handle
    /// identity, mutators by tagged name.
    pub fn same_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => {
                *a as f64 == *b
            }
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Obj(a), Self::Obj(b)) => Rc::ptr_eq(a, b),
            (Self::Vector(a), Self::Vector(b)) => Rc::ptr_eq(a, b),
            (Self::Mutator(a), Self::Mutator(b)) => a == b,
            _ => false,
        }
    }

    /// Human-readable kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Obj(handle) => {
                if handle.borrow().code.is_some() {
                    "method"
                } else {
                    "object"
                }
            }
            Self::Vector(_) => "vector",
            Self::Mutator(_) => "mutator",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(x) => write!(f, "{}", x),
            Self::Str(s) => write!(f, "{}", s),
            Self::Obj(handle) => write!(f, "{}", handle.borrow()),
            Self::Vector(elements) => {
                write!(f, "(")?;
                for (i, element) in elements.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, ")")
            }
            Self::Mutator(name) => write!(f, "<-{}", name),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "Int({})", n),
            Self::Float(x) => write!(f, "Float({})", x),
            Self::Str(s) => write!(f, "Str({:?})", s),
            // Shallow on purpose: slot values may form cycles.
            Self::Obj(handle) => write!(f, "Obj({})", handle.borrow()),
            Self::Vector(elements) => {
                write!(f, "Vector(len={})", elements.borrow().len())
            }
            Self::Mutator(name) => write!(f, "Mutator({})", name),
        }
    }
}
