use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::{Obj, ObjHandle, Slot, SpecialObjects, Value};

/// Stack-allocated linked list for cycle detection.
///
/// Each node lives on a recursive call's stack frame and points to the
/// caller's node, so the chain is valid for exactly the duration of one
/// lookup. Keyed by object identity.
struct VisitedLink<'a> {
    obj: *const RefCell<Obj>,
    prev: Option<&'a VisitedLink<'a>>,
}

impl<'a> VisitedLink<'a> {
    fn contains(mut link: Option<&VisitedLink<'_>>, target: &ObjHandle) -> bool {
        let target = Rc::as_ptr(target);
        while let Some(node) = link {
            if std::ptr::eq(node.obj, target) {
                return true;
            }
            link = node.prev;
        }
        false
    }
}

/// A successful lookup.
#[derive(Debug, Clone)]
pub struct Found {
    /// The object that owns the slot (may differ from the receiver when
    /// the slot was found via a parent link).
    pub holder: ObjHandle,
    /// Copy of the matching slot.
    pub slot: Slot,
    /// Index of the slot within its holder.
    pub slot_index: usize,
}

impl Found {
    /// Two results denote the same slot when holder and index agree.
    /// Distinct parent chains converging on one slot (diamond
    /// inheritance) are not ambiguous.
    fn same_slot(&self, other: &Found) -> bool {
        Rc::ptr_eq(&self.holder, &other.holder)
            && self.slot_index == other.slot_index
    }
}

/// Why a lookup failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// No reachable slot carries the name.
    Unknown(String),
    /// Two or more distinct slots are reachable via distinct parent
    /// chains with no closer shadowing.
    Ambiguous(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(name) => write!(f, "UnknownMessageSend({})", name),
            Self::Ambiguous(name) => {
                write!(f, "AmbiguousMessageSend({})", name)
            }
        }
    }
}

impl std::error::Error for LookupError {}

/// Look up `name` on `receiver`.
///
/// Objects search their own slots first (a local slot always shadows an
/// inherited one), then every parent-flagged slot's value. Values
/// without slots delegate to the matching trait object in `specials`;
/// any other slot-less value simply has no slots.
pub fn find_slot(
    receiver: &Value,
    name: &str,
    specials: &SpecialObjects,
) -> Result<Found, LookupError> {
    match lookup_value(receiver, name, specials, None)? {
        Some(found) => Ok(found),
        None => Err(LookupError::Unknown(name.to_string())),
    }
}

fn lookup_value(
    receiver: &Value,
    name: &str,
    specials: &SpecialObjects,
    visited: Option<&VisitedLink<'_>>,
) -> Result<Option<Found>, LookupError> {
    match receiver {
        Value::Obj(obj) => lookup_in_object(obj, name, visited),
        Value::Int(_) | Value::Float(_) => {
            lookup_in_object(&specials.number_traits, name, visited)
        }
        Value::Str(_) => {
            lookup_in_object(&specials.string_traits, name, visited)
        }
        Value::Vector(_) => {
            lookup_in_object(&specials.vector_traits, name, visited)
        }
        // Mutators carry no behavior of their own.
        Value::Mutator(_) => Ok(None),
    }
}

fn lookup_in_object(
    obj: &ObjHandle,
    name: &str,
    visited: Option<&VisitedLink<'_>>,
) -> Result<Option<Found>, LookupError> {
    if VisitedLink::contains(visited, obj) {
        return Ok(None);
    }

    let borrow = obj.borrow();

    // Local scan — an own slot shadows anything inherited.
    for (i, slot) in borrow.slots.iter().enumerate() {
        if &*slot.name == name {
            return Ok(Some(Found {
                holder: obj.clone(),
                slot: slot.clone(),
                slot_index: i,
            }));
        }
    }

    // Parent walk. Results from distinct parents must agree on a single
    // slot; otherwise the send is ambiguous.
    let link = VisitedLink {
        obj: Rc::as_ptr(obj),
        prev: visited,
    };

    let mut found: Option<Found> = None;
    for slot in borrow.slots.iter() {
        if !slot.is_parent() {
            continue;
        }
        // Non-object parents contribute no further slots.
        let Value::Obj(parent) = &slot.value else {
            continue;
        };
        if let Some(hit) = lookup_in_object(parent, name, Some(&link))? {
            match &found {
                None => found = Some(hit),
                Some(existing) if existing.same_slot(&hit) => {}
                Some(_) => {
                    return Err(LookupError::Ambiguous(name.to_string()));
                }
            }
        }
    }

    Ok(found)
}
