use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

use crate::Value;

bitflags! {
    /// Property flags for a [`Slot`].
    ///
    /// A slot with neither `DATA` nor `ARGUMENT` set is a constant.
    /// `PARENT` is orthogonal to the slot kind: the lookup algorithm
    /// traverses any parent-flagged slot whose value is an object.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SlotTags: u8 {
        /// Assignable data slot; owns a paired `name:` mutator slot.
        const DATA = 1 << 0;
        /// Argument slot; assigned only by the runtime during activation.
        const ARGUMENT = 1 << 1;
        /// Parent link traversed by lookup.
        const PARENT = 1 << 2;
    }
}

/// A named cell inside an [`Obj`](crate::Obj).
///
/// Slot names are unique within one object. Every data slot `x` has a
/// sibling constant slot `x:` holding [`Value::Mutator`]`("x")` — the
/// mutator invariant, maintained by
/// [`Obj::add_data_slot`](crate::Obj::add_data_slot).
#[derive(Debug, Clone)]
pub struct Slot {
    pub name: Rc<str>,
    pub tags: SlotTags,
    pub value: Value,
}

impl Slot {
    pub fn new(tags: SlotTags, name: impl AsRef<str>, value: Value) -> Self {
        Self {
            name: Rc::from(name.as_ref()),
            tags,
            value,
        }
    }

    /// A constant slot.
    pub fn constant(name: impl AsRef<str>, value: Value) -> Self {
        Self::new(SlotTags::empty(), name, value)
    }

    /// A data slot. Callers almost always want
    /// [`Obj::add_data_slot`](crate::Obj::add_data_slot) instead, which
    /// also emits the paired mutator.
    pub fn data(name: impl AsRef<str>, value: Value) -> Self {
        Self::new(SlotTags::DATA, name, value)
    }

    /// An argument slot.
    pub fn argument(name: impl AsRef<str>, value: Value) -> Self {
        Self::new(SlotTags::ARGUMENT, name, value)
    }

    /// Add the parent flag to this slot.
    pub fn parent(mut self) -> Self {
        self.tags |= SlotTags::PARENT;
        self
    }

    #[inline]
    pub fn is_constant(&self) -> bool {
        !self.tags.intersects(SlotTags::DATA | SlotTags::ARGUMENT)
    }

    #[inline]
    pub fn is_data(&self) -> bool {
        self.tags.contains(SlotTags::DATA)
    }

    #[inline]
    pub fn is_argument(&self) -> bool {
        self.tags.contains(SlotTags::ARGUMENT)
    }

    #[inline]
    pub fn is_parent(&self) -> bool {
        self.tags.contains(SlotTags::PARENT)
    }
}

/// Prints the slot's kind markers, not its value:
/// `:` prefix for arguments, `*` suffix for parents, `<-` for data.
impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_argument() {
            write!(f, ":")?;
        }
        write!(f, "{}", self.name)?;
        if self.is_parent() {
            write!(f, "*")?;
        }
        if self.is_data() {
            write!(f, "<-")?;
        }
        Ok(())
    }
}
