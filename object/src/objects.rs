use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::{Code, ObjHandle, Slot, SlotTags, Value};

/// Synthesized name of slot 0 in a block method. Unspellable in source
/// (parentheses never lex as part of an identifier), so user slots can
/// never collide with it.
pub const BLOCK_PARENT_SLOT: &str = "(parent)";

/// Name of the block slot holding the captured enclosing activation.
pub const LEXICAL_PARENT_SLOT: &str = "lexicalParent";

/// A slot-bearing record: the only compound object in the system.
///
/// Plain objects carry `code: None`. A method is an object whose code
/// list is present; activations are method clones whose argument slots
/// have been filled in. Slot order is observable in printing and in
/// activation indexing, but irrelevant for lookup.
pub struct Obj {
    pub slots: Vec<Slot>,
    /// Method body, shared between a method and its activations.
    pub code: Option<Rc<[Code]>>,
}

impl Obj {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            code: None,
        }
    }

    pub fn with_slots(slots: Vec<Slot>) -> Self {
        Self { slots, code: None }
    }

    pub fn method(slots: Vec<Slot>, code: Vec<Code>) -> Self {
        Self {
            slots,
            code: Some(code.into()),
        }
    }

    /// Wrap into a shared handle.
    pub fn handle(self) -> ObjHandle {
        Rc::new(RefCell::new(self))
    }

    /// Find an own slot by name.
    pub fn slot(&self, name: &str) -> Option<(usize, &Slot)> {
        self.slots
            .iter()
            .enumerate()
            .find(|(_, slot)| &*slot.name == name)
    }

    pub fn has_slot(&self, name: &str) -> bool {
        self.slot(name).is_some()
    }

    /// Append a slot. Returns `false` (and leaves the object unchanged)
    /// when a slot of that name already exists.
    pub fn add_slot(&mut self, slot: Slot) -> bool {
        if self.has_slot(&slot.name) {
            return false;
        }
        self.slots.push(slot);
        true
    }

    /// Append a data slot together with its paired mutator slot `name:`.
    pub fn add_data_slot(
        &mut self,
        name: impl AsRef<str>,
        tags: SlotTags,
        value: Value,
    ) -> bool {
        let name = name.as_ref();
        let mutator_name = format!("{}:", name);
        if self.has_slot(name) || self.has_slot(&mutator_name) {
            return false;
        }
        self.slots.push(Slot::new(tags | SlotTags::DATA, name, value));
        self.slots.push(Slot::constant(
            &mutator_name,
            Value::Mutator(Rc::from(name)),
        ));
        true
    }

    /// Per-slot clone for prototypes and activations: the slot vector is
    /// copied so mutable cells are independent, while slot values and
    /// the code list stay structurally shared.
    pub fn clone_object(&self) -> Obj {
        Obj {
            slots: self.slots.clone(),
            code: self.code.clone(),
        }
    }

    /// True for methods whose slot 0 is the synthesized block parent.
    pub fn is_block_method(&self) -> bool {
        self.slots
            .first()
            .is_some_and(|slot| &*slot.name == BLOCK_PARENT_SLOT)
    }
}

impl Default for Obj {
    fn default() -> Self {
        Self::new()
    }
}

/// `(| slot1. slot2. … |)` for plain objects, `(| slots | codes )` for
/// methods. Slots print their kind markers only, never their values.
impl fmt::Display for Obj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(|")?;
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, " {}", slot)?;
        }
        write!(f, " |")?;
        if let Some(code) = &self.code {
            for node in code.iter() {
                write!(f, " {}", node)?;
            }
            write!(f, " ")?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for Obj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
