use crate::{Obj, ObjHandle};

/// Well-known singleton objects and trait objects.
///
/// Holds handles the runtime needs for core operations and for looking
/// up messages on values that carry no slots of their own. Allocated
/// once per interpreter instance; re-initialization clears the objects'
/// slots but keeps their identities, so captured handles stay valid.
///
/// Pass this struct by reference (`&SpecialObjects`) to subsystems that
/// need it.
pub struct SpecialObjects {
    // ── Singletons ─────────────────────────────────────────────────
    /// The canonical `nil` object.
    pub nil: ObjHandle,

    /// The canonical `true` object.
    pub true_obj: ObjHandle,

    /// The canonical `false` object.
    pub false_obj: ObjHandle,

    // ── Trait objects for slot-less values ─────────────────────────
    /// Behavior shared by `Int` and `Float` values.
    pub number_traits: ObjHandle,

    /// Behavior shared by `Str` values.
    pub string_traits: ObjHandle,

    /// Behavior shared by `Vector` values.
    pub vector_traits: ObjHandle,

    /// Behavior shared by block objects (their `parent` slot points
    /// here).
    pub block_traits: ObjHandle,

    // ── The root ───────────────────────────────────────────────────
    /// The lobby: implicit receiver of top-level programs and parent of
    /// the trait objects.
    pub lobby: ObjHandle,
}

impl SpecialObjects {
    /// Allocate all special objects, each initially slotless.
    pub fn new() -> Self {
        Self {
            nil: Obj::new().handle(),
            true_obj: Obj::new().handle(),
            false_obj: Obj::new().handle(),
            number_traits: Obj::new().handle(),
            string_traits: Obj::new().handle(),
            vector_traits: Obj::new().handle(),
            block_traits: Obj::new().handle(),
            lobby: Obj::new().handle(),
        }
    }
}

impl Default for SpecialObjects {
    fn default() -> Self {
        Self::new()
    }
}
