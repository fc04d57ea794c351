//! Pointers, unique identifiers, and the level ordering they induce
//!
//! A [`Ptr`] is the 64-bit opaque word every other data type in this crate is
//! built from: a tagged union of *nil*, a boolean *terminal* (with its flag
//! bit), and an *internal* pointer `(label, id)`. The bit layout is private —
//! callers only ever see the accessor methods named in the specification
//! (`is_terminal`, `is_nil`, `label`, `id`, `flag`). Keeping the layout
//! private is what lets us change it later (e.g. to support wider
//! `max_label`/`max_id`) without touching any algorithm built on top.

#![allow(clippy::unusual_byte_groupings)]

use std::cmp::Ordering;
use std::fmt;

/// Variable label type (§3: `label ∈ [0, max_label]`).
pub type Label = u32;

/// Level-local identifier type (§3: `id ∈ [0, max_id]`).
pub type Id = u32;

const TERMINAL_BIT: u64 = 1 << 63;
const VALUE_BIT: u64 = 1 << 62;
const FLAG_BIT: u64 = 1;

const ID_SHIFT: u32 = 1;
const ID_BITS: u32 = 32;
const ID_MASK: u64 = ((1u64 << ID_BITS) - 1) << ID_SHIFT;

const LABEL_SHIFT: u32 = ID_SHIFT + ID_BITS;
const LABEL_BITS: u32 = 30;
const LABEL_MASK: u64 = ((1u64 << LABEL_BITS) - 1) << LABEL_SHIFT;

/// The unique all-ones bit pattern reserved for [`Ptr::NIL`].
///
/// No valid terminal or internal pointer ever sets every bit in `[1, 62]`
/// (a valid terminal leaves bits `[1, 61]` zero; a valid internal pointer
/// never has `label == max_label && id == max_id` *and* the flag bit set
/// at the same time as the terminal bit, since the terminal bit is clear
/// for internal pointers) so this pattern cannot collide.
const NIL_BITS: u64 = u64::MAX;

/// The maximal representable variable label.
pub const MAX_LABEL: Label = (1 << LABEL_BITS) - 1;

/// The maximal representable level-local identifier.
pub const MAX_ID: Id = (1 << ID_BITS) - 1;

/// A pointer: *nil*, a *terminal* (boolean value + flag bit), or an
/// *internal* pointer `(label, id)` with a flag bit (§3).
///
/// Orderings are defined such that internal pointers sort lexicographically
/// by `(label, id)` and all terminals sort after all internal pointers at
/// any level (§3, §4.4's "terminals at +∞" rule).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ptr(u64);

impl Ptr {
    /// The sentinel pointer, distinct from every terminal and internal value.
    pub const NIL: Ptr = Ptr(NIL_BITS);

    /// Construct the terminal pointer for `value`, flag cleared.
    #[inline]
    pub const fn terminal(value: bool) -> Ptr {
        let mut bits = TERMINAL_BIT;
        if value {
            bits |= VALUE_BIT;
        }
        Ptr(bits)
    }

    /// Construct an internal pointer `(label, id)`, flag cleared.
    ///
    /// # Panics
    /// Panics if `label > MAX_LABEL` or `id > MAX_ID`.
    #[inline]
    pub fn internal(label: Label, id: Id) -> Ptr {
        assert!(label <= MAX_LABEL, "label {label} exceeds max_label");
        assert!(id <= MAX_ID, "id {id} exceeds max_id");
        Ptr(((label as u64) << LABEL_SHIFT) | ((id as u64) << ID_SHIFT))
    }

    /// Whether this is the nil sentinel.
    #[inline]
    pub const fn is_nil(self) -> bool {
        self.0 == NIL_BITS
    }

    /// Whether this pointer names a terminal.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        !self.is_nil() && (self.0 & TERMINAL_BIT) != 0
    }

    /// Whether this pointer names an internal node.
    #[inline]
    pub const fn is_internal(self) -> bool {
        !self.is_nil() && (self.0 & TERMINAL_BIT) == 0
    }

    /// The terminal's boolean value.
    ///
    /// # Panics
    /// Panics if `!self.is_terminal()`.
    #[inline]
    pub fn value(self) -> bool {
        assert!(self.is_terminal(), "value() on a non-terminal pointer");
        (self.0 & VALUE_BIT) != 0
    }

    /// The shorthand for `is_terminal() && !value()`.
    #[inline]
    pub fn is_false(self) -> bool {
        self.is_terminal() && !self.value()
    }

    /// The shorthand for `is_terminal() && value()`.
    #[inline]
    pub fn is_true(self) -> bool {
        self.is_terminal() && self.value()
    }

    /// This pointer's variable label.
    ///
    /// # Panics
    /// Panics if `!self.is_internal()`.
    #[inline]
    pub fn label(self) -> Label {
        assert!(self.is_internal(), "label() on a non-internal pointer");
        ((self.0 & LABEL_MASK) >> LABEL_SHIFT) as Label
    }

    /// This pointer's level-local identifier.
    ///
    /// # Panics
    /// Panics if `!self.is_internal()`.
    #[inline]
    pub fn id(self) -> Id {
        assert!(self.is_internal(), "id() on a non-internal pointer");
        ((self.0 & ID_MASK) >> ID_SHIFT) as Id
    }

    /// The flag bit. Unused by any [`Ptr`]/[`Uid`] invariant on its own —
    /// [`Uid::new`] always clears it — but available as one spare bit for a
    /// caller to pack a meaning onto a pointer without growing the word;
    /// [`crate::data::Arc`] is the one user, packing the low/high out-edge
    /// direction onto its source pointer (see that type's doc comment).
    #[inline]
    pub const fn flag(self) -> bool {
        (self.0 & FLAG_BIT) != 0
    }

    /// This pointer with the flag bit set to `flag`.
    #[inline]
    pub const fn with_flag(self, flag: bool) -> Ptr {
        if flag {
            Ptr(self.0 | FLAG_BIT)
        } else {
            Ptr(self.0 & !FLAG_BIT)
        }
    }

    /// This pointer with the flag bit flipped.
    #[inline]
    pub const fn negated(self) -> Ptr {
        Ptr(self.0 ^ FLAG_BIT)
    }

    /// The level this pointer is at: `Some(label)` for internal pointers,
    /// `None` for terminals (sorting after every internal level, §4.4).
    #[inline]
    pub fn level(self) -> Level {
        if self.is_internal() {
            Level::Label(self.label())
        } else {
            Level::Infinity
        }
    }

    /// Raw 8-byte little-endian encoding used by the on-disk record format
    /// (§6: "8 bytes for pointers").
    #[inline]
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    /// Inverse of [`Ptr::to_bytes`].
    #[inline]
    pub fn from_bytes(bytes: [u8; 8]) -> Ptr {
        Ptr(u64::from_le_bytes(bytes))
    }
}

impl fmt::Debug for Ptr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            write!(f, "Ptr::NIL")
        } else if self.is_terminal() {
            write!(f, "Ptr::terminal({}, flag={})", self.value(), self.flag())
        } else {
            write!(
                f,
                "Ptr::internal(label={}, id={}, flag={})",
                self.label(),
                self.id(),
                self.flag()
            )
        }
    }
}

/// Total order on pointers: internal pointers sort by `(label, id)` and
/// every terminal sorts after every internal pointer (§3).
impl PartialOrd for Ptr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ptr {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_internal(), other.is_internal()) {
            (true, true) => (self.label(), self.id()).cmp(&(other.label(), other.id())),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.0.cmp(&other.0),
        }
    }
}

/// A [`Ptr`] with its flag bit guaranteed clear: uniquely names a node (§3).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uid(Ptr);

impl Uid {
    /// Wrap a pointer as a UID, clearing its flag bit.
    #[inline]
    pub fn new(ptr: Ptr) -> Uid {
        Uid(ptr.with_flag(false))
    }

    /// The terminal UID for `value`.
    #[inline]
    pub const fn terminal(value: bool) -> Uid {
        Uid(Ptr::terminal(value))
    }

    /// The internal UID `(label, id)`.
    #[inline]
    pub fn internal(label: Label, id: Id) -> Uid {
        Uid(Ptr::internal(label, id))
    }

    /// View this UID as a plain pointer (flag still clear).
    #[inline]
    pub const fn as_ptr(self) -> Ptr {
        self.0
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        self.0.is_terminal()
    }
    #[inline]
    pub fn is_internal(self) -> bool {
        self.0.is_internal()
    }
    #[inline]
    pub fn value(self) -> bool {
        self.0.value()
    }
    #[inline]
    pub fn label(self) -> Label {
        self.0.label()
    }
    #[inline]
    pub fn id(self) -> Id {
        self.0.id()
    }
    #[inline]
    pub fn level(self) -> Level {
        self.0.level()
    }
}

impl fmt::Debug for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl From<Uid> for Ptr {
    fn from(u: Uid) -> Ptr {
        u.0
    }
}

/// The level of a pointer or a request: a variable label, or `Infinity` for
/// anything that bottoms out at a terminal (§4.4).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Label(Label),
    Infinity,
}

impl Level {
    /// The minimum of two levels (§4.4: "top level is `min(level(p_f),
    /// level(p_g))` with terminals at +∞").
    #[inline]
    pub fn min(self, other: Level) -> Level {
        std::cmp::min(self, other)
    }

    /// The underlying label, if any.
    #[inline]
    pub fn label(self) -> Option<Label> {
        match self {
            Level::Label(l) => Some(l),
            Level::Infinity => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nil_is_distinct_from_every_terminal_and_internal() {
        assert!(Ptr::NIL.is_nil());
        assert!(!Ptr::NIL.is_terminal());
        assert!(!Ptr::NIL.is_internal());
        assert_ne!(Ptr::NIL, Ptr::terminal(true));
        assert_ne!(Ptr::NIL, Ptr::terminal(false));
        assert_ne!(Ptr::NIL, Ptr::internal(MAX_LABEL, MAX_ID));
    }

    #[test]
    fn internal_pointers_round_trip_label_and_id() {
        let p = Ptr::internal(42, 7);
        assert!(p.is_internal());
        assert_eq!(p.label(), 42);
        assert_eq!(p.id(), 7);
        assert!(!p.flag());
    }

    #[test]
    fn ordering_is_lexicographic_then_terminals_last() {
        let a = Ptr::internal(1, 5);
        let b = Ptr::internal(1, 6);
        let c = Ptr::internal(2, 0);
        let t = Ptr::terminal(false);
        assert!(a < b);
        assert!(b < c);
        assert!(c < t);
    }

    #[test]
    fn uid_clears_flag() {
        let p = Ptr::internal(3, 3).with_flag(true);
        let u = Uid::new(p);
        assert!(!u.as_ptr().flag());
    }

    #[test]
    fn byte_round_trip_is_stable() {
        for p in [
            Ptr::NIL,
            Ptr::terminal(true),
            Ptr::terminal(false),
            Ptr::internal(0, 0),
            Ptr::internal(MAX_LABEL, MAX_ID),
        ] {
            assert_eq!(Ptr::from_bytes(p.to_bytes()), p);
        }
    }

    #[test]
    fn level_min_treats_terminal_as_infinity() {
        let internal = Level::Label(3);
        assert_eq!(internal.min(Level::Infinity), internal);
        assert_eq!(Level::Infinity.min(Level::Infinity), Level::Infinity);
    }
}
