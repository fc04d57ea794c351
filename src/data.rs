//! Value types built on [`crate::ptr`]: tuples, nodes, arcs (§3)
//!
//! The node/arc outdegree is a const generic (§9's redesign flag preserving
//! room for future MDD/QMDD support); every algorithm in this crate
//! instantiates it at `OUTDEGREE = 2` via the [`BOOLEAN`] alias, and a
//! terminal carries a `bool` value per §9 ("initial implementation targets
//! `outdegree = 2` and boolean terminals").

use crate::ptr::{Id, Label, Level, Ptr, Uid};

/// A fixed-size tuple of pointers — a node's children, or a sweep's request
/// payload (§3, §4.4).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tuple<const N: usize>(pub [Ptr; N]);

impl<const N: usize> Tuple<N> {
    pub fn new(items: [Ptr; N]) -> Tuple<N> {
        Tuple(items)
    }

    /// The level this tuple is scheduled at: the minimum level of its
    /// entries, terminals counting as `+∞` (§4.4).
    pub fn level(&self) -> Level {
        self.0.iter().fold(Level::Infinity, |acc, p| acc.min(p.level()))
    }
}

impl<const N: usize> std::ops::Index<usize> for Tuple<N> {
    type Output = Ptr;
    fn index(&self, idx: usize) -> &Ptr {
        &self.0[idx]
    }
}

impl<const N: usize> std::fmt::Debug for Tuple<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Tuple").field(&self.0).finish()
    }
}

/// Outdegree of a binary decision diagram node, per §9's `Node::outdegree`.
pub const OUTDEGREE: usize = 2;

/// A decision diagram node `(uid, low, high)` (§3).
///
/// Invariants upheld by construction helpers, not re-checked on every field
/// access (callers that build nodes from raw arc data are responsible for
/// invariant (1); Reduce is what enforces (2) and (3)):
/// 1. if `low`/`high` is internal, `uid.label() < low/high.label()`.
/// 2. `low != high` in a reduced diagram.
/// 3. two distinct nodes on a level never share `(low, high)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Node {
    uid: Uid,
    children: Tuple<OUTDEGREE>,
}

impl Node {
    /// Construct the special terminal-node representation `(terminal_uid,
    /// nil, nil)` used as a 1-node constant diagram (§3).
    pub fn terminal(value: bool) -> Node {
        Node {
            uid: Uid::terminal(value),
            children: Tuple::new([Ptr::NIL, Ptr::NIL]),
        }
    }

    /// Construct an internal node `(uid, low, high)`.
    ///
    /// # Panics
    /// Panics if `uid` is not internal, or if an internal child does not
    /// sort strictly after `uid` (ordered-diagram invariant).
    pub fn internal(uid: Uid, low: Ptr, high: Ptr) -> Node {
        assert!(uid.is_internal(), "node uid must be internal");
        for child in [low, high] {
            if child.is_internal() {
                assert!(
                    uid.label() < child.label(),
                    "ordered-diagram invariant violated: {:?} -> {:?}",
                    uid,
                    child
                );
            }
        }
        Node { uid, children: Tuple::new([low, high]) }
    }

    pub fn uid(&self) -> Uid {
        self.uid
    }
    pub fn low(&self) -> Ptr {
        self.children[0]
    }
    pub fn high(&self) -> Ptr {
        self.children[1]
    }
    pub fn children(&self) -> Tuple<OUTDEGREE> {
        self.children
    }
    pub fn is_terminal(&self) -> bool {
        self.uid.is_terminal()
    }
    pub fn label(&self) -> Label {
        self.uid.label()
    }
    pub fn id(&self) -> Id {
        self.uid.id()
    }

    /// The canonical per-level sort key: descending `(high, low)` (§3
    /// "Canonicity").
    pub fn canonical_key(&self) -> (std::cmp::Reverse<Ptr>, std::cmp::Reverse<Ptr>) {
        (std::cmp::Reverse(self.high()), std::cmp::Reverse(self.low()))
    }

    /// Fixed-size on-disk encoding (§6: "24 bytes for nodes").
    pub fn to_bytes(&self) -> [u8; 24] {
        let mut out = [0u8; 24];
        out[0..8].copy_from_slice(&self.uid.as_ptr().to_bytes());
        out[8..16].copy_from_slice(&self.low().to_bytes());
        out[16..24].copy_from_slice(&self.high().to_bytes());
        out
    }

    pub fn from_bytes(bytes: [u8; 24]) -> Node {
        let mut uid_bytes = [0u8; 8];
        let mut low_bytes = [0u8; 8];
        let mut high_bytes = [0u8; 8];
        uid_bytes.copy_from_slice(&bytes[0..8]);
        low_bytes.copy_from_slice(&bytes[8..16]);
        high_bytes.copy_from_slice(&bytes[16..24]);
        Node {
            uid: Uid::new(Ptr::from_bytes(uid_bytes)),
            children: Tuple::new([Ptr::from_bytes(low_bytes), Ptr::from_bytes(high_bytes)]),
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_terminal() {
            write!(f, "Node::terminal({})", self.uid.value())
        } else {
            write!(f, "Node({:?} -> low={:?}, high={:?})", self.uid, self.low(), self.high())
        }
    }
}

/// An arc `(source, target)` produced during construction, before Reduce
/// (§3). The out-flag ("is this the low or high arc") is carried on the
/// flag bit of `source` — a UID's flag bit is otherwise unused, so this
/// keeps the on-disk record at exactly two packed pointers (16 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Arc {
    source: Ptr,
    target: Ptr,
}

impl Arc {
    /// Construct the low (`is_high = false`) or high (`is_high = true`) arc
    /// out of `source` to `target`.
    pub fn new(source: Uid, is_high: bool, target: Ptr) -> Arc {
        Arc { source: source.as_ptr().with_flag(is_high), target }
    }

    pub fn source(&self) -> Uid {
        Uid::new(self.source)
    }

    /// Whether this is the high (`true`-cofactor) out-arc.
    pub fn is_high(&self) -> bool {
        self.source.flag()
    }

    pub fn target(&self) -> Ptr {
        self.target
    }

    /// Whether `target` is a terminal (vs. an internal arc, §3).
    pub fn is_terminal_arc(&self) -> bool {
        self.target.is_terminal()
    }

    /// Fixed-size on-disk encoding (§6: "16 bytes for arcs").
    pub fn to_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[0..8].copy_from_slice(&self.source.to_bytes());
        out[8..16].copy_from_slice(&self.target.to_bytes());
        out
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Arc {
        let mut source_bytes = [0u8; 8];
        let mut target_bytes = [0u8; 8];
        source_bytes.copy_from_slice(&bytes[0..8]);
        target_bytes.copy_from_slice(&bytes[8..16]);
        Arc { source: Ptr::from_bytes(source_bytes), target: Ptr::from_bytes(target_bytes) }
    }
}

impl std::fmt::Debug for Arc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Arc({:?} --{}--> {:?})",
            self.source(),
            if self.is_high() { "hi" } else { "lo" },
            self.target
        )
    }
}

/// A level-info record `(label, width)` (§3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelInfo {
    pub label: Label,
    pub width: usize,
}

impl LevelInfo {
    pub fn to_bytes(self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[0..4].copy_from_slice(&self.label.to_le_bytes());
        out[8..16].copy_from_slice(&(self.width as u64).to_le_bytes());
        out
    }

    pub fn from_bytes(bytes: [u8; 16]) -> LevelInfo {
        let mut label_bytes = [0u8; 4];
        let mut width_bytes = [0u8; 8];
        label_bytes.copy_from_slice(&bytes[0..4]);
        width_bytes.copy_from_slice(&bytes[8..16]);
        LevelInfo { label: Label::from_le_bytes(label_bytes), width: u64::from_le_bytes(width_bytes) as usize }
    }
}

/// A recursion request: a tuple of pointers scheduled through the levelized
/// priority queue (§4.2, §4.4). Generic over arity so both the 2-ary product
/// construction and the 2-ary equality/quantify sweeps share one type.
pub type Request<const N: usize> = Tuple<N>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_node_has_nil_children() {
        let n = Node::terminal(true);
        assert!(n.is_terminal());
        assert!(n.low().is_nil());
        assert!(n.high().is_nil());
    }

    #[test]
    #[should_panic(expected = "ordered-diagram")]
    fn internal_node_rejects_out_of_order_child() {
        let uid = Uid::internal(5, 0);
        let bad_child = Ptr::internal(2, 0);
        Node::internal(uid, bad_child, Ptr::terminal(false));
    }

    #[test]
    fn arc_out_flag_round_trips_through_bytes() {
        let uid = Uid::internal(3, 1);
        let a = Arc::new(uid, true, Ptr::terminal(false));
        assert!(a.is_high());
        let back = Arc::from_bytes(a.to_bytes());
        assert_eq!(back.source(), uid);
        assert!(back.is_high());
        assert_eq!(back.target(), Ptr::terminal(false));
    }

    #[test]
    fn node_byte_round_trip() {
        let n = Node::internal(Uid::internal(1, 0), Ptr::terminal(false), Ptr::internal(2, 3));
        let back = Node::from_bytes(n.to_bytes());
        assert_eq!(back, n);
    }

    #[test]
    fn canonical_key_orders_descending_high_then_low() {
        let a = Node::internal(Uid::internal(0, 0), Ptr::terminal(false), Ptr::terminal(true));
        let b = Node::internal(Uid::internal(0, 1), Ptr::terminal(true), Ptr::terminal(true));
        assert!(b.canonical_key() < a.canonical_key());
    }
}
