//! Random-access buffering of one canonical level at a time (§4.2 "Random
//! Access" variant of the levelized priority queue, §4.9 execution-policy
//! `access::Random_Access`).
//!
//! Unlike the levelized priority queue, which only ever looks at the next
//! request in level order, a random-access reader lets an algorithm index
//! directly into the *current* level's nodes by [`Uid`] or by a dense
//! index. This is only meaningful over a canonical node file (§9
//! supplement: non-canonical input is an [`Error::InvalidArgument`], not a
//! silent best-effort).

use std::collections::HashMap;

use crate::data::{LevelInfo, Node};
use crate::error::{Error, Result};
use crate::file::stream::{nodes_reverse, Stream};
use crate::file::NodeFile;
use crate::ptr::{Label, Ptr, Uid};

/// Buffers one level of a canonical node file at a time, advancing
/// top-down (ascending label) one `setup_next_level` call at a time.
pub struct NodeRandomAccess {
    stream: Stream<Node>,
    width: usize,
    current_label: Option<Label>,
    /// Dense position within the level, ascending in the level's original
    /// forward file order (the reverse stream yields them back-to-front;
    /// `setup_next_level` un-reverses before indexing).
    by_idx: Vec<Node>,
    by_uid: HashMap<Uid, usize>,
}

impl NodeRandomAccess {
    /// Attach to `file`. `file` must be canonical (§3 "Canonicity");
    /// anything else is a caller error; reduce the file first.
    pub fn attach(file: &NodeFile) -> Result<NodeRandomAccess> {
        if !file.metadata().canonical {
            return Err(Error::invalid_argument(
                "NodeRandomAccess requires a canonical (reduced) node file",
            ));
        }
        let stream = nodes_reverse(file)?;
        Ok(NodeRandomAccess {
            stream,
            width: 0,
            current_label: None,
            by_idx: Vec::new(),
            by_uid: HashMap::new(),
        })
    }

    pub fn has_next_level(&self) -> bool {
        self.stream.can_pull()
    }

    /// Buffer the next level (reading from the back of the file, since
    /// nodes are stored bottom-up but levels are consumed top-down here —
    /// callers drive this in ascending-label order via repeated calls).
    pub fn setup_next_level(&mut self, width: usize) -> Result<()> {
        self.by_idx.clear();
        self.by_uid.clear();
        self.width = width;
        let mut nodes = Vec::with_capacity(width);
        for _ in 0..width {
            nodes.push(self.stream.pull()?);
        }
        // `nodes` arrived in descending-id order (reverse file stream);
        // reverse once more to get ascending `idx`.
        nodes.reverse();
        self.current_label = nodes.first().map(|n| n.label());
        for (idx, node) in nodes.into_iter().enumerate() {
            self.by_uid.insert(node.uid(), idx);
            self.by_idx.push(node);
        }
        Ok(())
    }

    pub fn current_label(&self) -> Option<Label> {
        self.current_label
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Look up a node in the buffered level by its [`Uid`].
    pub fn at(&self, uid: Uid) -> Option<&Node> {
        self.by_uid.get(&uid).map(|&idx| &self.by_idx[idx])
    }

    /// Look up a node in the buffered level by dense ascending index.
    pub fn at_index(&self, idx: usize) -> Option<&Node> {
        self.by_idx.get(idx)
    }

    /// This level's lowest (all-false-child) terminal pointer, for callers
    /// that need a sentinel "beyond the buffered level" value.
    pub fn sentinel() -> Ptr {
        Ptr::NIL
    }
}

/// A lazily-advancing [`NodeRandomAccess`] over one input file, shared by
/// every top-down sweep that needs cofactor lookups on one or more input
/// diagrams at once ([`crate::prod2`], [`crate::quantify`],
/// [`crate::select`]). Advances only as far as the sweep's current label
/// actually asks for, discarding levels never queried.
pub struct LevelFrontier {
    ra: NodeRandomAccess,
    levels: std::vec::IntoIter<LevelInfo>,
    next: Option<LevelInfo>,
}

impl LevelFrontier {
    pub fn new(file: &NodeFile) -> Result<LevelFrontier> {
        let mut levels = file.metadata().levels.clone();
        levels.reverse(); // stored bottom-up; sweeps walk top-down.
        let ra = NodeRandomAccess::attach(file)?;
        let mut it = levels.into_iter();
        let next = it.next();
        Ok(LevelFrontier { ra, levels: it, next })
    }

    /// Buffer `label`'s nodes if this file has any, consuming and
    /// discarding any shallower levels the sweep never asked for.
    pub fn advance_to(&mut self, label: Label) -> Result<()> {
        while let Some(lv) = self.next {
            if lv.label > label {
                break;
            }
            self.ra.setup_next_level(lv.width)?;
            self.next = self.levels.next();
            if lv.label == label {
                break;
            }
        }
        Ok(())
    }

    /// The low/high cofactors of `ptr` at the sweep's current `label`: its
    /// real children if `ptr` is internal and has arrived at this level,
    /// otherwise `ptr` carried through unchanged on both branches (§4.4
    /// "carry that side unchanged (suppressed)").
    pub fn cofactors(&self, ptr: Ptr, label: Label) -> Result<(Ptr, Ptr)> {
        if ptr.is_internal() && ptr.label() == label {
            let node = self
                .at(Uid::new(ptr))
                .ok_or_else(|| Error::invalid_argument("sweep: node missing from random-access buffer"))?;
            Ok((node.low(), node.high()))
        } else {
            Ok((ptr, ptr))
        }
    }

    /// `ptr`'s low/high cofactor at `label`, in ZDD terms: its real children
    /// if it's an internal node exactly at `label`, otherwise `(ptr, False)`
    /// — a diagram that doesn't mention `label` stands for the same family
    /// whether `label` is excluded (low, unchanged) or, since none of its
    /// members contain `label`, the empty family if `label` is forced in
    /// (high). This is the one place ZDD and BDD sweeps diverge: the
    /// "unchanged on both branches" pass-through [`LevelFrontier::cofactors`]
    /// uses is BDD don't-care semantics and would silently invent members
    /// here.
    pub fn zdd_cofactors(&self, ptr: Ptr, label: Label) -> Result<(Ptr, Ptr)> {
        if ptr.is_internal() && ptr.label() == label {
            let node = self
                .at(Uid::new(ptr))
                .ok_or_else(|| Error::invalid_argument("sweep: node missing from random-access buffer"))?;
            Ok((node.low(), node.high()))
        } else {
            Ok((ptr, Ptr::terminal(false)))
        }
    }

    fn at(&self, uid: Uid) -> Option<&Node> {
        if self.ra.current_label() == Some(uid.label()) {
            self.ra.at(uid)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::new_node_writer;

    fn build_file() -> NodeFile {
        let (dir, mut w) = new_node_writer().unwrap();
        // Level 1 (bottom, written first): two nodes over terminals.
        let n0 = Node::internal(Uid::internal(1, 0), Ptr::terminal(false), Ptr::terminal(true));
        let n1 = Node::internal(Uid::internal(1, 1), Ptr::terminal(true), Ptr::terminal(false));
        w.push(n1).unwrap();
        w.push(n0).unwrap();
        w.push_level(1).unwrap();
        // Level 0 (top): one node pointing into level 1.
        let root = Node::internal(Uid::internal(0, 0), Ptr::internal(1, 0), Ptr::internal(1, 1));
        w.push(root).unwrap();
        w.push_level(0).unwrap();
        let output = w.close().unwrap();
        NodeFile::from_writer_output(dir, output).unwrap()
    }

    #[test]
    fn node_files_are_always_canonical_and_attachable() {
        let (dir, mut w) = new_node_writer().unwrap();
        w.push(Node::terminal(false)).unwrap();
        w.push_level(0).unwrap();
        let output = w.close().unwrap();
        let file = NodeFile::from_writer_output(dir, output).unwrap();
        assert!(file.metadata().canonical);
        assert!(NodeRandomAccess::attach(&file).is_ok());
    }

    #[test]
    fn buffers_levels_top_down_with_ascending_index() {
        let file = build_file();
        let mut ra = NodeRandomAccess::attach(&file).unwrap();
        assert!(ra.has_next_level());
        ra.setup_next_level(1).unwrap();
        assert_eq!(ra.current_label(), Some(0));
        assert!(ra.at(Uid::internal(0, 0)).is_some());

        assert!(ra.has_next_level());
        ra.setup_next_level(2).unwrap();
        assert_eq!(ra.current_label(), Some(1));
        assert_eq!(ra.at_index(0).unwrap().uid(), Uid::internal(1, 1));
        assert_eq!(ra.at_index(1).unwrap().uid(), Uid::internal(1, 0));
        assert!(!ra.has_next_level());
    }
}
