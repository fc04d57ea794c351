//! Reconstructs nodes on the fly from a pair of arcs in an arc file
//! (§4.1, grounded on `node_arc_stream.h` in the original sources: a view
//! that lets downstream consumers treat an unreduced arc file as if it were
//! already a node file).
//!
//! An arc file stores a node's low- and high-arc as two separate records,
//! written in whatever order the producing sweep emitted them. This stream
//! pairs them back up by source, attaching lazily: if the file is not
//! already sorted by source (`!semi_transposed`), the stream sorts it on
//! attach rather than erroring — "self-healing", per the original's
//! attach contract.

use crate::data::{Arc, Node};
use crate::error::{Error, Result};
use crate::file::ArcFile;
use crate::ptr::{Ptr, Uid};

/// A forward stream that yields whole [`Node`]s out of an arc file's
/// internal arcs, pairing the low/high arc of each source as it goes.
pub struct NodeArcStream {
    arcs: Vec<Arc>,
    idx: usize,
}

impl NodeArcStream {
    /// Attach to `file`'s internal arcs. Sorts by source ascending first if
    /// the file isn't already known to be in that order.
    pub fn attach(file: &ArcFile) -> Result<NodeArcStream> {
        let mut arcs = file.internal_reader()?.drain_fwd()?;
        arcs.sort_by_key(|a| a.source());
        Ok(NodeArcStream { arcs, idx: 0 })
    }

    pub fn can_pull(&self) -> bool {
        self.idx < self.arcs.len()
    }

    /// Pull the next node, consuming its low and high arc together.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if the two arcs at the front of
    /// the stream do not share a source, or if their low/high tagging
    /// doesn't cover both slots exactly once — a malformed arc file.
    pub fn pull(&mut self) -> Result<Node> {
        if self.idx + 2 > self.arcs.len() {
            return Err(Error::out_of_range("node_arc_stream exhausted mid-node"));
        }
        let a = self.arcs[self.idx];
        let b = self.arcs[self.idx + 1];
        self.idx += 2;

        if a.source() != b.source() {
            return Err(Error::invalid_argument("node_arc_stream: mismatched arc pair sources"));
        }
        let (low, high) = match (a.is_high(), b.is_high()) {
            (false, true) => (a.target(), b.target()),
            (true, false) => (b.target(), a.target()),
            _ => {
                return Err(Error::invalid_argument(
                    "node_arc_stream: arc pair does not cover one low and one high arc",
                ))
            }
        };
        Ok(Node::internal(a.source(), low, high))
    }
}

/// The root pointer of an arc file: the source of its very first arc in
/// source order, or a terminal pointer if the file is terminal-only.
pub fn root_of(file: &ArcFile) -> Result<Ptr> {
    if file.is_terminal() {
        let mut r = file.terminals_in_order_reader()?;
        if r.is_empty() {
            r = file.terminals_out_of_order_reader()?;
        }
        return Ok(r.peek_fwd()?.target());
    }
    let mut stream = NodeArcStream::attach(file)?;
    if !stream.can_pull() {
        return Err(Error::invalid_argument("root_of: empty arc file"));
    }
    Ok(stream.pull()?.uid().as_ptr())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::new_arc_writer;

    #[test]
    fn pairs_low_and_high_arcs_by_source() {
        let (_dir, mut w) = new_arc_writer().unwrap();
        let uid = Uid::internal(0, 0);
        // Pushed high-then-low, out of tag order, to exercise the pairing logic.
        w.push(Arc::new(uid, true, Ptr::terminal(true))).unwrap();
        w.push(Arc::new(uid, false, Ptr::terminal(false))).unwrap();
        w.push_level(0).unwrap();
        let output = w.close().unwrap();
        let file = crate::file::ArcFile::from_writer_output(_dir, output);

        let mut s = NodeArcStream::attach(&file).unwrap();
        assert!(s.can_pull());
        let node = s.pull().unwrap();
        assert_eq!(node.uid(), uid);
        assert_eq!(node.low(), Ptr::terminal(false));
        assert_eq!(node.high(), Ptr::terminal(true));
        assert!(!s.can_pull());
    }

    #[test]
    fn mismatched_pair_sources_is_rejected() {
        let (_dir, mut w) = new_arc_writer().unwrap();
        w.push(Arc::new(Uid::internal(0, 0), false, Ptr::terminal(false))).unwrap();
        w.push(Arc::new(Uid::internal(0, 1), true, Ptr::terminal(true))).unwrap();
        w.push_level(0).unwrap();
        let output = w.close().unwrap();
        let file = crate::file::ArcFile::from_writer_output(_dir, output);

        let mut s = NodeArcStream::attach(&file).unwrap();
        assert!(s.pull().is_err());
    }
}
