//! Equality (§4.7).
//!
//! The fast path trusts canonicity: two canonical files describing the same
//! diagram must be byte-for-byte identical, so matching metadata (terminal
//! counts, level sequence) plus a matching node stream settles it without a
//! sweep. [`NodeFile`] is always canonical by construction in this crate (no
//! reader ever sees a non-reduced node file), so the fast path applies to
//! every call; the slow path below exists for the case metadata already
//! disagrees on byte layout while the diagrams could still be *isomorphic*
//! — e.g. one side's ids were assigned by a different algorithm run and
//! happen not to match up 1:1 even though the structures coincide.

use std::collections::{HashMap, HashSet};

use crate::data::{Request, Tuple};
use crate::error::Result;
use crate::file::random_access::LevelFrontier;
use crate::file::NodeFile;
use crate::pq::{Comparator, LevelizedPriorityQueue};
use crate::ptr::{Ptr, Uid};
use crate::statistics;

fn fast_path_eligible(f: &NodeFile, g: &NodeFile) -> bool {
    f.metadata().canonical
        && g.metadata().canonical
        && f.metadata().number_of_terminals == g.metadata().number_of_terminals
        && f.metadata().levels == g.metadata().levels
}

fn node_streams_match(f: &NodeFile, g: &NodeFile) -> Result<bool> {
    if f.node_count() != g.node_count() {
        return Ok(false);
    }
    let lhs = f.nodes_reader()?.drain_fwd()?;
    let rhs = g.nodes_reader()?.drain_fwd()?;
    Ok(lhs == rhs)
}

/// Is `(cl, cr)` a consistent pairing? Both terminal with matching value,
/// or both internal on the same level, with neither uid already paired
/// with a different counterpart (§4.7: "a node at a level paired with more
/// than one counterpart refutes equality").
fn consistent(
    cl: Ptr,
    cr: Ptr,
    left_pair: &mut HashMap<Uid, Uid>,
    right_pair: &mut HashMap<Uid, Uid>,
) -> bool {
    if cl.is_terminal() != cr.is_terminal() {
        return false;
    }
    if cl.is_terminal() {
        return cl.value() == cr.value();
    }
    if cl.label() != cr.label() {
        return false;
    }
    let (ul, ur) = (Uid::new(cl), Uid::new(cr));
    if let Some(&existing) = left_pair.get(&ul) {
        if existing != ur {
            return false;
        }
    }
    if let Some(&existing) = right_pair.get(&ur) {
        if existing != ul {
            return false;
        }
    }
    left_pair.insert(ul, ur);
    right_pair.insert(ur, ul);
    true
}

fn slow_equal(f: &NodeFile, f_root: Ptr, g: &NodeFile, g_root: Ptr) -> Result<bool> {
    if f_root.is_terminal() || g_root.is_terminal() {
        return Ok(f_root.is_terminal() == g_root.is_terminal() && f_root == g_root);
    }

    let mut left_pair: HashMap<Uid, Uid> = HashMap::new();
    let mut right_pair: HashMap<Uid, Uid> = HashMap::new();
    if !consistent(f_root, g_root, &mut left_pair, &mut right_pair) {
        return Ok(false);
    }

    let comparator: Comparator<2> = Box::new(|a: &Request<2>, b: &Request<2>| (a[0], a[1]).cmp(&(b[0], b[1])));
    let mut lpq: LevelizedPriorityQueue<2> = LevelizedPriorityQueue::new(comparator);
    let mut visited: HashSet<(Ptr, Ptr)> = HashSet::new();
    visited.insert((f_root, g_root));
    lpq.push(Tuple::new([f_root, g_root]))?;

    let mut frontier_f = LevelFrontier::new(f)?;
    let mut frontier_g = LevelFrontier::new(g)?;

    loop {
        lpq.setup_next_level()?;
        let label = match lpq.current_label() {
            Some(l) => l,
            None => break,
        };
        frontier_f.advance_to(label)?;
        frontier_g.advance_to(label)?;

        while lpq.can_pull() {
            let req = lpq.pull()?;
            let (pl, pr) = (req[0], req[1]);
            let (lo_l, hi_l) = frontier_f.cofactors(pl, label)?;
            let (lo_r, hi_r) = frontier_g.cofactors(pr, label)?;

            for (cl, cr) in [(lo_l, lo_r), (hi_l, hi_r)] {
                if !consistent(cl, cr, &mut left_pair, &mut right_pair) {
                    return Ok(false);
                }
                if cl.is_internal() && visited.insert((cl, cr)) {
                    lpq.push(Tuple::new([cl, cr]))?;
                }
            }
        }
    }

    Ok(true)
}

/// Are `(f, f_root)` and `(g, g_root)` the same diagram (§4.7)?
pub fn equal(f: &NodeFile, f_root: Ptr, g: &NodeFile, g_root: Ptr) -> Result<bool> {
    if fast_path_eligible(f, g) {
        statistics::record_equality_fast_run();
        if f_root != g_root {
            return Ok(false);
        }
        return node_streams_match(f, g);
    }
    statistics::record_equality_slow_run();
    slow_equal(f, f_root, g, g_root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Node;
    use crate::file::new_node_writer;

    fn single_var_true_high(label: crate::ptr::Label) -> NodeFile {
        let (dir, mut w) = new_node_writer().unwrap();
        w.push(Node::internal(Uid::internal(label, 0), Ptr::terminal(false), Ptr::terminal(true))).unwrap();
        w.push_level(label).unwrap();
        let output = w.close().unwrap();
        NodeFile::from_writer_output(dir, output).unwrap()
    }

    #[test]
    fn identical_constants_are_equal() {
        let f = NodeFile::constant(true).unwrap();
        let g = NodeFile::constant(true).unwrap();
        assert!(equal(&f, Ptr::terminal(true), &g, Ptr::terminal(true)).unwrap());
    }

    #[test]
    fn different_constants_are_not_equal() {
        let f = NodeFile::constant(true).unwrap();
        let g = NodeFile::constant(false).unwrap();
        assert!(!equal(&f, Ptr::terminal(true), &g, Ptr::terminal(false)).unwrap());
    }

    #[test]
    fn byte_identical_files_take_the_fast_path() {
        let f = single_var_true_high(0);
        let g = single_var_true_high(0);
        assert!(equal(&f, Ptr::internal(0, 0), &g, Ptr::internal(0, 0)).unwrap());
    }

    #[test]
    fn isomorphic_diagrams_with_mismatched_level_sequences_use_the_slow_path_and_agree() {
        let f = single_var_true_high(0);
        let g = single_var_true_high(1);
        // Same shape, different variable label: structurally not equal
        // (the slow path must say so, not just "different metadata").
        assert!(!equal(&f, Ptr::internal(0, 0), &g, Ptr::internal(1, 0)).unwrap());
    }

    #[test]
    fn a_node_paired_with_two_different_counterparts_refutes_equality() {
        // f: root x0 -> (low=F, high=T)
        // g: root x0 -> (low=node x1, high=node x1) -- same node both arcs,
        // so the single x1 node would need to pair with both F and T from f.
        let (dir_f, mut wf) = new_node_writer().unwrap();
        wf.push(Node::internal(Uid::internal(0, 0), Ptr::terminal(false), Ptr::terminal(true))).unwrap();
        wf.push_level(0).unwrap();
        let f = NodeFile::from_writer_output(dir_f, wf.close().unwrap()).unwrap();

        let (dir_g, mut wg) = new_node_writer().unwrap();
        wg.push(Node::internal(Uid::internal(1, 0), Ptr::terminal(false), Ptr::terminal(true))).unwrap();
        wg.push_level(1).unwrap();
        wg.push(Node::internal(Uid::internal(0, 0), Ptr::internal(1, 0), Ptr::internal(1, 0))).unwrap();
        wg.push_level(0).unwrap();
        let g = NodeFile::from_writer_output(dir_g, wg.close().unwrap()).unwrap();

        assert!(!equal(&f, Ptr::internal(0, 0), &g, Ptr::internal(0, 0)).unwrap());
    }
}
