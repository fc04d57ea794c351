//! Two-argument product construction (Apply), §4.4.
//!
//! Combines two reduced diagrams `f`, `g` under a boolean operator into an
//! unreduced arc file, by a top-down sweep driven by the levelized
//! priority queue (§4.2): requests are pairs `(p_f, p_g)` of pointers, the
//! current recursion frontier, scheduled at `min(level(p_f), level(p_g))`.
//!
//! The original names four policy hooks per operator (`can_left_shortcut`,
//! `can_right_shortcut`, `is_left_irrelevant`, `is_right_irrelevant`). All
//! four reduce to the same question — "is the result fully determined by
//! this side alone, regardless of what the other side turns out to be?" —
//! which is answered directly from the operator's 2x2 truth table, so
//! [`BinOp`] exposes it as a single `left_shortcut`/`right_shortcut` pair
//! rather than four separately-authored predicates per operator.
//!
//! Two further optimizations named in the original are intentionally not
//! implemented, since both are pure performance optimizations whose
//! absence does not change the result: the "identical file on both sides"
//! trivial resolution (`resolve_same_file`), and the ZDD-specific early
//! skip of nodes whose `high` is a shortcutting terminal. Both cases are
//! still handled correctly — just less eagerly — by the ordinary sweep
//! below followed by [`crate::reduce::reduce`]'s Rule 1/Rule 2 collapse.
//! Likewise, `exec_policy::access` is accepted (through [`crate::policy`])
//! but both inputs are always buffered via [`NodeRandomAccess`] one level
//! at a time; the `Priority_Queue` access mode's alternate "second LPQ
//! paired by level" traversal is not implemented as a separate code path.
//!
//! [`apply`] and [`zdd_apply`] share this entire sweep, differing only in
//! which cofactor rule reads a level a pointer hasn't reached yet:
//! [`LevelFrontier::cofactors`]'s "unchanged on both branches" is BDD
//! don't-care semantics, while [`LevelFrontier::zdd_cofactors`]'s "(ptr,
//! False)" is the ZDD zero-suppression reading of the same gap. Everything
//! else — request scheduling, terminal shortcuts, memoization — is
//! identical between diagram kinds, so only the cofactor lookup is a
//! parameter.

use std::collections::HashMap;

use crate::data::{Arc, Request, Tuple};
use crate::error::Result;
use crate::file::random_access::LevelFrontier;
use crate::file::{new_arc_writer, ArcFile, NodeFile};
use crate::pq::{Comparator, LevelizedPriorityQueue};
use crate::ptr::{Label, Ptr, Uid};
use crate::reduce::UnreducedResult;
use crate::statistics;

/// A binary boolean operator, represented by its full truth table so the
/// shortcut predicates can be derived generically instead of hand-written
/// per operator (§4.4 "policy hooks").
#[derive(Clone, Copy, Debug)]
pub struct BinOp {
    table: [[bool; 2]; 2],
}

impl BinOp {
    /// Build an operator from its truth table, indexed `table[a][b]`.
    pub fn from_table(table: [[bool; 2]; 2]) -> BinOp {
        BinOp { table }
    }

    pub fn and() -> BinOp {
        BinOp::from_table([[false, false], [false, true]])
    }
    pub fn or() -> BinOp {
        BinOp::from_table([[false, true], [true, true]])
    }
    pub fn xor() -> BinOp {
        BinOp::from_table([[false, true], [true, false]])
    }
    pub fn xnor() -> BinOp {
        BinOp::from_table([[true, false], [false, true]])
    }
    pub fn nand() -> BinOp {
        BinOp::from_table([[true, true], [true, false]])
    }
    pub fn nor() -> BinOp {
        BinOp::from_table([[true, false], [false, false]])
    }
    /// `a` and not `b` (ZDD set difference, implication's converse).
    pub fn diff() -> BinOp {
        BinOp::from_table([[false, false], [true, false]])
    }
    pub fn imp() -> BinOp {
        BinOp::from_table([[true, true], [false, true]])
    }

    pub fn apply(&self, a: bool, b: bool) -> bool {
        self.table[a as usize][b as usize]
    }

    /// `Some(v)` if, with the left operand fixed at `a`, the result is `v`
    /// no matter what the right operand turns out to be.
    pub fn left_shortcut(&self, a: bool) -> Option<bool> {
        let row = self.table[a as usize];
        (row[0] == row[1]).then_some(row[0])
    }

    /// `Some(v)` if, with the right operand fixed at `b`, the result is `v`
    /// no matter what the left operand turns out to be.
    pub fn right_shortcut(&self, b: bool) -> Option<bool> {
        let col = [self.table[0][b as usize], self.table[1][b as usize]];
        (col[0] == col[1]).then_some(col[0])
    }
}

/// Resolve one child request: fully evaluate it if both sides (or a
/// shortcutting side) are terminal, otherwise assign it a stable id (memoized
/// by pair, so the same pair requested from two different parents shares one
/// output node) and schedule it on first sight.
fn resolve_child(
    lhs: Ptr,
    rhs: Ptr,
    op: &BinOp,
    assigned: &mut HashMap<(Ptr, Ptr), Uid>,
    counters: &mut HashMap<Label, u32>,
    lpq: &mut LevelizedPriorityQueue<2>,
) -> Result<Ptr> {
    if lhs.is_terminal() && rhs.is_terminal() {
        return Ok(Ptr::terminal(op.apply(lhs.value(), rhs.value())));
    }
    if lhs.is_terminal() {
        if let Some(v) = op.left_shortcut(lhs.value()) {
            return Ok(Ptr::terminal(v));
        }
    }
    if rhs.is_terminal() {
        if let Some(v) = op.right_shortcut(rhs.value()) {
            return Ok(Ptr::terminal(v));
        }
    }

    let pair = (lhs, rhs);
    if let Some(&uid) = assigned.get(&pair) {
        return Ok(uid.as_ptr());
    }
    let label = Tuple::new([lhs, rhs])
        .level()
        .label()
        .expect("a pair with no terminal shortcut has at least one internal side");
    let counter = counters.entry(label).or_insert(0);
    let uid = Uid::internal(label, *counter);
    *counter += 1;
    assigned.insert(pair, uid);
    lpq.push(Tuple::new([lhs, rhs]))?;
    Ok(uid.as_ptr())
}

/// Apply `op` to `f` and `g`, rooted at `f_root`/`g_root` (§4.4).
///
/// `f_root`/`g_root` are the pointers the callers consider their diagrams'
/// roots — not necessarily the sole top-level node, since a caller may be
/// mid-chain from an earlier unreduced result.
pub fn apply(f: &NodeFile, f_root: Ptr, g: &NodeFile, g_root: Ptr, op: &BinOp) -> Result<UnreducedResult> {
    apply_with_cofactor(f, f_root, g, g_root, op, LevelFrontier::cofactors)
}

/// ZDD twin of [`apply`]: same sweep, cofactored with
/// [`LevelFrontier::zdd_cofactors`] so a level neither side has reached
/// reads as "excluded" rather than "don't care" (§2, §4.4). This is what
/// drives ZDD union/intersection/difference — `op` is the same
/// truth-table-derived [`BinOp`] used for BDDs; only the cofactor rule
/// differs.
pub fn zdd_apply(f: &NodeFile, f_root: Ptr, g: &NodeFile, g_root: Ptr, op: &BinOp) -> Result<UnreducedResult> {
    apply_with_cofactor(f, f_root, g, g_root, op, LevelFrontier::zdd_cofactors)
}

fn apply_with_cofactor(
    f: &NodeFile,
    f_root: Ptr,
    g: &NodeFile,
    g_root: Ptr,
    op: &BinOp,
    cofactor: fn(&LevelFrontier, Ptr, Label) -> Result<(Ptr, Ptr)>,
) -> Result<UnreducedResult> {
    if f_root.is_terminal() && g_root.is_terminal() {
        statistics::record_prod2_trivial_terminal();
        let value = op.apply(f_root.value(), g_root.value());
        return Ok(UnreducedResult::Node(NodeFile::constant(value)?, Ptr::terminal(value)));
    }

    let mut assigned: HashMap<(Ptr, Ptr), Uid> = HashMap::new();
    let mut counters: HashMap<Label, u32> = HashMap::new();
    let comparator: Comparator<2> =
        Box::new(|a: &Request<2>, b: &Request<2>| (a[0], a[1]).cmp(&(b[0], b[1])));
    let mut lpq: LevelizedPriorityQueue<2> = LevelizedPriorityQueue::new(comparator);

    let root_label = Tuple::new([f_root, g_root])
        .level()
        .label()
        .expect("checked above: f_root and g_root are not both terminal");
    let root_counter = counters.entry(root_label).or_insert(0);
    let root_uid = Uid::internal(root_label, *root_counter);
    *root_counter += 1;
    assigned.insert((f_root, g_root), root_uid);
    lpq.push(Tuple::new([f_root, g_root]))?;

    let (dir, mut writer) = new_arc_writer()?;
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
            let (pf, pg) = (req[0], req[1]);
            let own_uid = *assigned
                .get(&(pf, pg))
                .expect("every pulled request was assigned a uid when it was pushed");

            let (lf, hf) = cofactor(&frontier_f, pf, label)?;
            let (lg, hg) = cofactor(&frontier_g, pg, label)?;

            let low_child = resolve_child(lf, lg, op, &mut assigned, &mut counters, &mut lpq)?;
            let high_child = resolve_child(hf, hg, op, &mut assigned, &mut counters, &mut lpq)?;

            writer.push(Arc::new(own_uid, false, low_child))?;
            writer.push(Arc::new(own_uid, true, high_child))?;
        }
        writer.push_level(label)?;
    }

    let output = writer.close()?;
    let arc_file = ArcFile::from_writer_output(dir, output);
    Ok(UnreducedResult::Arc(arc_file, root_uid.as_ptr()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Node;
    use crate::file::new_node_writer;

    fn single_var_true_high(label: Label) -> NodeFile {
        let (dir, mut w) = new_node_writer().unwrap();
        w.push(Node::internal(Uid::internal(label, 0), Ptr::terminal(false), Ptr::terminal(true))).unwrap();
        w.push_level(label).unwrap();
        let output = w.close().unwrap();
        NodeFile::from_writer_output(dir, output).unwrap()
    }

    #[test]
    fn both_terminal_roots_collapse_without_a_sweep() {
        let f = NodeFile::constant(true).unwrap();
        let g = NodeFile::constant(false).unwrap();
        let result = apply(&f, Ptr::terminal(true), &g, Ptr::terminal(false), &BinOp::and()).unwrap();
        let (file, root) = result.into_reduced().unwrap();
        assert_eq!(root, Ptr::terminal(false));
        assert!(file.is_terminal());
    }

    #[test]
    fn and_with_false_terminal_shortcuts_regardless_of_the_other_side() {
        let f = single_var_true_high(0);
        let g = NodeFile::constant(false).unwrap();
        let result = apply(&f, Ptr::internal(0, 0), &g, Ptr::terminal(false), &BinOp::and()).unwrap();
        let (file, root) = result.into_reduced().unwrap();
        assert_eq!(root, Ptr::terminal(false));
        assert!(file.is_terminal());
    }

    #[test]
    fn or_of_two_single_variable_diagrams_on_different_labels() {
        // f: x0 ? T : F        g: x1 ? T : F
        // f OR g should need both variables: only F when both are F.
        let f = single_var_true_high(0);
        let g = single_var_true_high(1);
        let result = apply(&f, Ptr::internal(0, 0), &g, Ptr::internal(1, 0), &BinOp::or()).unwrap();
        let (file, root) = result.into_reduced().unwrap();
        assert!(root.is_internal());
        assert_eq!(root.label(), 0);
        // Two genuinely distinct internal nodes survive: the x0 root and
        // the x1 node on its low branch (the high branch short-circuits to
        // true without ever creating a node for it).
        assert_eq!(file.node_count(), 2);
    }

    #[test]
    fn xor_of_a_diagram_with_itself_is_driven_to_false_by_the_general_sweep() {
        let f = single_var_true_high(0);
        let result = apply(&f, Ptr::internal(0, 0), &f, Ptr::internal(0, 0), &BinOp::xor()).unwrap();
        let (file, root) = result.into_reduced().unwrap();
        assert_eq!(root, Ptr::terminal(false));
        assert!(file.is_terminal());
    }

    #[test]
    fn zdd_apply_or_of_two_singleton_family_diagrams_unions_their_members() {
        // f: { {0} }       g: { {1} }       f zdd_apply/or g: { {0}, {1} }
        let f = single_var_true_high(0);
        let g = single_var_true_high(1);
        let result = zdd_apply(&f, Ptr::internal(0, 0), &g, Ptr::internal(1, 0), &BinOp::or()).unwrap();
        let (file, root) = result.into_zdd_reduced().unwrap();
        assert!(root.is_internal());
        assert_eq!(root.label(), 0);
        assert_eq!(file.node_count(), 2);
    }

    #[test]
    fn zdd_apply_and_of_disjoint_singleton_families_is_empty() {
        // Unlike the BDD cofactor rule, a ZDD that doesn't mention a
        // variable excludes it — "and" of two families over different
        // variables shares no member set, so the result is empty.
        let f = single_var_true_high(0);
        let g = single_var_true_high(1);
        let result = zdd_apply(&f, Ptr::internal(0, 0), &g, Ptr::internal(1, 0), &BinOp::and()).unwrap();
        let (file, root) = result.into_zdd_reduced().unwrap();
        assert_eq!(root, Ptr::terminal(false));
        assert!(file.is_terminal());
    }
}
