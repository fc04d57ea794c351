//! Reduce (§4.3): converts an unreduced arc file into a canonical node
//! file by sweeping levels bottom-up.

use std::collections::HashMap;

use crate::data::{Arc, Node};
use crate::error::Result;
use crate::file::writer::NodeWriter;
use crate::file::{new_node_writer, ArcFile, NodeFile};
use crate::ptr::{Label, Ptr, Uid};
use crate::statistics;

/// The result of reducing an arc file: the canonical node file plus where
/// its root ended up (the root may have been forwarded straight to a
/// terminal, or to a surviving node's new id).
pub struct ReduceOutput {
    pub file: NodeFile,
    pub root: Ptr,
}

/// A construction's result before it has necessarily been canonicalized
/// (§3 `__dd`): either already a reduced node file, or an arc file that
/// still owes Reduce a pass. Callers that only need to feed the result
/// into another sweep (e.g. Apply chaining straight into a second Apply)
/// can defer that pass; [`UnreducedResult::into_reduced`] forces it.
pub enum UnreducedResult {
    Node(NodeFile, Ptr),
    Arc(ArcFile, Ptr),
}

impl UnreducedResult {
    pub fn into_reduced(self) -> Result<(NodeFile, Ptr)> {
        match self {
            UnreducedResult::Node(file, root) => Ok((file, root)),
            UnreducedResult::Arc(arcs, root) => {
                let out = reduce(&arcs, root)?;
                Ok((out.file, out.root))
            }
        }
    }

    /// Like [`UnreducedResult::into_reduced`], but for an arc file produced
    /// by a ZDD sweep: forwarding uses zero-suppression, not BDD Rule 1.
    pub fn into_zdd_reduced(self) -> Result<(NodeFile, Ptr)> {
        match self {
            UnreducedResult::Node(file, root) => Ok((file, root)),
            UnreducedResult::Arc(arcs, root) => {
                let out = zdd_reduce(&arcs, root)?;
                Ok((out.file, out.root))
            }
        }
    }
}

/// Which condition collapses a candidate node to a forward instead of
/// writing it — Reduce's Rule 1, the one place BDD and ZDD disagree (§4.3,
/// §2 ZDD definition). Rule 2 (duplicate-sibling merge) is unaffected by
/// diagram kind and lives in [`process_level`] unconditionally.
#[derive(Clone, Copy)]
enum Rule1 {
    /// BDD: both branches already lead to the same place, so the variable
    /// never distinguished anything.
    Bdd,
    /// ZDD zero-suppression: the high branch is dead, so no member ever
    /// contains this variable and the node contributes nothing beyond its
    /// low child. A node with `low == high != False` is a genuine
    /// don't-care and must survive.
    Zdd,
}

impl Rule1 {
    fn forwards(self, low: Ptr, high: Ptr) -> bool {
        match self {
            Rule1::Bdd => low == high,
            Rule1::Zdd => high == Ptr::terminal(false),
        }
    }
}

/// Reduce `arcs` into a canonical node file (§4.3).
///
/// `root` is the pointer the producing sweep considers its result — not
/// necessarily a node that ends up written, since it may be forwarded by
/// Rule 1 straight through to one of its children, recursively collapsing
/// whole chains down to a single terminal.
pub fn reduce(arcs: &ArcFile, root: Ptr) -> Result<ReduceOutput> {
    reduce_with_rule1(arcs, root, Rule1::Bdd)
}

/// Reduce a ZDD sweep's arc file (§4.3, §2): identical to [`reduce`] except
/// a candidate collapses on zero-suppression (`high == False`) rather than
/// `low == high`.
pub fn zdd_reduce(arcs: &ArcFile, root: Ptr) -> Result<ReduceOutput> {
    reduce_with_rule1(arcs, root, Rule1::Zdd)
}

fn reduce_with_rule1(arcs: &ArcFile, root: Ptr, rule1: Rule1) -> Result<ReduceOutput> {
    if root.is_terminal() {
        return Ok(ReduceOutput { file: NodeFile::constant(root.value())?, root });
    }

    let mut by_level: HashMap<Label, Vec<Arc>> = HashMap::new();
    for arc in arcs.internal_reader()?.drain_fwd()? {
        by_level.entry(arc.source().label()).or_default().push(arc);
    }
    let mut terminal_arcs = arcs.terminals_in_order_reader()?.drain_fwd()?;
    let out_of_order = arcs.terminals_out_of_order_reader()?.drain_fwd()?;
    if !out_of_order.is_empty() {
        terminal_arcs.extend(out_of_order);
        terminal_arcs.sort_by(|a, b| b.source().cmp(&a.source()));
    }
    for arc in terminal_arcs {
        by_level.entry(arc.source().label()).or_default().push(arc);
    }

    let mut labels: Vec<Label> = by_level.keys().copied().collect();
    labels.sort_unstable_by(|a, b| b.cmp(a)); // descending: bottom level first

    let (dir, mut writer) = new_node_writer()?;
    let mut forward: HashMap<Ptr, Ptr> = HashMap::new();

    for label in labels {
        let level_arcs = by_level.remove(&label).unwrap();
        process_level(label, level_arcs, rule1, &mut forward, &mut writer)?;
    }

    let output = writer.close()?;
    let file = NodeFile::from_writer_output(dir, output)?;
    let final_root = forward.get(&root).copied().unwrap_or(root);
    Ok(ReduceOutput { file, root: final_root })
}

/// Process one level: pair arcs into candidate nodes, apply both
/// reduction rules, write survivors, and extend `forward` (§4.3 steps
/// 2a–2e).
fn process_level(
    label: Label,
    level_arcs: Vec<Arc>,
    rule1: Rule1,
    forward: &mut HashMap<Ptr, Ptr>,
    writer: &mut NodeWriter,
) -> Result<()> {
    let mut pairs: HashMap<Uid, [Option<Ptr>; 2]> = HashMap::new();
    for arc in level_arcs {
        let target = forward.get(&arc.target()).copied().unwrap_or(arc.target());
        let slot = &mut pairs.entry(arc.source()).or_insert([None, None])[arc.is_high() as usize];
        *slot = Some(target);
    }

    let mut candidates: Vec<(Uid, Ptr, Ptr)> = Vec::with_capacity(pairs.len());
    for (uid, [low, high]) in pairs {
        let (low, high) = (low.expect("malformed arc file: missing low arc"), high.expect("malformed arc file: missing high arc"));
        if rule1.forwards(low, high) {
            statistics::record_reduce_rule_1();
            forward.insert(uid.as_ptr(), low);
        } else {
            candidates.push((uid, low, high));
        }
    }

    // Canonical order: descending (high, low) (§3 "Canonicity").
    candidates.sort_by_key(|&(_, low, high)| (std::cmp::Reverse(high), std::cmp::Reverse(low)));

    let width = count_distinct_pairs(&candidates);
    let mut next_id = width;
    let mut i = 0;
    while i < candidates.len() {
        let (_, low, high) = candidates[i];
        let mut j = i;
        while j < candidates.len() && candidates[j].1 == low && candidates[j].2 == high {
            j += 1;
        }
        next_id -= 1;
        let node = Node::internal(Uid::internal(label, next_id as u32), low, high);
        writer.push(node)?;
        for &(uid, _, _) in &candidates[i..j] {
            forward.insert(uid.as_ptr(), node.uid().as_ptr());
        }
        if j - i > 1 {
            statistics::record_reduce_rule_2();
        }
        i = j;
    }

    // A level that fully forwarded away (every candidate hit Rule 1)
    // contributes no rows to the output and is not recorded.
    if width > 0 {
        writer.push_level(label)?;
    }
    Ok(())
}

fn count_distinct_pairs(sorted: &[(Uid, Ptr, Ptr)]) -> usize {
    let mut count = 0;
    let mut i = 0;
    while i < sorted.len() {
        let (_, low, high) = sorted[i];
        let mut j = i + 1;
        while j < sorted.len() && sorted[j].1 == low && sorted[j].2 == high {
            j += 1;
        }
        count += 1;
        i = j;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::new_arc_writer;

    fn push_pair(w: &mut crate::file::writer::ArcWriter, uid: Uid, low: Ptr, high: Ptr) {
        w.push(Arc::new(uid, false, low)).unwrap();
        w.push(Arc::new(uid, true, high)).unwrap();
    }

    #[test]
    fn rule_1_collapses_low_equals_high_into_a_forward() {
        let (_dir, mut w) = new_arc_writer().unwrap();
        let uid = Uid::internal(0, 0);
        push_pair(&mut w, uid, Ptr::terminal(true), Ptr::terminal(true));
        w.push_level(0).unwrap();
        let output = w.close().unwrap();
        let arcs = ArcFile::from_writer_output(_dir, output);

        let result = reduce(&arcs, uid.as_ptr()).unwrap();
        assert_eq!(result.root, Ptr::terminal(true));
        assert!(result.file.is_terminal());
    }

    #[test]
    fn rule_2_collapses_duplicate_siblings_to_one_node() {
        let (_dir, mut w) = new_arc_writer().unwrap();
        let a = Uid::internal(1, 0);
        let b = Uid::internal(1, 1);
        push_pair(&mut w, a, Ptr::terminal(false), Ptr::terminal(true));
        push_pair(&mut w, b, Ptr::terminal(false), Ptr::terminal(true));
        w.push_level(1).unwrap();

        // Root's two branches lead to the (now-collapsed) level-1 node and
        // to a plain terminal, so root itself stays distinct.
        let root = Uid::internal(0, 0);
        push_pair(&mut w, root, a.as_ptr(), Ptr::terminal(false));
        w.push_level(0).unwrap();

        let output = w.close().unwrap();
        let arcs = ArcFile::from_writer_output(_dir, output);
        let result = reduce(&arcs, root.as_ptr()).unwrap();

        assert_eq!(result.file.node_count(), 2);
        assert_eq!(result.file.metadata().levels_count(), 2);
        assert_eq!(result.file.metadata().label_at(0), Some(1));
        assert_eq!(result.file.metadata().label_at(1), Some(0));
    }

    #[test]
    fn a_well_formed_two_level_diagram_reduces_to_canonical_ids() {
        let (_dir, mut w) = new_arc_writer().unwrap();
        let low_child = Uid::internal(1, 0);
        let high_child = Uid::internal(1, 1);
        push_pair(&mut w, low_child, Ptr::terminal(false), Ptr::terminal(true));
        push_pair(&mut w, high_child, Ptr::terminal(true), Ptr::terminal(false));
        w.push_level(1).unwrap();

        let root = Uid::internal(0, 0);
        push_pair(&mut w, root, low_child.as_ptr(), high_child.as_ptr());
        w.push_level(0).unwrap();

        let output = w.close().unwrap();
        let arcs = ArcFile::from_writer_output(_dir, output);
        let result = reduce(&arcs, root.as_ptr()).unwrap();

        assert_eq!(result.file.node_count(), 3);
        assert!(result.root.is_internal());
        assert_eq!(result.root.label(), 0);
    }

    #[test]
    fn unreduced_result_node_variant_passes_through_unreduced() {
        let file = NodeFile::constant(true).unwrap();
        let result = UnreducedResult::Node(file, Ptr::terminal(true));
        let (file, root) = result.into_reduced().unwrap();
        assert!(file.is_terminal());
        assert_eq!(root, Ptr::terminal(true));
    }

    #[test]
    fn unreduced_result_arc_variant_forces_reduction() {
        let (_dir, mut w) = new_arc_writer().unwrap();
        let uid = Uid::internal(0, 0);
        push_pair(&mut w, uid, Ptr::terminal(false), Ptr::terminal(false));
        w.push_level(0).unwrap();
        let output = w.close().unwrap();
        let arcs = ArcFile::from_writer_output(_dir, output);

        let result = UnreducedResult::Arc(arcs, uid.as_ptr());
        let (file, root) = result.into_reduced().unwrap();
        assert!(file.is_terminal());
        assert_eq!(root, Ptr::terminal(false));
    }
}
