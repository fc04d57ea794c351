//! Counting (`satcount`/`pathcount`/`size`), §4.8.
//!
//! A single bottom-up sweep drives all three: [`crate::file::NodeFile`]'s
//! node stream is already written bottom-up (deepest level first, §4.3), so
//! draining it forward visits every node strictly after both of its
//! children have been visited. Each node's value is folded from its two
//! already-computed child values and stored in a memo table keyed by
//! [`Uid`] — in principle only the previous level's entries are ever read
//! again, since children are always deeper than their parent, but since a
//! suppressed level can put a child more than one level away the memo here
//! simply keeps every entry for the sweep's duration rather than evicting
//! per level.
//!
//! `size` and `pathcount` are diagram-kind-agnostic: neither cares whether a
//! level between a node and its child was suppressed, so "2 out of 4
//! possible paths" is ZDD `size` (set-membership count) read one way and
//! BDD `pathcount` (satisfying-path count ignoring don't-cares) read the
//! other — same fold, same function. `satcount` additionally needs the
//! variable domain: a node whose child sits several labels further down (or
//! is a terminal beyond the last real variable) stands for every possible
//! assignment to the labels in between, so each step multiplies by `2^gap`.
//! `size_t` / arbitrary-width integer are represented here by `u128`
//! (matching the rest of the crate's count types) and the floating-point
//! case (arbitrarily large domains) by `f64`, as §4.8 allows either
//! depending on the operation.

use std::collections::HashMap;

use crate::data::Node;
use crate::domain::Context;
use crate::error::Result;
use crate::file::NodeFile;
use crate::ptr::{Label, Ptr, Uid};

/// A pointer's level for gap purposes: its own label if internal, or
/// `domain_size` if terminal (§4.8's "factors in a provided domain size" —
/// a terminal stands for every variable from here to the end of the
/// domain).
fn virtual_level(ptr: Ptr, domain_size: Label) -> Label {
    if ptr.is_terminal() {
        domain_size
    } else {
        ptr.label()
    }
}

fn fold_bottom_up<V: Copy>(
    file: &NodeFile,
    terminal_value: impl Fn(bool) -> V,
    combine: impl Fn(&Node, Ptr, V, Ptr, V) -> V,
) -> Result<HashMap<Uid, V>> {
    let mut values: HashMap<Uid, V> = HashMap::new();
    for node in file.nodes_reader()?.drain_fwd()? {
        if node.is_terminal() {
            // Only `NodeFile::constant`'s single-node encoding ever writes
            // one of these; callers reach that case via the `root.is_terminal()`
            // short-circuit before ever calling this sweep.
            continue;
        }
        let low = node.low();
        let high = node.high();
        let low_v = if low.is_terminal() { terminal_value(low.value()) } else { values[&Uid::new(low)] };
        let high_v = if high.is_terminal() { terminal_value(high.value()) } else { values[&Uid::new(high)] };
        values.insert(node.uid(), combine(&node, low, low_v, high, high_v));
    }
    Ok(values)
}

/// Number of internal nodes in the diagram rooted at `root` (§4.8 `size`).
/// A constant diagram has size `0`.
pub fn size(file: &NodeFile, root: Ptr) -> usize {
    if root.is_terminal() {
        0
    } else {
        file.node_count()
    }
}

fn path_combine(_node: &Node, _low: Ptr, low_v: u128, _high: Ptr, high_v: u128) -> u128 {
    low_v + high_v
}

/// Number of root-to-true-terminal paths through the diagram's own
/// structure, ignoring any suppressed/skipped variables along the way
/// (§4.8 `pathcount`; also ZDD `size`, the count of member sets the
/// diagram represents — suppression in a ZDD means "excluded", not "don't
/// care", so the plain structural fold already gives the right count).
pub fn pathcount(file: &NodeFile, root: Ptr) -> Result<u128> {
    if root.is_terminal() {
        return Ok(root.value() as u128);
    }
    let values = fold_bottom_up(file, |v| v as u128, path_combine)?;
    Ok(values[&Uid::new(root)])
}

/// Number of satisfying assignments over all of `domain`'s variables (§4.8
/// BDD `satcount`). Every variable in `domain` not mentioned on a given
/// path is a don't-care and doubles that path's contribution.
pub fn satcount(file: &NodeFile, root: Ptr, domain: &Context) -> Result<f64> {
    let n = domain.size() as Label;
    if root.is_terminal() {
        return Ok(if root.value() { 2f64.powi(n as i32) } else { 0.0 });
    }
    let combine = |node: &Node, low: Ptr, low_v: f64, high: Ptr, high_v: f64| {
        let label = node.uid().label();
        let low_gap = virtual_level(low, n) - label - 1;
        let high_gap = virtual_level(high, n) - label - 1;
        2f64.powi(low_gap as i32) * low_v + 2f64.powi(high_gap as i32) * high_v
    };
    let values = fold_bottom_up(file, |v| v as u8 as f64, combine)?;
    let root_value = values[&Uid::new(root)];
    Ok(2f64.powi(root.label() as i32) * root_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::new_node_writer;

    fn single_var_true_high(label: Label) -> NodeFile {
        let (dir, mut w) = new_node_writer().unwrap();
        w.push(Node::internal(Uid::internal(label, 0), Ptr::terminal(false), Ptr::terminal(true))).unwrap();
        w.push_level(label).unwrap();
        let output = w.close().unwrap();
        NodeFile::from_writer_output(dir, output).unwrap()
    }

    #[test]
    fn size_of_a_constant_is_zero() {
        let f = NodeFile::constant(true).unwrap();
        assert_eq!(size(&f, Ptr::terminal(true)), 0);
    }

    #[test]
    fn size_counts_internal_nodes() {
        let f = single_var_true_high(0);
        assert_eq!(size(&f, Ptr::internal(0, 0)), 1);
    }

    #[test]
    fn pathcount_of_a_single_variable_diagram_is_one() {
        let f = single_var_true_high(0);
        assert_eq!(pathcount(&f, Ptr::internal(0, 0)).unwrap(), 1);
    }

    #[test]
    fn pathcount_of_the_true_constant_is_one_and_false_is_zero() {
        let t = NodeFile::constant(true).unwrap();
        let f = NodeFile::constant(false).unwrap();
        assert_eq!(pathcount(&t, Ptr::terminal(true)).unwrap(), 1);
        assert_eq!(pathcount(&f, Ptr::terminal(false)).unwrap(), 0);
    }

    #[test]
    fn satcount_over_the_exact_domain_of_the_only_variable() {
        let f = single_var_true_high(0);
        let domain = Context::range(1).unwrap();
        assert_eq!(satcount(&f, Ptr::internal(0, 0), &domain).unwrap(), 1.0);
    }

    #[test]
    fn satcount_doubles_for_every_dont_care_variable_in_the_domain() {
        // f depends only on x0; x1 is in the domain but never appears in
        // the diagram, so it's free on every path.
        let f = single_var_true_high(0);
        let domain = Context::range(2).unwrap();
        assert_eq!(satcount(&f, Ptr::internal(0, 0), &domain).unwrap(), 2.0);
    }

    #[test]
    fn satcount_of_a_constant_scales_with_the_whole_domain() {
        let f = NodeFile::constant(true).unwrap();
        let domain = Context::range(3).unwrap();
        assert_eq!(satcount(&f, Ptr::terminal(true), &domain).unwrap(), 8.0);
    }
}
