//! Selection (restrict / onset / offset), §4.6, grounded on
//! `adiar/zdd/subset.cpp`.
//!
//! [`restrict`] is the general top-down sweep: at each node, an assignment
//! source decides whether the node's variable is fixed (replace the node by
//! one cofactor) or free (keep the node, recursing into both cofactors). A
//! fixed node is never written as a genuine two-child node — both of its
//! arcs are pointed at the same resolved cofactor, so [`crate::reduce`]'s
//! Rule 1 collapses it into a forward the moment the caller reduces the
//! result. This sidesteps needing a separate forwarding map inside this
//! sweep: the same trick [`crate::prod2`] uses for terminal shortcuts, here
//! used for assignment shortcuts instead.
//!
//! `offset` (force a set of ZDD variables out of every member set) turns out
//! to be exactly `restrict` fixing those variables to `false` — the
//! original's `zdd_offset_policy` has no special behaviour beyond a plain
//! restrict. `onset` (force a set of variables into every member set) is
//! genuinely ZDD-specific: a variable missing from a path (a level the
//! diagram's suppressed-node encoding skips over) means that variable is
//! *excluded*, so onset must track, as it descends, the next as-yet-
//! unsatisfied required variable and collapse any branch that jumps past it
//! without including it.

use std::collections::HashMap;

use crate::callback::LabelGenerator;
use crate::data::{Arc, Request, Tuple};
use crate::error::Result;
use crate::file::random_access::LevelFrontier;
use crate::file::{new_arc_writer, ArcFile, NodeFile};
use crate::pq::{Comparator, LevelizedPriorityQueue};
use crate::ptr::{Label, Ptr, Uid};
use crate::reduce::UnreducedResult;

/// Where a [`restrict`] sweep gets each variable's fixed value, if any (§6
/// "Predicate over labels" / "random-access map" — both collapse to the
/// same `Label -> Option<bool>` shape since restrict only ever needs a
/// lookup, never an ordering guarantee).
pub struct Assignment(Box<dyn FnMut(Label) -> Option<bool>>);

impl Assignment {
    pub fn from_fn(f: impl FnMut(Label) -> Option<bool> + 'static) -> Assignment {
        Assignment(Box::new(f))
    }

    /// A fixed map of `label -> value`; every other label is free.
    pub fn from_map(map: HashMap<Label, bool>) -> Assignment {
        Assignment(Box::new(move |l| map.get(&l).copied()))
    }

    /// Fix every label the generator produces (ascending) to `value`; every
    /// other label is free. Consumes the generator lazily, one pull per
    /// distinct label the sweep actually asks about.
    pub fn fixed_to(mut vars: LabelGenerator, value: bool) -> Assignment {
        let mut next = vars.pull();
        Assignment(Box::new(move |l| {
            while let Some(v) = next {
                if v < l {
                    next = vars.pull();
                } else {
                    break;
                }
            }
            if next == Some(l) {
                Some(value)
            } else {
                None
            }
        }))
    }

    fn get(&mut self, label: Label) -> Option<bool> {
        (self.0)(label)
    }
}

/// Duplicate-through resolution for a one-diagram top-down sweep: a
/// terminal is returned as-is, an already-visited pointer reuses its
/// assigned id, and a fresh internal pointer gets a new id and is scheduled
/// for later expansion. Shared by every single-file sweep in this crate
/// ([`restrict`], [`onset`], [`crate::zdd`]'s `change`/`expand`) since none
/// of them need more than this to track progress.
pub(crate) fn resolve(
    ptr: Ptr,
    assigned: &mut HashMap<Ptr, Uid>,
    counters: &mut HashMap<Label, u32>,
    lpq: &mut LevelizedPriorityQueue<1>,
) -> Result<Ptr> {
    if ptr.is_terminal() {
        return Ok(ptr);
    }
    if let Some(&uid) = assigned.get(&ptr) {
        return Ok(uid.as_ptr());
    }
    let label = ptr.label();
    let counter = counters.entry(label).or_insert(0);
    let uid = Uid::internal(label, *counter);
    *counter += 1;
    assigned.insert(ptr, uid);
    lpq.push(Tuple::new([ptr]))?;
    Ok(uid.as_ptr())
}

/// Restrict `file` by `assignment`, rooted at `root` (§4.6).
pub fn restrict(file: &NodeFile, root: Ptr, mut assignment: Assignment) -> Result<UnreducedResult> {
    if root.is_terminal() {
        return Ok(UnreducedResult::Node(NodeFile::constant(root.value())?, root));
    }

    let mut assigned: HashMap<Ptr, Uid> = HashMap::new();
    let mut counters: HashMap<Label, u32> = HashMap::new();
    let comparator: Comparator<1> = Box::new(|a: &Request<1>, b: &Request<1>| a[0].cmp(&b[0]));
    let mut lpq: LevelizedPriorityQueue<1> = LevelizedPriorityQueue::new(comparator);

    let root_uid = Uid::internal(root.label(), 0);
    counters.insert(root.label(), 1);
    assigned.insert(root, root_uid);
    lpq.push(Tuple::new([root]))?;

    let (dir, mut writer) = new_arc_writer()?;
    let mut frontier = LevelFrontier::new(file)?;

    loop {
        lpq.setup_next_level()?;
        let label = match lpq.current_label() {
            Some(l) => l,
            None => break,
        };
        frontier.advance_to(label)?;

        while lpq.can_pull() {
            let req = lpq.pull()?;
            let p = req[0];
            let own_uid = *assigned.get(&p).expect("every pulled request was assigned a uid when it was pushed");
            let (low, high) = frontier.cofactors(p, label)?;

            match assignment.get(label) {
                Some(value) => {
                    let kept = if value { high } else { low };
                    let target = resolve(kept, &mut assigned, &mut counters, &mut lpq)?;
                    writer.push(Arc::new(own_uid, false, target))?;
                    writer.push(Arc::new(own_uid, true, target))?;
                }
                None => {
                    let low_out = resolve(low, &mut assigned, &mut counters, &mut lpq)?;
                    let high_out = resolve(high, &mut assigned, &mut counters, &mut lpq)?;
                    writer.push(Arc::new(own_uid, false, low_out))?;
                    writer.push(Arc::new(own_uid, true, high_out))?;
                }
            }
        }
        writer.push_level(label)?;
    }

    let output = writer.close()?;
    let arc_file = ArcFile::from_writer_output(dir, output);
    Ok(UnreducedResult::Arc(arc_file, root_uid.as_ptr()))
}

/// Force every variable `vars` produces out of every set `file` represents
/// (§4.6, `adiar::zdd_offset`) — plain restrict, fixing each to `false`.
pub fn offset(file: &NodeFile, root: Ptr, vars: LabelGenerator) -> Result<UnreducedResult> {
    restrict(file, root, Assignment::fixed_to(vars, false))
}

/// Tracks, while descending, the next required variable not yet satisfied
/// (§4.6, `adiar::zdd_subset_labels<assignment::True>`).
struct RequiredVars {
    gen: LabelGenerator,
    incl: Option<Label>,
    excl: Option<Label>,
    alg_level: Label,
    matched: bool,
}

impl RequiredVars {
    fn new(mut gen: LabelGenerator) -> RequiredVars {
        let incl = gen.pull();
        let excl = if incl.is_some() { gen.pull() } else { None };
        RequiredVars { gen, incl, excl, alg_level: 0, matched: false }
    }

    fn forward_to(&mut self, label: Label) {
        self.alg_level = label;
        while let Some(l) = self.incl {
            if l < label {
                self.incl = self.excl.take();
                self.excl = if self.incl.is_some() { self.gen.pull() } else { None };
            } else {
                break;
            }
        }
    }

    fn matches(&mut self, label: Label) -> bool {
        let m = self.incl == Some(label);
        self.matched |= m;
        m
    }

    fn has_incl(&self) -> bool {
        self.incl.is_some_and(|l| self.alg_level <= l)
    }

    fn level_incl(&self) -> Option<Label> {
        self.has_incl().then_some(self.incl.unwrap())
    }

    fn has_excl(&self) -> bool {
        self.incl.is_some_and(|l| self.alg_level < l) || self.excl.is_some()
    }

    fn level_excl(&self) -> Option<Label> {
        if self.incl.is_some_and(|l| self.alg_level < l) {
            self.incl
        } else {
            self.excl
        }
    }

    /// Beyond `label`, does a pointer's branch still owe a required
    /// variable it has no way left to satisfy?
    fn jumps_past(&self, ptr: Ptr, boundary: Option<Label>) -> bool {
        match boundary {
            None => false,
            Some(b) => ptr.is_terminal() || ptr.label() > b,
        }
    }

    fn terminal_value(&self, value: bool) -> bool {
        !self.has_excl() && value
    }
}

/// Force every variable `vars` produces into every set `file` represents
/// (§4.6, `adiar::zdd_onset`).
pub fn onset(file: &NodeFile, root: Ptr, vars: LabelGenerator) -> Result<UnreducedResult> {
    let mut required = RequiredVars::new(vars);
    if !required.has_incl() {
        // No variables requested: every set already (vacuously) includes them.
        return Ok(UnreducedResult::Node(file.clone(), root));
    }
    if root.is_terminal() {
        // `{ (empty set) }` or `empty`, neither of which can include a
        // required variable.
        let value = required.terminal_value(root.value());
        return Ok(UnreducedResult::Node(NodeFile::constant(value)?, Ptr::terminal(value)));
    }

    let mut assigned: HashMap<Ptr, Uid> = HashMap::new();
    let mut counters: HashMap<Label, u32> = HashMap::new();
    let comparator: Comparator<1> = Box::new(|a: &Request<1>, b: &Request<1>| a[0].cmp(&b[0]));
    let mut lpq: LevelizedPriorityQueue<1> = LevelizedPriorityQueue::new(comparator);

    let root_uid = Uid::internal(root.label(), 0);
    counters.insert(root.label(), 1);
    assigned.insert(root, root_uid);
    lpq.push(Tuple::new([root]))?;

    let (dir, mut writer) = new_arc_writer()?;
    let mut frontier = LevelFrontier::new(file)?;

    loop {
        lpq.setup_next_level()?;
        let label = match lpq.current_label() {
            Some(l) => l,
            None => break,
        };
        required.forward_to(label);

        while lpq.can_pull() {
            let req = lpq.pull()?;
            let p = req[0];
            let own_uid = *assigned.get(&p).expect("every pulled request was assigned a uid when it was pushed");
            let (low, high) = frontier.cofactors(p, label)?;

            let (low_out, high_out) = if required.matches(label) {
                let boundary = required.level_excl();
                if required.jumps_past(high, boundary) {
                    (Ptr::terminal(false), Ptr::terminal(false))
                } else {
                    let high_resolved = resolve_onset(high, &required, &mut assigned, &mut counters, &mut lpq)?;
                    (Ptr::terminal(false), high_resolved)
                }
            } else if required.has_incl() {
                let boundary = required.level_incl();
                let low_forced = if required.jumps_past(low, boundary) { Ptr::terminal(false) } else { low };
                if required.jumps_past(high, boundary) {
                    let forwarded = resolve_onset(low_forced, &required, &mut assigned, &mut counters, &mut lpq)?;
                    (forwarded, forwarded)
                } else {
                    let low_resolved = resolve_onset(low_forced, &required, &mut assigned, &mut counters, &mut lpq)?;
                    let high_resolved = resolve_onset(high, &required, &mut assigned, &mut counters, &mut lpq)?;
                    (low_resolved, high_resolved)
                }
            } else {
                let low_resolved = resolve_onset(low, &required, &mut assigned, &mut counters, &mut lpq)?;
                let high_resolved = resolve_onset(high, &required, &mut assigned, &mut counters, &mut lpq)?;
                (low_resolved, high_resolved)
            };

            writer.push(Arc::new(own_uid, false, low_out))?;
            writer.push(Arc::new(own_uid, true, high_out))?;
        }
        writer.push_level(label)?;
    }

    let output = writer.close()?;
    let arc_file = ArcFile::from_writer_output(dir, output);
    let result = UnreducedResult::Arc(arc_file, root_uid.as_ptr());
    if !required.matched {
        // No level of `file` ever matched a required variable: every member
        // set is missing at least one, so the whole family is empty.
        return Ok(UnreducedResult::Node(NodeFile::constant(false)?, Ptr::terminal(false)));
    }
    Ok(result)
}

fn resolve_onset(
    ptr: Ptr,
    required: &RequiredVars,
    assigned: &mut HashMap<Ptr, Uid>,
    counters: &mut HashMap<Label, u32>,
    lpq: &mut LevelizedPriorityQueue<1>,
) -> Result<Ptr> {
    if ptr.is_terminal() {
        return Ok(Ptr::terminal(required.terminal_value(ptr.value())));
    }
    resolve(ptr, assigned, counters, lpq)
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
    fn restrict_fixing_the_only_variable_to_false_collapses_to_the_low_cofactor() {
        let f = single_var_true_high(0);
        let assignment = Assignment::from_map(HashMap::from([(0, false)]));
        let result = restrict(&f, Ptr::internal(0, 0), assignment).unwrap();
        let (file, root) = result.into_reduced().unwrap();
        assert_eq!(root, Ptr::terminal(false));
        assert!(file.is_terminal());
    }

    #[test]
    fn restrict_fixing_the_only_variable_to_true_collapses_to_the_high_cofactor() {
        let f = single_var_true_high(0);
        let assignment = Assignment::from_map(HashMap::from([(0, true)]));
        let result = restrict(&f, Ptr::internal(0, 0), assignment).unwrap();
        let (file, root) = result.into_reduced().unwrap();
        assert_eq!(root, Ptr::terminal(true));
        assert!(file.is_terminal());
    }

    #[test]
    fn restrict_of_an_unrelated_variable_is_the_identity() {
        let f = single_var_true_high(0);
        let assignment = Assignment::from_map(HashMap::from([(5, true)]));
        let result = restrict(&f, Ptr::internal(0, 0), assignment).unwrap();
        let (file, root) = result.into_reduced().unwrap();
        assert!(root.is_internal());
        assert_eq!(file.node_count(), 1);
    }

    #[test]
    fn offset_of_the_only_variable_collapses_to_the_low_cofactor() {
        let f = single_var_true_high(0);
        let result = offset(&f, Ptr::internal(0, 0), LabelGenerator::once(0)).unwrap();
        let (file, root) = result.into_reduced().unwrap();
        assert_eq!(root, Ptr::terminal(false));
        assert!(file.is_terminal());
    }

    #[test]
    fn onset_of_a_variable_missing_from_the_diagram_is_empty() {
        let f = single_var_true_high(0);
        // Variable 3 never appears on any path through `f`.
        let result = onset(&f, Ptr::internal(0, 0), LabelGenerator::once(3)).unwrap();
        let (file, root) = result.into_reduced().unwrap();
        assert_eq!(root, Ptr::terminal(false));
        assert!(file.is_terminal());
    }

    #[test]
    fn onset_of_the_only_variable_collapses_to_the_high_cofactor() {
        let f = single_var_true_high(0);
        let result = onset(&f, Ptr::internal(0, 0), LabelGenerator::once(0)).unwrap();
        let (file, root) = result.into_reduced().unwrap();
        assert_eq!(root, Ptr::terminal(true));
        assert!(file.is_terminal());
    }
}
