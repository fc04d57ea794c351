//! Public ZDD façade (§6): a thin `anyhow`-erroring wrapper over the engine
//! sweeps, grounded on the teacher's `api.rs` "happy path" shape and on
//! `adiar/zdd.h`'s documented public surface.
//!
//! [`zdd_onset`]/[`zdd_offset`]/[`zdd_size`] are direct wrappers over
//! [`crate::select`] and [`crate::count`], which are diagram-kind-agnostic.
//! [`zdd_binop`] and [`zdd_project`] reuse [`crate::prod2::zdd_apply`] and
//! [`crate::quantify::zdd_eliminate_one`] respectively — the ZDD-correct
//! twins of [`crate::prod2::apply`]/[`crate::quantify::quantify_one`], which
//! read a level neither operand has reached as "excluded" rather than
//! "don't care" via [`crate::file::random_access::LevelFrontier::zdd_cofactors`].
//! No in-memory node map or hand-rolled recursion is needed for either: both
//! are streaming level-by-level sweeps over on-disk files, same as their BDD
//! counterparts.
//!
//! `change`/`expand` also need to insert genuinely new nodes rather than
//! recombine existing ones, which puts them at odds with
//! [`crate::reduce::reduce`]'s BDD Rule 1 (`low == high` always forwards): a
//! ZDD "don't care" node — the shape `expand` needs — has `low == high` *by
//! construction* and must survive. [`crate::reduce::zdd_reduce`] is the
//! fix — the same arc-file-in, canonical-node-file-out Reduce pass, just
//! parameterized on zero-suppression instead. [`zdd_insert`] is the shared
//! streaming sweep behind both: a single top-down pass over `f`'s node file
//! that detects, at each parent, whether a child's real label already
//! skipped past the inserted variable `v` (terminal, or a label deeper than
//! `v`) and splices in a fresh `v`-level node right there rather than
//! waiting for the levelized queue to reach a level nothing schedules a
//! request at. The resulting arc file is fed to [`crate::reduce::zdd_reduce`]
//! exactly like any other sweep's output, so the result is canonical (§3)
//! like everything else this crate builds — no private writer, no
//! creation-order ids. `change`/`expand` differ only in what the spliced
//! node's low branch is: forced out (`False`) for `change` (the variable is
//! being toggled in, so the branch that continues to exclude it is dead),
//! or the same continuation as the high branch for `expand` (the variable
//! is a free choice, so excluding it changes nothing downstream).

use std::collections::HashMap;

use anyhow::Result;

use crate::bdd::Bdd;
use crate::callback::LabelGenerator;
use crate::count;
use crate::data::{Arc as DiagArc, Node, Request, Tuple};
use crate::domain::Context;
use crate::error::Error;
use crate::file::random_access::LevelFrontier;
use crate::file::{new_arc_writer, new_node_writer, ArcFile, NodeFile};
use crate::policy::ExecPolicy;
use crate::pq::{Comparator, LevelizedPriorityQueue};
use crate::prod2::{self, BinOp};
use crate::ptr::{Label, Ptr, Uid};
use crate::quantify;
use crate::reduce::UnreducedResult;
use crate::select::{self, Assignment};

/// A handle onto one ZDD: an owned, reduced node file plus the pointer this
/// handle considers its root (§3 `dd`). Carries no complement edge or
/// separate negation flag — `Ptr`'s flag bit is already spoken for by
/// [`crate::data::Arc`]'s low/high tagging and is never reinterpreted by a
/// node pointer stored in a reduced file (see `DESIGN.md`'s Open Question
/// decisions).
#[derive(Clone)]
pub struct Zdd {
    file: NodeFile,
    root: Ptr,
}

impl Zdd {
    pub(crate) fn from_parts(file: NodeFile, root: Ptr) -> Zdd {
        Zdd { file, root }
    }

    /// The family containing no sets at all.
    pub fn empty() -> Result<Zdd> {
        Ok(Zdd { file: NodeFile::constant(false)?, root: Ptr::terminal(false) })
    }

    /// The family containing exactly the empty set, `{ {} }`.
    pub fn unit() -> Result<Zdd> {
        Ok(Zdd { file: NodeFile::constant(true)?, root: Ptr::terminal(true) })
    }

    /// The family containing exactly one set, `{ members }` (`members`
    /// ascending, no duplicates).
    pub fn singleton(members: &[Label]) -> Result<Zdd> {
        let (dir, mut writer) = new_node_writer()?;
        let mut next = Ptr::terminal(true);
        for (id, &label) in members.iter().enumerate().rev() {
            let node = Node::internal(Uid::internal(label, id as u32), Ptr::terminal(false), next);
            writer.push(node)?;
            writer.push_level(label)?;
            next = node.uid().as_ptr();
        }
        let output = writer.close()?;
        Ok(Zdd { file: NodeFile::from_writer_output(dir, output)?, root: next })
    }

    pub fn file(&self) -> &NodeFile {
        &self.file
    }

    pub fn root(&self) -> Ptr {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root == Ptr::terminal(false)
    }

    pub fn to_bdd(&self) -> Bdd {
        Bdd::from_zdd(self)
    }
}

/// ZDD `from_bdd` (§6): reinterpret a BDD's diagram as a ZDD over the same
/// node file — the two façades share one representation (no negate flag to
/// reconcile), so this is a relabelling of the handle, not a sweep.
pub fn zdd_from_bdd(b: &Bdd) -> Zdd {
    Zdd { file: b.file().clone(), root: b.root() }
}

/// Combine two families under `op` (union/intersection/difference), via
/// [`prod2::zdd_apply`]'s streaming product sweep and
/// [`UnreducedResult::into_zdd_reduced`] — the same Apply construction
/// [`crate::bdd`] uses, just cofactored with ZDD zero-suppression instead
/// of BDD don't-care pass-through (§4.4, §2).
pub fn zdd_binop(f: &Zdd, g: &Zdd, op: BinOp) -> Result<Zdd> {
    let result = prod2::zdd_apply(&f.file, f.root, &g.file, g.root, &op)?;
    let (file, root) = result.into_zdd_reduced()?;
    Ok(Zdd { file, root })
}

pub fn zdd_union(f: &Zdd, g: &Zdd) -> Result<Zdd> {
    zdd_binop(f, g, BinOp::or())
}

pub fn zdd_intsec(f: &Zdd, g: &Zdd) -> Result<Zdd> {
    zdd_binop(f, g, BinOp::and())
}

pub fn zdd_diff(f: &Zdd, g: &Zdd) -> Result<Zdd> {
    zdd_binop(f, g, BinOp::diff())
}

/// Force every variable `vars` produces out of every member set (§4.6,
/// `adiar::zdd_offset`).
pub fn zdd_offset(f: &Zdd, vars: LabelGenerator) -> Result<Zdd> {
    let (file, root) = select::offset(&f.file, f.root, vars)?.into_reduced()?;
    Ok(Zdd { file, root })
}

/// Force every variable `vars` produces into every member set (§4.6,
/// `adiar::zdd_onset`).
pub fn zdd_onset(f: &Zdd, vars: LabelGenerator) -> Result<Zdd> {
    let (file, root) = select::onset(&f.file, f.root, vars)?.into_reduced()?;
    Ok(Zdd { file, root })
}

fn labels_in(file: &NodeFile) -> Vec<Label> {
    file.metadata().levels.iter().map(|l| l.label).collect()
}

/// Keep only the variables in `keep`, eliminating every other label that
/// appears in `f`, one at a time via [`quantify::zdd_project_labels`] (§4.5
/// "restrict then union"). `policy` is accepted for API parity with the BDD
/// entry points; this always uses the same one-variable-at-a-time strategy
/// as [`crate::quantify::quantify_many`].
pub fn zdd_project(f: &Zdd, keep: &Context, _policy: ExecPolicy) -> Result<Zdd> {
    let eliminate: Vec<Label> = labels_in(&f.file).into_iter().filter(|l| !keep.contains(*l)).collect();
    let (file, root) = quantify::zdd_project_labels(&f.file, f.root, &eliminate)?;
    Ok(Zdd { file, root })
}

/// Number of sets the family represents (§4.8 `zdd_size`).
pub fn zdd_size(f: &Zdd) -> Result<u128> {
    Ok(count::pathcount(&f.file, f.root)?)
}

fn load_all(file: &NodeFile) -> Result<HashMap<Uid, Node>> {
    let mut nodes = HashMap::new();
    for node in file.nodes_reader()?.drain_fwd()? {
        nodes.insert(node.uid(), node);
    }
    Ok(nodes)
}

/// Does the family include the exact set `members` (ascending)? (§6
/// `adiar::zdd_contains`.)
pub fn zdd_contains(f: &Zdd, members: &[Label]) -> Result<bool> {
    let nodes = load_all(&f.file)?;
    let mut ptr = f.root;
    let mut members = members.iter().copied().peekable();
    loop {
        if ptr.is_terminal() {
            return Ok(ptr.value() && members.peek().is_none());
        }
        let node = nodes
            .get(&Uid::new(ptr))
            .ok_or_else(|| Error::invalid_argument("zdd_contains: dangling node reference"))?;
        let label = node.uid().label();
        match members.peek() {
            Some(&m) if m < label => return Ok(false),
            Some(&m) if m == label => {
                members.next();
                ptr = node.high();
            }
            _ => ptr = node.low(),
        }
    }
}

fn reaches_true(nodes: &HashMap<Uid, Node>, memo: &mut HashMap<Ptr, bool>, ptr: Ptr) -> bool {
    if ptr.is_terminal() {
        return ptr.value();
    }
    if let Some(&cached) = memo.get(&ptr) {
        return cached;
    }
    let node = nodes[&Uid::new(ptr)];
    let value = reaches_true(nodes, memo, node.low()) || reaches_true(nodes, memo, node.high());
    memo.insert(ptr, value);
    value
}

/// The lexicographically smallest member set, traced as the low-most path
/// to the true terminal (§6 `adiar::zdd_minelem`, convention `x0 > x1 > ...`).
pub fn zdd_minelem(f: &Zdd) -> Result<Vec<Label>> {
    elem_path(f, false)
}

/// The lexicographically largest member set, traced as the high-most path
/// to the true terminal (§6 `adiar::zdd_maxelem`).
pub fn zdd_maxelem(f: &Zdd) -> Result<Vec<Label>> {
    elem_path(f, true)
}

fn elem_path(f: &Zdd, prefer_high: bool) -> Result<Vec<Label>> {
    let nodes = load_all(&f.file)?;
    let mut memo = HashMap::new();
    let mut ptr = f.root;
    let mut result = Vec::new();
    loop {
        if ptr.is_terminal() {
            if ptr.value() {
                return Ok(result);
            }
            return Err(Error::invalid_argument("zdd_minelem/zdd_maxelem: family is empty").into());
        }
        let node = nodes[&Uid::new(ptr)];
        let take_high = if prefer_high {
            reaches_true(&nodes, &mut memo, node.high())
        } else {
            !reaches_true(&nodes, &mut memo, node.low())
        };
        if take_high {
            result.push(node.uid().label());
            ptr = node.high();
        } else {
            ptr = node.low();
        }
    }
}

/// Resolve one child of a [`zdd_insert`] sweep: if `ptr` hasn't reached the
/// inserted variable `v` yet (it's internal with a label `<= v`), it's still
/// pending and gets the ordinary [`select::resolve`] treatment, to be
/// expanded later by the main loop with the same `v`-aware logic. Otherwise
/// (`ptr` is terminal, or its real label already skipped past `v`) this path
/// never gets another chance to decide `v`, so a fresh node is spliced in
/// right here: `forced` (`change`) kills the branch that would keep
/// excluding `v`; `!forced` (`expand`) sends both branches to the same
/// unchanged continuation. Memoized separately from `select::resolve`'s
/// table (by the *pre-splice* pointer) since the same subtree can be
/// reached both through a path that has already decided `v` (no splice
/// needed) and one that hasn't (splice needed) — see this module's doc
/// comment.
#[allow(clippy::too_many_arguments)]
fn resolve_with_jump(
    ptr: Ptr,
    v: Label,
    forced: bool,
    assigned: &mut HashMap<Ptr, Uid>,
    wrapped: &mut HashMap<Ptr, Uid>,
    counters: &mut HashMap<Label, u32>,
    lpq: &mut LevelizedPriorityQueue<1>,
    writer: &mut crate::file::writer::ArcWriter,
) -> crate::error::Result<Ptr> {
    if !(ptr.is_terminal() || ptr.label() > v) {
        return select::resolve(ptr, assigned, counters, lpq);
    }
    if let Some(&uid) = wrapped.get(&ptr) {
        return Ok(uid.as_ptr());
    }
    let continuation = select::resolve(ptr, assigned, counters, lpq)?;
    let counter = counters.entry(v).or_insert(0);
    let uid = Uid::internal(v, *counter);
    *counter += 1;
    wrapped.insert(ptr, uid);
    let low = if forced { Ptr::terminal(false) } else { continuation };
    writer.push(DiagArc::new(uid, false, low))?;
    writer.push(DiagArc::new(uid, true, continuation))?;
    writer.push_level(v)?;
    Ok(uid.as_ptr())
}

/// Splice a new node deciding variable `v` into every path of `f` that
/// doesn't already have one (§6 `zdd_change`/`zdd_expand`, whichever is
/// selected by `forced`), as a single top-down streaming sweep over `f`'s
/// node file. Unlike [`prod2`]/[`quantify`]'s sweeps this walks only one
/// diagram and produces no combination, but the shape is the same: a
/// levelized priority queue of pending pointers, one node resolved per pop.
///
/// The one piece of bookkeeping those sweeps don't need: a node whose real
/// label is already past `v` may be reached both from a pending parent
/// (label `<= v`, needs the splice) and from another node that has already
/// had `v` spliced in on its path (needs a plain copy) — both are legitimate
/// and distinct outputs for the same underlying subtree, so [`resolve_with_jump`]
/// and [`select::resolve`] keep separate id tables (`wrapped` vs `assigned`)
/// rather than collapsing them into one.
fn zdd_insert(file: &NodeFile, root: Ptr, v: Label, forced: bool) -> crate::error::Result<UnreducedResult> {
    let mut assigned: HashMap<Ptr, Uid> = HashMap::new();
    let mut wrapped: HashMap<Ptr, Uid> = HashMap::new();
    let mut counters: HashMap<Label, u32> = HashMap::new();
    let comparator: Comparator<1> = Box::new(|a: &Request<1>, b: &Request<1>| a[0].cmp(&b[0]));
    let mut lpq: LevelizedPriorityQueue<1> = LevelizedPriorityQueue::new(comparator);
    let (dir, mut writer) = new_arc_writer()?;

    let root_uid =
        resolve_with_jump(root, v, forced, &mut assigned, &mut wrapped, &mut counters, &mut lpq, &mut writer)?;

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

            let (low_out, high_out) = if label == v {
                if forced {
                    (
                        select::resolve(high, &mut assigned, &mut counters, &mut lpq)?,
                        select::resolve(low, &mut assigned, &mut counters, &mut lpq)?,
                    )
                } else {
                    (
                        select::resolve(low, &mut assigned, &mut counters, &mut lpq)?,
                        select::resolve(high, &mut assigned, &mut counters, &mut lpq)?,
                    )
                }
            } else if label < v {
                (
                    resolve_with_jump(low, v, forced, &mut assigned, &mut wrapped, &mut counters, &mut lpq, &mut writer)?,
                    resolve_with_jump(high, v, forced, &mut assigned, &mut wrapped, &mut counters, &mut lpq, &mut writer)?,
                )
            } else {
                (
                    select::resolve(low, &mut assigned, &mut counters, &mut lpq)?,
                    select::resolve(high, &mut assigned, &mut counters, &mut lpq)?,
                )
            };

            writer.push(DiagArc::new(own_uid, false, low_out))?;
            writer.push(DiagArc::new(own_uid, true, high_out))?;
        }
        writer.push_level(label)?;
    }

    let output = writer.close()?;
    let arc_file = ArcFile::from_writer_output(dir, output);
    Ok(UnreducedResult::Arc(arc_file, root_uid))
}

/// `{ vars Δ a | a ∈ A }` — symmetric difference of a fixed set `vars` with
/// every member of the family (§6 `adiar::zdd_change`), one variable's
/// splice at a time (order does not matter: symmetric difference is
/// commutative and associative) via [`zdd_insert`] with `forced = true` —
/// the branch that would keep excluding a just-toggled-in variable is dead.
pub fn zdd_change(f: &Zdd, vars: Vec<Label>) -> Result<Zdd> {
    let mut file = f.file.clone();
    let mut root = f.root;
    for v in vars {
        let (next_file, next_root) = zdd_insert(&file, root, v, true)?.into_zdd_reduced()?;
        file = next_file;
        root = next_root;
    }
    Ok(Zdd { file, root })
}

/// Adds a don't-care node on each level in `vars` (§6 `adiar::zdd_expand`,
/// "the inverse of `zdd_project`"): every member of the result is some
/// member of `A` together with an arbitrary subset of `vars`. Built on
/// [`zdd_insert`] with `forced = false`, which splices the free node at
/// `v`'s actual position in the level order rather than requiring `v` to
/// sit above everything already in `f`.
pub fn zdd_expand(f: &Zdd, vars: Vec<Label>) -> Result<Zdd> {
    let mut file = f.file.clone();
    let mut root = f.root;
    for v in vars {
        let (next_file, next_root) = zdd_insert(&file, root, v, false)?.into_zdd_reduced()?;
        file = next_file;
        root = next_root;
    }
    Ok(Zdd { file, root })
}

/// `2^dom \ A` (§6 `adiar::zdd_complement`), built as the full powerset of
/// `dom` (every subset of `dom`, via [`zdd_expand`] from [`Zdd::unit`]) with
/// `A`'s members removed.
pub fn zdd_complement(f: &Zdd, dom: &Context) -> Result<Zdd> {
    let whole = zdd_expand(&Zdd::unit()?, dom.labels().to_vec())?;
    zdd_diff(&whole, f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_unit_have_the_expected_sizes() {
        assert_eq!(zdd_size(&Zdd::empty().unwrap()).unwrap(), 0);
        assert_eq!(zdd_size(&Zdd::unit().unwrap()).unwrap(), 1);
    }

    #[test]
    fn singleton_contains_exactly_its_own_members() {
        let s = Zdd::singleton(&[1, 3]).unwrap();
        assert!(zdd_contains(&s, &[1, 3]).unwrap());
        assert!(!zdd_contains(&s, &[1]).unwrap());
        assert!(!zdd_contains(&s, &[]).unwrap());
        assert_eq!(zdd_size(&s).unwrap(), 1);
    }

    #[test]
    fn union_of_two_singletons_has_size_two() {
        let a = Zdd::singleton(&[0]).unwrap();
        let b = Zdd::singleton(&[1]).unwrap();
        let u = zdd_union(&a, &b).unwrap();
        assert_eq!(zdd_size(&u).unwrap(), 2);
        assert!(zdd_contains(&u, &[0]).unwrap());
        assert!(zdd_contains(&u, &[1]).unwrap());
        assert!(!zdd_contains(&u, &[0, 1]).unwrap());
    }

    #[test]
    fn minelem_and_maxelem_of_a_two_member_family() {
        let a = Zdd::singleton(&[0]).unwrap();
        let b = Zdd::singleton(&[0, 1]).unwrap();
        let u = zdd_union(&a, &b).unwrap();
        // x0 > x1: {0} is lexicographically smaller than {0,1}.
        assert_eq!(zdd_minelem(&u).unwrap(), vec![0]);
        assert_eq!(zdd_maxelem(&u).unwrap(), vec![0, 1]);
    }

    #[test]
    fn change_toggles_membership_of_the_given_variable() {
        // unit() = {{}}; changing {0} gives {{0}}.
        let u = Zdd::unit().unwrap();
        let changed = zdd_change(&u, vec![0]).unwrap();
        assert!(zdd_contains(&changed, &[0]).unwrap());
        assert_eq!(zdd_size(&changed).unwrap(), 1);
    }

    #[test]
    fn change_is_its_own_inverse() {
        let s = Zdd::singleton(&[1, 2]).unwrap();
        let once = zdd_change(&s, vec![0]).unwrap();
        let twice = zdd_change(&once, vec![0]).unwrap();
        assert!(zdd_contains(&twice, &[1, 2]).unwrap());
        assert_eq!(zdd_size(&twice).unwrap(), 1);
    }

    #[test]
    fn expand_doubles_membership_count_per_free_variable() {
        let s = Zdd::singleton(&[2]).unwrap();
        let expanded = zdd_expand(&s, vec![0, 1]).unwrap();
        assert_eq!(zdd_size(&expanded).unwrap(), 4);
        assert!(zdd_contains(&expanded, &[2]).unwrap());
        assert!(zdd_contains(&expanded, &[0, 2]).unwrap());
        assert!(zdd_contains(&expanded, &[1, 2]).unwrap());
        assert!(zdd_contains(&expanded, &[0, 1, 2]).unwrap());
    }

    #[test]
    fn expand_can_splice_a_variable_between_two_existing_levels() {
        // s: { {0, 2} }. Expanding at label 1, strictly between the two
        // levels already in the diagram, should double membership just
        // like expanding at a level above everything does.
        let s = Zdd::singleton(&[0, 2]).unwrap();
        let expanded = zdd_expand(&s, vec![1]).unwrap();
        assert_eq!(zdd_size(&expanded).unwrap(), 2);
        assert!(zdd_contains(&expanded, &[0, 2]).unwrap());
        assert!(zdd_contains(&expanded, &[0, 1, 2]).unwrap());
        assert!(!zdd_contains(&expanded, &[0]).unwrap());
        assert!(!zdd_contains(&expanded, &[1, 2]).unwrap());
    }

    #[test]
    fn complement_of_the_whole_domain_family_is_empty() {
        let dom = Context::range(2).unwrap();
        let all = zdd_expand(&Zdd::unit().unwrap(), dom.labels().to_vec()).unwrap();
        let complement = zdd_complement(&all, &dom).unwrap();
        assert!(complement.is_empty());
    }

    #[test]
    fn complement_contains_every_set_not_in_the_original() {
        let dom = Context::range(2).unwrap();
        let a = Zdd::singleton(&[0]).unwrap();
        let complement = zdd_complement(&a, &dom).unwrap();
        assert_eq!(zdd_size(&complement).unwrap(), 3);
        assert!(!zdd_contains(&complement, &[0]).unwrap());
        assert!(zdd_contains(&complement, &[]).unwrap());
        assert!(zdd_contains(&complement, &[1]).unwrap());
        assert!(zdd_contains(&complement, &[0, 1]).unwrap());
    }
}
