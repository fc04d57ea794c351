//! Public BDD façade (§6): a thin `anyhow`-erroring wrapper over the engine
//! sweeps, grounded on the teacher's `api.rs` "happy path" shape and on
//! `adiar/bdd.h`'s documented public surface.
//!
//! Every operation here is a direct pass to the sweep that implements it —
//! [`crate::prod2::apply`] for the boolean combinators, [`crate::select::restrict`]
//! for `restrict`, [`crate::quantify`] for `exists`/`forall`, [`crate::equality::equal`]
//! for `equal`, [`crate::count`] for the counting family — reduced via
//! [`UnreducedResult::into_reduced`] where the sweep doesn't already return a
//! canonical file. Unlike `crate::zdd`, nothing here needs a bespoke sweep:
//! `prod2`'s "unchanged on both branches" cofactor at a level a pointer
//! hasn't reached is exactly BDD don't-care semantics, so this module can
//! reuse the shared machinery without the caveats that module's docs spell
//! out.

use anyhow::Result;

use crate::count;
use crate::domain::Context;
use crate::equality;
use crate::file::NodeFile;
use crate::policy::ExecPolicy;
use crate::ptr::{Label, Ptr};
use crate::prod2::{self, BinOp};
use crate::quantify;
use crate::select::{self, Assignment};
use crate::zdd::Zdd;

/// A handle onto one BDD: an owned, reduced node file plus the pointer this
/// handle considers its root (§3 `dd`).
#[derive(Clone)]
pub struct Bdd {
    file: NodeFile,
    root: Ptr,
}

impl Bdd {
    pub(crate) fn from_parts(file: NodeFile, root: Ptr) -> Bdd {
        Bdd { file, root }
    }

    /// The constant-`true` or constant-`false` function.
    pub fn constant(value: bool) -> Result<Bdd> {
        Ok(Bdd { file: NodeFile::constant(value)?, root: Ptr::terminal(value) })
    }

    pub fn file(&self) -> &NodeFile {
        &self.file
    }

    pub fn root(&self) -> Ptr {
        self.root
    }

    /// `Some(value)` if this diagram is a bare constant, `None` if it still
    /// depends on at least one variable.
    pub fn is_constant(&self) -> Option<bool> {
        self.root.is_terminal().then(|| self.root.value())
    }

    /// Reinterpret this BDD as a ZDD over the same node file (§6
    /// `adiar::zdd_from_bdd`'s inverse direction) — a relabelling of the
    /// handle, not a sweep; see [`crate::zdd::zdd_from_bdd`]'s doc comment.
    pub fn to_zdd(&self) -> Zdd {
        Zdd::from_parts(self.file.clone(), self.root)
    }

    pub(crate) fn from_zdd(z: &Zdd) -> Bdd {
        Bdd { file: z.file().clone(), root: z.root() }
    }
}

/// Apply `op` to `f` and `g` (§4.4), reducing the result (§4.3) before
/// handing back a canonical handle.
pub fn bdd_apply(f: &Bdd, g: &Bdd, op: &BinOp) -> Result<Bdd> {
    let (file, root) = prod2::apply(&f.file, f.root, &g.file, g.root, op)?.into_reduced()?;
    Ok(Bdd { file, root })
}

pub fn bdd_and(f: &Bdd, g: &Bdd) -> Result<Bdd> {
    bdd_apply(f, g, &BinOp::and())
}

pub fn bdd_or(f: &Bdd, g: &Bdd) -> Result<Bdd> {
    bdd_apply(f, g, &BinOp::or())
}

pub fn bdd_xor(f: &Bdd, g: &Bdd) -> Result<Bdd> {
    bdd_apply(f, g, &BinOp::xor())
}

/// `!f`, computed as `f XOR true` so negation reuses the same sweep rather
/// than needing a dedicated one-argument pass.
pub fn bdd_not(f: &Bdd) -> Result<Bdd> {
    bdd_apply(f, &Bdd::constant(true)?, &BinOp::xor())
}

/// `if f then g else h`, built from three applies (`f.g`, `!f.h`, then their
/// disjunction) rather than a dedicated three-argument sweep — the original
/// has no single-pass `ite` either, resolving it the same way at the
/// `bdd` facade layer.
pub fn bdd_ite(f: &Bdd, g: &Bdd, h: &Bdd) -> Result<Bdd> {
    let then_branch = bdd_and(f, g)?;
    let else_branch = bdd_and(&bdd_not(f)?, h)?;
    bdd_or(&then_branch, &else_branch)
}

/// Fix `label` to `value` throughout `f` (§4.6).
pub fn bdd_restrict(f: &Bdd, label: Label, value: bool) -> Result<Bdd> {
    let assignment = Assignment::from_map(std::collections::HashMap::from([(label, value)]));
    let (file, root) = select::restrict(&f.file, f.root, assignment)?.into_reduced()?;
    Ok(Bdd { file, root })
}

/// `∃x. f` for every `x` in `vars`, eliminated one at a time (§4.5).
pub fn bdd_exists(f: &Bdd, vars: &[Label], policy: ExecPolicy) -> Result<Bdd> {
    let (file, root) = quantify::exists_many(&f.file, f.root, vars, policy)?;
    Ok(Bdd { file, root })
}

/// `∀x. f` for every `x` in `vars`, eliminated one at a time (§4.5).
pub fn bdd_forall(f: &Bdd, vars: &[Label], policy: ExecPolicy) -> Result<Bdd> {
    let (file, root) = quantify::forall_many(&f.file, f.root, vars, policy)?;
    Ok(Bdd { file, root })
}

/// Do `f` and `g` represent the same boolean function (§4.7)?
pub fn bdd_equal(f: &Bdd, g: &Bdd) -> Result<bool> {
    Ok(equality::equal(&f.file, f.root, &g.file, g.root)?)
}

/// Number of internal nodes (§4.8 `bdd_nodecount`).
pub fn bdd_nodecount(f: &Bdd) -> usize {
    count::size(&f.file, f.root)
}

/// Number of satisfying assignments over `domain` (§4.8 `bdd_satcount`).
pub fn bdd_satcount(f: &Bdd, domain: &Context) -> Result<f64> {
    Ok(count::satcount(&f.file, f.root, domain)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Node;
    use crate::file::new_node_writer;
    use crate::ptr::Uid;

    fn single_var_true_high(label: Label) -> Bdd {
        let (dir, mut w) = new_node_writer().unwrap();
        w.push(Node::internal(Uid::internal(label, 0), Ptr::terminal(false), Ptr::terminal(true))).unwrap();
        w.push_level(label).unwrap();
        let output = w.close().unwrap();
        Bdd { file: NodeFile::from_writer_output(dir, output).unwrap(), root: Ptr::internal(label, 0) }
    }

    #[test]
    fn constants_report_their_own_value() {
        assert_eq!(Bdd::constant(true).unwrap().is_constant(), Some(true));
        assert_eq!(single_var_true_high(0).is_constant(), None);
    }

    #[test]
    fn not_of_the_true_constant_is_false() {
        let f = bdd_not(&Bdd::constant(true).unwrap()).unwrap();
        assert_eq!(f.is_constant(), Some(false));
    }

    #[test]
    fn and_of_a_variable_with_false_is_false() {
        let f = single_var_true_high(0);
        let g = Bdd::constant(false).unwrap();
        assert_eq!(bdd_and(&f, &g).unwrap().is_constant(), Some(false));
    }

    #[test]
    fn restrict_to_true_collapses_to_the_constant_cofactor() {
        let f = single_var_true_high(0);
        let restricted = bdd_restrict(&f, 0, true).unwrap();
        assert_eq!(restricted.is_constant(), Some(true));
    }

    #[test]
    fn exists_over_the_only_variable_is_true() {
        let f = single_var_true_high(0);
        let result = bdd_exists(&f, &[0], ExecPolicy::new()).unwrap();
        assert_eq!(result.is_constant(), Some(true));
    }

    #[test]
    fn forall_over_the_only_variable_is_false() {
        let f = single_var_true_high(0);
        let result = bdd_forall(&f, &[0], ExecPolicy::new()).unwrap();
        assert_eq!(result.is_constant(), Some(false));
    }

    #[test]
    fn ite_with_a_true_condition_picks_the_then_branch() {
        let cond = Bdd::constant(true).unwrap();
        let then_branch = single_var_true_high(0);
        let else_branch = Bdd::constant(false).unwrap();
        let result = bdd_ite(&cond, &then_branch, &else_branch).unwrap();
        assert!(bdd_equal(&result, &then_branch).unwrap());
    }

    #[test]
    fn equal_diagrams_compare_equal_and_differing_ones_do_not() {
        let f = single_var_true_high(0);
        let g = single_var_true_high(0);
        let h = single_var_true_high(1);
        assert!(bdd_equal(&f, &g).unwrap());
        assert!(!bdd_equal(&f, &h).unwrap());
    }

    #[test]
    fn satcount_and_nodecount_agree_with_the_single_variable_case() {
        let f = single_var_true_high(0);
        let domain = Context::range(1).unwrap();
        assert_eq!(bdd_nodecount(&f), 1);
        assert_eq!(bdd_satcount(&f, &domain).unwrap(), 1.0);
    }

    #[test]
    fn round_trip_through_zdd_preserves_the_node_file() {
        let f = single_var_true_high(0);
        let z = f.to_zdd();
        let back = Bdd::from_zdd(&z);
        assert!(bdd_equal(&f, &back).unwrap());
    }
}
