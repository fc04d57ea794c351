//! Crate root: public surface and module map for an I/O-efficient engine for
//! Reduced Ordered Binary and Zero-suppressed Decision Diagrams (§1–§2),
//! built on levelized on-disk files (§4.1) and time-forward processing
//! (§4.2–§4.4).
//!
//! ## Invariants
//!
//! - **Canonicity.** Every [`file::NodeFile`] this crate hands back to a
//!   caller is reduced (§3 "Decision diagram handle", §4.3): no node has
//!   `low == high` (BDD Rule 1) or a duplicate `(low, high)` sibling on its
//!   level (Rule 2), except the deliberately-unreduced ZDD don't-care nodes
//!   [`zdd::zdd_expand`]/[`zdd::zdd_change`] build directly (see that
//!   module's docs).
//! - **Levelization.** Every on-disk stream this crate writes groups records
//!   by level and visits levels in a single consistent direction per pass —
//!   bottom-up for [`reduce::reduce`] and the counting/equality sweeps,
//!   top-down for [`prod2::apply`]/[`select::restrict`] — never both in the
//!   same pass (§4.1 "time-forward processing").
//! - **No unbounded in-memory state.** Every sweep holds at most one level's
//!   worth of nodes in RAM at a time ([`pq::LevelizedPriorityQueue`],
//!   [`file::random_access::LevelFrontier`]); the one exception is
//!   [`zdd`]'s recursive combinators, which load a whole diagram into a
//!   `HashMap` because ZDD set operations need random node access BDD
//!   `prod2` does not (see that module's docs for why).
//!
//! If any invariant is violated at runtime, the failure mode is a precise
//! [`error::Error`] (never UB, never a panic outside `expect`s documented as
//! internal-consistency checks).

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

/// Pointers, unique identifiers, and the level ordering they induce (§3).
pub mod ptr;
/// Crate-wide error taxonomy (§7).
pub mod error;
/// Value types built on [`ptr`]: tuples, nodes, arcs (§3).
pub mod data;
/// The levelized file model: on-disk storage, streams, writers, sorter (§4.1).
pub mod file;
/// Levelized priority queue (§4.2).
pub mod pq;
/// Cut estimator, feeding the execution planner (§4.9).
pub mod cut;
/// Callback shapes: generators and predicates over labels (§6).
pub mod callback;
/// Execution policy and memory planner (§4.9, §6 `exec_policy`).
pub mod policy;
/// Variable domain (§6, §9 "Global domain singleton" flag).
pub mod domain;
/// Statistics counters, gated by the `statistics` feature (§6, §9).
pub mod statistics;
/// Reduce (§4.3): arc file to canonical node file.
pub mod reduce;
/// Two-argument product construction / Apply (§4.4).
pub mod prod2;
/// Selection: restrict, onset, offset (§4.6).
pub mod select;
/// Quantification: BDD exists/forall (§4.5).
pub mod quantify;
/// Counting: satcount, pathcount, size, ZDD size (§4.8).
pub mod count;
/// Structural equality (§4.7).
pub mod equality;
/// Public BDD façade (§6).
pub mod bdd;
/// Public ZDD façade (§6).
pub mod zdd;

pub use bdd::{
    bdd_and, bdd_apply, bdd_equal, bdd_exists, bdd_forall, bdd_ite, bdd_nodecount, bdd_not,
    bdd_or, bdd_restrict, bdd_satcount, bdd_xor, Bdd,
};
pub use domain::{domain_get, domain_isset, domain_set, domain_set_labels, domain_size, domain_unset, Context};
pub use error::{Error, Result};
pub use policy::{Access, ExecPolicy, Memory, Quantify};
pub use ptr::{Id, Label, Ptr, Uid};
pub use zdd::{
    zdd_change, zdd_complement, zdd_contains, zdd_diff, zdd_expand, zdd_from_bdd, zdd_intsec,
    zdd_maxelem, zdd_minelem, zdd_offset, zdd_onset, zdd_project, zdd_size, zdd_union, Zdd,
};
