//! Execution policy and memory planner (§4.9, §6 `exec_policy`).
//!
//! A plain value accepted by every algorithm entry point. The planner
//! resolves `Auto` settings into a concrete choice given the input
//! diagrams' cut sizes — it never second-guesses an explicit choice, even
//! a disastrous one, since §4.9 treats precondition violations (e.g.
//! `Random_Access` over a non-canonical file) as the caller's mistake to
//! report, not something to silently route around.

use crate::error::{Error, Result};
use crate::file::metadata::{CutSizes, CutType};
use crate::pq::BucketBacking;

/// Traversal strategy (§6 `access`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Access {
    #[default]
    Auto,
    RandomAccess,
    PriorityQueue,
}

/// Auxiliary-structure backing (§6 `memory`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Memory {
    #[default]
    Auto,
    Internal,
    External,
}

/// Multi-variable quantification plan (§6 `quantify`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Quantify {
    #[default]
    Auto,
    Nested,
    Partial,
    Singleton,
}

/// The value record accepted by every algorithm (§4.9, §6).
#[derive(Clone, Copy, Debug, Default)]
pub struct ExecPolicy {
    pub access: Access,
    pub memory: Memory,
    pub quantify: Quantify,
}

impl ExecPolicy {
    pub fn new() -> ExecPolicy {
        ExecPolicy::default()
    }

    pub fn with_access(mut self, access: Access) -> ExecPolicy {
        self.access = access;
        self
    }

    pub fn with_memory(mut self, memory: Memory) -> ExecPolicy {
        self.memory = memory;
        self
    }

    pub fn with_quantify(mut self, quantify: Quantify) -> ExecPolicy {
        self.quantify = quantify;
        self
    }
}

/// The width, below which `Auto` access prefers `Random_Access` over
/// `Priority_Queue`, measured by an input's max width.
///
/// The source leaves this as "narrow enough" without a number (§9 open
/// question). This is a placeholder pending benchmarking, not a derived
/// constant.
pub const RANDOM_ACCESS_WIDTH_THRESHOLD: usize = 1 << 20;

/// How large an internal (in-RAM) sorter run may grow before the planner
/// prefers spilling to disk (§4.9 `memory::Auto` resolution).
pub const INTERNAL_SORTER_THRESHOLD: usize = 1 << 24;

/// The planner's concrete resolution of an [`ExecPolicy`] against a given
/// input shape (§4.9: "given `exec_policy` and the input diagrams'
/// `max_2level_cut` values ... chooses LPQ variant, sorter backing, and
/// access mode").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedPolicy {
    pub use_random_access: bool,
    pub backing: BucketBacking,
}

/// Resolve `policy` against one or two input widths/cuts.
///
/// # Errors
/// [`Error::InvalidArgument`] if `Random_Access` is explicitly requested
/// but `canonical` is `false` (no narrow canonical input is available) —
/// the fatal precondition violation named in §4.9.
pub fn resolve(
    policy: ExecPolicy,
    width: usize,
    max_2level_cut: CutSizes,
    canonical: bool,
) -> Result<ResolvedPolicy> {
    let use_random_access = match policy.access {
        Access::RandomAccess => {
            if !canonical {
                return Err(Error::invalid_argument(
                    "Random_Access execution policy requires a canonical (reduced) input",
                ));
            }
            true
        }
        Access::PriorityQueue => false,
        Access::Auto => canonical && width <= RANDOM_ACCESS_WIDTH_THRESHOLD,
    };

    let predicted = max_2level_cut.get(CutType::All);
    let backing = match policy.memory {
        Memory::Internal => BucketBacking::Internal,
        Memory::External => BucketBacking::External,
        Memory::Auto => {
            if predicted <= INTERNAL_SORTER_THRESHOLD {
                BucketBacking::Internal
            } else {
                BucketBacking::External
            }
        }
    };

    Ok(ResolvedPolicy { use_random_access, backing })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_prefers_random_access_for_narrow_canonical_input() {
        let resolved = resolve(ExecPolicy::new(), 10, CutSizes::default(), true).unwrap();
        assert!(resolved.use_random_access);
    }

    #[test]
    fn auto_falls_back_to_priority_queue_for_wide_input() {
        let resolved =
            resolve(ExecPolicy::new(), RANDOM_ACCESS_WIDTH_THRESHOLD + 1, CutSizes::default(), true)
                .unwrap();
        assert!(!resolved.use_random_access);
    }

    #[test]
    fn explicit_random_access_over_non_canonical_input_is_an_error() {
        let policy = ExecPolicy::new().with_access(Access::RandomAccess);
        assert!(resolve(policy, 1, CutSizes::default(), false).is_err());
    }

    #[test]
    fn explicit_memory_choice_is_never_overridden() {
        let policy = ExecPolicy::new().with_memory(Memory::External);
        let resolved = resolve(policy, 1, CutSizes::default(), true).unwrap();
        assert_eq!(resolved.backing, BucketBacking::External);
    }
}
