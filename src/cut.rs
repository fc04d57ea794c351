//! Cut estimator (§2 dependency order item 4, §4.9).
//!
//! A *level-cut* is the number of arcs crossing from one level into the
//! next; its maximum across all levels bounds how large an algorithm's
//! priority queue or random-access buffer must be to hold one level's worth
//! of in-flight requests. This estimator accumulates, while a levelized
//! file is being written, the per-[`CutType`] running count of arcs leaving
//! the level currently being written, and folds that into a running maximum
//! for both the 1-level and 2-level window (§3's `max_1level_cut[4]` /
//! `max_2level_cut[4]`).
//!
//! The exact prediction algorithm from "Predicting Memory Demands of BDD
//! Operations using Maximum Graph Cuts" (ATVA 2023) is out of scope (§1); this
//! is a direct, conservative accumulator over the actual arcs written, not a
//! predictive model over node counts alone.

use crate::file::metadata::{CutSizes, CutType};
use crate::ptr::Ptr;

fn cut_type_includes(t: CutType, target: Ptr) -> bool {
    match t {
        CutType::Internal => target.is_internal(),
        CutType::InternalFalse => target.is_internal() || target.is_false(),
        CutType::InternalTrue => target.is_internal() || target.is_true(),
        CutType::All => true,
    }
}

/// Accumulates 1- and 2-level cut sizes while a writer streams arcs level
/// by level (§3, §4.1 writer responsibility: "Writers additionally maintain
/// `max_1level_cut`/`max_2level_cut` accumulators").
#[derive(Clone, Debug, Default)]
pub struct CutEstimator {
    current: CutSizes,
    previous: CutSizes,
    max_1level: CutSizes,
    max_2level: CutSizes,
}

impl CutEstimator {
    pub fn new() -> CutEstimator {
        CutEstimator::default()
    }

    /// Record one arc whose source is on the level currently being written.
    pub fn record_arc(&mut self, target: Ptr) {
        for t in CutType::ALL {
            if cut_type_includes(t, target) {
                self.current.set_max(t, self.current.get(t) + 1);
            }
        }
    }

    /// Signal that the writer has moved on to the next level: fold the
    /// level just finished into the running maxima and roll the window.
    pub fn level_boundary(&mut self) {
        for t in CutType::ALL {
            self.max_1level.set_max(t, self.current.get(t));
            self.max_2level.set_max(t, self.current.get(t) + self.previous.get(t));
        }
        self.previous = self.current;
        self.current = CutSizes::default();
    }

    /// Finalize and return `(max_1level_cut, max_2level_cut)`.
    pub fn finish(mut self) -> (CutSizes, CutSizes) {
        self.level_boundary();
        (self.max_1level, self.max_2level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_level_cut_equals_its_arc_count() {
        let mut e = CutEstimator::new();
        e.record_arc(Ptr::terminal(false));
        e.record_arc(Ptr::terminal(true));
        let (max1, max2) = e.finish();
        assert_eq!(max1.get(CutType::All), 2);
        assert_eq!(max2.get(CutType::All), 2);
    }

    #[test]
    fn two_level_window_sums_adjacent_levels() {
        let mut e = CutEstimator::new();
        for _ in 0..3 {
            e.record_arc(Ptr::terminal(false));
        }
        e.level_boundary();
        for _ in 0..5 {
            e.record_arc(Ptr::terminal(false));
        }
        let (max1, max2) = e.finish();
        assert_eq!(max1.get(CutType::All), 5);
        assert_eq!(max2.get(CutType::All), 8);
    }

    #[test]
    fn internal_vs_all_cut_types_are_tracked_separately() {
        let mut e = CutEstimator::new();
        e.record_arc(Ptr::internal(1, 0));
        e.record_arc(Ptr::terminal(false));
        let (max1, _) = e.finish();
        assert_eq!(max1.get(CutType::Internal), 1);
        assert_eq!(max1.get(CutType::All), 2);
    }
}
