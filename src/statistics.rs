//! Statistics (§6 utility surface, §9 "Statistics counters" redesign flag,
//! grounded on `statistics.h`).
//!
//! The original gates every counter update behind a CMake switch so a
//! release build pays nothing for instrumentation. This crate gets the
//! same zero-cost property from the `statistics` Cargo feature: with it
//! off, every `record_*` call below compiles away entirely (the function
//! bodies are empty and the call sites are still monomorphic, so there's
//! nothing left for the optimizer to even need to remove). With it on,
//! counters are plain `Cell<u64>` fields behind one thread-local, matching
//! §5's "single-threaded cooperative" scheduling model (no atomics needed).
//!
//! Only a representative subset of the original's counter tree is kept —
//! one struct per algorithm family plus the two file-writer structs — since
//! the nested per-sweep-direction breakdown (`nested_sweeping::inner::up`,
//! `...::down`, ...) adds detail this crate's sweep structure doesn't need
//! a dedicated counter for; the per-algorithm structs below are where that
//! would be extended if it ever did.

#[cfg(feature = "statistics")]
mod enabled {
    use std::cell::Cell;

    #[derive(Default)]
    pub struct ArcFileStats {
        pub push_internal: Cell<u64>,
        pub push_in_order: Cell<u64>,
        pub push_out_of_order: Cell<u64>,
        pub push_level: Cell<u64>,
    }

    #[derive(Default)]
    pub struct NodeFileStats {
        pub push_node: Cell<u64>,
        pub push_level: Cell<u64>,
    }

    #[derive(Default)]
    pub struct LpqStats {
        pub unbucketed: Cell<u64>,
        pub internal: Cell<u64>,
        pub external: Cell<u64>,
    }

    #[derive(Default)]
    pub struct ReduceStats {
        pub lpq: LpqStats,
        pub sum_node_arcs: Cell<u64>,
        pub sum_terminal_arcs: Cell<u64>,
        pub removed_by_rule_1: Cell<u64>,
        pub removed_by_rule_2: Cell<u64>,
    }

    #[derive(Default)]
    pub struct EqualityStats {
        pub lpq: LpqStats,
        pub exit_on_same_file: Cell<u64>,
        pub exit_on_nodecount: Cell<u64>,
        pub exit_on_varcount: Cell<u64>,
        pub exit_on_width: Cell<u64>,
        pub exit_on_terminalcount: Cell<u64>,
        pub exit_on_levels_mismatch: Cell<u64>,
        pub fast_runs: Cell<u64>,
        pub slow_runs: Cell<u64>,
    }

    #[derive(Default)]
    pub struct Prod2Stats {
        pub lpq: LpqStats,
        pub trivial_file: Cell<u64>,
        pub trivial_terminal: Cell<u64>,
    }

    #[derive(Default)]
    pub struct QuantifyStats {
        pub lpq: LpqStats,
    }

    #[derive(Default)]
    pub struct SelectStats {
        pub lpq: LpqStats,
    }

    #[derive(Default)]
    pub struct CountStats {
        pub lpq: LpqStats,
    }

    #[derive(Default)]
    pub struct Statistics {
        pub arc_file: ArcFileStats,
        pub node_file: NodeFileStats,
        pub reduce: ReduceStats,
        pub equality: EqualityStats,
        pub prod2: Prod2Stats,
        pub quantify: QuantifyStats,
        pub select: SelectStats,
        pub count: CountStats,
    }

    thread_local! {
        static STATS: Statistics = Statistics::default();
    }

    pub fn with_stats<R>(f: impl FnOnce(&Statistics) -> R) -> R {
        STATS.with(f)
    }

    pub fn reset() {
        STATS.with(|s| {
            s.arc_file.push_internal.set(0);
            s.arc_file.push_in_order.set(0);
            s.arc_file.push_out_of_order.set(0);
            s.arc_file.push_level.set(0);
            s.node_file.push_node.set(0);
            s.node_file.push_level.set(0);
            s.reduce.sum_node_arcs.set(0);
            s.reduce.sum_terminal_arcs.set(0);
            s.reduce.removed_by_rule_1.set(0);
            s.reduce.removed_by_rule_2.set(0);
            s.equality.exit_on_same_file.set(0);
            s.equality.exit_on_nodecount.set(0);
            s.equality.exit_on_varcount.set(0);
            s.equality.exit_on_width.set(0);
            s.equality.exit_on_terminalcount.set(0);
            s.equality.exit_on_levels_mismatch.set(0);
            s.equality.fast_runs.set(0);
            s.equality.slow_runs.set(0);
            s.prod2.trivial_file.set(0);
            s.prod2.trivial_terminal.set(0);
        });
    }

    fn bump(cell: &Cell<u64>) {
        cell.set(cell.get() + 1);
    }

    pub fn record_arc_push_internal() {
        STATS.with(|s| bump(&s.arc_file.push_internal));
    }
    pub fn record_arc_push_in_order() {
        STATS.with(|s| bump(&s.arc_file.push_in_order));
    }
    pub fn record_arc_push_out_of_order() {
        STATS.with(|s| bump(&s.arc_file.push_out_of_order));
    }
    pub fn record_node_push() {
        STATS.with(|s| bump(&s.node_file.push_node));
    }
    pub fn record_reduce_rule_1() {
        STATS.with(|s| bump(&s.reduce.removed_by_rule_1));
    }
    pub fn record_reduce_rule_2() {
        STATS.with(|s| bump(&s.reduce.removed_by_rule_2));
    }
    pub fn record_equality_fast_run() {
        STATS.with(|s| bump(&s.equality.fast_runs));
    }
    pub fn record_equality_slow_run() {
        STATS.with(|s| bump(&s.equality.slow_runs));
    }
    pub fn record_equality_exit_on_same_file() {
        STATS.with(|s| bump(&s.equality.exit_on_same_file));
    }
    pub fn record_equality_exit_on_nodecount() {
        STATS.with(|s| bump(&s.equality.exit_on_nodecount));
    }
    pub fn record_prod2_trivial_file() {
        STATS.with(|s| bump(&s.prod2.trivial_file));
    }
    pub fn record_prod2_trivial_terminal() {
        STATS.with(|s| bump(&s.prod2.trivial_terminal));
    }
}

#[cfg(feature = "statistics")]
pub use enabled::*;

#[cfg(not(feature = "statistics"))]
mod disabled {
    #[inline(always)]
    pub fn record_arc_push_internal() {}
    #[inline(always)]
    pub fn record_arc_push_in_order() {}
    #[inline(always)]
    pub fn record_arc_push_out_of_order() {}
    #[inline(always)]
    pub fn record_node_push() {}
    #[inline(always)]
    pub fn record_reduce_rule_1() {}
    #[inline(always)]
    pub fn record_reduce_rule_2() {}
    #[inline(always)]
    pub fn record_equality_fast_run() {}
    #[inline(always)]
    pub fn record_equality_slow_run() {}
    #[inline(always)]
    pub fn record_equality_exit_on_same_file() {}
    #[inline(always)]
    pub fn record_equality_exit_on_nodecount() {}
    #[inline(always)]
    pub fn record_prod2_trivial_file() {}
    #[inline(always)]
    pub fn record_prod2_trivial_terminal() {}
    #[inline(always)]
    pub fn reset() {}
}

#[cfg(not(feature = "statistics"))]
pub use disabled::*;

/// Print the current statistics to stdout in a human-readable form (§6
/// `statistics_print`). A no-op format under the disabled feature, since
/// there is nothing gathered to print.
#[cfg(feature = "statistics")]
pub fn print() {
    with_stats(|s| {
        println!("arc_file.push_internal = {}", s.arc_file.push_internal.get());
        println!("arc_file.push_in_order = {}", s.arc_file.push_in_order.get());
        println!("arc_file.push_out_of_order = {}", s.arc_file.push_out_of_order.get());
        println!("node_file.push_node = {}", s.node_file.push_node.get());
        println!("reduce.removed_by_rule_1 = {}", s.reduce.removed_by_rule_1.get());
        println!("reduce.removed_by_rule_2 = {}", s.reduce.removed_by_rule_2.get());
        println!("equality.fast_runs = {}", s.equality.fast_runs.get());
        println!("equality.slow_runs = {}", s.equality.slow_runs.get());
        println!("prod2.trivial_file = {}", s.prod2.trivial_file.get());
        println!("prod2.trivial_terminal = {}", s.prod2.trivial_terminal.get());
    });
}

#[cfg(not(feature = "statistics"))]
pub fn print() {}

#[cfg(test)]
#[cfg(feature = "statistics")]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_and_reset() {
        reset();
        record_reduce_rule_1();
        record_reduce_rule_1();
        record_equality_fast_run();
        assert_eq!(with_stats(|s| s.reduce.removed_by_rule_1.get()), 2);
        assert_eq!(with_stats(|s| s.equality.fast_runs.get()), 1);
        reset();
        assert_eq!(with_stats(|s| s.reduce.removed_by_rule_1.get()), 0);
    }
}
