//! Aggregate metadata carried by a levelized file (§3, §6).

use crate::data::LevelInfo;
use crate::ptr::Label;

/// The four cut types tracked per §3 ("max_1level_cut[4]", "max_2level_cut[4]
/// indexed by cut-type").
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CutType {
    Internal,
    InternalFalse,
    InternalTrue,
    All,
}

impl CutType {
    pub const ALL: [CutType; 4] =
        [CutType::Internal, CutType::InternalFalse, CutType::InternalTrue, CutType::All];

    fn idx(self) -> usize {
        match self {
            CutType::Internal => 0,
            CutType::InternalFalse => 1,
            CutType::InternalTrue => 2,
            CutType::All => 3,
        }
    }
}

/// Per-cut-type counters, indexed by [`CutType`] (§3 `max_1level_cut[4]` /
/// `max_2level_cut[4]`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CutSizes([usize; 4]);

impl CutSizes {
    pub fn get(&self, t: CutType) -> usize {
        self.0[t.idx()]
    }

    pub fn set_max(&mut self, t: CutType, value: usize) {
        let slot = &mut self.0[t.idx()];
        if value > *slot {
            *slot = value;
        }
    }

    pub fn max_over_all(&self) -> usize {
        self.0.iter().copied().max().unwrap_or(0)
    }
}

/// Whether a levelized file holds [`crate::data::Node`]s or [`crate::data::Arc`]s.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    Node,
    Arc,
}

/// Aggregate metadata header for a levelized file (§3, §6).
#[derive(Clone, Debug)]
pub struct Metadata {
    pub kind: FileKind,
    /// Nodes sorted descending by `(high, low)` with ids running from
    /// `max_id` down, within each level (§3 "Canonicity"). Always `false`
    /// for arc files.
    pub canonical: bool,
    /// Arc files only: whether the internal-arc sub-stream is still sorted
    /// by target (written bottom-up) rather than by source (§3, §4.1).
    pub semi_transposed: bool,
    /// Max width across all levels.
    pub width: usize,
    /// `[false_terminal_count, true_terminal_count]`.
    pub number_of_terminals: [usize; 2],
    pub max_1level_cut: CutSizes,
    pub max_2level_cut: CutSizes,
    pub levels: Vec<LevelInfo>,
}

impl Metadata {
    pub fn new(kind: FileKind) -> Metadata {
        Metadata {
            kind,
            canonical: false,
            semi_transposed: false,
            width: 0,
            number_of_terminals: [0, 0],
            max_1level_cut: CutSizes::default(),
            max_2level_cut: CutSizes::default(),
            levels: Vec::new(),
        }
    }

    pub fn is_terminal_only(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn levels_count(&self) -> usize {
        self.levels.len()
    }

    pub fn label_at(&self, idx: usize) -> Option<Label> {
        self.levels.get(idx).map(|l| l.label)
    }
}
