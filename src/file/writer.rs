//! Levelized file writers (§4.1).

use std::path::Path;

use crate::cut::CutEstimator;
use crate::data::{Arc, LevelInfo, Node};
use crate::error::Result;
use crate::file::metadata::{CutSizes, FileKind, Metadata};
use crate::file::raw::{write_all, RawWriter};
use crate::ptr::{Label, Uid};

/// Builds a canonical node file one level at a time (§4.1, §4.3 Reduce's
/// output writer). The level-info sub-stream is tiny by construction (one
/// record per variable) so it is accumulated in memory and flushed to its
/// own sub-stream file on [`NodeWriter::close`], rather than streamed
/// record-by-record like `nodes`.
pub struct NodeWriter {
    nodes: RawWriter<Node>,
    levels_path: std::path::PathBuf,
    levels: Vec<LevelInfo>,
    number_of_terminals: [usize; 2],
    current_level_width: usize,
}

impl NodeWriter {
    pub fn create(nodes_path: impl AsRef<Path>, levels_path: impl AsRef<Path>) -> Result<NodeWriter> {
        Ok(NodeWriter {
            nodes: RawWriter::create(nodes_path)?,
            levels_path: levels_path.as_ref().to_path_buf(),
            levels: Vec::new(),
            number_of_terminals: [0, 0],
            current_level_width: 0,
        })
    }

    /// Push one node. Nodes for a level must be pushed in canonical order
    /// (descending `(high, low)`, §3) before [`NodeWriter::push_level`]
    /// seals that level's width.
    pub fn push(&mut self, node: Node) -> Result<()> {
        crate::statistics::record_node_push();
        if node.is_terminal() {
            let idx = if node.uid().value() { 1 } else { 0 };
            self.number_of_terminals[idx] += 1;
        } else {
            self.current_level_width += 1;
        }
        self.nodes.push(node)
    }

    /// Seal the level just written, recording its `(label, width)`. Reduce
    /// writes bottom-up, so levels are pushed in descending-label order;
    /// [`Metadata::levels`] simply preserves whatever order they were
    /// pushed in and downstream readers (e.g.
    /// [`crate::file::random_access::NodeRandomAccess`]) consume the file
    /// with a reverse stream to recover top-down order.
    pub fn push_level(&mut self, label: Label) -> Result<()> {
        self.levels.push(LevelInfo { label, width: self.current_level_width });
        self.current_level_width = 0;
        Ok(())
    }

    pub fn close(self) -> Result<NodeWriterOutput> {
        let count = self.nodes.close()?;
        write_all(&self.levels_path, &self.levels)?;
        Ok(NodeWriterOutput { node_count: count, levels: self.levels, number_of_terminals: self.number_of_terminals })
    }
}

pub struct NodeWriterOutput {
    pub node_count: usize,
    pub levels: Vec<LevelInfo>,
    pub number_of_terminals: [usize; 2],
}

/// Builds an unreduced arc file (§3, §4.1). Internal arcs are appended to
/// the `internal` sub-stream in write order and the file is always marked
/// `semi_transposed` (this writer makes no attempt to guarantee
/// source-ascending order up front: [`crate::file::node_arc_stream`] sorts
/// on demand when it needs to, per the self-healing `attach` contract).
/// Terminal arcs are routed to the in-order or out-of-order sub-stream by
/// comparing against the last terminal arc's source (§4.1, §4.3 step 1).
pub struct ArcWriter {
    internal: RawWriter<Arc>,
    terminals_in_order: RawWriter<Arc>,
    terminals_out_of_order: RawWriter<Arc>,
    levels_path: std::path::PathBuf,
    levels: Vec<LevelInfo>,
    cut: CutEstimator,
    last_terminal_source: Option<Uid>,
    number_of_terminals: [usize; 2],
    current_level_width: usize,
}

impl ArcWriter {
    pub fn create(
        internal_path: impl AsRef<Path>,
        terminals_in_order_path: impl AsRef<Path>,
        terminals_out_of_order_path: impl AsRef<Path>,
        levels_path: impl AsRef<Path>,
    ) -> Result<ArcWriter> {
        Ok(ArcWriter {
            internal: RawWriter::create(internal_path)?,
            terminals_in_order: RawWriter::create(terminals_in_order_path)?,
            terminals_out_of_order: RawWriter::create(terminals_out_of_order_path)?,
            levels_path: levels_path.as_ref().to_path_buf(),
            levels: Vec::new(),
            cut: CutEstimator::new(),
            last_terminal_source: None,
            number_of_terminals: [0, 0],
            current_level_width: 0,
        })
    }

    /// Push one arc (§4.1 `push(element)`).
    pub fn push(&mut self, arc: Arc) -> Result<()> {
        self.cut.record_arc(arc.target());
        if arc.is_terminal_arc() {
            let idx = if arc.target().value() { 1 } else { 0 };
            self.number_of_terminals[idx] += 1;

            // In-order iff sources arrive in the descending order Reduce's
            // reverse-BFS wants (§4.3 step 1).
            let in_order = match self.last_terminal_source {
                None => true,
                Some(prev) => arc.source().as_ptr() <= prev.as_ptr(),
            };
            self.last_terminal_source = Some(arc.source());
            if in_order {
                crate::statistics::record_arc_push_in_order();
                self.terminals_in_order.push(arc)
            } else {
                crate::statistics::record_arc_push_out_of_order();
                self.terminals_out_of_order.push(arc)
            }
        } else {
            crate::statistics::record_arc_push_internal();
            self.current_level_width += 1;
            self.internal.push(arc)
        }
    }

    /// Seal the level just written (its width is counted in terms of
    /// distinct *nodes*, i.e. arc pairs, not raw arcs).
    pub fn push_level(&mut self, label: Label) -> Result<()> {
        self.cut.level_boundary();
        self.levels.push(LevelInfo { label, width: self.current_level_width / 2 });
        self.current_level_width = 0;
        Ok(())
    }

    pub fn close(self) -> Result<ArcWriterOutput> {
        let (max_1level_cut, max_2level_cut) = self.cut.finish();
        let internal_count = self.internal.close()?;
        let in_order_count = self.terminals_in_order.close()?;
        let out_of_order_count = self.terminals_out_of_order.close()?;
        write_all(&self.levels_path, &self.levels)?;
        Ok(ArcWriterOutput {
            internal_count,
            in_order_count,
            out_of_order_count,
            levels: self.levels,
            number_of_terminals: self.number_of_terminals,
            max_1level_cut,
            max_2level_cut,
        })
    }
}

pub struct ArcWriterOutput {
    pub internal_count: usize,
    pub in_order_count: usize,
    pub out_of_order_count: usize,
    pub levels: Vec<LevelInfo>,
    pub number_of_terminals: [usize; 2],
    pub max_1level_cut: CutSizes,
    pub max_2level_cut: CutSizes,
}

/// Construct an empty, terminal-only [`Metadata`] for either file kind.
pub fn terminal_only_metadata(kind: FileKind, canonical: bool) -> Metadata {
    let mut m = Metadata::new(kind);
    m.canonical = canonical;
    m
}
