//! The levelized file model: on-disk storage, streams, writers, sorter
//! (§4.1).
//!
//! A levelized file is a directory of four fixed-named sub-streams
//! (`internal`, `terminals_in_order`, `terminals_out_of_order`, `levels`)
//! plus the [`metadata::Metadata`] header (§6). [`NodeFile`] and [`ArcFile`]
//! are the two owner handles (§3 "Decision diagram handle", §9 "ownership of
//! on-disk files"): reference-counted, and the backing temporary directory
//! is unlinked when the last handle is dropped.

pub mod metadata;
pub mod node_arc_stream;
pub mod random_access;
pub mod raw;
pub mod record;
pub mod sorter;
pub mod stream;
pub mod writer;

use std::path::PathBuf;
use std::rc::Rc;

use tempfile::TempDir;

use crate::data::{Arc, Node};
use crate::error::Result;
use crate::file::metadata::{FileKind, Metadata};
use crate::file::raw::RawReader;
use crate::file::writer::{ArcWriter, ArcWriterOutput, NodeWriter, NodeWriterOutput};

const INTERNAL_NAME: &str = "internal";
const TERMINALS_IN_ORDER_NAME: &str = "terminals_in_order";
const TERMINALS_OUT_OF_ORDER_NAME: &str = "terminals_out_of_order";
const LEVELS_NAME: &str = "levels";

/// The on-disk directory and sealed record counts backing one levelized
/// file. Shared (via [`Rc`]) between the owning handle and any views
/// (streams, random-access buffers) borrowed from it, and unlinked from
/// disk when the last reference is dropped (§3, §9).
struct FileInner {
    _dir: TempDir,
    dir_path: PathBuf,
    internal_count: usize,
    terminals_in_order_count: usize,
    terminals_out_of_order_count: usize,
    meta: Metadata,
}

impl FileInner {
    fn path(&self, name: &str) -> PathBuf {
        self.dir_path.join(name)
    }
}

/// A reduced, canonical node file (§3 `dd`'s backing store).
#[derive(Clone)]
pub struct NodeFile {
    inner: Rc<FileInner>,
}

impl NodeFile {
    /// Build a node file's backing directory from the raw output of a
    /// [`NodeWriter`].
    pub fn from_writer_output(dir: TempDir, output: NodeWriterOutput) -> Result<NodeFile> {
        let mut meta = Metadata::new(FileKind::Node);
        meta.canonical = true;
        meta.number_of_terminals = output.number_of_terminals;
        meta.width = output.levels.iter().map(|l| l.width).max().unwrap_or(0);
        meta.levels = output.levels;
        let dir_path = dir.path().to_path_buf();
        Ok(NodeFile {
            inner: Rc::new(FileInner {
                _dir: dir,
                dir_path,
                internal_count: output.node_count,
                terminals_in_order_count: 0,
                terminals_out_of_order_count: 0,
                meta,
            }),
        })
    }

    /// The single-node file representing a constant `value` diagram (§3).
    pub fn constant(value: bool) -> Result<NodeFile> {
        let dir = TempDir::new().map_err(|e| crate::error::Error::io("<tempdir>", e))?;
        let nodes_path = dir.path().join(INTERNAL_NAME);
        let mut w = NodeWriter::create(&nodes_path, dir.path().join(LEVELS_NAME))?;
        w.push(Node::terminal(value))?;
        let output = w.close()?;
        NodeFile::from_writer_output(dir, output)
    }

    pub fn metadata(&self) -> &Metadata {
        &self.inner.meta
    }

    pub fn is_terminal(&self) -> bool {
        self.inner.meta.is_terminal_only()
    }

    pub fn node_count(&self) -> usize {
        self.inner.internal_count
    }

    fn nodes_path(&self) -> PathBuf {
        self.inner.path(INTERNAL_NAME)
    }

    /// Open a forward or reverse stream over this file's nodes (§4.1).
    pub fn nodes_reader(&self) -> Result<RawReader<Node>> {
        RawReader::open(self.nodes_path(), self.inner.internal_count)
    }
}

/// An unreduced arc file (§3). Produced by top-down sweeps; consumed by
/// Reduce.
#[derive(Clone)]
pub struct ArcFile {
    inner: Rc<FileInner>,
}

impl ArcFile {
    pub fn from_writer_output(dir: TempDir, output: ArcWriterOutput) -> ArcFile {
        let mut meta = Metadata::new(FileKind::Arc);
        meta.semi_transposed = true;
        meta.number_of_terminals = output.number_of_terminals;
        meta.max_1level_cut = output.max_1level_cut;
        meta.max_2level_cut = output.max_2level_cut;
        meta.width = output.levels.iter().map(|l| l.width).max().unwrap_or(0);
        meta.levels = output.levels;
        let dir_path = dir.path().to_path_buf();
        ArcFile {
            inner: Rc::new(FileInner {
                _dir: dir,
                dir_path,
                internal_count: output.internal_count,
                terminals_in_order_count: output.in_order_count,
                terminals_out_of_order_count: output.out_of_order_count,
                meta,
            }),
        }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.inner.meta
    }

    pub fn is_terminal(&self) -> bool {
        self.inner.meta.is_terminal_only()
    }

    pub fn semi_transposed(&self) -> bool {
        self.inner.meta.semi_transposed
    }

    fn internal_path(&self) -> PathBuf {
        self.inner.path(INTERNAL_NAME)
    }
    fn terminals_in_order_path(&self) -> PathBuf {
        self.inner.path(TERMINALS_IN_ORDER_NAME)
    }
    fn terminals_out_of_order_path(&self) -> PathBuf {
        self.inner.path(TERMINALS_OUT_OF_ORDER_NAME)
    }

    pub fn internal_count(&self) -> usize {
        self.inner.internal_count
    }
    pub fn terminals_in_order_count(&self) -> usize {
        self.inner.terminals_in_order_count
    }
    pub fn terminals_out_of_order_count(&self) -> usize {
        self.inner.terminals_out_of_order_count
    }

    pub fn internal_reader(&self) -> Result<RawReader<Arc>> {
        RawReader::open(self.internal_path(), self.internal_count())
    }
    pub fn terminals_in_order_reader(&self) -> Result<RawReader<Arc>> {
        RawReader::open(self.terminals_in_order_path(), self.terminals_in_order_count())
    }
    pub fn terminals_out_of_order_reader(&self) -> Result<RawReader<Arc>> {
        RawReader::open(self.terminals_out_of_order_path(), self.terminals_out_of_order_count())
    }

    /// Read every internal arc, sorted by `target` descending then `source`
    /// descending — the order Reduce's bottom-up sweep consumes them in
    /// (§4.3 step 2a groups "all arcs whose source is on level `L`", which
    /// in a bottom-up sweep means processing by decreasing target level
    /// first).
    pub fn internal_sorted_by_target_desc(&self) -> Result<Vec<Arc>> {
        let mut arcs = self.internal_reader()?.drain_fwd()?;
        arcs.sort_by(|a, b| b.target().cmp(&a.target()).then(b.source().cmp(&a.source())));
        Ok(arcs)
    }
}

fn new_tempdir() -> Result<TempDir> {
    TempDir::new().map_err(|e| crate::error::Error::io("<tempdir>", e))
}

/// Start building a fresh arc file with the four standard sub-stream names.
pub fn new_arc_writer() -> Result<(TempDir, ArcWriter)> {
    let dir = new_tempdir()?;
    let w = ArcWriter::create(
        dir.path().join(INTERNAL_NAME),
        dir.path().join(TERMINALS_IN_ORDER_NAME),
        dir.path().join(TERMINALS_OUT_OF_ORDER_NAME),
        dir.path().join(LEVELS_NAME),
    )?;
    Ok((dir, w))
}

/// Start building a fresh node file.
pub fn new_node_writer() -> Result<(TempDir, NodeWriter)> {
    let dir = new_tempdir()?;
    let w = NodeWriter::create(dir.path().join(INTERNAL_NAME), dir.path().join(LEVELS_NAME))?;
    Ok((dir, w))
}
