//! Forward/reverse streams over a levelized file (§4.1).
//!
//! A stream is a read-only cursor that can walk a sub-stream from either
//! end. Algorithms attach a fresh stream per pass rather than sharing one,
//! since a stream has no concept of "rewind" — once exhausted in a
//! direction it stays exhausted.

use crate::data::{Arc, Node};
use crate::error::Result;
use crate::file::raw::RawReader;
use crate::file::{ArcFile, NodeFile};

/// Direction a [`Stream`] reads in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// A single-direction cursor over one file's worth of fixed-size records
/// (§4.1 "Stream: sequential forward or backward iteration").
pub struct Stream<T: crate::file::record::Record> {
    reader: RawReader<T>,
    direction: Direction,
}

impl<T: crate::file::record::Record> Stream<T> {
    fn new(reader: RawReader<T>, direction: Direction) -> Stream<T> {
        Stream { reader, direction }
    }

    pub fn can_pull(&self) -> bool {
        match self.direction {
            Direction::Forward => self.reader.can_pull_fwd(),
            Direction::Reverse => self.reader.can_pull_rev(),
        }
    }

    pub fn pull(&mut self) -> Result<T> {
        match self.direction {
            Direction::Forward => self.reader.pull_fwd(),
            Direction::Reverse => self.reader.pull_rev(),
        }
    }

    pub fn peek(&mut self) -> Result<T> {
        match self.direction {
            Direction::Forward => self.reader.peek_fwd(),
            Direction::Reverse => self.reader.peek_rev(),
        }
    }

    pub fn len(&self) -> usize {
        self.reader.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reader.is_empty()
    }
}

/// Attach a forward node stream over `file` (§4.1 `node_stream<forward>`).
pub fn nodes_forward(file: &NodeFile) -> Result<Stream<Node>> {
    Ok(Stream::new(file.nodes_reader()?, Direction::Forward))
}

/// Attach a reverse node stream over `file` (§4.1 `node_stream<backward>`,
/// used by Reduce's bottom-up consumer and by counting sweeps).
pub fn nodes_reverse(file: &NodeFile) -> Result<Stream<Node>> {
    Ok(Stream::new(file.nodes_reader()?, Direction::Reverse))
}

/// Attach a forward stream over an arc file's internal sub-stream.
pub fn internal_arcs_forward(file: &ArcFile) -> Result<Stream<Arc>> {
    Ok(Stream::new(file.internal_reader()?, Direction::Forward))
}

/// Attach a forward stream over an arc file's in-order terminal sub-stream.
pub fn terminals_in_order_forward(file: &ArcFile) -> Result<Stream<Arc>> {
    Ok(Stream::new(file.terminals_in_order_reader()?, Direction::Forward))
}

/// Attach a forward stream over an arc file's out-of-order terminal
/// sub-stream.
pub fn terminals_out_of_order_forward(file: &ArcFile) -> Result<Stream<Arc>> {
    Ok(Stream::new(file.terminals_out_of_order_reader()?, Direction::Forward))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::{new_node_writer, NodeFile};

    fn build_two_node_file() -> NodeFile {
        let (dir, mut w) = new_node_writer().unwrap();
        w.push(Node::terminal(false)).unwrap();
        w.push(Node::terminal(true)).unwrap();
        w.push_level(0).unwrap();
        let output = w.close().unwrap();
        NodeFile::from_writer_output(dir, output).unwrap()
    }

    #[test]
    fn forward_and_reverse_agree_on_length() {
        let file = build_two_node_file();
        let fwd = nodes_forward(&file).unwrap();
        let rev = nodes_reverse(&file).unwrap();
        assert_eq!(fwd.len(), 2);
        assert_eq!(rev.len(), 2);
    }

    #[test]
    fn reverse_stream_pulls_last_record_first() {
        let file = build_two_node_file();
        let mut rev = nodes_reverse(&file).unwrap();
        let first = rev.pull().unwrap();
        assert!(first.is_terminal());
        assert!(first.uid().value());
    }

    #[test]
    fn forward_stream_exhausts_after_len_pulls() {
        let file = build_two_node_file();
        let mut fwd = nodes_forward(&file).unwrap();
        assert!(fwd.can_pull());
        fwd.pull().unwrap();
        assert!(fwd.can_pull());
        fwd.pull().unwrap();
        assert!(!fwd.can_pull());
    }
}
