//! Fixed-size on-disk record encoding (§6: "packed sequence of fixed-size
//! records").

use crate::data::{Arc, LevelInfo, Node};
use crate::ptr::Ptr;

/// A value with a fixed-size, stable binary encoding, usable as an element
/// of a levelized file's sub-streams or of the external sorter.
pub trait Record: Copy + Send + 'static {
    /// Size in bytes of the encoded record (§6 names 8/16/24 for the four
    /// kinds this crate has: pointers, arcs, level-info, nodes).
    const SIZE: usize;

    fn encode(&self, out: &mut [u8]);
    fn decode(bytes: &[u8]) -> Self;
}

impl Record for Ptr {
    const SIZE: usize = 8;
    fn encode(&self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_bytes());
    }
    fn decode(bytes: &[u8]) -> Self {
        let mut b = [0u8; 8];
        b.copy_from_slice(bytes);
        Ptr::from_bytes(b)
    }
}

impl Record for Arc {
    const SIZE: usize = 16;
    fn encode(&self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_bytes());
    }
    fn decode(bytes: &[u8]) -> Self {
        let mut b = [0u8; 16];
        b.copy_from_slice(bytes);
        Arc::from_bytes(b)
    }
}

impl Record for Node {
    const SIZE: usize = 24;
    fn encode(&self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_bytes());
    }
    fn decode(bytes: &[u8]) -> Self {
        let mut b = [0u8; 24];
        b.copy_from_slice(bytes);
        Node::from_bytes(b)
    }
}

impl Record for LevelInfo {
    const SIZE: usize = 16;
    fn encode(&self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_bytes());
    }
    fn decode(bytes: &[u8]) -> Self {
        let mut b = [0u8; 16];
        b.copy_from_slice(bytes);
        LevelInfo::from_bytes(b)
    }
}
