//! Callback shapes (§6 "Callback shapes", §9 "Iterator-pair / generator /
//! predicate overloads" redesign flag, grounded on `functional.h`).
//!
//! The original overloads `make_generator`/`make_consumer` across iterator
//! pairs, streams, and single values. Rather than replicate that overload
//! set, this crate settles on one canonical shape — a generator returning
//! `Option<Label>`, `None` marking the end — and provides thin adapter
//! constructors from the common sources callers actually have on hand.

use crate::error::{Error, Result};
use crate::ptr::Label;

/// A predicate over labels (§6 "Predicate over labels").
pub type Predicate<'a> = Box<dyn Fn(Label) -> bool + 'a>;

/// A cost function over labels (§6 "Cost function").
pub type Cost<'a> = Box<dyn Fn(Label) -> f64 + 'a>;

/// The canonical generator shape: produces labels until exhausted, then
/// yields `None` forever (§6 "Generator of labels", §9 redesign).
///
/// Callers specify (per entry point, not here) whether the expected order
/// is ascending or descending; this type carries no ordering guarantee of
/// its own beyond whatever its constructor promises.
pub struct LabelGenerator {
    next: Box<dyn FnMut() -> Option<Label>>,
}

impl LabelGenerator {
    pub fn new(f: impl FnMut() -> Option<Label> + 'static) -> LabelGenerator {
        LabelGenerator { next: Box::new(f) }
    }

    pub fn pull(&mut self) -> Option<Label> {
        (self.next)()
    }

    /// Adapt an ascending `Vec<Label>` into a generator (§9's "thin adapter
    /// from iterator pairs").
    pub fn from_ascending(labels: Vec<Label>) -> LabelGenerator {
        let mut it = labels.into_iter();
        LabelGenerator::new(move || it.next())
    }

    /// Adapt a single label into a one-shot generator.
    pub fn once(label: Label) -> LabelGenerator {
        let mut done = false;
        LabelGenerator::new(move || {
            if done {
                None
            } else {
                done = true;
                Some(label)
            }
        })
    }

    /// Collect every remaining label. Mostly for tests; production sweeps
    /// pull one at a time to stay within the external-memory budget.
    pub fn collect(mut self) -> Vec<Label> {
        let mut out = Vec::new();
        while let Some(l) = self.pull() {
            out.push(l);
        }
        out
    }
}

/// A consumer of labels, backed by a caller-supplied output buffer that
/// raises [`Error::OutOfRange`] once exhausted (§6 "Consumer of labels",
/// `functional.h`'s `make_consumer`).
pub struct LabelConsumer<'a> {
    out: &'a mut Vec<Label>,
    capacity: usize,
}

impl<'a> LabelConsumer<'a> {
    /// `out` is appended to, and must not grow past `capacity` total
    /// pushes through this consumer.
    pub fn bounded(out: &'a mut Vec<Label>, capacity: usize) -> LabelConsumer<'a> {
        LabelConsumer { out, capacity }
    }

    pub fn push(&mut self, label: Label) -> Result<()> {
        if self.out.len() >= self.capacity {
            return Err(Error::out_of_range(
                "label consumer buffer exhausted before all values were produced",
            ));
        }
        self.out.push(label);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascending_generator_yields_then_ends() {
        let mut g = LabelGenerator::from_ascending(vec![1, 2, 3]);
        assert_eq!(g.pull(), Some(1));
        assert_eq!(g.pull(), Some(2));
        assert_eq!(g.pull(), Some(3));
        assert_eq!(g.pull(), None);
        assert_eq!(g.pull(), None);
    }

    #[test]
    fn once_generator_yields_exactly_one_value() {
        let mut g = LabelGenerator::once(7);
        assert_eq!(g.pull(), Some(7));
        assert_eq!(g.pull(), None);
    }

    #[test]
    fn bounded_consumer_errors_once_capacity_is_reached() {
        let mut buf = Vec::new();
        let mut c = LabelConsumer::bounded(&mut buf, 2);
        c.push(1).unwrap();
        c.push(2).unwrap();
        assert!(c.push(3).is_err());
        assert_eq!(buf, vec![1, 2]);
    }
}
