//! Variable domain (§6 utility surface, redesigned per §9's "Global domain
//! singleton" flag).
//!
//! The original exposes a single process-wide domain, set once and read by
//! any operation that needs "the whole variable universe" (complement,
//! quantify-all, etc.). Replacing a mutable global with an implicit
//! ambient value would just relocate the same problem, so this crate
//! makes it an explicit, immutable [`Context`] value threaded through the
//! calls that need it — and, for API parity with callers used to the
//! global form, a thread-local default manipulated by [`domain_set`] /
//! [`domain_get`] / [`domain_unset`] / [`domain_isset`] / [`domain_size`].

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::ptr::{Label, MAX_LABEL};

/// An immutable, ascending set of variable labels describing "the whole
/// universe" a ZDD complement or a quantify-all is relative to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Context {
    vars: Rc<Vec<Label>>,
}

impl Context {
    /// The domain `[0, varcount)`.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] if `varcount` exceeds [`MAX_LABEL`] + 1.
    pub fn range(varcount: Label) -> Result<Context> {
        if varcount > MAX_LABEL + 1 {
            return Err(Error::invalid_argument(format!(
                "domain variable count {varcount} exceeds max_label + 1"
            )));
        }
        Ok(Context { vars: Rc::new((0..varcount).collect()) })
    }

    /// A domain from an explicit ascending list of labels.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] if `labels` is not strictly ascending.
    pub fn from_ascending(labels: Vec<Label>) -> Result<Context> {
        if !labels.windows(2).all(|w| w[0] < w[1]) {
            return Err(Error::invalid_argument(
                "domain labels must be supplied in strictly ascending order",
            ));
        }
        Ok(Context { vars: Rc::new(labels) })
    }

    pub fn size(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn contains(&self, label: Label) -> bool {
        self.vars.binary_search(&label).is_ok()
    }

    pub fn labels(&self) -> &[Label] {
        &self.vars
    }

    /// Ascending-order generator over this domain's labels (§9 "generator
    /// returning optional labels").
    pub fn generator(&self) -> crate::callback::LabelGenerator {
        crate::callback::LabelGenerator::from_ascending(self.vars.as_ref().clone())
    }
}

thread_local! {
    static DEFAULT_CONTEXT: RefCell<Option<Context>> = const { RefCell::new(None) };
}

/// Set the default domain to `[0, varcount)` (§6 `domain_set`).
pub fn domain_set(varcount: Label) -> Result<()> {
    let ctx = Context::range(varcount)?;
    DEFAULT_CONTEXT.with(|c| *c.borrow_mut() = Some(ctx));
    Ok(())
}

/// Set the default domain to an explicit ascending label list.
pub fn domain_set_labels(labels: Vec<Label>) -> Result<()> {
    let ctx = Context::from_ascending(labels)?;
    DEFAULT_CONTEXT.with(|c| *c.borrow_mut() = Some(ctx));
    Ok(())
}

/// Clear the default domain (§6 `domain_unset`).
pub fn domain_unset() {
    DEFAULT_CONTEXT.with(|c| *c.borrow_mut() = None);
}

/// Whether a default domain is currently set (§6 `domain_isset`).
pub fn domain_isset() -> bool {
    DEFAULT_CONTEXT.with(|c| c.borrow().is_some())
}

/// Fetch the default domain.
///
/// # Errors
/// [`Error::DomainError`] if none is set.
pub fn domain_get() -> Result<Context> {
    DEFAULT_CONTEXT.with(|c| c.borrow().clone()).ok_or(Error::DomainError)
}

/// The default domain's size, or `0` if unset (§6 `domain_size`).
pub fn domain_size() -> usize {
    DEFAULT_CONTEXT.with(|c| c.borrow().as_ref().map_or(0, Context::size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_domain_contains_exactly_its_interval() {
        let ctx = Context::range(4).unwrap();
        assert_eq!(ctx.size(), 4);
        assert!(ctx.contains(0));
        assert!(ctx.contains(3));
        assert!(!ctx.contains(4));
    }

    #[test]
    fn non_ascending_labels_are_rejected() {
        assert!(Context::from_ascending(vec![1, 0, 2]).is_err());
        assert!(Context::from_ascending(vec![0, 1, 1]).is_err());
    }

    #[test]
    fn default_domain_round_trips_through_thread_local() {
        domain_unset();
        assert!(!domain_isset());
        assert_eq!(domain_size(), 0);
        assert!(domain_get().is_err());

        domain_set(3).unwrap();
        assert!(domain_isset());
        assert_eq!(domain_size(), 3);
        assert!(domain_get().unwrap().contains(2));

        domain_unset();
        assert!(!domain_isset());
    }
}
