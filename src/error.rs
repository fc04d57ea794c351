//! Crate-wide error taxonomy (§7)
//!
//! Every module owns a `thiserror`-derived enum scoped to its own failure
//! modes (see [`crate::file::FileError`], [`crate::pq::PqError`], ...); this
//! module is the common currency those per-module errors convert into at the
//! algorithm/façade boundary, the way the teacher's `scheduler::VerifySchedError`
//! aggregates `pcs::VerifyError` and `quotient::QuotientError`.

use std::io;
use std::path::PathBuf;

/// The five error kinds named in §7.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Terminal where an internal was required; generator not in the
    /// declared order; label exceeds `max_label`; `Random_Access` with no
    /// narrow input; and similar caller mistakes.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `domain_get` called with no domain set.
    #[error("no variable domain is set")]
    DomainError,

    /// A consumer/iterator ran past its end.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// Underlying file-system failure. Fatal.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Temporary disk or memory budget exceeded. Fatal.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Error {
        Error::InvalidArgument(msg.into())
    }

    pub fn out_of_range(msg: impl Into<String>) -> Error {
        Error::OutOfRange(msg.into())
    }

    pub fn resource_exhausted(msg: impl Into<String>) -> Error {
        Error::ResourceExhausted(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Error {
        Error::Io { path: path.into(), source }
    }
}

/// Convenience alias used throughout the crate's internals.
pub type Result<T> = std::result::Result<T, Error>;
