//! Error types returned by the public API.

use thiserror::Error;

/// Everything that can go wrong calling into a [`crate::PersistentMap`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrbtError {
    /// A lookup or `insert_or_assign`-on-existing-version targeted a key
    /// that is not present in the resolved version.
    #[error("key not found")]
    KeyMissing,

    /// A version handle was presented that no longer resolves to a live
    /// version — either it was never issued by this map, or it named a
    /// version already retired by `remove_version`.
    #[error("version handle does not refer to a live version")]
    OrphanNode,

    /// An internal invariant the caller's inputs must satisfy was violated.
    /// The payload names the invariant in human terms.
    #[error("precondition violated: {0}")]
    PreconditionViolation(&'static str),
}

pub type Result<T> = std::result::Result<T, PrbtError>;
