//! Crate-wide error taxonomy shared by every component.
//!
//! Mirrors the conceptual kinds in `spec.md` §7. Components that must never
//! raise (the retriever, the policy adapter) do not use this type on their
//! hot path; it exists for the store and for callers that legitimately need
//! to propagate a typed failure.

use thiserror::Error;

/// Crate-wide error kind.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller supplied malformed input (schema validation failure).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A transient failure the caller may retry.
    #[error("retriable: {0}")]
    Retriable(String),

    /// An unexpected internal failure; never leaks internal state to callers.
    #[error("internal error")]
    Internal,
}
