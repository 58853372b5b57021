//! Errors the ledger can raise. Never swallowed silently: a failed `emit`
//! must fail the caller's request rather than proceed unaudited.

use thiserror::Error;

/// Ledger failure kind.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The actor partition has no record matching the requested id.
    #[error("event not found: {0}")]
    NotFound(String),

    /// Underlying storage failed (in the reference adapter, this never
    /// happens; a durable backend would surface I/O failures here).
    #[error("storage error: {0}")]
    Storage(String),
}
