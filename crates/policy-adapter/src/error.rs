//! Backend transport errors. Never surfaced to callers of [`crate::PolicyAdapter::evaluate`] —
//! every one of these collapses to a deny decision.

use thiserror::Error;

/// Failure talking to a policy backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The evaluation did not complete within the configured timeout.
    #[error("policy evaluation timed out")]
    Timeout,

    /// A network or HTTP-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend's response did not match the expected schema.
    #[error("malformed policy response: {0}")]
    Schema(String),
}

impl BackendError {
    /// Whether one jittered retry is worth attempting, per `spec.md` §4.2
    /// ("on transient errors, one retry with jittered backoff is permitted").
    /// Timeouts and transport failures are transient; a schema mismatch is
    /// not — retrying will not fix a backend that speaks the wrong contract.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, BackendError::Timeout | BackendError::Transport(_))
    }
}
