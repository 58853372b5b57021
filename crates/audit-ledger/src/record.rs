//! The record shape and its canonical hash.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Minimum event catalog (`spec.md` §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// Emitted on request entry, before retrieval.
    QueryIssued,
    /// Emitted once per fragment evaluated by the policy adapter.
    PdpDecision,
    /// Emitted when any fragment in a query triggers step-up.
    StepUpRequired,
    /// Emitted on a successful second-factor assertion.
    StepUpOk,
    /// Emitted per fragment where redaction changed the text.
    RedactionApplied,
    /// Emitted on response emit, with result counts in `metadata`.
    ResultReturned,
    /// Emitted when an export is attempted.
    ExportAttempted,
    /// Emitted when an export is authorized.
    ExportGranted,
    /// Emitted when an export is refused.
    ExportDenied,
}

impl AuditAction {
    /// Wire string, also used as the hash input.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::QueryIssued => "QUERY_ISSUED",
            AuditAction::PdpDecision => "PDP_DECISION",
            AuditAction::StepUpRequired => "STEP_UP_REQUIRED",
            AuditAction::StepUpOk => "STEP_UP_OK",
            AuditAction::RedactionApplied => "REDACTION_APPLIED",
            AuditAction::ResultReturned => "RESULT_RETURNED",
            AuditAction::ExportAttempted => "EXPORT_ATTEMPTED",
            AuditAction::ExportGranted => "EXPORT_GRANTED",
            AuditAction::ExportDenied => "EXPORT_DENIED",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable ledger entry. Fields other than `hash` are the hash input,
/// in the order `compute_hash` concatenates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Collision-resistant identifier, unique across the whole ledger.
    pub event_id: String,
    /// Server monotonic milliseconds at emit time.
    pub ts: u64,
    /// Subject id whose partition this record belongs to.
    pub actor: String,
    /// What happened.
    pub action: AuditAction,
    /// Object the action concerns, if any.
    pub object_id: Option<String>,
    /// Kind of object (`"query"`, `"fragment"`, `"session"`).
    pub object_type: String,
    /// Decision kind string (`"allow"`, `"deny"`, `"step_up"`), if this event
    /// carries one.
    pub decision: Option<String>,
    /// Human-readable reason, if any.
    pub reason: Option<String>,
    /// Arbitrary structured context. Canonicalized (sorted keys, no
    /// insignificant whitespace) before hashing.
    pub metadata: serde_json::Value,
    /// Hash of the previous record in this actor's chain, or `None` for the
    /// first record.
    pub prev_hash: Option<String>,
    /// `SHA256(canonical_concat(...))` over every field above.
    pub hash: String,
}

/// Compute the canonical hash for a record's fields, excluding `hash` itself.
///
/// `serde_json::Value`'s default map representation is a `BTreeMap`, so
/// `to_string` already yields sorted keys with no insignificant whitespace —
/// exactly the canonicalization the hash formula requires.
#[must_use]
pub fn compute_hash(
    event_id: &str,
    ts: u64,
    actor: &str,
    action: AuditAction,
    object_id: Option<&str>,
    object_type: &str,
    decision: Option<&str>,
    reason: Option<&str>,
    prev_hash: Option<&str>,
    metadata: &serde_json::Value,
) -> String {
    let canonical_metadata = serde_json::to_string(metadata).unwrap_or_default();
    let input = format!(
        "{}|{}|{}|{}|{}|{}|{}|{}|{}|{}",
        event_id,
        ts,
        actor,
        action.as_str(),
        object_id.unwrap_or(""),
        object_type,
        decision.unwrap_or(""),
        reason.unwrap_or(""),
        prev_hash.unwrap_or(""),
        canonical_metadata,
    );
    let digest = Sha256::digest(input.as_bytes());
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_fields_hash_identically() {
        let meta = serde_json::json!({"b": 1, "a": 2});
        let h1 = compute_hash("e1", 10, "alice", AuditAction::QueryIssued, None, "query", None, None, None, &meta);
        let h2 = compute_hash("e1", 10, "alice", AuditAction::QueryIssued, None, "query", None, None, None, &meta);
        assert_eq!(h1, h2);
    }

    #[test]
    fn different_event_id_changes_hash() {
        let meta = serde_json::json!({});
        let h1 = compute_hash("e1", 10, "alice", AuditAction::QueryIssued, None, "query", None, None, None, &meta);
        let h2 = compute_hash("e2", 10, "alice", AuditAction::QueryIssued, None, "query", None, None, None, &meta);
        assert_ne!(h1, h2);
    }

    #[test]
    fn metadata_key_order_does_not_affect_hash() {
        let m1 = serde_json::json!({"z": 1, "a": 2});
        let m2 = serde_json::json!({"a": 2, "z": 1});
        let h1 = compute_hash("e1", 10, "alice", AuditAction::QueryIssued, None, "query", None, None, None, &m1);
        let h2 = compute_hash("e1", 10, "alice", AuditAction::QueryIssued, None, "query", None, None, None, &m2);
        assert_eq!(h1, h2);
    }
}
