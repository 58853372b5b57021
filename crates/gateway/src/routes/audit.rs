//! `GET /audit/{subject_id}` (`spec.md` §6, §8 Testable Property 4 and
//! scenario 6: `chain_valid` must come from actually verifying the chain,
//! per `SPEC_FULL.md` §C.2).

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use audit_ledger::Ledger;

use crate::error::GatewayError;
use crate::extract::AuthSubject;
use crate::state::AppState;

const AUDITOR_GROUP: &str = "auditor";

/// `GET /audit/{subject_id}` query parameters.
#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    /// Maximum events to return, newest first.
    pub limit: Option<usize>,
}

/// One audit record as returned on the wire.
#[derive(Debug, Serialize)]
pub struct AuditEventView {
    /// Collision-resistant event id.
    pub event_id: String,
    /// Server monotonic milliseconds at emit time.
    pub ts: u64,
    /// What happened.
    pub action: String,
    /// Object the action concerns, if any.
    pub object_id: Option<String>,
    /// Kind of object.
    pub object_type: String,
    /// Decision kind, if this event carries one.
    pub decision: Option<String>,
    /// Human-readable reason, if any.
    pub reason: Option<String>,
    /// This record's hash.
    pub hash: String,
    /// The previous record's hash in this actor's chain, if any.
    pub prev_hash: Option<String>,
}

/// `GET /audit/{subject_id}` response body.
#[derive(Debug, Serialize)]
pub struct AuditResponse {
    /// Events, newest first.
    pub events: Vec<AuditEventView>,
    /// Result of recomputing and checking the hash chain.
    pub chain_valid: bool,
}

/// Read a subject's audit chain. Authorized for the subject itself, or for
/// any subject in the `auditor` group.
pub async fn read_audit(
    State(state): State<AppState>,
    AuthSubject(subject): AuthSubject,
    Path(subject_id): Path<String>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<AuditResponse>, GatewayError> {
    let is_self = subject.id == subject_id;
    let is_auditor = subject.groups.iter().any(|g| g == AUDITOR_GROUP);
    if !is_self && !is_auditor {
        return Err(GatewayError::Forbidden(
            "not authorized to read this subject's audit chain".to_string(),
        ));
    }

    let mut history = state.ledger.history(&subject_id).await.map_err(|_| GatewayError::Internal)?;
    history.reverse();
    if let Some(limit) = query.limit {
        history.truncate(limit);
    }

    let verify_outcome =
        state.ledger.verify(&subject_id).await.map_err(|_| GatewayError::Internal)?;

    let events = history
        .into_iter()
        .map(|record| AuditEventView {
            event_id: record.event_id,
            ts: record.ts,
            action: record.action.to_string(),
            object_id: record.object_id,
            object_type: record.object_type,
            decision: record.decision,
            reason: record.reason,
            hash: record.hash,
            prev_hash: record.prev_hash,
        })
        .collect();

    Ok(Json(AuditResponse { events, chain_valid: verify_outcome.valid }))
}
