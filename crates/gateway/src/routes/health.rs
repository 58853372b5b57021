//! `GET /health` (`spec.md` §6, `SPEC_FULL.md` §C.1: liveness is real, not a
//! hardcoded string).

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use audit_ledger::Ledger;
use gov_core::CoreError;

use crate::state::AppState;

const HEALTH_CHECK_SUBJECT: &str = "__health_check__";

/// `GET /health` response body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `"healthy"` or `"unhealthy"`.
    pub status: &'static str,
}

/// Probe the store and ledger for reachability. `InMemoryStore`/
/// `InMemoryLedger` are always reachable, but the seam is real: a durable
/// backend reports `unhealthy` through the same path instead of a hardcoded
/// `"healthy"`.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_ok = match state.store.load_subject(HEALTH_CHECK_SUBJECT).await {
        Ok(_) | Err(CoreError::NotFound(_)) => true,
        Err(CoreError::InvalidInput(_) | CoreError::Retriable(_) | CoreError::Internal) => false,
    };
    let ledger_ok = state.ledger.history(HEALTH_CHECK_SUBJECT).await.is_ok();

    let status = if store_ok && ledger_ok { "healthy" } else { "unhealthy" };
    Json(HealthResponse { status })
}
