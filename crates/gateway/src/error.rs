//! The gateway's closed error taxonomy: one variant per conceptual kind
//! from `spec.md` §7, each mapped to its contractual HTTP status code.
//! `GatewayError` implements axum's `IntoResponse` directly so a handler
//! that returns `Result<_, GatewayError>` needs no further glue.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Request-terminating failure kind.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Missing or invalid bearer token.
    #[error("unauthenticated")]
    Unauthenticated,
    /// All candidates denied, or an action the subject's attributes forbid.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Schema validation failure on the request body.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The policy engine collapsed every candidate to deny
    /// (`"policy-unavailable"`); clients may retry.
    #[error("policy engine unavailable")]
    PolicyUnavailable,
    /// The store failed to answer; clients may retry.
    #[error("store unavailable")]
    StoreUnavailable,
    /// Unexpected failure; never leaks internal state.
    #[error("internal error")]
    Internal,
    /// Not one of `spec.md` §7's seven kinds: `POST /auth/token` and
    /// `GET /audit/{subject_id}` need a literal 404 for an unknown subject
    /// id, which the taxonomy doesn't separately name. Kept distinct from
    /// `InvalidInput` so callers get the contractual status code.
    #[error("not found: {0}")]
    NotFound(String),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            GatewayError::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            GatewayError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            GatewayError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            GatewayError::PolicyUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "policy_unavailable")
            }
            GatewayError::StoreUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable")
            }
            GatewayError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
            GatewayError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "internal error");
        } else {
            tracing::warn!(error = %self, code, "request rejected");
        }
        (status, Json(json!({ "error": code, "message": self.to_string() }))).into_response()
    }
}

impl From<gov_core::CoreError> for GatewayError {
    fn from(e: gov_core::CoreError) -> Self {
        match e {
            gov_core::CoreError::NotFound(msg) => GatewayError::NotFound(msg),
            gov_core::CoreError::InvalidInput(msg) => GatewayError::InvalidInput(msg),
            gov_core::CoreError::Retriable(_) => GatewayError::StoreUnavailable,
            gov_core::CoreError::Internal => GatewayError::Internal,
        }
    }
}
