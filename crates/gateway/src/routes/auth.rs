//! `POST /auth/token` and `POST /auth/step-up` (`spec.md` §6).

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use audit_ledger::{AuditAction, EmitRequest, Ledger};
use gov_core::ids::now_ms;

use crate::error::GatewayError;
use crate::extract::AuthSubject;
use crate::state::AppState;
use crate::token::{self, ClaimAttrs, Claims};

const TOKEN_TTL_S: u64 = 3_600;

/// `POST /auth/token` request body.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    /// Subject to issue a token for.
    pub user_id: String,
}

/// `POST /auth/token` response body.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// The signed opaque token.
    pub token: String,
    /// Seconds until expiry.
    pub expires_in: u64,
}

/// Issue a bearer token for a known subject. 404 if `user_id` names no
/// subject on file.
pub async fn issue_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, GatewayError> {
    if req.user_id.trim().is_empty() {
        return Err(GatewayError::InvalidInput("user_id must not be empty".to_string()));
    }

    let subject = state.store.load_subject(&req.user_id).await?;

    let claims = Claims {
        sub: subject.id,
        groups: subject.groups,
        attrs: ClaimAttrs {
            clearance: subject.attrs.clearance,
            allow_export: subject.attrs.allow_export,
        },
        tenant: subject.tenant,
        exp: now_ms() / 1000 + TOKEN_TTL_S,
    };
    let signed = token::issue(&claims, &state.config.token_signing_key);

    Ok(Json(TokenResponse { token: signed, expires_in: TOKEN_TTL_S }))
}

/// `POST /auth/step-up` request body.
#[derive(Debug, Deserialize)]
pub struct StepUpRequest {
    /// Subject asserting the second factor.
    pub user_id: String,
    /// Opaque second-factor assertion (verified upstream by the identity
    /// provider; this core only records that one was presented).
    pub second_factor: String,
}

/// `POST /auth/step-up` response body.
#[derive(Debug, Serialize)]
pub struct StepUpResponse {
    /// Always `true` on success; failures are surfaced as an error status.
    pub ok: bool,
    /// Seconds until the assertion expires.
    pub expires_in: u64,
}

/// Record a second-factor assertion for the authenticated subject, extending
/// its step-up window (`spec.md` §4.6's `Assert`).
pub async fn step_up(
    State(state): State<AppState>,
    AuthSubject(subject): AuthSubject,
    Json(req): Json<StepUpRequest>,
) -> Result<Json<StepUpResponse>, GatewayError> {
    if req.second_factor.trim().is_empty() {
        return Err(GatewayError::InvalidInput("second_factor must not be empty".to_string()));
    }
    // The contract only lists 200/400/401 for this endpoint, so a mismatched
    // user_id (asserting step-up on someone else's behalf) surfaces as 401
    // rather than introducing a 403 the contract doesn't name here.
    if subject.id != req.user_id {
        return Err(GatewayError::Unauthenticated);
    }

    state.sessions.assert(&subject.id, state.config.step_up_ttl_s);

    state
        .ledger
        .emit(EmitRequest {
            actor: &subject.id,
            action: AuditAction::StepUpOk,
            object_id: None,
            object_type: "session",
            decision: None,
            reason: None,
            metadata: serde_json::json!({}),
        })
        .await
        .map_err(|_| GatewayError::Internal)?;

    Ok(Json(StepUpResponse { ok: true, expires_in: state.config.step_up_ttl_s }))
}
