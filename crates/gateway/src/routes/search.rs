//! `POST /search` (`spec.md` §4.7, §6).

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use audit_ledger::{AuditAction, EmitRequest, Ledger};
use gov_core::{Action, Label};

use crate::error::GatewayError;
use crate::extract::AuthSubject;
use crate::state::AppState;

const POLICY_UNAVAILABLE_REASON: &str = "policy-unavailable";

fn default_top_k() -> usize {
    10
}

fn default_min_evidence() -> u32 {
    2
}

/// `POST /search` request body.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Natural-language query.
    pub query: String,
    /// Results to return, in `1..=50`.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Minimum allowed-fragment count before the result is watermarked as
    /// insufficient evidence.
    #[serde(default = "default_min_evidence")]
    pub min_evidence: u32,
}

/// One fragment in a search response.
#[derive(Debug, Serialize)]
pub struct FragmentView {
    /// Fragment id.
    pub id: String,
    /// Redacted text.
    pub text: String,
    /// Sensitivity label.
    pub label: Label,
    /// Cosine similarity to the query, in `[0, 1]`.
    pub similarity: f64,
}

/// One decision observed during retrieval, allow or not.
#[derive(Debug, Serialize)]
pub struct DecisionView {
    /// Fragment the decision concerns.
    pub fragment_id: String,
    /// `"allow"`, `"deny"`, or `"step_up"`.
    pub decision: String,
    /// Reason, if the engine supplied one.
    pub reason: Option<String>,
}

/// Per-kind decision counts.
#[derive(Debug, Serialize)]
pub struct Counts {
    /// Fragments allowed and returned.
    pub allowed: usize,
    /// Fragments denied.
    pub denied: usize,
    /// Fragments that required step-up.
    pub step_up: usize,
}

/// `POST /search` response body. `step_up_required` is additive to the
/// literal field list in `spec.md` §6, resolving its apparent gap against
/// §7 kind 3 ("surfaced as 200 with a step_up_required: true flag").
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// Synthesized answer (deterministic extract-and-concatenate; `spec.md`
    /// §1 mandates no generative model call here).
    pub response: String,
    /// Authorized, redacted fragments, at most `top_k`.
    pub fragments: Vec<FragmentView>,
    /// Every decision observed, including denies and step-ups.
    pub decisions: Vec<DecisionView>,
    /// Whether redaction changed at least one fragment's text.
    pub redaction_applied: bool,
    /// Whether fewer than `min_evidence` fragments were allowed.
    pub insufficient_evidence: bool,
    /// Whether any candidate required step-up.
    pub step_up_required: bool,
    /// Per-kind decision counts.
    pub counts: Counts,
}

/// Run the governed retrieval pipeline for the authenticated subject.
pub async fn search(
    State(state): State<AppState>,
    AuthSubject(subject): AuthSubject,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, GatewayError> {
    if req.query.trim().is_empty() {
        return Err(GatewayError::InvalidInput("query must not be empty".to_string()));
    }
    if !(1..=50).contains(&req.top_k) {
        return Err(GatewayError::InvalidInput("top_k must be in 1..=50".to_string()));
    }

    state
        .ledger
        .emit(EmitRequest {
            actor: &subject.id,
            action: AuditAction::QueryIssued,
            object_id: None,
            object_type: "query",
            decision: None,
            reason: None,
            metadata: serde_json::json!({ "query": req.query }),
        })
        .await
        .map_err(|_| GatewayError::Internal)?;

    let query_vec = embed(&req.query, state.config.embedding_dim);

    let outcome = state
        .retriever
        .retrieve(&subject, &query_vec, req.top_k, req.min_evidence, Action::Read)
        .await?;

    let mut denied = 0usize;
    let mut step_up = 0usize;
    for decision in &outcome.decisions {
        match decision.decision.kind_str() {
            "deny" => denied += 1,
            "step_up" => step_up += 1,
            _ => {}
        }
        state
            .ledger
            .emit(EmitRequest {
                actor: &subject.id,
                action: AuditAction::PdpDecision,
                object_id: Some(&decision.fragment_id),
                object_type: "fragment",
                decision: Some(decision.decision.kind_str()),
                reason: decision.decision.reason(),
                metadata: serde_json::json!({}),
            })
            .await
            .map_err(|_| GatewayError::Internal)?;
    }

    if outcome.step_up_required {
        state
            .ledger
            .emit(EmitRequest {
                actor: &subject.id,
                action: AuditAction::StepUpRequired,
                object_id: None,
                object_type: "query",
                decision: None,
                reason: None,
                metadata: serde_json::json!({}),
            })
            .await
            .map_err(|_| GatewayError::Internal)?;
    }

    // Deny-by-default: every candidate collapsed to the policy-unavailable
    // reason means the policy engine itself is unreachable, not that access
    // was legitimately refused (`spec.md` §7 kind 5).
    if !outcome.decisions.is_empty()
        && outcome.decisions.iter().all(|d| d.decision.reason() == Some(POLICY_UNAVAILABLE_REASON))
    {
        return Err(GatewayError::PolicyUnavailable);
    }

    let mut redaction_applied = false;
    let mut fragments = Vec::with_capacity(outcome.allowed.len());
    for fragment in &outcome.allowed {
        let redacted = state.catalog.redact(&fragment.text, fragment.label);
        if redacted.changed {
            redaction_applied = true;
            state
                .ledger
                .emit(EmitRequest {
                    actor: &subject.id,
                    action: AuditAction::RedactionApplied,
                    object_id: Some(&fragment.fragment_id),
                    object_type: "fragment",
                    decision: None,
                    reason: None,
                    metadata: serde_json::json!({ "patterns_matched": redacted.patterns_matched }),
                })
                .await
                .map_err(|_| GatewayError::Internal)?;
        }
        fragments.push(FragmentView {
            id: fragment.fragment_id.clone(),
            text: redacted.text,
            label: fragment.label,
            similarity: fragment.similarity,
        });
    }

    let response_text = if outcome.insufficient_evidence {
        "Insufficient governed evidence to answer this query.".to_string()
    } else {
        synthesize(&fragments)
    };

    let allowed = fragments.len();
    state
        .ledger
        .emit(EmitRequest {
            actor: &subject.id,
            action: AuditAction::ResultReturned,
            object_id: None,
            object_type: "query",
            decision: None,
            reason: None,
            metadata: serde_json::json!({ "allowed": allowed, "denied": denied, "step_up": step_up }),
        })
        .await
        .map_err(|_| GatewayError::Internal)?;

    let decisions = outcome
        .decisions
        .iter()
        .map(|d| DecisionView {
            fragment_id: d.fragment_id.clone(),
            decision: d.decision.kind_str().to_string(),
            reason: d.decision.reason().map(str::to_string),
        })
        .collect();

    Ok(Json(SearchResponse {
        response: response_text,
        fragments,
        decisions,
        redaction_applied,
        insufficient_evidence: outcome.insufficient_evidence,
        step_up_required: outcome.step_up_required,
        counts: Counts { allowed, denied, step_up },
    }))
}

/// Deterministic extract-and-concatenate stand-in for the external
/// synthesizer (`spec.md` §1: no generative model call is mandated here).
fn synthesize(fragments: &[FragmentView]) -> String {
    fragments.iter().map(|f| f.text.as_str()).collect::<Vec<_>>().join(" ")
}

/// Deterministic placeholder for the externalized `Embed` capability
/// (`spec.md` §4.5 step 2, §9 "Embedding generation"). A real deployment
/// swaps this for an embedding client behind the same signature.
pub(crate) fn embed(query: &str, dim: usize) -> Vec<f32> {
    let mut v = vec![0.0f32; dim.max(1)];
    for (i, byte) in query.bytes().enumerate() {
        let slot = i % v.len();
        v[slot] += f32::from(byte) / 255.0;
    }
    v
}
