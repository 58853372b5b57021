//! `POST /export` (`spec.md` §4.7 "Export path", §6).

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use audit_ledger::{AuditAction, EmitRequest, Ledger};
use gov_core::{Action, Label};
use retriever::FragmentDecision;

use crate::error::GatewayError;
use crate::extract::AuthSubject;
use crate::routes::search::embed;
use crate::state::AppState;

/// Export artifact encoding.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// JSON array of `{id, text, label}`.
    Json,
    /// `id,label,text` CSV rows.
    Csv,
}

/// `POST /export` request body.
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    /// Query whose authorized evidence should be exported.
    pub query: String,
    /// Artifact encoding.
    pub format: ExportFormat,
}

/// `POST /export` response body.
#[derive(Debug, Serialize)]
pub struct ExportResponse {
    /// Always `"allow"` on success; refusals surface as an error status.
    pub decision: String,
    /// The rendered artifact, present on success.
    pub artifact: Option<String>,
}

/// Export authorized evidence for a query. Identical to `/search` except
/// the action evaluated against the policy engine is `"export"` (not
/// `"read"`), `subject.attrs.allow_export` gates entry before the retriever
/// is ever invoked, each allowed fragment is redacted the same as `/search`
/// before it is rendered, and the result is an artifact rather than a
/// synthesized answer.
pub async fn export(
    State(state): State<AppState>,
    AuthSubject(subject): AuthSubject,
    Json(req): Json<ExportRequest>,
) -> Result<Json<ExportResponse>, GatewayError> {
    if req.query.trim().is_empty() {
        return Err(GatewayError::InvalidInput("query must not be empty".to_string()));
    }

    state
        .ledger
        .emit(EmitRequest {
            actor: &subject.id,
            action: AuditAction::ExportAttempted,
            object_id: None,
            object_type: "query",
            decision: None,
            reason: None,
            metadata: serde_json::json!({ "query": req.query, "format": format_str(&req.format) }),
        })
        .await
        .map_err(|_| GatewayError::Internal)?;

    if !subject.attrs.allow_export {
        deny(&state, &subject.id, "export not permitted for subject").await?;
        return Err(GatewayError::Forbidden("export not permitted for subject".to_string()));
    }

    let query_vec = embed(&req.query, state.config.embedding_dim);
    let outcome = state
        .retriever
        .retrieve(
            &subject,
            &query_vec,
            state.config.default_top_k,
            state.config.default_min_evidence,
            Action::Export,
        )
        .await?;

    if outcome.decisions.is_empty() {
        deny(&state, &subject.id, "no content matched query").await?;
        return Err(GatewayError::NotFound("no content matched query".to_string()));
    }
    if outcome.allowed.is_empty() {
        deny(&state, &subject.id, "no evidence authorized for export").await?;
        return Err(GatewayError::Forbidden("no evidence authorized for export".to_string()));
    }

    state
        .ledger
        .emit(EmitRequest {
            actor: &subject.id,
            action: AuditAction::ExportGranted,
            object_id: None,
            object_type: "query",
            decision: Some("allow"),
            reason: None,
            metadata: serde_json::json!({}),
        })
        .await
        .map_err(|_| GatewayError::Internal)?;

    let mut redacted = Vec::with_capacity(outcome.allowed.len());
    for fragment in &outcome.allowed {
        let result = state.catalog.redact(&fragment.text, fragment.label);
        if result.changed {
            state
                .ledger
                .emit(EmitRequest {
                    actor: &subject.id,
                    action: AuditAction::RedactionApplied,
                    object_id: Some(&fragment.fragment_id),
                    object_type: "fragment",
                    decision: None,
                    reason: None,
                    metadata: serde_json::json!({ "patterns_matched": result.patterns_matched }),
                })
                .await
                .map_err(|_| GatewayError::Internal)?;
        }
        redacted.push(FragmentDecision { text: result.text, ..fragment.clone() });
    }

    let artifact = render_artifact(&redacted, &req.format);
    Ok(Json(ExportResponse { decision: "allow".to_string(), artifact: Some(artifact) }))
}

async fn deny(state: &AppState, actor: &str, reason: &str) -> Result<(), GatewayError> {
    state
        .ledger
        .emit(EmitRequest {
            actor,
            action: AuditAction::ExportDenied,
            object_id: None,
            object_type: "query",
            decision: Some("deny"),
            reason: Some(reason),
            metadata: serde_json::json!({}),
        })
        .await
        .map_err(|_| GatewayError::Internal)?;
    Ok(())
}

fn format_str(format: &ExportFormat) -> &'static str {
    match format {
        ExportFormat::Json => "json",
        ExportFormat::Csv => "csv",
    }
}

fn render_artifact(allowed: &[FragmentDecision], format: &ExportFormat) -> String {
    match format {
        ExportFormat::Json => {
            let items: Vec<_> = allowed
                .iter()
                .map(|d| {
                    serde_json::json!({ "id": d.fragment_id, "text": d.text, "label": label_str(d.label) })
                })
                .collect();
            serde_json::Value::Array(items).to_string()
        }
        ExportFormat::Csv => {
            let mut out = String::from("id,label,text\n");
            for d in allowed {
                out.push_str(&format!(
                    "{},{},{}\n",
                    d.fragment_id,
                    label_str(d.label),
                    d.text.replace(',', " ")
                ));
            }
            out
        }
    }
}

fn label_str(label: Label) -> &'static str {
    label.as_str()
}
