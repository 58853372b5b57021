//! HTTP client backend for an external policy engine, grounded on the
//! `reqwest::Client::new().post(..).json(..).timeout(..).send()` shape used
//! for outbound audit delivery in the corpus's audit-logging crate.

use async_trait::async_trait;
use gov_core::{Action, Subject};
use serde::{Deserialize, Serialize};

use crate::backend::{PolicyBackend, RawDecision, RawKind};
use crate::error::BackendError;
use crate::resource::PolicyResource;

#[derive(Debug, Serialize)]
struct WireSubject<'a> {
    id: &'a str,
    groups: &'a [String],
    tenant: &'a str,
    clearance: &'static str,
    allow_export: bool,
    mfa_satisfied: bool,
}

#[derive(Debug, Serialize)]
struct WireResource<'a> {
    id: &'a str,
    label: &'static str,
    source: &'a str,
    owner_id: &'a str,
    tenant: &'a str,
}

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    subject: WireSubject<'a>,
    resource: WireResource<'a>,
    action: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum WireKind {
    Allow,
    Deny,
    StepUp,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    decision: WireKind,
    reason: Option<String>,
    rule_id: Option<String>,
}

/// Calls an external policy engine's HTTP decision endpoint.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpBackend {
    /// Construct a backend posting to `endpoint` with the given
    /// per-request timeout.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, timeout: std::time::Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, endpoint: endpoint.into() }
    }
}

#[async_trait]
impl PolicyBackend for HttpBackend {
    async fn raw_decide(
        &self,
        subject: &Subject,
        resource: &PolicyResource<'_>,
        action: Action,
    ) -> Result<RawDecision, BackendError> {
        let request = WireRequest {
            subject: WireSubject {
                id: &subject.id,
                groups: &subject.groups,
                tenant: &subject.tenant,
                clearance: subject.attrs.clearance.as_str(),
                allow_export: subject.attrs.allow_export,
                mfa_satisfied: subject.attrs.mfa_satisfied,
            },
            resource: WireResource {
                id: resource.id,
                label: resource.label.as_str(),
                source: resource.source,
                owner_id: resource.owner_id,
                tenant: resource.tenant,
            },
            action: action.as_str(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout
                } else {
                    BackendError::Transport(e.to_string())
                }
            })?;

        let body: WireResponse =
            response.json().await.map_err(|e| BackendError::Schema(e.to_string()))?;

        let kind = match body.decision {
            WireKind::Allow => RawKind::Allow,
            WireKind::Deny => RawKind::Deny,
            WireKind::StepUp => RawKind::StepUp,
        };
        Ok(RawDecision { kind, reason: body.reason, rule_id: body.rule_id })
    }
}
