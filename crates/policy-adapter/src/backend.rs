//! The backend contract every policy engine implementation satisfies.

use async_trait::async_trait;
use gov_core::{Action, Subject};

use crate::error::BackendError;
use crate::resource::PolicyResource;

/// Engine-level decision kind, before the adapter's mfa-aware priority
/// mapping is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawKind {
    /// Permit.
    Allow,
    /// Refuse.
    Deny,
    /// A second factor is required.
    StepUp,
}

/// Raw output of one backend evaluation.
#[derive(Debug, Clone)]
pub struct RawDecision {
    /// Engine-level kind.
    pub kind: RawKind,
    /// Human-readable reason, if the engine supplied one.
    pub reason: Option<String>,
    /// Identifier of the rule that produced this decision, if any.
    pub rule_id: Option<String>,
}

impl RawDecision {
    /// Shorthand for an allow with no reason.
    #[must_use]
    pub fn allow() -> Self {
        RawDecision { kind: RawKind::Allow, reason: None, rule_id: None }
    }

    /// Shorthand for a deny with a reason and optional rule attribution.
    #[must_use]
    pub fn deny(reason: impl Into<String>, rule_id: Option<String>) -> Self {
        RawDecision { kind: RawKind::Deny, reason: Some(reason.into()), rule_id }
    }

    /// Shorthand for a step-up with a reason and optional rule attribution.
    #[must_use]
    pub fn step_up(reason: impl Into<String>, rule_id: Option<String>) -> Self {
        RawDecision { kind: RawKind::StepUp, reason: Some(reason.into()), rule_id }
    }
}

/// A policy engine client. Implementations may call out over the network,
/// evaluate rules in-process, or anything else — `PolicyAdapter` only relies
/// on this contract.
#[async_trait]
pub trait PolicyBackend: Send + Sync {
    /// Evaluate `(subject, resource, action)`, returning the engine's raw
    /// signal. Transport/timeout/schema failures are reported as `Err`; the
    /// adapter maps them to a deny, never the backend itself.
    async fn raw_decide(
        &self,
        subject: &Subject,
        resource: &PolicyResource<'_>,
        action: Action,
    ) -> Result<RawDecision, BackendError>;
}
