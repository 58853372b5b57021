//! A deterministic, in-process rule interpreter. Used as the default backend
//! and as a reference/offline stand-in for the external policy engine.
//!
//! Evaluation precedence is priority, then most-restrictive-wins, then
//! first-match-wins — the same three-stage tie-break the teacher's rule
//! engine used for its declarative `when`/`action` rules, generalized here
//! from string-matched envelope conditions to typed predicates over
//! `(subject, resource, action)`.

use async_trait::async_trait;
use gov_core::{Action, Label, Subject};

use crate::backend::{PolicyBackend, RawDecision, RawKind};
use crate::error::BackendError;
use crate::resource::PolicyResource;

/// A condition a rule fires on.
#[derive(Debug, Clone, Copy)]
pub enum Predicate {
    /// `subject.tenant != resource.tenant`.
    TenantMismatch,
    /// `subject.attrs.clearance < resource.label`.
    ClearanceBelowLabel,
    /// `action == Export && !subject.attrs.allow_export`.
    ExportWithoutPermission,
    /// `resource.label == Regulated && action == Read`, unless the subject
    /// already satisfied a second factor — an engine re-evaluating after
    /// step-up must stop asking for one, or the gateway's step-up flow can
    /// never converge on an allow (`spec.md` §8 scenario 2).
    RegulatedRead,
    /// Always fires; useful for a catch-all rule.
    Always,
}

impl Predicate {
    fn matches(self, subject: &Subject, resource: &PolicyResource<'_>, action: Action) -> bool {
        match self {
            Predicate::TenantMismatch => subject.tenant != resource.tenant,
            Predicate::ClearanceBelowLabel => subject.attrs.clearance < resource.label,
            Predicate::ExportWithoutPermission => {
                action == Action::Export && !subject.attrs.allow_export
            }
            Predicate::RegulatedRead => {
                resource.label == Label::Regulated
                    && action == Action::Read
                    && !subject.attrs.mfa_satisfied
            }
            Predicate::Always => true,
        }
    }
}

/// What a rule decides when its predicate matches.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Refuse, with a reason.
    Deny(String),
    /// Require a second factor, with a reason.
    StepUp(String),
    /// Permit.
    Allow,
}

/// One declarative rule.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Stable name, reported as `rule_id`.
    pub name: String,
    /// Higher priority wins; ties broken by most-restrictive effect, then by
    /// declaration order.
    pub priority: i32,
    /// Condition under which this rule fires.
    pub predicate: Predicate,
    /// What happens when it fires.
    pub effect: Effect,
}

fn severity(effect: &Effect) -> u8 {
    match effect {
        Effect::Deny(_) => 3,
        Effect::StepUp(_) => 2,
        Effect::Allow => 1,
    }
}

/// The default rule set, encoding the tenant isolation, clearance, export,
/// and step-up invariants from `spec.md` §3/§4.2/§8.
#[must_use]
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule {
            name: "tenant_isolation".into(),
            priority: 100,
            predicate: Predicate::TenantMismatch,
            effect: Effect::Deny("cross-tenant access".into()),
        },
        Rule {
            name: "clearance_check".into(),
            priority: 90,
            predicate: Predicate::ClearanceBelowLabel,
            effect: Effect::Deny("insufficient clearance".into()),
        },
        Rule {
            name: "export_permission".into(),
            priority: 80,
            predicate: Predicate::ExportWithoutPermission,
            effect: Effect::Deny("export not permitted for this subject".into()),
        },
        Rule {
            name: "regulated_step_up".into(),
            priority: 50,
            predicate: Predicate::RegulatedRead,
            effect: Effect::StepUp("regulated content requires a second factor".into()),
        },
    ]
}

/// Deterministic local policy backend.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    rules: Vec<Rule>,
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl LocalBackend {
    /// Construct a backend from an explicit rule set.
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    fn decide(&self, subject: &Subject, resource: &PolicyResource<'_>, action: Action) -> RawDecision {
        let matches: Vec<(i32, usize, &Rule)> = self
            .rules
            .iter()
            .enumerate()
            .filter(|(_, r)| r.predicate.matches(subject, resource, action))
            .map(|(idx, r)| (r.priority, idx, r))
            .collect();

        if matches.is_empty() {
            return RawDecision::allow();
        }

        let max_priority = matches.iter().map(|(p, _, _)| *p).max().unwrap_or(0);
        let mut best: Option<(usize, &Rule)> = None;
        for (priority, idx, rule) in matches.into_iter().filter(|(p, _, _)| *p == max_priority) {
            let _ = priority;
            let is_better = match best {
                None => true,
                Some((_, current)) => severity(&rule.effect) > severity(&current.effect),
            };
            if is_better {
                best = Some((idx, rule));
            }
        }

        match best {
            None => RawDecision::allow(),
            Some((_, rule)) => match &rule.effect {
                Effect::Deny(reason) => RawDecision::deny(reason.clone(), Some(rule.name.clone())),
                Effect::StepUp(reason) => RawDecision::step_up(reason.clone(), Some(rule.name.clone())),
                Effect::Allow => RawDecision::allow(),
            },
        }
    }
}

#[async_trait]
impl PolicyBackend for LocalBackend {
    async fn raw_decide(
        &self,
        subject: &Subject,
        resource: &PolicyResource<'_>,
        action: Action,
    ) -> Result<RawDecision, BackendError> {
        Ok(self.decide(subject, resource, action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gov_core::SubjectAttrs;

    fn subject(tenant: &str, clearance: Label, allow_export: bool) -> Subject {
        Subject {
            id: "s1".into(),
            email: "s1@example.com".into(),
            groups: vec![],
            assurance_level: 1,
            attrs: SubjectAttrs::new(clearance, allow_export),
            tenant: tenant.into(),
        }
    }

    fn resource(tenant: &'static str, label: Label) -> PolicyResource<'static> {
        PolicyResource { id: "frag-1", label, source: "confluence", owner_id: "owner-1", tenant }
    }

    #[tokio::test]
    async fn cross_tenant_is_denied_regardless_of_clearance() {
        let backend = LocalBackend::default();
        let subject = subject("acme", Label::Regulated, true);
        let resource = resource("other-tenant", Label::Public);
        let d = backend.raw_decide(&subject, &resource, Action::Read).await.unwrap();
        assert_eq!(d.kind, RawKind::Deny);
        assert_eq!(d.rule_id.as_deref(), Some("tenant_isolation"));
    }

    #[tokio::test]
    async fn insufficient_clearance_is_denied() {
        let backend = LocalBackend::default();
        let subject = subject("acme", Label::Public, true);
        let resource = resource("acme", Label::Confidential);
        let d = backend.raw_decide(&subject, &resource, Action::Read).await.unwrap();
        assert_eq!(d.kind, RawKind::Deny);
        assert_eq!(d.rule_id.as_deref(), Some("clearance_check"));
    }

    #[tokio::test]
    async fn export_without_permission_is_denied() {
        let backend = LocalBackend::default();
        let subject = subject("acme", Label::Regulated, false);
        let resource = resource("acme", Label::Public);
        let d = backend.raw_decide(&subject, &resource, Action::Export).await.unwrap();
        assert_eq!(d.kind, RawKind::Deny);
        assert_eq!(d.rule_id.as_deref(), Some("export_permission"));
    }

    #[tokio::test]
    async fn regulated_read_requires_step_up() {
        let backend = LocalBackend::default();
        let subject = subject("acme", Label::Regulated, true);
        let resource = resource("acme", Label::Regulated);
        let d = backend.raw_decide(&subject, &resource, Action::Read).await.unwrap();
        assert_eq!(d.kind, RawKind::StepUp);
    }

    #[tokio::test]
    async fn unmatched_request_is_allowed() {
        let backend = LocalBackend::default();
        let subject = subject("acme", Label::Confidential, true);
        let resource = resource("acme", Label::Internal);
        let d = backend.raw_decide(&subject, &resource, Action::Read).await.unwrap();
        assert_eq!(d.kind, RawKind::Allow);
    }

    #[tokio::test]
    async fn tenant_mismatch_outranks_regulated_step_up() {
        // Both tenant_isolation (priority 100, Deny) and regulated_step_up
        // (priority 50, StepUp) would fire; priority must decide, not severity.
        let backend = LocalBackend::default();
        let subject = subject("acme", Label::Regulated, true);
        let resource = resource("other-tenant", Label::Regulated);
        let d = backend.raw_decide(&subject, &resource, Action::Read).await.unwrap();
        assert_eq!(d.kind, RawKind::Deny);
        assert_eq!(d.rule_id.as_deref(), Some("tenant_isolation"));
    }
}
