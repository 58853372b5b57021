//! The adapter: bounded timeout, one jittered retry on transient failure,
//! and the mfa-aware priority mapping from raw engine output to a
//! [`Decision`]. Deny-by-default: any unrecovered failure becomes a deny,
//! never an error the caller has to handle — the retriever's per-fragment
//! fan-out must never throw on policy failure (`spec.md` §9).

use std::sync::Arc;
use std::time::Duration;

use gov_core::{Action, Decision, Subject};
use rand::Rng;

use crate::backend::{PolicyBackend, RawKind};
use crate::resource::PolicyResource;

const POLICY_UNAVAILABLE: &str = "policy-unavailable";

/// Timeout and retry configuration for the adapter.
#[derive(Debug, Clone, Copy)]
pub struct AdapterConfig {
    /// Per-evaluation timeout. `spec.md` §4.2 recommends 5s.
    pub timeout: Duration,
    /// Base delay for the single permitted retry; actual delay is jittered
    /// uniformly in `[0, base)`.
    pub retry_backoff_base: Duration,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(5), retry_backoff_base: Duration::from_millis(100) }
    }
}

/// Uniform client for the external policy engine (`spec.md` §4.2).
#[derive(Clone)]
pub struct PolicyAdapter {
    backend: Arc<dyn PolicyBackend>,
    config: AdapterConfig,
}

impl PolicyAdapter {
    /// Construct an adapter over any [`PolicyBackend`].
    #[must_use]
    pub fn new(backend: Arc<dyn PolicyBackend>, config: AdapterConfig) -> Self {
        Self { backend, config }
    }

    /// Evaluate `(subject, resource, action)`. Never fails: transport,
    /// timeout, and schema errors all collapse to a deny.
    pub async fn evaluate(
        &self,
        subject: &Subject,
        resource: &PolicyResource<'_>,
        action: Action,
    ) -> Decision {
        let decision = match self.call_with_retry(subject, resource, action).await {
            Ok(raw) => match raw.kind {
                RawKind::StepUp if !subject.attrs.mfa_satisfied => {
                    Decision::StepUp { reason: raw.reason.unwrap_or_default(), rule_id: raw.rule_id }
                }
                RawKind::Allow => Decision::Allow,
                _ => Decision::Deny {
                    reason: raw.reason.unwrap_or_else(|| "denied".to_string()),
                    rule_id: raw.rule_id,
                },
            },
            Err(e) => {
                tracing::warn!(error = %e, subject = %subject.id, resource = %resource.id, "policy backend unavailable");
                Decision::deny(POLICY_UNAVAILABLE)
            }
        };
        crate::observer::notify(&subject.id, resource.id, &decision);
        decision
    }

    async fn call_with_retry(
        &self,
        subject: &Subject,
        resource: &PolicyResource<'_>,
        action: Action,
    ) -> Result<crate::backend::RawDecision, crate::error::BackendError> {
        let first = self.timed_decide(subject, resource, action).await;
        match first {
            Ok(raw) => Ok(raw),
            Err(e) if e.is_transient() => {
                let jitter_ms = rand::thread_rng().gen_range(0..=self.config.retry_backoff_base.as_millis() as u64);
                tokio::time::sleep(Duration::from_millis(jitter_ms)).await;
                self.timed_decide(subject, resource, action).await
            }
            Err(e) => Err(e),
        }
    }

    async fn timed_decide(
        &self,
        subject: &Subject,
        resource: &PolicyResource<'_>,
        action: Action,
    ) -> Result<crate::backend::RawDecision, crate::error::BackendError> {
        match tokio::time::timeout(self.config.timeout, self.backend.raw_decide(subject, resource, action)).await {
            Ok(result) => result,
            Err(_) => Err(crate::error::BackendError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalBackend;
    use gov_core::{Label, SubjectAttrs};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn subject(mfa: bool) -> Subject {
        Subject {
            id: "alice".into(),
            email: "alice@example.com".into(),
            groups: vec![],
            assurance_level: 1,
            attrs: SubjectAttrs { mfa_satisfied: mfa, ..SubjectAttrs::new(Label::Regulated, true) },
            tenant: "acme".into(),
        }
    }

    fn resource() -> PolicyResource<'static> {
        PolicyResource { id: "frag-1", label: Label::Regulated, source: "s", owner_id: "o", tenant: "acme" }
    }

    #[tokio::test]
    async fn step_up_with_mfa_unsatisfied_surfaces_as_step_up() {
        let adapter = PolicyAdapter::new(Arc::new(LocalBackend::default()), AdapterConfig::default());
        let d = adapter.evaluate(&subject(false), &resource(), Action::Read).await;
        assert!(d.is_step_up());
    }

    #[tokio::test]
    async fn step_up_with_mfa_satisfied_is_allowed() {
        // Once the second factor is satisfied, the backend's own step-up
        // predicate stops firing, so re-evaluation converges on Allow
        // instead of asking for step-up forever (`spec.md` §8 scenario 2).
        let adapter = PolicyAdapter::new(Arc::new(LocalBackend::default()), AdapterConfig::default());
        let d = adapter.evaluate(&subject(true), &resource(), Action::Read).await;
        assert!(d.is_allow());
    }

    struct FlakyBackend {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl PolicyBackend for FlakyBackend {
        async fn raw_decide(
            &self,
            _subject: &Subject,
            _resource: &PolicyResource<'_>,
            _action: Action,
        ) -> Result<crate::backend::RawDecision, crate::error::BackendError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                Err(crate::error::BackendError::Transport("connection reset".into()))
            } else {
                Ok(crate::backend::RawDecision::allow())
            }
        }
    }

    #[tokio::test]
    async fn transient_failure_is_retried_once() {
        let backend = Arc::new(FlakyBackend { calls: AtomicUsize::new(0) });
        let adapter = PolicyAdapter::new(backend.clone(), AdapterConfig::default());
        let d = adapter.evaluate(&subject(true), &resource(), Action::Read).await;
        assert!(d.is_allow());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    struct AlwaysFailingBackend;

    #[async_trait::async_trait]
    impl PolicyBackend for AlwaysFailingBackend {
        async fn raw_decide(
            &self,
            _subject: &Subject,
            _resource: &PolicyResource<'_>,
            _action: Action,
        ) -> Result<crate::backend::RawDecision, crate::error::BackendError> {
            Err(crate::error::BackendError::Transport("down".into()))
        }
    }

    #[tokio::test]
    async fn persistent_failure_collapses_to_deny() {
        let adapter = PolicyAdapter::new(Arc::new(AlwaysFailingBackend), AdapterConfig::default());
        let d = adapter.evaluate(&subject(true), &resource(), Action::Read).await;
        match d {
            Decision::Deny { reason, .. } => assert_eq!(reason, POLICY_UNAVAILABLE),
            other => panic!("expected deny, got {other:?}"),
        }
    }
}
