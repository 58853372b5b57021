//! The two-stage filter-then-authorize pipeline: a tenant- and
//! label-scoped similarity pre-filter followed by a bounded-fan-out policy
//! evaluation per candidate.

use std::collections::HashSet;
use std::sync::Arc;

use gov_core::{Action, CoreError, Subject};
use policy_adapter::{PolicyAdapter, PolicyResource};
use store::Store;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::decision::{FragmentDecision, RetrievalOutcome};

/// Upper bound on concurrent in-flight policy evaluations per request,
/// independent of candidate count (`spec.md` §5: `min(N, 16)`).
const MAX_FANOUT: usize = 16;

/// Turns a query plus a subject into an authorized fragment set with
/// provenance. Never raises for authorization-shaped outcomes — callers
/// read `insufficient_evidence`/`step_up_required` off the result; only
/// store failures and malformed input surface as `Err`.
pub struct Retriever {
    store: Arc<dyn Store>,
    policy: Arc<PolicyAdapter>,
}

impl Retriever {
    /// Construct a retriever over a store and a policy adapter.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, policy: Arc<PolicyAdapter>) -> Self {
        Self { store, policy }
    }

    /// Run the filter-then-authorize pipeline for `subject` and
    /// `query_vec`, returning at most `top_k` allowed fragments. `action`
    /// is threaded into every per-fragment policy evaluation, so a read
    /// and an export of the same candidate set can be authorized
    /// differently (`spec.md` §4.7: the export path evaluates `export`,
    /// not `read`).
    pub async fn retrieve(
        &self,
        subject: &Subject,
        query_vec: &[f32],
        top_k: usize,
        min_evidence: u32,
        action: Action,
    ) -> Result<RetrievalOutcome, CoreError> {
        let allowed_labels = gov_core::label::allowed_labels(subject.attrs.clearance);
        let limit = top_k.saturating_mul(2).max(top_k);

        let mut candidates = self
            .store
            .pre_filter_fragments(&subject.tenant, &allowed_labels, query_vec, limit)
            .await?;

        let mut seen = HashSet::with_capacity(candidates.len());
        candidates.retain(|c| seen.insert(c.fragment_id.clone()));

        if candidates.is_empty() {
            return Ok(RetrievalOutcome { insufficient_evidence: true, ..Default::default() });
        }

        let total = candidates.len();
        let permits = total.min(MAX_FANOUT);
        let semaphore = Arc::new(Semaphore::new(permits));
        let mut joinset = JoinSet::new();

        for (idx, candidate) in candidates.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let policy = Arc::clone(&self.policy);
            let subject = subject.clone();
            joinset.spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore never closed");
                let resource = PolicyResource {
                    id: &candidate.fragment_id,
                    label: candidate.label,
                    source: &candidate.source,
                    owner_id: &candidate.owner_id,
                    tenant: &candidate.tenant,
                };
                let decision = policy.evaluate(&subject, &resource, action).await;
                (
                    idx,
                    FragmentDecision {
                        fragment_id: candidate.fragment_id,
                        document_id: candidate.document_id,
                        text: candidate.text,
                        label: candidate.label,
                        similarity: candidate.similarity,
                        decision,
                    },
                )
            });
        }

        let mut slots: Vec<Option<FragmentDecision>> = (0..total).map(|_| None).collect();
        while let Some(joined) = joinset.join_next().await {
            let (idx, fragment_decision) = joined.expect("retriever evaluation task panicked");
            slots[idx] = Some(fragment_decision);
        }
        let decisions: Vec<FragmentDecision> =
            slots.into_iter().map(|slot| slot.expect("every spawned index is filled")).collect();

        let step_up_required = decisions.iter().any(|d| d.decision.is_step_up());

        let mut full_allowed: Vec<FragmentDecision> =
            decisions.iter().filter(|d| d.decision.is_allow()).cloned().collect();
        let insufficient_evidence = (full_allowed.len() as u32) < min_evidence;
        full_allowed.truncate(top_k);

        tracing::debug!(
            subject = %subject.id,
            candidates = total,
            allowed = full_allowed.len(),
            step_up_required,
            insufficient_evidence,
            "retrieval complete"
        );

        Ok(RetrievalOutcome {
            decisions,
            allowed: full_allowed,
            step_up_required,
            insufficient_evidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gov_core::{CoreError, Label, Subject, SubjectAttrs};
    use policy_adapter::LocalBackend;
    use store::{FragmentCandidate, InMemoryStore};

    fn subject(clearance: Label, tenant: &str) -> Subject {
        Subject {
            id: "alice".to_string(),
            email: "alice@example.com".to_string(),
            groups: vec![],
            assurance_level: 1,
            attrs: SubjectAttrs::new(clearance, true),
            tenant: tenant.to_string(),
        }
    }

    fn populated_store(tenant: &str, label: Label, n: usize) -> Arc<dyn Store> {
        let gov = gov_core::Document {
            id: "doc-1".to_string(),
            source: "confluence".to_string(),
            path: "/a".to_string(),
            title: "A".to_string(),
            mime: "text/plain".to_string(),
            owner_id: "owner-1".to_string(),
            tenant: tenant.to_string(),
        };
        let store = InMemoryStore::new();
        store.put_document(gov);
        for i in 0..n {
            store.put_fragment(gov_core::Fragment {
                id: format!("frag-{i}"),
                document_id: "doc-1".to_string(),
                ordinal: i as u32,
                text: format!("fragment {i}"),
                embedding: vec![1.0, 0.0],
                label,
            });
        }
        Arc::new(store)
    }

    fn adapter() -> Arc<PolicyAdapter> {
        Arc::new(PolicyAdapter::new(Arc::new(LocalBackend::default()), policy_adapter::AdapterConfig::default()))
    }

    #[tokio::test]
    async fn empty_candidate_set_is_insufficient_evidence() {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        let retriever = Retriever::new(store, adapter());
        let subj = subject(Label::Public, "acme");
        let outcome = retriever.retrieve(&subj, &[1.0, 0.0], 10, 2, Action::Read).await.unwrap();
        assert!(outcome.insufficient_evidence);
        assert!(outcome.allowed.is_empty());
    }

    #[tokio::test]
    async fn below_threshold_clearance_sees_nothing_but_evidence_flag_set() {
        let store = populated_store("acme", Label::Regulated, 3);
        let retriever = Retriever::new(store, adapter());
        let subj = subject(Label::Public, "acme");
        let outcome = retriever.retrieve(&subj, &[1.0, 0.0], 10, 2, Action::Read).await.unwrap();
        assert!(outcome.decisions.is_empty());
        assert!(outcome.insufficient_evidence);
    }

    #[tokio::test]
    async fn sufficient_public_evidence_is_allowed() {
        let store = populated_store("acme", Label::Public, 3);
        let retriever = Retriever::new(store, adapter());
        let subj = subject(Label::Confidential, "acme");
        let outcome = retriever.retrieve(&subj, &[1.0, 0.0], 10, 2, Action::Read).await.unwrap();
        assert!(!outcome.insufficient_evidence);
        assert_eq!(outcome.allowed.len(), 3);
        assert!(outcome.allowed.iter().all(|d| d.decision.is_allow()));
    }

    #[tokio::test]
    async fn top_k_truncates_allowed_but_not_the_evidence_check() {
        let store = populated_store("acme", Label::Public, 5);
        let retriever = Retriever::new(store, adapter());
        let subj = subject(Label::Confidential, "acme");
        let outcome = retriever.retrieve(&subj, &[1.0, 0.0], 2, 2, Action::Read).await.unwrap();
        assert!(!outcome.insufficient_evidence);
        assert_eq!(outcome.allowed.len(), 2);
        assert_eq!(outcome.decisions.len(), 5);
    }

    #[tokio::test]
    async fn regulated_read_surfaces_step_up_not_allow() {
        let store = populated_store("acme", Label::Regulated, 2);
        let retriever = Retriever::new(store, adapter());
        let subj = subject(Label::Regulated, "acme");
        let outcome = retriever.retrieve(&subj, &[1.0, 0.0], 10, 2, Action::Read).await.unwrap();
        assert!(outcome.step_up_required);
        assert!(outcome.allowed.is_empty());
    }

    #[tokio::test]
    async fn empty_query_vector_is_invalid_input() {
        let store = populated_store("acme", Label::Public, 1);
        let retriever = Retriever::new(store, adapter());
        let subj = subject(Label::Public, "acme");
        let err = retriever.retrieve(&subj, &[], 10, 2, Action::Read).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    struct StaticBackend(policy_adapter::RawDecision);

    #[async_trait]
    impl policy_adapter::PolicyBackend for StaticBackend {
        async fn raw_decide(
            &self,
            _subject: &Subject,
            _resource: &policy_adapter::PolicyResource<'_>,
            _action: Action,
        ) -> Result<policy_adapter::RawDecision, policy_adapter::BackendError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn duplicate_fragment_ids_are_evaluated_once() {
        let store = InMemoryStore::new();
        store.put_document(gov_core::Document {
            id: "doc-1".to_string(),
            source: "confluence".to_string(),
            path: "/a".to_string(),
            title: "A".to_string(),
            mime: "text/plain".to_string(),
            owner_id: "owner-1".to_string(),
            tenant: "acme".to_string(),
        });
        // Two fragments sharing an id is not something `InMemoryStore` can
        // model directly (its map is keyed by id), so this instead checks
        // that the dedup pass in `retrieve` is a no-op when ids are already
        // unique and produces exactly one decision per unique id.
        store.put_fragment(gov_core::Fragment {
            id: "frag-1".to_string(),
            document_id: "doc-1".to_string(),
            ordinal: 0,
            text: "t".to_string(),
            embedding: vec![1.0, 0.0],
            label: Label::Public,
        });
        let store: Arc<dyn Store> = Arc::new(store);
        let backend = Arc::new(StaticBackend(policy_adapter::RawDecision::allow()));
        let policy = Arc::new(PolicyAdapter::new(backend, policy_adapter::AdapterConfig::default()));
        let retriever = Retriever::new(store, policy);
        let subj = subject(Label::Public, "acme");
        let outcome = retriever.retrieve(&subj, &[1.0, 0.0], 10, 1, Action::Read).await.unwrap();
        assert_eq!(outcome.decisions.len(), 1);
    }
}
