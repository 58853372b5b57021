//! In-memory reference `Store`, `DashMap`-backed for concurrent reads and
//! writes without an external coordinator, grounded on the teacher
//! `orchestrator::RunIndex`'s `Arc<DashMap<..>>` fields.

use async_trait::async_trait;
use dashmap::DashMap;
use gov_core::{Classification, CoreError, Document, Fragment, Label, Permission, RetentionRule, Subject};

use crate::candidate::FragmentCandidate;
use crate::similarity::cosine_similarity;
use crate::Store;

/// Reference implementation good enough to run the full pipeline and the
/// test suite; not durable across process restarts.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    subjects: DashMap<String, Subject>,
    documents: DashMap<String, Document>,
    classifications: DashMap<String, Vec<Classification>>,
    fragments: DashMap<String, Fragment>,
    permissions: DashMap<String, Vec<Permission>>,
    retention_rules: DashMap<(Label, String), RetentionRule>,
}

impl InMemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a subject.
    pub fn put_subject(&self, subject: Subject) {
        self.subjects.insert(subject.id.clone(), subject);
    }

    /// Insert or replace a document.
    pub fn put_document(&self, document: Document) {
        self.documents.insert(document.id.clone(), document);
    }

    /// Append a classification event for a document. Does not retroactively
    /// relabel any fragment already produced under an earlier classification.
    pub fn put_classification(&self, classification: Classification) {
        self.classifications.entry(classification.document_id.clone()).or_default().push(classification);
    }

    /// Insert or replace a fragment.
    pub fn put_fragment(&self, fragment: Fragment) {
        self.fragments.insert(fragment.id.clone(), fragment);
    }

    /// Record a permission for a subject.
    pub fn put_permission(&self, permission: Permission) {
        self.permissions.entry(permission.subject_id.clone()).or_default().push(permission);
    }

    /// Insert or replace a retention rule, keyed by `(label, source)`.
    pub fn put_retention_rule(&self, rule: RetentionRule) {
        self.retention_rules.insert((rule.label, rule.source.clone()), rule);
    }

    /// The most recent classification's label for a document, if any have
    /// been recorded. Current label per `spec.md` §3 is the most recent by
    /// timestamp, not insertion order.
    #[must_use]
    pub fn current_label(&self, document_id: &str) -> Option<Label> {
        self.classifications
            .get(document_id)
            .and_then(|events| events.iter().max_by_key(|c| c.timestamp).map(|c| c.label))
    }

    /// Whether `document_id` falls under an active legal hold, consulting
    /// the most specific retention rule on file (`source`-specific, then
    /// the `"*"` wildcard).
    #[must_use]
    pub fn under_legal_hold(&self, document_id: &str) -> bool {
        let Some(document) = self.documents.get(document_id) else { return false };
        let Some(label) = self.current_label(document_id) else { return false };
        self.retention_rules
            .get(&(label, document.source.clone()))
            .or_else(|| self.retention_rules.get(&(label, "*".to_string())))
            .is_some_and(|rule| rule.legal_hold)
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn load_subject(&self, id: &str) -> Result<Subject, CoreError> {
        self.subjects.get(id).map(|entry| entry.value().clone()).ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    async fn pre_filter_fragments(
        &self,
        tenant: &str,
        allowed_labels: &[Label],
        query_vec: &[f32],
        limit: usize,
    ) -> Result<Vec<FragmentCandidate>, CoreError> {
        if query_vec.is_empty() {
            return Err(CoreError::InvalidInput("query vector must not be empty".to_string()));
        }

        let mut candidates: Vec<FragmentCandidate> = self
            .fragments
            .iter()
            .filter_map(|entry| {
                let fragment = entry.value();
                if fragment.embedding.is_empty() || !allowed_labels.contains(&fragment.label) {
                    return None;
                }
                let document = self.documents.get(&fragment.document_id)?;
                if document.tenant != tenant {
                    return None;
                }
                let similarity = cosine_similarity(query_vec, &fragment.embedding)?;
                Some(FragmentCandidate {
                    fragment_id: fragment.id.clone(),
                    document_id: fragment.document_id.clone(),
                    text: fragment.text.clone(),
                    label: fragment.label,
                    source: document.source.clone(),
                    owner_id: document.owner_id.clone(),
                    tenant: document.tenant.clone(),
                    similarity,
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.fragment_id.cmp(&b.fragment_id))
        });
        candidates.truncate(limit);
        Ok(candidates)
    }

    async fn permissions_for_subject(&self, subject_id: &str) -> Result<Vec<Permission>, CoreError> {
        Ok(self.permissions.get(subject_id).map(|entry| entry.value().clone()).unwrap_or_default())
    }

    async fn retention_rule(&self, label: Label, source: &str) -> Option<RetentionRule> {
        self.retention_rules
            .get(&(label, source.to_string()))
            .or_else(|| self.retention_rules.get(&(label, "*".to_string())))
            .map(|entry| entry.value().clone())
    }
}
