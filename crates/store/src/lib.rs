//! Persisted entities and the two retrieval shapes the rest of the core
//! needs: a single subject lookup and the label-aware, tenant-scoped,
//! similarity-ordered fragment pre-filter.
//!
//! The audit ledger is a separate concern (see the `audit-ledger` crate);
//! this crate only owns subjects, documents, classifications, fragments,
//! permissions, and retention rules.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod candidate;
mod memory;
mod similarity;

pub use candidate::FragmentCandidate;
pub use memory::InMemoryStore;
pub use similarity::cosine_similarity;

use async_trait::async_trait;
use gov_core::{CoreError, Label, Permission, RetentionRule, Subject};

/// Persisted state and the core's two retrieval shapes.
#[async_trait]
pub trait Store: Send + Sync {
    /// Load one subject by id.
    async fn load_subject(&self, id: &str) -> Result<Subject, CoreError>;

    /// Fragments whose `tenant` matches, whose `label` is in
    /// `allowed_labels`, and whose embedding is non-empty, ordered by
    /// descending similarity to `query_vec` with ties broken by fragment
    /// id, truncated to `limit`.
    async fn pre_filter_fragments(
        &self,
        tenant: &str,
        allowed_labels: &[Label],
        query_vec: &[f32],
        limit: usize,
    ) -> Result<Vec<FragmentCandidate>, CoreError>;

    /// Permissions recorded for a subject. Surfaced as-is; the policy
    /// engine interprets them, this core does not.
    async fn permissions_for_subject(&self, subject_id: &str) -> Result<Vec<Permission>, CoreError>;

    /// The retention rule for a `(label, source)` pair, if one is on file.
    async fn retention_rule(&self, label: Label, source: &str) -> Option<RetentionRule>;
}
