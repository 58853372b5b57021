//! The shape the retriever hands back per candidate, and the outcome of one
//! `retrieve` call.

use gov_core::{Decision, Label};

/// One evaluated candidate: the store's provenance plus the policy
/// adapter's decision for it.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentDecision {
    /// Fragment identifier.
    pub fragment_id: String,
    /// Parent document identifier.
    pub document_id: String,
    /// Fragment text, pre-redaction.
    pub text: String,
    /// Sensitivity label.
    pub label: Label,
    /// Similarity to the query, in `[0, 1]`.
    pub similarity: f64,
    /// The policy adapter's decision for `(subject, this fragment, action)`.
    pub decision: Decision,
}

/// Result of one `Retriever::retrieve` call.
#[derive(Debug, Clone, Default)]
pub struct RetrievalOutcome {
    /// Every candidate evaluated, in store order (similarity desc, id asc).
    /// The gateway audits `PDP_DECISION` once per entry here.
    pub decisions: Vec<FragmentDecision>,
    /// The subsequence of `decisions` with `Decision::Allow`, truncated to
    /// `top_k`.
    pub allowed: Vec<FragmentDecision>,
    /// `true` if any candidate's decision was `StepUp`.
    pub step_up_required: bool,
    /// `true` if fewer than `min_evidence` candidates were allowed (checked
    /// before the `top_k` truncation).
    pub insufficient_evidence: bool,
}
