//! The shape `PreFilterFragments` returns: a fragment plus enough
//! document-derived provenance for the policy adapter to evaluate it
//! without a second lookup.

use gov_core::Label;

/// One fragment surfaced by the pre-filter, ordered by descending
/// `similarity` with ties broken by `fragment_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentCandidate {
    /// Fragment identifier.
    pub fragment_id: String,
    /// Parent document identifier.
    pub document_id: String,
    /// Fragment text, pre-redaction.
    pub text: String,
    /// Denormalized label inherited from the document's classification at
    /// the time this fragment was produced.
    pub label: Label,
    /// Parent document's source tag.
    pub source: String,
    /// Parent document's owner subject id.
    pub owner_id: String,
    /// Parent document's tenant.
    pub tenant: String,
    /// `1 - cosine_distance(query_vec, fragment.embedding)`, clamped to `[0, 1]`.
    pub similarity: f64,
}
