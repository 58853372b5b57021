//! Entities from the data model (`spec.md` §3).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::label::Label;

/// Typed attributes the policy adapter and gateway rely on, plus a
/// pass-through string bag for anything else the external policy engine
/// wants to see. Per the redesign note in `spec.md` §9 ("Dynamic user
/// attributes"), known fields are typed so the gateway stays deny-safe by
/// construction; everything else is opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectAttrs {
    /// Maximal label this subject may see.
    pub clearance: Label,
    /// Whether this subject may invoke the export action at all.
    pub allow_export: bool,
    /// Whether a second factor has been satisfied recently (populated by
    /// the gateway from the session store at request time, not stored).
    #[serde(default)]
    pub mfa_satisfied: bool,
    /// Pass-through string attributes forwarded to the policy engine as-is.
    #[serde(default)]
    pub extra: HashMap<String, String>,
}

impl SubjectAttrs {
    /// Construct attributes with no extra pass-through bag.
    #[must_use]
    pub fn new(clearance: Label, allow_export: bool) -> Self {
        Self { clearance, allow_export, mfa_satisfied: false, extra: HashMap::new() }
    }
}

/// An authenticated principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    /// Stable identifier.
    pub id: String,
    /// Contact email.
    pub email: String,
    /// Group memberships.
    pub groups: Vec<String>,
    /// Assurance level, 1..=3.
    pub assurance_level: u8,
    /// Typed + pass-through attribute bag.
    pub attrs: SubjectAttrs,
    /// Tenant this subject belongs to.
    pub tenant: String,
}

/// A document produced by the (external) corpus ingester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier.
    pub id: String,
    /// Source system tag (e.g. `"confluence"`, `"s3"`).
    pub source: String,
    /// Path or URI within the source.
    pub path: String,
    /// Human-readable title.
    pub title: String,
    /// MIME type.
    pub mime: String,
    /// Subject id of the owner.
    pub owner_id: String,
    /// Tenant this document belongs to. Immutable after creation.
    pub tenant: String,
}

/// One classification event for a document. A document may accumulate many
/// of these over time; the most recent is the document's current label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Document this classification applies to.
    pub document_id: String,
    /// Assigned sensitivity label.
    pub label: Label,
    /// Classifier confidence, expected in `[0, 1]`.
    pub confidence: f64,
    /// Why the classifier assigned this label.
    pub reason: String,
    /// When the classification was produced.
    pub timestamp: DateTime<Utc>,
}

/// The smallest retrieval unit: a contiguous span of a document with a
/// fixed-dimension embedding and a label inherited from the document's
/// current classification at the time the fragment was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Stable identifier.
    pub id: String,
    /// Parent document id.
    pub document_id: String,
    /// Ordinal position within the document.
    pub ordinal: u32,
    /// Fragment text.
    pub text: String,
    /// Fixed-dimension embedding vector.
    pub embedding: Vec<f32>,
    /// Label inherited at indexing time. Never downgraded after creation;
    /// re-indexing produces new fragments instead.
    pub label: Label,
}

/// A permission surfaced by the store for the external policy engine to
/// reason over. This crate does not interpret `relation`/`attributes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    /// Subject the permission is granted to.
    pub subject_id: String,
    /// Object the permission applies to (document or fragment id).
    pub object_id: String,
    /// Relation name (e.g. `"viewer"`, `"owner"`).
    pub relation: String,
    /// Free-form attributes the policy engine may consult.
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

/// Retention policy for a `(label, source)` pair, consulted by an external
/// reaper. The core only refuses to return fragments under legal hold when
/// policy evaluation requires it; otherwise retention is transparent here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionRule {
    /// Label this rule applies to.
    pub label: Label,
    /// Source system tag this rule applies to, or `"*"` for all sources.
    pub source: String,
    /// Days to retain before the external reaper may delete.
    pub days_to_live: u32,
    /// Whether documents under this rule are currently under legal hold.
    pub legal_hold: bool,
}
