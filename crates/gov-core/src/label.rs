//! Sensitivity labels and the clearance order they form.

use serde::{Deserialize, Serialize};

/// Sensitivity classification label. Declaration order is the total order
/// `Public < Internal < Confidential < Regulated` (derived `Ord` relies on
/// this, so the variant order must never change).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    /// No restriction.
    Public,
    /// Internal-only.
    Internal,
    /// Confidential; requires elevated clearance.
    Confidential,
    /// Most sensitive; requires the highest clearance.
    Regulated,
}

impl Label {
    /// All labels in ascending order.
    pub const ALL: [Label; 4] =
        [Label::Public, Label::Internal, Label::Confidential, Label::Regulated];

    /// Parse from the lowercase wire form used in configuration and the
    /// policy engine wire contract.
    #[must_use]
    pub fn parse(s: &str) -> Option<Label> {
        match s {
            "public" => Some(Label::Public),
            "internal" => Some(Label::Internal),
            "confidential" => Some(Label::Confidential),
            "regulated" => Some(Label::Regulated),
            _ => None,
        }
    }

    /// Lowercase wire form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Public => "public",
            Label::Internal => "internal",
            Label::Confidential => "confidential",
            Label::Regulated => "regulated",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The labels a subject with the given clearance may see, in ascending
/// order: `public` -> `{Public}`, `internal` -> `{Public, Internal}`, and so
/// on up to `regulated` -> all four.
#[must_use]
pub fn allowed_labels(clearance: Label) -> Vec<Label> {
    Label::ALL.iter().copied().filter(|l| *l <= clearance).collect()
}
