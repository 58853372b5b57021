//! The closed decision variant every policy-aware component speaks in.
//!
//! Per the redesign note in `spec.md` §9 ("Dispatch across decision kinds"),
//! this replaces the temptation to carry separate `allowed: bool` /
//! `step_up: bool` flags: every consumer must handle all three arms.

use serde::{Deserialize, Serialize};

/// Outcome of evaluating one `(subject, resource, action)` triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decision {
    /// Permit the action.
    Allow,
    /// Block the action.
    Deny {
        /// Human-readable reason.
        reason: String,
        /// Identifier of the rule that produced this decision, if any.
        rule_id: Option<String>,
    },
    /// A second factor is required before the action can be permitted.
    StepUp {
        /// Human-readable reason.
        reason: String,
        /// Identifier of the rule that produced this decision, if any.
        rule_id: Option<String>,
    },
}

impl Decision {
    /// A deny with the given reason and no rule attribution.
    #[must_use]
    pub fn deny(reason: impl Into<String>) -> Self {
        Decision::Deny { reason: reason.into(), rule_id: None }
    }

    /// A deny attributed to a specific rule.
    #[must_use]
    pub fn deny_rule(reason: impl Into<String>, rule_id: impl Into<String>) -> Self {
        Decision::Deny { reason: reason.into(), rule_id: Some(rule_id.into()) }
    }

    /// A step-up requirement with the given reason.
    #[must_use]
    pub fn step_up(reason: impl Into<String>) -> Self {
        Decision::StepUp { reason: reason.into(), rule_id: None }
    }

    /// `true` iff this is `Decision::Allow`.
    #[must_use]
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// `true` iff this is `Decision::StepUp`.
    #[must_use]
    pub fn is_step_up(&self) -> bool {
        matches!(self, Decision::StepUp { .. })
    }

    /// Low-cardinality kind string, for logs and metrics.
    #[must_use]
    pub fn kind_str(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Deny { .. } => "deny",
            Decision::StepUp { .. } => "step_up",
        }
    }

    /// The reason string, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Decision::Allow => None,
            Decision::Deny { reason, .. } | Decision::StepUp { reason, .. } => Some(reason),
        }
    }

    /// The attributed rule id, if any.
    #[must_use]
    pub fn rule_id(&self) -> Option<&str> {
        match self {
            Decision::Allow => None,
            Decision::Deny { rule_id, .. } | Decision::StepUp { rule_id, .. } => {
                rule_id.as_deref()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_str_matches_variant() {
        assert_eq!(Decision::Allow.kind_str(), "allow");
        assert_eq!(Decision::deny("x").kind_str(), "deny");
        assert_eq!(Decision::step_up("x").kind_str(), "step_up");
    }
}
