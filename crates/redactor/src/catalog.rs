//! The ordered pattern catalog and the label-parameterized redact operation.

use std::collections::BTreeSet;

use gov_core::Label;

use crate::error::RedactError;
use crate::pattern::{Category, MaskStrategy, Pattern, PatternSpec};

/// Output of a redact call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionResult {
    /// Text after redaction (unchanged from input if `changed` is false).
    pub text: String,
    /// Ids of patterns that matched at least once.
    pub patterns_matched: BTreeSet<String>,
    /// Whether any substitution occurred.
    pub changed: bool,
}

/// An ordered, compiled set of redaction patterns.
///
/// No I/O and no panics on the hot path: a malformed catalog fails to
/// construct at all, so by the time a `Catalog` exists every pattern in it
/// is known to compile.
#[derive(Debug, Clone)]
pub struct Catalog {
    patterns: Vec<Pattern>,
}

impl Catalog {
    /// Compile a catalog from specs, in order, rejecting duplicate ids.
    pub fn from_specs(specs: Vec<PatternSpec>) -> Result<Self, RedactError> {
        let mut seen = std::collections::HashSet::new();
        let mut patterns = Vec::with_capacity(specs.len());
        for spec in specs {
            if !seen.insert(spec.id.clone()) {
                return Err(RedactError::DuplicateId(spec.id));
            }
            patterns.push(Pattern::compile(spec)?);
        }
        Ok(Catalog { patterns })
    }

    /// Parse and compile a catalog from a YAML document of `PatternSpec`s.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, RedactError> {
        let specs: Vec<PatternSpec> = serde_yaml::from_str(yaml)?;
        Self::from_specs(specs)
    }

    /// The built-in default catalog: email and SSN (PII), a medical record
    /// number and a bare diagnosis code (PHI).
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_specs(builtin_specs()).expect("builtin pattern specs are valid")
    }

    /// Which categories apply at a given label, per the classification
    /// policy: `Public` none, `Internal` PII only, `Confidential` PII+PHI,
    /// `Regulated` all patterns regardless of category.
    #[must_use]
    pub fn categories_for_label(label: Label) -> &'static [Category] {
        match label {
            Label::Public => &[],
            Label::Internal => &[Category::Pii],
            Label::Confidential | Label::Regulated => &[Category::Pii, Category::Phi],
        }
    }

    /// Redact `text` at `label`. Deterministic and idempotent:
    /// `redact(redact(t, l).text, l) == redact(t, l)`, because every mask
    /// strategy produces output that cannot match its own pattern again.
    #[must_use]
    pub fn redact(&self, text: &str, label: Label) -> RedactionResult {
        let allowed = Self::categories_for_label(label);
        if allowed.is_empty() {
            return RedactionResult {
                text: text.to_string(),
                patterns_matched: BTreeSet::new(),
                changed: false,
            };
        }

        let mut current = text.to_string();
        let mut matched = BTreeSet::new();
        for pattern in &self.patterns {
            if !allowed.contains(&pattern.category) {
                continue;
            }
            let (next, changed) = pattern.apply(&current);
            if changed {
                matched.insert(pattern.id.clone());
            }
            current = next;
        }

        let changed = !matched.is_empty();
        RedactionResult { text: current, patterns_matched: matched, changed }
    }
}

fn builtin_specs() -> Vec<PatternSpec> {
    vec![
        PatternSpec {
            id: "email".into(),
            regex: r"\b[\w.+-]+@[\w-]+\.[\w.-]+\b".into(),
            category: Category::Pii,
            mask: MaskStrategy::Fixed { replacement: "***@***.***".into() },
        },
        PatternSpec {
            id: "ssn".into(),
            regex: r"\b\d{3}-\d{2}-\d{4}\b".into(),
            category: Category::Pii,
            mask: MaskStrategy::Fixed { replacement: "XXX-XX-XXXX".into() },
        },
        PatternSpec {
            id: "phone".into(),
            regex: r"\b\d{3}[-.]\d{3}[-.]\d{4}\b".into(),
            category: Category::Pii,
            mask: MaskStrategy::KeepLast { k: 4, mask_char: 'X' },
        },
        PatternSpec {
            id: "mrn".into(),
            regex: r"\bMRN-\d{6,10}\b".into(),
            category: Category::Phi,
            mask: MaskStrategy::Fixed { replacement: "MRN-[REDACTED]".into() },
        },
        PatternSpec {
            id: "icd10".into(),
            regex: r"\b[A-TV-Z][0-9][0-9AB](?:\.[0-9A-TV-Z]{1,4})?\b".into(),
            category: Category::Phi,
            mask: MaskStrategy::Fixed { replacement: "[DX-REDACTED]".into() },
        },
    ]
}
