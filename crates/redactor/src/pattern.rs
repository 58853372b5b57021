//! Pattern specification: the declarative, deserializable form a catalog is
//! built from, and the compiled form the engine runs against.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RedactError;

/// The category a pattern belongs to, used by the label-parameterized
/// classification policy to decide which patterns apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Personally identifiable information.
    Pii,
    /// Protected health information.
    Phi,
}

/// How a matched substring is transformed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskStrategy {
    /// Replace the entire match with a fixed string.
    Fixed {
        /// Replacement text.
        replacement: String,
    },
    /// Keep the last `k` characters of the match, replacing the rest with
    /// `mask_char` repeated to the same length.
    KeepLast {
        /// Number of trailing characters to keep unmasked.
        k: usize,
        /// Character used to mask the remainder.
        mask_char: char,
    },
}

impl MaskStrategy {
    fn apply(&self, matched: &str) -> String {
        match self {
            MaskStrategy::Fixed { replacement } => replacement.clone(),
            MaskStrategy::KeepLast { k, mask_char } => {
                let chars: Vec<char> = matched.chars().collect();
                if chars.len() <= *k {
                    return matched.to_string();
                }
                let masked_len = chars.len() - k;
                let mut out = String::with_capacity(chars.len());
                out.extend(std::iter::repeat(*mask_char).take(masked_len));
                out.extend(&chars[masked_len..]);
                out
            }
        }
    }
}

/// Declarative catalog entry, the form loaded from YAML or hardcoded as the
/// built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternSpec {
    /// Stable identifier, reported in `patterns_matched` and audit metadata.
    pub id: String,
    /// Regular expression matched against fragment text.
    pub regex: String,
    /// Category this pattern belongs to.
    pub category: Category,
    /// How a match is transformed.
    pub mask: MaskStrategy,
}

/// Compiled pattern, ready to run.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub(crate) id: String,
    pub(crate) regex: Regex,
    pub(crate) category: Category,
    pub(crate) mask: MaskStrategy,
}

impl Pattern {
    /// Compile a spec, failing closed on an invalid regex or degenerate mask.
    pub fn compile(spec: PatternSpec) -> Result<Self, RedactError> {
        if let MaskStrategy::KeepLast { k: 0, .. } = &spec.mask {
            return Err(RedactError::ZeroKeepLast(spec.id));
        }
        let regex = Regex::new(&spec.regex)
            .map_err(|source| RedactError::InvalidPattern { id: spec.id.clone(), source })?;
        Ok(Pattern { id: spec.id, regex, category: spec.category, mask: spec.mask })
    }

    /// Replace every match in `text` with this pattern's mask, returning the
    /// new text and whether anything changed.
    pub(crate) fn apply(&self, text: &str) -> (String, bool) {
        let mut changed = false;
        let replaced = self
            .regex
            .replace_all(text, |caps: &regex::Captures<'_>| {
                changed = true;
                self.mask.apply(&caps[0])
            })
            .into_owned();
        (replaced, changed)
    }
}
