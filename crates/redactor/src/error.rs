//! Catalog load errors. A bad pattern must fail closed at load time, never
//! at redact time.

use thiserror::Error;

/// Failure while compiling or validating a pattern catalog.
#[derive(Debug, Error)]
pub enum RedactError {
    /// A pattern's regex failed to compile.
    #[error("pattern '{id}' has invalid regex: {source}")]
    InvalidPattern {
        /// Offending pattern id.
        id: String,
        /// Underlying compile error.
        #[source]
        source: regex::Error,
    },

    /// Two patterns in the catalog share an id.
    #[error("duplicate pattern id: {0}")]
    DuplicateId(String),

    /// The catalog source was not valid YAML.
    #[error("malformed catalog YAML: {0}")]
    Malformed(#[from] serde_yaml::Error),

    /// A `keep_last` mask strategy specified `k = 0`, which degenerates to
    /// full masking and is rejected so authors use `fixed` instead.
    #[error("pattern '{0}' has keep_last k = 0; use a fixed mask instead")]
    ZeroKeepLast(String),
}
