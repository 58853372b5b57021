//! Governed retrieval gateway: shared domain types and primitives.
//!
//! This crate has no I/O. It defines the entities and invariants from the
//! system's data model (subjects, documents, classifications, fragments,
//! permissions, retention rules) and the closed decision variant every
//! policy-aware component speaks in.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod decision;
pub mod error;
pub mod ids;
pub mod label;
pub mod types;

pub use decision::Decision;
pub use error::CoreError;
pub use label::Label;
pub use types::{
    Classification, Document, Fragment, Permission, RetentionRule, Subject, SubjectAttrs,
};

/// Action a subject may request against a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Read (retrieve) the fragment.
    Read,
    /// Export the fragment outside the system.
    Export,
}

impl Action {
    /// String form used on the wire to the external policy engine.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Export => "export",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
