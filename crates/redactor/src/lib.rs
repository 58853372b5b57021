//! Label-parameterized redaction of fragment text.
//!
//! A fixed, ordered catalog of patterns is compiled once at startup; malformed
//! patterns fail the construction, not a later redact call, so a service that
//! boots with a bad catalog never serves unredacted output. `Catalog::redact`
//! performs no I/O and never panics.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
mod error;
mod pattern;

pub use catalog::{Catalog, RedactionResult};
pub use error::RedactError;
pub use pattern::{Category, MaskStrategy, Pattern, PatternSpec};
