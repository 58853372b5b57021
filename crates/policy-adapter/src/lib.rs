//! Uniform client for the external policy decision point.
//!
//! Normalizes subject/resource/action into a backend call, enforces a
//! timeout with one jittered retry on transient failure, and converts the
//! backend's raw signal into a typed, closed [`gov_core::Decision`] — never
//! an error. A malfunctioning or unreachable backend degrades to deny, not
//! to a panic or an unhandled `Result`.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod adapter;
mod backend;
mod error;
mod http;
mod local;
mod observer;
mod resource;

pub use adapter::{AdapterConfig, PolicyAdapter};
pub use backend::{PolicyBackend, RawDecision, RawKind};
pub use error::BackendError;
pub use http::HttpBackend;
pub use local::{default_rules, Effect, LocalBackend, Predicate, Rule};
pub use observer::{policy_metrics, set_observer, PolicyMetrics, PolicyObserver};
pub use resource::PolicyResource;
