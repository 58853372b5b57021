//! Two-stage filter-then-authorize retrieval (`spec.md` §4.5): a store
//! pre-filter narrows candidates by tenant, label, and similarity; a
//! bounded-fan-out policy evaluation authorizes each one.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decision;
mod retriever;

pub use decision::{FragmentDecision, RetrievalOutcome};
pub use retriever::Retriever;
