//! Append-only, hash-chained audit trail.
//!
//! Every authorization-relevant event is written through [`Ledger::emit`]
//! before or immediately after the action it records. Chains are partitioned
//! per actor and linked by hash, not by storage insertion order, so tampering
//! with any single record is detectable by [`Ledger::verify`] without trusting
//! the storage layer's ordering guarantees.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod ledger;
mod record;

pub use error::LedgerError;
pub use ledger::{EmitOutcome, EmitRequest, InMemoryLedger, Ledger, VerifyOutcome};
pub use record::{compute_hash, AuditAction, AuditRecord};
