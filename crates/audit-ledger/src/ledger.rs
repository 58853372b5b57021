//! Per-actor single-writer ledger and its in-memory reference implementation.
//!
//! Per the design note in `spec.md` §9 ("Per-subject audit chain under
//! concurrency"), each actor's chain is serialized through its own writer —
//! here a `tokio::Mutex` held in a `DashMap` keyed by actor, the same
//! per-key-lock shape the teacher used for per-run state. Chain order is
//! never reconstructed from insertion order: each record carries `prev_hash`
//! and the chain is walked explicitly on verify.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use gov_core::ids::{new_event_id, now_ms};
use tokio::sync::Mutex;

use crate::error::LedgerError;
use crate::record::{compute_hash, AuditAction, AuditRecord};

/// Result of a successful `emit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOutcome {
    /// Id assigned to the new record.
    pub event_id: String,
    /// Hash of the new record.
    pub hash: String,
}

/// Result of `verify`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyOutcome {
    /// `true` iff every record's stored hash matches its recomputed hash and
    /// every `prev_hash` matches the previous record's hash.
    pub valid: bool,
    /// Event ids whose `prev_hash` does not match the previous record's hash.
    pub broken_links: Vec<String>,
    /// Event ids whose recomputed hash does not match the stored hash.
    pub failed_hashes: Vec<String>,
}

/// Parameters for a single `emit` call.
#[derive(Debug, Clone)]
pub struct EmitRequest<'a> {
    /// Subject id whose chain this event belongs to.
    pub actor: &'a str,
    /// What happened.
    pub action: AuditAction,
    /// Object the action concerns, if any.
    pub object_id: Option<&'a str>,
    /// Kind of object.
    pub object_type: &'a str,
    /// Decision kind string, if this event carries one.
    pub decision: Option<&'a str>,
    /// Human-readable reason, if any.
    pub reason: Option<&'a str>,
    /// Structured context, canonicalized before hashing.
    pub metadata: serde_json::Value,
}

/// Append-only, tamper-evident, per-actor hash-chained audit trail.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Append one record to `request.actor`'s chain.
    async fn emit(&self, request: EmitRequest<'_>) -> Result<EmitOutcome, LedgerError>;

    /// Recompute and check the hash chain for `actor`'s full history.
    async fn verify(&self, actor: &str) -> Result<VerifyOutcome, LedgerError>;

    /// All records for `actor`, oldest first.
    async fn history(&self, actor: &str) -> Result<Vec<AuditRecord>, LedgerError>;
}

/// In-memory reference ledger. A durable backend (e.g. an append-only table
/// with an UPDATE/DELETE-rejecting trigger, per `spec.md` §4.4) is a drop-in
/// replacement behind the `Ledger` trait.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    chains: DashMap<String, Arc<Mutex<Vec<AuditRecord>>>>,
}

impl InMemoryLedger {
    /// Construct an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self { chains: DashMap::new() }
    }

    fn chain_for(&self, actor: &str) -> Arc<Mutex<Vec<AuditRecord>>> {
        self.chains.entry(actor.to_string()).or_insert_with(|| Arc::new(Mutex::new(Vec::new()))).clone()
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn emit(&self, request: EmitRequest<'_>) -> Result<EmitOutcome, LedgerError> {
        let chain = self.chain_for(request.actor);
        let mut records = chain.lock().await;

        let prev_hash = records.last().map(|r| r.hash.clone());
        let event_id = new_event_id();
        let ts = now_ms();

        let hash = compute_hash(
            &event_id,
            ts,
            request.actor,
            request.action,
            request.object_id,
            request.object_type,
            request.decision,
            request.reason,
            prev_hash.as_deref(),
            &request.metadata,
        );

        let record = AuditRecord {
            event_id: event_id.clone(),
            ts,
            actor: request.actor.to_string(),
            action: request.action,
            object_id: request.object_id.map(str::to_string),
            object_type: request.object_type.to_string(),
            decision: request.decision.map(str::to_string),
            reason: request.reason.map(str::to_string),
            metadata: request.metadata,
            prev_hash,
            hash: hash.clone(),
        };

        tracing::info!(
            event_id = %record.event_id,
            actor = %record.actor,
            action = %record.action,
            object_type = %record.object_type,
            hash = %record.hash,
            "audit event emitted"
        );

        records.push(record);
        Ok(EmitOutcome { event_id, hash })
    }

    async fn verify(&self, actor: &str) -> Result<VerifyOutcome, LedgerError> {
        let chain = self.chain_for(actor);
        let records = chain.lock().await;

        let mut outcome = VerifyOutcome { valid: true, broken_links: Vec::new(), failed_hashes: Vec::new() };
        let mut expected_prev: Option<String> = None;

        for record in records.iter() {
            if record.prev_hash != expected_prev {
                outcome.broken_links.push(record.event_id.clone());
                outcome.valid = false;
            }

            let recomputed = compute_hash(
                &record.event_id,
                record.ts,
                &record.actor,
                record.action,
                record.object_id.as_deref(),
                &record.object_type,
                record.decision.as_deref(),
                record.reason.as_deref(),
                record.prev_hash.as_deref(),
                &record.metadata,
            );
            if recomputed != record.hash {
                outcome.failed_hashes.push(record.event_id.clone());
                outcome.valid = false;
            }

            expected_prev = Some(record.hash.clone());
        }

        Ok(outcome)
    }

    async fn history(&self, actor: &str) -> Result<Vec<AuditRecord>, LedgerError> {
        let chain = self.chain_for(actor);
        let records = chain.lock().await;
        Ok(records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req<'a>(actor: &'a str, action: AuditAction) -> EmitRequest<'a> {
        EmitRequest {
            actor,
            action,
            object_id: None,
            object_type: "query",
            decision: None,
            reason: None,
            metadata: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn chain_links_successive_records() {
        let ledger = InMemoryLedger::new();
        let a = ledger.emit(req("alice", AuditAction::QueryIssued)).await.unwrap();
        let b = ledger.emit(req("alice", AuditAction::ResultReturned)).await.unwrap();

        let history = ledger.history("alice").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].hash, a.hash);
        assert_eq!(history[1].prev_hash.as_deref(), Some(a.hash.as_str()));
        assert_eq!(history[1].hash, b.hash);
    }

    #[tokio::test]
    async fn separate_actors_have_independent_chains() {
        let ledger = InMemoryLedger::new();
        ledger.emit(req("alice", AuditAction::QueryIssued)).await.unwrap();
        ledger.emit(req("bob", AuditAction::QueryIssued)).await.unwrap();

        let alice_history = ledger.history("alice").await.unwrap();
        let bob_history = ledger.history("bob").await.unwrap();
        assert_eq!(alice_history.len(), 1);
        assert_eq!(bob_history.len(), 1);
        assert!(alice_history[0].prev_hash.is_none());
        assert!(bob_history[0].prev_hash.is_none());
    }

    #[tokio::test]
    async fn verify_reports_valid_for_untouched_chain() {
        let ledger = InMemoryLedger::new();
        ledger.emit(req("alice", AuditAction::QueryIssued)).await.unwrap();
        ledger.emit(req("alice", AuditAction::PdpDecision)).await.unwrap();
        ledger.emit(req("alice", AuditAction::ResultReturned)).await.unwrap();

        let outcome = ledger.verify("alice").await.unwrap();
        assert!(outcome.valid);
        assert!(outcome.broken_links.is_empty());
        assert!(outcome.failed_hashes.is_empty());
    }

    #[tokio::test]
    async fn verify_detects_tampered_metadata() {
        let ledger = InMemoryLedger::new();
        ledger.emit(req("alice", AuditAction::QueryIssued)).await.unwrap();
        ledger.emit(req("alice", AuditAction::ResultReturned)).await.unwrap();

        // Simulate a privileged direct write bypassing the ledger API.
        let chain = ledger.chain_for("alice");
        {
            let mut records = chain.lock().await;
            records[0].metadata = serde_json::json!({"tampered": true});
        }

        let outcome = ledger.verify("alice").await.unwrap();
        assert!(!outcome.valid);
        assert_eq!(outcome.failed_hashes.len(), 1);
    }

    #[tokio::test]
    async fn empty_actor_verifies_as_valid() {
        let ledger = InMemoryLedger::new();
        let outcome = ledger.verify("nobody").await.unwrap();
        assert!(outcome.valid);
    }
}
