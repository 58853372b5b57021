//! Step-up (second factor) session store.
//!
//! `Satisfied` returns `true` iff an `Assert` occurred within the last `ttl`
//! seconds for that subject. Storage is in-memory with periodic cleanup; an
//! external cache with TTL semantics is a drop-in replacement behind
//! [`SessionStore`]'s inherent methods, per the design note in `spec.md` §9
//! ("Shared session flag").

#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use gov_core::ids::now_ms;

/// Default TTL for a step-up assertion, per `spec.md` §9's recommendation.
pub const DEFAULT_TTL_SECONDS: u64 = 300;

/// TTL-bounded map of subject id to the millisecond timestamp at which its
/// most recent step-up assertion expires.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    expirations: Arc<DashMap<String, u64>>,
}

impl SessionStore {
    /// Construct an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { expirations: Arc::new(DashMap::new()) }
    }

    /// Record that `subject_id` satisfied the second factor now, valid for
    /// `ttl_s` seconds.
    pub fn assert(&self, subject_id: &str, ttl_s: u64) {
        let expires_at = now_ms().saturating_add(ttl_s.saturating_mul(1000));
        self.expirations.insert(subject_id.to_string(), expires_at);
    }

    /// `true` iff `subject_id` has an unexpired assertion.
    #[must_use]
    pub fn satisfied(&self, subject_id: &str) -> bool {
        match self.expirations.get(subject_id) {
            Some(expires_at) => now_ms() < *expires_at,
            None => false,
        }
    }

    /// Drop every expired entry. Called periodically by [`Self::spawn_cleanup`];
    /// exposed directly for tests and for callers that prefer to drive
    /// cleanup from their own scheduler.
    pub fn cleanup(&self) {
        let now = now_ms();
        self.expirations.retain(|_, expires_at| *expires_at > now);
    }

    /// Spawn a background task that calls [`Self::cleanup`] every `period`.
    /// Abort the returned handle to stop it.
    pub fn spawn_cleanup(&self, period: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(period);
            loop {
                tick.tick().await;
                store.cleanup();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unasserted_subject_is_not_satisfied() {
        let store = SessionStore::new();
        assert!(!store.satisfied("alice"));
    }

    #[test]
    fn asserted_subject_is_satisfied_immediately() {
        let store = SessionStore::new();
        store.assert("alice", 300);
        assert!(store.satisfied("alice"));
    }

    #[test]
    fn expired_assertion_is_not_satisfied() {
        let store = SessionStore::new();
        store.assert("alice", 0);
        std::thread::sleep(Duration::from_millis(5));
        assert!(!store.satisfied("alice"));
    }

    #[test]
    fn cleanup_removes_expired_entries_only() {
        let store = SessionStore::new();
        store.assert("alice", 0);
        store.assert("bob", 300);
        std::thread::sleep(Duration::from_millis(5));
        store.cleanup();
        assert_eq!(store.expirations.len(), 1);
        assert!(store.expirations.contains_key("bob"));
    }

    #[tokio::test]
    async fn spawn_cleanup_runs_in_background() {
        let store = SessionStore::new();
        store.assert("alice", 0);
        let handle = store.spawn_cleanup(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();
        assert!(!store.expirations.contains_key("alice"));
    }
}
