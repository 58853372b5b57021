//! Observation hooks for policy decisions: a pluggable observer callback plus
//! an in-process decision counter, mirroring the teacher's
//! `PolicyObserver`/`policy_metrics` pair so callers can wire in their own
//! dashboards without the adapter depending on any particular metrics crate.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, RwLock};

use gov_core::Decision;

/// Implemented by callers that want a side-channel notification on every
/// evaluated decision, in addition to whatever the caller does with the
/// returned [`Decision`] itself.
pub trait PolicyObserver: Send + Sync {
    /// Called once per [`crate::PolicyAdapter::evaluate`] call, after the
    /// decision has been computed.
    fn on_decision(&self, subject_id: &str, resource_id: &str, decision: &Decision);
}

static OBSERVER: OnceLock<RwLock<Option<Arc<dyn PolicyObserver>>>> = OnceLock::new();

/// Install or clear the process-global policy observer.
///
/// Passing `Some(..)` installs the observer; passing `None` clears it.
pub fn set_observer(observer: Option<Arc<dyn PolicyObserver>>) {
    let cell = OBSERVER.get_or_init(|| RwLock::new(None));
    let mut guard = cell.write().expect("policy observer lock poisoned");
    *guard = observer;
}

pub(crate) fn notify(subject_id: &str, resource_id: &str, decision: &Decision) {
    if let Some(cell) = OBSERVER.get() {
        if let Ok(guard) = cell.read() {
            if let Some(observer) = guard.as_ref() {
                observer.on_decision(subject_id, resource_id, decision);
            }
        }
    }
    policy_metrics().record(decision);
}

/// Low-cardinality, in-process counters for policy decisions keyed by kind
/// (`allow`/`deny`/`step_up`). Intended for tests and local observability,
/// not persisted across process restarts.
#[derive(Default)]
pub struct PolicyMetrics {
    inner: Mutex<HashMap<&'static str, u64>>,
}

impl PolicyMetrics {
    /// Current count for a decision kind.
    #[must_use]
    pub fn count(&self, kind: &str) -> u64 {
        self.inner.lock().expect("policy metrics lock poisoned").get(kind).copied().unwrap_or(0)
    }

    fn record(&self, decision: &Decision) {
        let kind = match decision {
            Decision::Allow => "allow",
            Decision::Deny { .. } => "deny",
            Decision::StepUp { .. } => "step_up",
        };
        let mut guard = self.inner.lock().expect("policy metrics lock poisoned");
        *guard.entry(kind).or_insert(0) += 1;
    }
}

static METRICS: OnceLock<PolicyMetrics> = OnceLock::new();

/// Access the process-global policy decision counters.
#[must_use]
pub fn policy_metrics() -> &'static PolicyMetrics {
    METRICS.get_or_init(PolicyMetrics::default)
}
