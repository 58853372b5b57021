#![allow(clippy::module_name_repetitions)]

use once_cell::sync::OnceCell;
use opentelemetry::global;
use opentelemetry::metrics::{Counter, Meter};
use opentelemetry::KeyValue;

use gov_core::Decision;

struct Instruments {
    counter: Counter<u64>,
}

static INSTR: OnceCell<Instruments> = OnceCell::new();

fn ensure_instruments() -> &'static Instruments {
    INSTR.get_or_init(|| {
        // Use the global meter provider (may be a no-op if OTLP not initialized).
        let meter: Meter = global::meter("gateway.policy");
        let counter = meter
            .u64_counter("policy.decision.count")
            .with_description("Policy decision counter")
            .init();
        Instruments { counter }
    })
}

/// OTel-backed observer for policy decisions, keyed by `(kind, rule_id)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct OtelDecisionObserver;

impl policy_adapter::PolicyObserver for OtelDecisionObserver {
    fn on_decision(&self, subject_id: &str, resource_id: &str, decision: &Decision) {
        let inst = ensure_instruments();
        let attrs = [
            KeyValue::new("kind", decision.kind_str().to_string()),
            KeyValue::new("rule_id", decision.rule_id().unwrap_or("none").to_string()),
            KeyValue::new("subject_id", subject_id.to_string()),
            KeyValue::new("resource_id", resource_id.to_string()),
        ];
        inst.counter.add(1, &attrs);
    }
}

/// Return an observer instance. Prefer a new value instead of `&'static` for simplicity.
#[must_use]
pub fn global() -> OtelDecisionObserver {
    let _ = ensure_instruments();
    OtelDecisionObserver
}
