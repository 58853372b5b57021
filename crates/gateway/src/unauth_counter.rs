//! Aggregated counter for unauthenticated requests (`spec.md` §7: "no audit
//! except an aggregated rate-limited counter"). Logging is rate-limited per
//! window so a flood of bad tokens cannot itself become a log-amplification
//! vector; the running total is always tracked regardless.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use gov_core::ids::now_ms;

const WINDOW_MS: u64 = 60_000;
const MAX_LOGGED_PER_WINDOW: u64 = 100;

#[derive(Debug, Default)]
struct Window {
    started_at_ms: u64,
    count: u64,
}

/// Process-wide counter of rejected-for-no-or-bad-token requests.
#[derive(Debug, Default)]
pub struct UnauthCounter {
    total: AtomicU64,
    window: Mutex<Window>,
}

impl UnauthCounter {
    /// Record one unauthenticated request.
    pub fn record(&self) {
        let total = self.total.fetch_add(1, Ordering::Relaxed) + 1;
        let now = now_ms();
        let mut window = self.window.lock().expect("unauth counter lock poisoned");
        if now.saturating_sub(window.started_at_ms) > WINDOW_MS {
            window.started_at_ms = now;
            window.count = 0;
        }
        window.count += 1;
        if window.count <= MAX_LOGGED_PER_WINDOW {
            tracing::warn!(total, "unauthenticated request rejected");
        }
    }

    /// Total unauthenticated requests seen since process start.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}
