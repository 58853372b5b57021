//! Shared application state, composed once at startup and cloned cheaply
//! into every request handler — the same `#[derive(Clone)]` +
//! `Arc`-wrapped-services shape as the corpus's `ob-poc-web::state::AppState`.

use std::sync::Arc;

use audit_ledger::Ledger;
use policy_adapter::PolicyAdapter;
use redactor::Catalog;
use retriever::Retriever;
use session::SessionStore;
use store::Store;

use crate::config::GatewayConfig;
use crate::unauth_counter::UnauthCounter;

/// Everything a request handler needs, behind one cheap clone.
#[derive(Clone)]
pub struct AppState {
    /// Persisted entities and the pre-filter.
    pub store: Arc<dyn Store>,
    /// Hash-chained per-actor audit trail.
    pub ledger: Arc<dyn Ledger>,
    /// Step-up assertion store.
    pub sessions: SessionStore,
    /// The filter-then-authorize pipeline, bound to `store` and the policy
    /// adapter at construction time.
    pub retriever: Arc<Retriever>,
    /// Compiled redaction pattern catalog.
    pub catalog: Arc<Catalog>,
    /// Static runtime configuration.
    pub config: Arc<GatewayConfig>,
    /// Aggregated counter for rejected-unauthenticated requests.
    pub unauth_counter: Arc<UnauthCounter>,
}

impl AppState {
    /// Compose the gateway's shared state from its constituent services.
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        ledger: Arc<dyn Ledger>,
        policy: Arc<PolicyAdapter>,
        catalog: Arc<Catalog>,
        config: GatewayConfig,
    ) -> Self {
        let retriever = Arc::new(Retriever::new(Arc::clone(&store), policy));
        Self {
            store,
            ledger,
            sessions: SessionStore::new(),
            retriever,
            catalog,
            config: Arc::new(config),
            unauth_counter: Arc::new(UnauthCounter::default()),
        }
    }
}
