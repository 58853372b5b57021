//! Gateway binary: wires the default in-memory backends behind the gateway
//! crate's `Router` and serves it over HTTP, following the same
//! `init_json_logging` + `axum::serve` startup shape as the corpus's
//! `ob-poc-web::main`.

use std::net::SocketAddr;
use std::sync::Arc;

use audit_ledger::{InMemoryLedger, Ledger};
use gateway::{AppState, GatewayConfig};
use policy_adapter::{AdapterConfig, LocalBackend, PolicyAdapter};
use redactor::Catalog;
use store::InMemoryStore;

#[tokio::main]
async fn main() {
    telemetry::init_json_logging();

    let config = GatewayConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "invalid configuration");
        std::process::exit(1);
    });

    let store: Arc<dyn store::Store> = Arc::new(InMemoryStore::new());
    let ledger: Arc<dyn Ledger> = Arc::new(InMemoryLedger::new());
    let policy = Arc::new(PolicyAdapter::new(
        Arc::new(LocalBackend::default()),
        AdapterConfig { timeout: config.policy_timeout(), ..AdapterConfig::default() },
    ));
    let catalog = Arc::new(Catalog::builtin());

    let state = AppState::new(store, ledger, policy, catalog, config);
    let app = gateway::router(state);

    let port: u16 = std::env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "governed retrieval gateway listening");
    let listener = tokio::net::TcpListener::bind(addr).await.expect("bind gateway listener");
    axum::serve(listener, app).await.expect("gateway server error");
}
