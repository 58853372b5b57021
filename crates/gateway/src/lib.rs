//! Request entry point (`spec.md` §4.7): authenticates the token, loads the
//! subject, invokes the retriever, applies redaction, emits audit records,
//! and shapes the HTTP response.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
pub mod token;
pub mod unauth_counter;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use state::AppState;

/// Build the gateway's axum [`Router`], wired with tracing and permissive
/// CORS the same way the corpus's `ob-poc-web` binds its router — the
/// handful of endpoints in `spec.md` §6 do not need finer-grained CORS
/// policy than the teacher's development default.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth/token", post(routes::auth::issue_token))
        .route("/auth/step-up", post(routes::auth::step_up))
        .route("/search", post(routes::search::search))
        .route("/export", post(routes::export::export))
        .route("/audit/:subject_id", get(routes::audit::read_audit))
        .route("/health", get(routes::health::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
}
