//! Customer Intake library.
//!
//! This crate provides the intake service as a library, allowing it to be
//! tested and reused. The binary in `main.rs` only wires configuration,
//! tracing and the listener around [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the spreadsheet.
async fn health() -> &'static str {
    "ok"
}
