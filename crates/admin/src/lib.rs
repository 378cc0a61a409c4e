//! Timeless Strokes Admin - Internal back-office dashboard.
//!
//! Serves the order/user/analytics dashboard behind a role gate: handlers
//! run only for a session whose stored profile carries the admin role.
//! Everything durable lives in the Firebase project; a dashboard request
//! fetches its full list fresh, and mutations reload the page (a full
//! re-fetch) rather than patching view state.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use axum::{Router, routing::get};

use state::AppState;

/// Build the admin application: routes plus the session layer.
#[must_use]
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .layer(session_layer)
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
