//! HTTP route handlers for the public site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health        - Health check (wired in main)
//! GET  /              - Marketing and pricing page
//! GET  /order         - Order form
//! GET  /order/quote   - Live price quote for the current selections
//! POST /order         - Submit an order (multipart: fields + images)
//! ```

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub mod home;
pub mod order;

/// Build the site router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/order", get(order::form).post(order::submit))
        .route("/order/quote", get(order::quote_endpoint))
}
