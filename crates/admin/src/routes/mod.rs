//! HTTP route handlers for the admin dashboard.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                - Health check (wired in lib)
//!
//! # Auth
//! GET  /login                 - Sign-in form
//! POST /login                 - Sign in with email + password
//! POST /logout                - Sign out
//!
//! # Dashboard (admin role required)
//! GET  /                      - Overview with per-status order counts
//! GET  /orders                - Orders table (search + status filter)
//! GET  /orders/{id}           - Order detail
//! POST /orders/{id}/status    - Move an order to a new status
//! GET  /users                 - Users table, pending invites, add-account form
//! POST /users                 - Create an account
//! POST /users/{uid}/role      - Change a profile's role
//! POST /users/{uid}/delete    - Delete a profile
//! GET  /analytics             - Revenue and volume aggregates
//! ```

use askama::Template;
use axum::{
    Router,
    response::Html,
    routing::{get, post},
};

use crate::state::AppState;

pub mod analytics;
pub mod auth;
pub mod dashboard;
pub mod orders;
pub mod users;

/// Build the dashboard router.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        // Dashboard
        .route("/", get(dashboard::index))
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/status", post(orders::update_status))
        .route("/users", get(users::index).post(users::create))
        .route("/users/{uid}/role", post(users::update_role))
        .route("/users/{uid}/delete", post(users::delete))
        .route("/analytics", get(analytics::index))
}

/// Backend setup guide, rendered in place of a view when the project's
/// document database has not been provisioned yet.
#[derive(Template)]
#[template(path = "setup_guide.html")]
struct SetupGuideTemplate {
    pub detail: String,
}

/// Render the setup guide for an unprovisioned-backend error.
pub(crate) fn setup_guide(detail: &str) -> Html<String> {
    let template = SetupGuideTemplate {
        detail: detail.to_owned(),
    };
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_owned()
    }))
}
