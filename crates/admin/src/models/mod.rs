//! Session-facing models for the admin dashboard.

pub mod session;

pub use session::{CurrentUser, session_keys};
