//! Core types for Timeless Strokes.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod order;
pub mod status;
pub mod user;

pub use email::{Email, EmailError};
pub use id::*;
pub use order::*;
pub use status::*;
pub use user::*;
