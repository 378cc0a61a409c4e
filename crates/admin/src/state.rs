//! Application state shared across handlers.

use std::sync::Arc;

use timeless_strokes_firebase::Firebase;

use crate::config::AdminConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds the configuration and the Firebase
/// protocol clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    firebase: Firebase,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: AdminConfig) -> Self {
        let firebase = Firebase::new(&config.firebase);
        Self {
            inner: Arc::new(AppStateInner { config, firebase }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the Firebase clients.
    #[must_use]
    pub fn firebase(&self) -> &Firebase {
        &self.inner.firebase
    }
}
