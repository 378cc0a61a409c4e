//! Firebase project configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FIREBASE_API_KEY` - Web API key for the Firebase project
//! - `FIREBASE_AUTH_DOMAIN` - Auth domain (e.g. my-project.firebaseapp.com)
//! - `FIREBASE_PROJECT_ID` - Project identifier
//! - `FIREBASE_STORAGE_BUCKET` - Storage bucket (e.g. my-project.appspot.com)
//! - `FIREBASE_MESSAGING_SENDER_ID` - Cloud messaging sender id
//! - `FIREBASE_APP_ID` - Web app identifier
//!
//! ## Optional (emulator overrides, host:port)
//! - `FIRESTORE_EMULATOR_HOST`
//! - `FIREBASE_AUTH_EMULATOR_HOST`
//! - `FIREBASE_STORAGE_EMULATOR_HOST`
//!
//! All six required identifiers are checked together: startup reports the
//! full list of missing ones, not just the first.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// The six required identifier variables, in reporting order.
const REQUIRED_VARS: [&str; 6] = [
    "FIREBASE_API_KEY",
    "FIREBASE_AUTH_DOMAIN",
    "FIREBASE_PROJECT_ID",
    "FIREBASE_STORAGE_BUCKET",
    "FIREBASE_MESSAGING_SENDER_ID",
    "FIREBASE_APP_ID",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required identifiers are absent.
    #[error("missing Firebase configuration: {}", .0.join(", "))]
    MissingIdentifiers(Vec<String>),
}

/// Identifiers for the Firebase project backing the site.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct FirebaseConfig {
    /// Web API key, sent as the `key` query parameter on REST calls.
    pub api_key: SecretString,
    /// Auth domain for the project.
    pub auth_domain: String,
    /// Project identifier, used to derive the Firestore document root.
    pub project_id: String,
    /// Storage bucket name, used to derive the object root.
    pub storage_bucket: String,
    /// Cloud messaging sender id.
    pub messaging_sender_id: String,
    /// Web app identifier.
    pub app_id: String,
    /// Emulator host overrides for local development and tests.
    pub emulators: EmulatorHosts,
}

/// Optional `host:port` overrides redirecting each service at an emulator.
#[derive(Debug, Clone, Default)]
pub struct EmulatorHosts {
    pub firestore: Option<String>,
    pub auth: Option<String>,
    pub storage: Option<String>,
}

impl std::fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("api_key", &"[REDACTED]")
            .field("auth_domain", &self.auth_domain)
            .field("project_id", &self.project_id)
            .field("storage_bucket", &self.storage_bucket)
            .field("messaging_sender_id", &self.messaging_sender_id)
            .field("app_id", &self.app_id)
            .field("emulators", &self.emulators)
            .finish()
    }
}

impl FirebaseConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingIdentifiers`] listing every absent
    /// required variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: Vec<Option<String>> = REQUIRED_VARS
            .iter()
            .map(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
            .collect();

        let missing: Vec<String> = REQUIRED_VARS
            .iter()
            .zip(&values)
            .filter(|(_, value)| value.is_none())
            .map(|(key, _)| (*key).to_owned())
            .collect();

        if !missing.is_empty() {
            return Err(ConfigError::MissingIdentifiers(missing));
        }

        let mut values = values.into_iter().map(|v| v.unwrap_or_default());
        Ok(Self {
            api_key: SecretString::from(values.next().unwrap_or_default()),
            auth_domain: values.next().unwrap_or_default(),
            project_id: values.next().unwrap_or_default(),
            storage_bucket: values.next().unwrap_or_default(),
            messaging_sender_id: values.next().unwrap_or_default(),
            app_id: values.next().unwrap_or_default(),
            emulators: EmulatorHosts::from_env(),
        })
    }

    /// Expose the API key for use as the `key` query parameter.
    #[must_use]
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Root URL for Firestore document paths in this project's default
    /// database, without a trailing slash.
    #[must_use]
    pub fn firestore_root(&self) -> String {
        let origin = self.emulators.firestore.as_ref().map_or_else(
            || "https://firestore.googleapis.com".to_owned(),
            |host| format!("http://{host}"),
        );
        format!(
            "{origin}/v1/projects/{}/databases/(default)/documents",
            self.project_id
        )
    }

    /// Root URL for Identity Toolkit account endpoints.
    #[must_use]
    pub fn auth_root(&self) -> String {
        self.emulators.auth.as_ref().map_or_else(
            || "https://identitytoolkit.googleapis.com/v1".to_owned(),
            |host| format!("http://{host}/identitytoolkit.googleapis.com/v1"),
        )
    }

    /// Root URL for the project's storage bucket objects.
    #[must_use]
    pub fn storage_root(&self) -> String {
        let origin = self.emulators.storage.as_ref().map_or_else(
            || "https://firebasestorage.googleapis.com".to_owned(),
            |host| format!("http://{host}"),
        );
        format!("{origin}/v0/b/{}", self.storage_bucket)
    }
}

impl EmulatorHosts {
    fn from_env() -> Self {
        Self {
            firestore: std::env::var("FIRESTORE_EMULATOR_HOST").ok(),
            auth: std::env::var("FIREBASE_AUTH_EMULATOR_HOST").ok(),
            storage: std::env::var("FIREBASE_STORAGE_EMULATOR_HOST").ok(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> FirebaseConfig {
        FirebaseConfig {
            api_key: SecretString::from("AIzaTestKey123"),
            auth_domain: "banner-shop.firebaseapp.com".to_owned(),
            project_id: "banner-shop".to_owned(),
            storage_bucket: "banner-shop.appspot.com".to_owned(),
            messaging_sender_id: "123456789".to_owned(),
            app_id: "1:123456789:web:abcdef".to_owned(),
            emulators: EmulatorHosts::default(),
        }
    }

    #[test]
    fn test_firestore_root_production() {
        let config = test_config();
        assert_eq!(
            config.firestore_root(),
            "https://firestore.googleapis.com/v1/projects/banner-shop/databases/(default)/documents"
        );
    }

    #[test]
    fn test_roots_follow_emulator_overrides() {
        let mut config = test_config();
        config.emulators = EmulatorHosts {
            firestore: Some("127.0.0.1:8080".to_owned()),
            auth: Some("127.0.0.1:9099".to_owned()),
            storage: Some("127.0.0.1:9199".to_owned()),
        };
        assert_eq!(
            config.firestore_root(),
            "http://127.0.0.1:8080/v1/projects/banner-shop/databases/(default)/documents"
        );
        assert_eq!(
            config.auth_root(),
            "http://127.0.0.1:9099/identitytoolkit.googleapis.com/v1"
        );
        assert_eq!(
            config.storage_root(),
            "http://127.0.0.1:9199/v0/b/banner-shop.appspot.com"
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let output = format!("{:?}", test_config());
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("AIzaTestKey123"));
    }

    #[test]
    fn test_missing_identifiers_are_all_enumerated() {
        let err = ConfigError::MissingIdentifiers(vec![
            "FIREBASE_API_KEY".to_owned(),
            "FIREBASE_APP_ID".to_owned(),
        ]);
        assert_eq!(
            err.to_string(),
            "missing Firebase configuration: FIREBASE_API_KEY, FIREBASE_APP_ID"
        );
    }
}
