//! Identity Toolkit REST v1 client (password sign-in and sign-up).

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::config::FirebaseConfig;
use crate::error::FirebaseError;

/// A signed-in identity as reported by the provider.
///
/// The ID token is the short-lived bearer credential attached to
/// document-store requests made on this identity's behalf. No refresh
/// handling: when the token expires the user signs in again.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The provider's stable account id (`localId`).
    pub uid: String,
    /// Email the account was registered with.
    pub email: String,
    /// Bearer credential for backend calls.
    pub id_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    id_token: String,
}

impl From<AccountResponse> for AuthSession {
    fn from(response: AccountResponse) -> Self {
        Self {
            uid: response.local_id,
            email: response.email,
            id_token: response.id_token,
        }
    }
}

/// Client for Identity Toolkit account endpoints.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<AuthClientInner>,
}

struct AuthClientInner {
    client: reqwest::Client,
    /// `.../v1` root for `accounts:*` endpoints.
    root: String,
    api_key: SecretString,
}

impl AuthClient {
    /// Create a new Identity Toolkit client.
    #[must_use]
    pub fn new(config: &FirebaseConfig) -> Self {
        Self {
            inner: Arc::new(AuthClientInner {
                client: reqwest::Client::new(),
                root: config.auth_root(),
                api_key: config.api_key.clone(),
            }),
        }
    }

    /// Exchange email + password for a session.
    ///
    /// # Errors
    ///
    /// Returns [`FirebaseError::Unauthenticated`] for bad credentials and a
    /// classified error otherwise.
    #[instrument(skip(self, password))]
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, FirebaseError> {
        self.account_call(
            "accounts:signInWithPassword",
            &json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }),
        )
        .await
    }

    /// Register a new account and return its session.
    ///
    /// # Errors
    ///
    /// Returns [`FirebaseError::Conflict`] if the email is already
    /// registered and a classified error otherwise.
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, FirebaseError> {
        self.account_call(
            "accounts:signUp",
            &json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }),
        )
        .await
    }

    async fn account_call(
        &self,
        endpoint: &str,
        payload: &serde_json::Value,
    ) -> Result<AuthSession, FirebaseError> {
        let url = format!("{}/{endpoint}", self.inner.root);
        let response = self
            .inner
            .client
            .post(&url)
            .query(&[("key", self.inner.api_key.expose_secret())])
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(classify_account_error(status.as_u16(), &text));
        }

        let account: AccountResponse = serde_json::from_str(&text)?;
        Ok(account.into())
    }
}

/// Identity Toolkit reports failures through error-message codes rather than
/// useful HTTP statuses; translate the ones sign-in and sign-up care about.
fn classify_account_error(status: u16, body: &str) -> FirebaseError {
    if body.contains("EMAIL_NOT_FOUND")
        || body.contains("INVALID_PASSWORD")
        || body.contains("INVALID_LOGIN_CREDENTIALS")
        || body.contains("USER_DISABLED")
    {
        return FirebaseError::Unauthenticated("invalid email or password".to_owned());
    }
    if body.contains("EMAIL_EXISTS") {
        return FirebaseError::Conflict("an account with this email already exists".to_owned());
    }
    if body.contains("WEAK_PASSWORD") {
        return FirebaseError::Conflict("password should be at least 6 characters".to_owned());
    }
    FirebaseError::classify(status, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_credentials_collapse_to_unauthenticated() {
        for code in ["EMAIL_NOT_FOUND", "INVALID_PASSWORD", "INVALID_LOGIN_CREDENTIALS"] {
            let body = format!(r#"{{"error":{{"code":400,"message":"{code}"}}}}"#);
            let err = classify_account_error(400, &body);
            assert!(
                matches!(err, FirebaseError::Unauthenticated(_)),
                "{code} should be unauthenticated, got {err:?}"
            );
        }
    }

    #[test]
    fn test_email_exists_is_a_conflict() {
        let body = r#"{"error":{"code":400,"message":"EMAIL_EXISTS"}}"#;
        assert!(matches!(
            classify_account_error(400, body),
            FirebaseError::Conflict(_)
        ));
    }

    #[test]
    fn test_other_errors_fall_through_to_classifier() {
        let err = classify_account_error(403, "PERMISSION_DENIED");
        assert!(matches!(err, FirebaseError::PermissionDenied(_)));
    }
}
