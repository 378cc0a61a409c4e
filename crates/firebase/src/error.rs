//! Error taxonomy for backend operations.
//!
//! Remote failures are classified into the handful of cases the UI actually
//! distinguishes; everything else lands in [`FirebaseError::Failed`] with the
//! underlying detail attached. All errors are terminal per-operation - no
//! retries, no backoff.

use thiserror::Error;

/// Errors from the Firebase REST surfaces.
#[derive(Debug, Error)]
pub enum FirebaseError {
    /// The request never completed (DNS, connect, timeout, TLS).
    #[error("network error: {0}. Please check your internet connection and try again")]
    Network(#[from] reqwest::Error),

    /// The service rejected the caller's access.
    #[error("access denied: {0}. Please check your Firestore security rules")]
    PermissionDenied(String),

    /// The backend resource does not exist - usually an unprovisioned
    /// project. Triggers the in-UI setup guide.
    #[error(
        "backend not found: {0}. Create a Firestore database in your Firebase project console"
    )]
    NotFound(String),

    /// The identity provider rejected the credentials, or no usable
    /// identity/profile exists.
    #[error("authentication failed: {0}")]
    Unauthenticated(String),

    /// The operation conflicts with existing state (duplicate account,
    /// disallowed status transition).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A response arrived but could not be decoded.
    #[error("invalid response from backend: {0}")]
    Parse(#[from] serde_json::Error),

    /// A stored document does not match any known shape.
    #[error("corrupt document {id}: {detail}")]
    CorruptDocument { id: String, detail: String },

    /// Anything else the service reported.
    #[error("operation failed: {detail} (HTTP {status})")]
    Failed { status: u16, detail: String },
}

impl FirebaseError {
    /// Classify a non-success REST response by status code and body.
    ///
    /// The Google APIs put a machine-readable status string inside the error
    /// body (`PERMISSION_DENIED`, `NOT_FOUND`, `UNAUTHENTICATED`, ...);
    /// prefer that over the bare HTTP code when present.
    #[must_use]
    pub fn classify(status: u16, body: &str) -> Self {
        let detail = extract_message(body).unwrap_or_else(|| truncate(body));

        if body.contains("PERMISSION_DENIED") || status == 403 {
            return Self::PermissionDenied(detail);
        }
        if body.contains("UNAUTHENTICATED") || status == 401 {
            return Self::Unauthenticated(detail);
        }
        if body.contains("NOT_FOUND") || status == 404 {
            return Self::NotFound(detail);
        }
        Self::Failed { status, detail }
    }

    /// Whether this error should render the backend setup guide.
    #[must_use]
    pub const fn needs_setup_guide(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Pull `error.message` out of a Google API error body, if present.
fn extract_message(body: &str) -> Option<String> {
    let parsed: serde_json::Value = serde_json::from_str(body).ok()?;
    parsed
        .get("error")?
        .get("message")?
        .as_str()
        .map(ToOwned::to_owned)
}

fn truncate(body: &str) -> String {
    body.chars().take(200).collect()
}
