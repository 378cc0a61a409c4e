//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use timeless_strokes_firebase::FirebaseError;

/// Application-level error type for the public site.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend operation failed.
    #[error("Backend error: {0}")]
    Backend(#[from] FirebaseError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server-class errors to Sentry
        if server_class(&self) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Backend(err) => match err {
                FirebaseError::Network(_) => StatusCode::BAD_GATEWAY,
                FirebaseError::PermissionDenied(_) => StatusCode::FORBIDDEN,
                FirebaseError::NotFound(_) => StatusCode::NOT_FOUND,
                FirebaseError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
                FirebaseError::Conflict(_) => StatusCode::CONFLICT,
                FirebaseError::Parse(_)
                | FirebaseError::CorruptDocument { .. }
                | FirebaseError::Failed { .. } => StatusCode::BAD_GATEWAY,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // The taxonomy's messages already carry remediation hints; internal
        // detail stays out of the body.
        let message = match &self {
            Self::Backend(err) => err.to_string(),
            Self::BadRequest(msg) => msg.clone(),
            Self::Internal(_) => "Internal server error".to_owned(),
        };

        (status, message).into_response()
    }
}

/// Whether an error is worth a Sentry event (as opposed to client mistakes).
fn server_class(error: &AppError) -> bool {
    match error {
        AppError::Internal(_) => true,
        AppError::Backend(err) => !matches!(
            err,
            FirebaseError::Unauthenticated(_) | FirebaseError::Conflict(_)
        ),
        AppError::BadRequest(_) => false,
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(error: AppError) -> StatusCode {
        error.into_response().status()
    }

    #[test]
    fn test_taxonomy_status_codes() {
        assert_eq!(
            status_of(AppError::Backend(FirebaseError::PermissionDenied(
                "nope".to_owned()
            ))),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AppError::Backend(FirebaseError::NotFound("db".to_owned()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::BadRequest("missing field".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Internal("boom".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_permission_error_keeps_remediation_hint() {
        let error = AppError::Backend(FirebaseError::PermissionDenied("denied".to_owned()));
        assert!(error.to_string().contains("security rules"));
    }
}
