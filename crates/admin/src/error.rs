//! Unified error handling with Sentry integration.
//!
//! All dashboard handlers return `Result<T, AppError>`. Authentication
//! failures collapse to a redirect to the sign-in form; everything else maps
//! the backend taxonomy to a status code and a client-safe message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use timeless_strokes_firebase::FirebaseError;

/// Application-level error type for the admin dashboard.
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
        if server_class(&self) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // An expired or rejected identity means the session is no longer
        // usable; send the operator back to the sign-in form.
        if matches!(self, Self::Backend(FirebaseError::Unauthenticated(_))) {
            return Redirect::to("/login").into_response();
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

        let message = match &self {
            Self::Backend(err) => err.to_string(),
            Self::BadRequest(msg) => msg.clone(),
            Self::Internal(_) => "Internal server error".to_owned(),
        };

        (status, message).into_response()
    }
}

/// Whether an error is worth a Sentry event.
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

    #[test]
    fn test_unauthenticated_redirects_to_login() {
        let response = AppError::Backend(FirebaseError::Unauthenticated("expired".to_owned()))
            .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response
                .headers()
                .get(axum::http::header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/login")
        );
    }

    #[test]
    fn test_conflict_maps_to_409() {
        let response =
            AppError::Backend(FirebaseError::Conflict("email already exists".to_owned()))
                .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
