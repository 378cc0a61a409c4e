//! Authentication route handlers: sign-in and sign-out.
//!
//! Sign-in goes to the identity provider, then resolves the stored profile;
//! only an identity with both halves lands in the session. The role check
//! itself happens at the gate, so a non-admin can sign in and will see the
//! access-denied page on dashboard routes.

use askama::Template;
use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use timeless_strokes_firebase::{FirebaseError, UsersStore};

use crate::error::AppError;
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Sign-in page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginPageTemplate {
    pub error: Option<String>,
}

/// Render the sign-in form.
///
/// GET /login
pub async fn login_page() -> impl IntoResponse {
    render_login(None)
}

/// Sign-in form fields.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Sign in with email and password.
///
/// POST /login
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let users = UsersStore::new(state.firebase());

    match users.sign_in(&form.email, &form.password).await {
        Ok((auth_session, profile)) => {
            let user = CurrentUser::from_sign_in(auth_session, &profile);
            set_current_user(&session, &user)
                .await
                .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
            Ok(Redirect::to("/").into_response())
        }
        // Wrong password and profile-less identity both land back on the
        // form with the reason shown.
        Err(FirebaseError::Unauthenticated(reason)) => {
            Ok(render_login(Some(reason)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Sign out and clear the session.
///
/// POST /logout
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = clear_current_user(&session).await;
    Redirect::to("/login")
}

fn render_login(error: Option<String>) -> Html<String> {
    let template = LoginPageTemplate { error };
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_owned()
    }))
}
