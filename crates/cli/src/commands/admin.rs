//! Account management commands.

use thiserror::Error;

use timeless_strokes_core::{Email, Role, UserId};
use timeless_strokes_firebase::{Firebase, FirebaseConfig, FirebaseError, UsersStore};

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Configuration is incomplete.
    #[error(transparent)]
    Config(#[from] timeless_strokes_firebase::ConfigError),

    /// Invalid role argument.
    #[error("invalid role: {0}. Valid roles: admin, user")]
    InvalidRole(String),

    /// Invalid email argument.
    #[error("invalid email: {0}")]
    InvalidEmail(String),

    /// Backend operation failed.
    #[error(transparent)]
    Backend(#[from] FirebaseError),
}

/// Create an account and its profile document.
///
/// # Errors
///
/// Returns [`AdminError`] for bad arguments, missing configuration, or a
/// rejected backend call (including an already-registered email).
pub async fn create(email: &str, password: &str, name: &str, role: &str) -> Result<(), AdminError> {
    let _ = dotenvy::dotenv();

    let email = Email::parse(email).map_err(|e| AdminError::InvalidEmail(e.to_string()))?;
    let role: Role = role
        .parse()
        .map_err(|_: String| AdminError::InvalidRole(role.to_owned()))?;

    let config = FirebaseConfig::from_env()?;
    let firebase = Firebase::new(&config);
    let users = UsersStore::new(&firebase);

    let profile = users.create_account(&email, password, name, role).await?;

    tracing::info!(
        uid = %profile.uid,
        email = %profile.email,
        role = %profile.role,
        "account created"
    );
    Ok(())
}

/// Change an existing profile's role, acting as a signed-in admin.
///
/// # Errors
///
/// Returns [`AdminError`] for bad arguments, missing configuration, failed
/// sign-in, or a rejected backend call.
pub async fn promote(
    uid: &str,
    role: &str,
    as_email: &str,
    as_password: &str,
) -> Result<(), AdminError> {
    let _ = dotenvy::dotenv();

    let role: Role = role
        .parse()
        .map_err(|_: String| AdminError::InvalidRole(role.to_owned()))?;

    let config = FirebaseConfig::from_env()?;
    let firebase = Firebase::new(&config);

    // Sign in as the acting admin; the role change runs under that session.
    let (session, acting_profile) = UsersStore::new(&firebase)
        .sign_in(as_email, as_password)
        .await?;
    if acting_profile.role != Role::Admin {
        return Err(AdminError::Backend(FirebaseError::PermissionDenied(
            format!("{} is not an admin", acting_profile.email),
        )));
    }

    let users = UsersStore::with_session(&firebase, &session.id_token);
    let uid = UserId::new(uid);
    users.update_role(&uid, role).await?;

    tracing::info!(uid = %uid, role = %role, "role updated");
    Ok(())
}
