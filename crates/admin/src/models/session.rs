//! The signed-in identity as stored in the session.

use serde::{Deserialize, Serialize};

use timeless_strokes_core::{Role, UserProfile};
use timeless_strokes_firebase::AuthSession;

/// Session storage keys.
pub mod session_keys {
    /// Key holding the [`super::CurrentUser`].
    pub const CURRENT_USER: &str = "current_user";
}

/// A resolved identity: provider session plus stored profile.
///
/// Built at sign-in time, when both halves are known. An identity whose
/// profile lookup failed never becomes a `CurrentUser` - it stays
/// unauthenticated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Provider account id.
    pub uid: String,
    pub email: String,
    pub display_name: String,
    /// Role from the stored profile; gates the dashboard.
    pub role: Role,
    /// Bearer credential attached to backend calls made for this identity.
    pub id_token: String,
}

impl CurrentUser {
    /// Combine the provider session with the resolved profile.
    #[must_use]
    pub fn from_sign_in(session: AuthSession, profile: &UserProfile) -> Self {
        Self {
            uid: session.uid,
            email: profile.email.clone(),
            display_name: profile.display_name.clone(),
            role: profile.role,
            id_token: session.id_token,
        }
    }

    /// Whether this identity may use the dashboard.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}
