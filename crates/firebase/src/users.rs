//! User profile repository and sign-in orchestration.

use chrono::Utc;
use serde_json::Map;
use tracing::{instrument, warn};

use timeless_strokes_core::{Email, PendingUser, Role, UserId, UserProfile};

use crate::Firebase;
use crate::auth::AuthSession;
use crate::conversions;
use crate::error::FirebaseError;
use crate::value::{string_value, timestamp_value};

/// Firestore collection holding account profiles, keyed by uid.
const USERS_COLLECTION: &str = "users";
/// Firestore collection holding invited-but-unregistered accounts.
const PENDING_USERS_COLLECTION: &str = "pendingUsers";

/// Repository for profile operations.
pub struct UsersStore<'a> {
    firebase: &'a Firebase,
    session_token: Option<&'a str>,
}

impl<'a> UsersStore<'a> {
    /// Repository acting without a caller identity (sign-in itself).
    #[must_use]
    pub const fn new(firebase: &'a Firebase) -> Self {
        Self {
            firebase,
            session_token: None,
        }
    }

    /// Repository acting on behalf of a signed-in identity.
    #[must_use]
    pub const fn with_session(firebase: &'a Firebase, session_token: &'a str) -> Self {
        Self {
            firebase,
            session_token: Some(session_token),
        }
    }

    /// Sign in against the identity provider and resolve the stored profile.
    ///
    /// The profile lookup runs with the fresh session's own token. A missing
    /// profile is an authentication failure - an identity without a profile
    /// has no standing in the app. On success the profile's `lastLogin` is
    /// stamped.
    ///
    /// # Errors
    ///
    /// Returns [`FirebaseError::Unauthenticated`] for bad credentials or a
    /// profile-less identity, and a classified error otherwise.
    #[instrument(skip(self, password))]
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(AuthSession, UserProfile), FirebaseError> {
        let session = self
            .firebase
            .auth()
            .sign_in_with_password(email, password)
            .await?;

        let profile = self
            .firebase
            .firestore()
            .get(USERS_COLLECTION, &session.uid, Some(&session.id_token))
            .await?
            .map(conversions::profile_from_document)
            .transpose()?
            .ok_or_else(|| {
                FirebaseError::Unauthenticated(
                    "user profile not found. Please contact an administrator".to_owned(),
                )
            })?;

        let mut fields = Map::new();
        fields.insert("lastLogin".to_owned(), timestamp_value(Utc::now()));
        self.firebase
            .firestore()
            .update_fields(
                USERS_COLLECTION,
                &session.uid,
                fields,
                Some(&session.id_token),
            )
            .await?;

        Ok((session, profile))
    }

    /// Create a provider account plus its profile document.
    ///
    /// # Errors
    ///
    /// Returns [`FirebaseError::Conflict`] for an already-registered email
    /// and a classified error otherwise.
    #[instrument(skip(self, password))]
    pub async fn create_account(
        &self,
        email: &Email,
        password: &str,
        display_name: &str,
        role: Role,
    ) -> Result<UserProfile, FirebaseError> {
        let session = self.firebase.auth().sign_up(email.as_str(), password).await?;

        let now = Utc::now();
        let fields =
            conversions::new_profile_fields(&session.uid, email.as_str(), display_name, role, now);
        self.firebase
            .firestore()
            .create_with_id(
                USERS_COLLECTION,
                &session.uid,
                fields,
                Some(&session.id_token),
            )
            .await?;

        Ok(UserProfile {
            uid: UserId::new(session.uid),
            email: email.to_string(),
            display_name: display_name.to_owned(),
            role,
            created_at: now,
            last_login: now,
        })
    }

    /// Fetch one profile by uid, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a classified [`FirebaseError`] on request failure.
    #[instrument(skip(self))]
    pub async fn get_profile(&self, uid: &UserId) -> Result<Option<UserProfile>, FirebaseError> {
        let document = self
            .firebase
            .firestore()
            .get(USERS_COLLECTION, uid.as_str(), self.session_token)
            .await?;

        document.map(conversions::profile_from_document).transpose()
    }

    /// Fetch all profiles, newest-first.
    ///
    /// # Errors
    ///
    /// Returns a classified [`FirebaseError`] if the listing request fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<UserProfile>, FirebaseError> {
        let documents = self
            .firebase
            .firestore()
            .list_all(USERS_COLLECTION, self.session_token)
            .await?;

        let mut profiles: Vec<UserProfile> = documents
            .into_iter()
            .filter_map(|document| {
                let id = document.id.clone();
                match conversions::profile_from_document(document) {
                    Ok(profile) => Some(profile),
                    Err(e) => {
                        warn!(uid = %id, error = %e, "skipping undecodable user profile");
                        None
                    }
                }
            })
            .collect();

        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles)
    }

    /// Change a profile's role. Field-level update; nothing else on the
    /// profile is touched.
    ///
    /// # Errors
    ///
    /// Returns a classified [`FirebaseError`] if the update is rejected.
    #[instrument(skip(self))]
    pub async fn update_role(&self, uid: &UserId, role: Role) -> Result<(), FirebaseError> {
        let mut fields = Map::new();
        fields.insert("role".to_owned(), string_value(&role.to_string()));

        self.firebase
            .firestore()
            .update_fields(USERS_COLLECTION, uid.as_str(), fields, self.session_token)
            .await
    }

    /// Delete a profile document. The provider account itself is left
    /// behind; without a profile it can no longer sign in to anything.
    ///
    /// # Errors
    ///
    /// Returns a classified [`FirebaseError`] if the delete is rejected.
    #[instrument(skip(self))]
    pub async fn delete(&self, uid: &UserId) -> Result<(), FirebaseError> {
        self.firebase
            .firestore()
            .delete(USERS_COLLECTION, uid.as_str(), self.session_token)
            .await
    }

    /// Fetch all invited-but-unregistered accounts.
    ///
    /// # Errors
    ///
    /// Returns a classified [`FirebaseError`] if the listing request fails.
    #[instrument(skip(self))]
    pub async fn list_pending(&self) -> Result<Vec<PendingUser>, FirebaseError> {
        let documents = self
            .firebase
            .firestore()
            .list_all(PENDING_USERS_COLLECTION, self.session_token)
            .await?;

        let mut pending: Vec<PendingUser> = documents
            .into_iter()
            .filter_map(|document| {
                let id = document.id.clone();
                match conversions::pending_user_from_document(document) {
                    Ok(user) => Some(user),
                    Err(e) => {
                        warn!(id = %id, error = %e, "skipping undecodable pending user");
                        None
                    }
                }
            })
            .collect();

        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pending)
    }
}
