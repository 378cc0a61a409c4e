//! User profile types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{PendingUserId, UserId};
use super::status::Role;

/// A stored account profile, keyed by the identity provider's uid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: UserId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

impl UserProfile {
    /// Case-insensitive substring match over display name and email.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.display_name.to_lowercase().contains(&term)
            || self.email.to_lowercase().contains(&term)
    }
}

/// An invited identity with no completed sign-in yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingUser {
    pub id: PendingUserId,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_search() {
        let profile = UserProfile {
            uid: UserId::new("uid-1"),
            email: "painter@timelessstrokes.com".to_owned(),
            display_name: "Shop Owner".to_owned(),
            role: Role::Admin,
            created_at: Utc::now(),
            last_login: Utc::now(),
        };
        assert!(profile.matches_search("owner"));
        assert!(profile.matches_search("PAINTER"));
        assert!(!profile.matches_search("stranger"));
    }
}
