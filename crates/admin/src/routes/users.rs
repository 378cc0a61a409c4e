//! Users table, account creation, role changes, and deletion.

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use timeless_strokes_core::{Email, PendingUser, Role, UserId, UserProfile};
use timeless_strokes_firebase::UsersStore;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::auth::RequireAdmin;
use crate::routes::setup_guide;
use crate::state::AppState;

use super::dashboard::UserView;

/// Users list query parameters: search term and role filter.
#[derive(Debug, Default, Deserialize)]
pub struct UsersQuery {
    #[serde(default)]
    pub q: Option<String>,
    /// "admin", "user", or absent/"all" for no filter.
    #[serde(default)]
    pub role: Option<String>,
}

/// Filter a fetched profile list down to the query.
#[must_use]
pub fn apply_filters(profiles: &[UserProfile], query: &UsersQuery) -> Vec<UserProfile> {
    let role_filter: Option<Role> = query
        .role
        .as_deref()
        .filter(|r| *r != "all")
        .and_then(|r| r.parse().ok());

    profiles
        .iter()
        .filter(|profile| {
            let matches_search = query
                .q
                .as_deref()
                .is_none_or(|term| term.is_empty() || profile.matches_search(term));
            let matches_role = role_filter.is_none_or(|role| profile.role == role);
            matches_search && matches_role
        })
        .cloned()
        .collect()
}

/// Per-role profile counts for the stats cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleCounts {
    pub total: usize,
    pub admins: usize,
    pub users: usize,
    pub pending: usize,
}

impl RoleCounts {
    /// Tally profiles by role.
    #[must_use]
    pub fn tally(profiles: &[UserProfile], pending: &[PendingUser]) -> Self {
        let admins = profiles.iter().filter(|p| p.role == Role::Admin).count();
        Self {
            total: profiles.len(),
            admins,
            users: profiles.len() - admins,
            pending: pending.len(),
        }
    }
}

/// One row of the users table.
pub struct UserRow {
    pub uid: String,
    pub display_name: String,
    pub email: String,
    pub role: String,
    pub is_admin: bool,
    pub created: String,
    pub last_login: String,
}

impl From<&UserProfile> for UserRow {
    fn from(profile: &UserProfile) -> Self {
        Self {
            uid: profile.uid.to_string(),
            display_name: profile.display_name.clone(),
            email: profile.email.clone(),
            role: profile.role.to_string(),
            is_admin: profile.role == Role::Admin,
            created: profile.created_at.format("%Y-%m-%d").to_string(),
            last_login: profile.last_login.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// One row of the pending-invites list.
pub struct PendingRow {
    pub email: String,
    pub role: String,
    pub created: String,
}

impl From<&PendingUser> for PendingRow {
    fn from(pending: &PendingUser) -> Self {
        Self {
            email: pending.email.clone(),
            role: pending.role.to_string(),
            created: pending.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Users page template.
#[derive(Template)]
#[template(path = "users/index.html")]
pub struct UsersIndexTemplate {
    pub user: UserView,
    pub current_path: String,
    pub counts: RoleCounts,
    pub rows: Vec<UserRow>,
    pub pending: Vec<PendingRow>,
    pub search_value: String,
    pub role_value: String,
}

/// Users page handler.
///
/// GET /users
#[instrument(skip(user, state))]
pub async fn index(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<UsersQuery>,
) -> Result<Response> {
    let store = UsersStore::with_session(state.firebase(), &user.id_token);

    let profiles = match store.list().await {
        Ok(profiles) => profiles,
        Err(e) if e.needs_setup_guide() => return Ok(setup_guide(&e.to_string()).into_response()),
        Err(e) => return Err(e.into()),
    };

    // Pending invites are decorative next to the main table; a failure here
    // should not take the page down.
    let pending = store.list_pending().await.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch pending users: {e}");
        vec![]
    });

    let counts = RoleCounts::tally(&profiles, &pending);
    let rows = apply_filters(&profiles, &query).iter().map(UserRow::from).collect();
    let pending_rows = pending.iter().map(PendingRow::from).collect();

    let template = UsersIndexTemplate {
        user: UserView::from(&user),
        current_path: "/users".to_owned(),
        counts,
        rows,
        pending: pending_rows,
        search_value: query.q.unwrap_or_default(),
        role_value: query.role.unwrap_or_else(|| "all".to_owned()),
    };
    Ok(Html(render(template)).into_response())
}

/// Add-account form fields.
#[derive(Debug, Deserialize)]
pub struct CreateUserForm {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub role: String,
}

/// Create a provider account plus profile, then reload the users page.
///
/// POST /users
#[instrument(skip(user, state, form))]
pub async fn create(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Form(form): Form<CreateUserForm>,
) -> Result<Redirect> {
    let email = Email::parse(form.email.trim())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let role: Role = form
        .role
        .parse()
        .map_err(|e: String| AppError::BadRequest(e))?;
    let display_name = form.display_name.trim();
    if display_name.is_empty() {
        return Err(AppError::BadRequest("display name is required".to_owned()));
    }

    let store = UsersStore::with_session(state.firebase(), &user.id_token);
    store
        .create_account(&email, &form.password, display_name, role)
        .await?;

    Ok(Redirect::to("/users"))
}

/// Role-change form fields.
#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub role: String,
}

/// Change a profile's role, then reload the users page.
///
/// POST /users/{uid}/role
#[instrument(skip(user, state))]
pub async fn update_role(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Form(form): Form<RoleForm>,
) -> Result<Redirect> {
    let role: Role = form
        .role
        .parse()
        .map_err(|e: String| AppError::BadRequest(e))?;

    let store = UsersStore::with_session(state.firebase(), &user.id_token);
    store.update_role(&UserId::new(uid), role).await?;

    Ok(Redirect::to("/users"))
}

/// Delete a profile, then reload the users page.
///
/// POST /users/{uid}/delete
#[instrument(skip(user, state))]
pub async fn delete(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Redirect> {
    let store = UsersStore::with_session(state.firebase(), &user.id_token);
    store.delete(&UserId::new(uid)).await?;

    Ok(Redirect::to("/users"))
}

fn render<T: Template>(template: T) -> String {
    template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_owned()
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn profile(name: &str, role: Role) -> UserProfile {
        UserProfile {
            uid: UserId::new(name.to_lowercase()),
            email: format!("{}@example.com", name.to_lowercase()),
            display_name: name.to_owned(),
            role,
            created_at: Utc::now(),
            last_login: Utc::now(),
        }
    }

    #[test]
    fn test_role_counts() {
        let profiles = vec![
            profile("Owner", Role::Admin),
            profile("Helper", Role::User),
            profile("Helper2", Role::User),
        ];
        let counts = RoleCounts::tally(&profiles, &[]);
        assert_eq!(counts.total, 3);
        assert_eq!(counts.admins, 1);
        assert_eq!(counts.users, 2);
        assert_eq!(counts.pending, 0);
    }

    #[test]
    fn test_filter_by_role_and_search() {
        let profiles = vec![
            profile("Owner", Role::Admin),
            profile("Helper", Role::User),
        ];

        let query = UsersQuery {
            q: None,
            role: Some("admin".to_owned()),
        };
        let filtered = apply_filters(&profiles, &query);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.first().map(|p| p.display_name.as_str()), Some("Owner"));

        let query = UsersQuery {
            q: Some("helper".to_owned()),
            role: None,
        };
        assert_eq!(apply_filters(&profiles, &query).len(), 1);
    }
}
