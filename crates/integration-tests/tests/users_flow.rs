//! Sign-in, account creation, and profile CRUD against the mock backend.

#![allow(clippy::unwrap_used)]

use serde_json::json;

use timeless_strokes_core::{Email, Role, UserId};
use timeless_strokes_firebase::{Firebase, FirebaseError, UsersStore};
use timeless_strokes_integration_tests::MockBackend;

fn profile_fields(email: &str, name: &str, role: &str) -> serde_json::Value {
    json!({
        "email": { "stringValue": email },
        "displayName": { "stringValue": name },
        "role": { "stringValue": role },
        "createdAt": { "timestampValue": "2026-01-01T00:00:00Z" },
        "lastLogin": { "timestampValue": "2026-01-01T00:00:00Z" },
    })
}

#[tokio::test]
async fn sign_in_without_a_profile_is_unauthenticated() {
    let backend = MockBackend::spawn().await;
    backend.state.add_account("ghost@example.com", "pw-123456", "uid-ghost");

    let firebase = Firebase::new(&backend.firebase_config());
    let result = UsersStore::new(&firebase)
        .sign_in("ghost@example.com", "pw-123456")
        .await;

    match result {
        Err(FirebaseError::Unauthenticated(reason)) => {
            assert!(reason.contains("contact an administrator"), "{reason}");
        }
        other => panic!("expected unauthenticated, got {other:?}"),
    }
}

#[tokio::test]
async fn sign_in_resolves_profile_and_stamps_last_login() {
    let backend = MockBackend::spawn().await;
    backend.state.add_account("owner@example.com", "pw-123456", "uid-owner");
    backend.state.seed(
        "users",
        "uid-owner",
        profile_fields("owner@example.com", "Shop Owner", "admin"),
    );

    let firebase = Firebase::new(&backend.firebase_config());
    let (session, profile) = UsersStore::new(&firebase)
        .sign_in("owner@example.com", "pw-123456")
        .await
        .unwrap();

    assert_eq!(session.uid, "uid-owner");
    assert_eq!(profile.role, Role::Admin);
    assert_eq!(profile.display_name, "Shop Owner");

    // lastLogin moved past the seeded value.
    let fields = backend.state.documents("users")["uid-owner"].clone();
    let stamped = fields["lastLogin"]["timestampValue"].as_str().unwrap();
    assert_ne!(stamped, "2026-01-01T00:00:00Z");
}

#[tokio::test]
async fn wrong_password_is_unauthenticated() {
    let backend = MockBackend::spawn().await;
    backend.state.add_account("owner@example.com", "pw-123456", "uid-owner");

    let firebase = Firebase::new(&backend.firebase_config());
    let result = UsersStore::new(&firebase)
        .sign_in("owner@example.com", "wrong")
        .await;
    assert!(matches!(result, Err(FirebaseError::Unauthenticated(_))));
}

#[tokio::test]
async fn create_account_registers_identity_and_profile() {
    let backend = MockBackend::spawn().await;
    let firebase = Firebase::new(&backend.firebase_config());
    let store = UsersStore::new(&firebase);

    let email = Email::parse("helper@example.com").unwrap();
    let profile = store
        .create_account(&email, "pw-123456", "Helper", Role::User)
        .await
        .unwrap();

    assert_eq!(profile.email, "helper@example.com");
    assert_eq!(profile.role, Role::User);

    // And the account can now sign in.
    let (_, signed_in) = store.sign_in("helper@example.com", "pw-123456").await.unwrap();
    assert_eq!(signed_in.display_name, "Helper");
}

#[tokio::test]
async fn duplicate_account_creation_conflicts() {
    let backend = MockBackend::spawn().await;
    backend.state.add_account("owner@example.com", "pw-123456", "uid-owner");

    let firebase = Firebase::new(&backend.firebase_config());
    let email = Email::parse("owner@example.com").unwrap();
    let result = UsersStore::new(&firebase)
        .create_account(&email, "pw-other", "Dup", Role::User)
        .await;

    assert!(matches!(result, Err(FirebaseError::Conflict(_))));
}

#[tokio::test]
async fn role_change_and_deletion_show_up_on_the_next_fetch() {
    let backend = MockBackend::spawn().await;
    backend.state.seed(
        "users",
        "uid-helper",
        profile_fields("helper@example.com", "Helper", "user"),
    );

    let firebase = Firebase::new(&backend.firebase_config());
    let store = UsersStore::new(&firebase);

    let before = store.list().await.unwrap();
    assert_eq!(before.first().map(|p| p.role), Some(Role::User));

    store
        .update_role(&UserId::new("uid-helper"), Role::Admin)
        .await
        .unwrap();

    // The list fetched before the mutation still holds the old role; only a
    // fresh fetch reflects the change.
    assert_eq!(before.first().map(|p| p.role), Some(Role::User));
    let after = store.list().await.unwrap();
    assert_eq!(after.first().map(|p| p.role), Some(Role::Admin));

    store.delete(&UserId::new("uid-helper")).await.unwrap();
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn pending_users_list_round_trips() {
    let backend = MockBackend::spawn().await;
    backend.state.seed(
        "pendingUsers",
        "invite-1",
        json!({
            "email": { "stringValue": "new@example.com" },
            "role": { "stringValue": "user" },
            "createdAt": { "timestampValue": "2026-02-01T00:00:00Z" },
        }),
    );

    let firebase = Firebase::new(&backend.firebase_config());
    let pending = UsersStore::new(&firebase).list_pending().await.unwrap();

    assert_eq!(pending.len(), 1);
    assert_eq!(pending.first().map(|p| p.email.as_str()), Some("new@example.com"));
}
