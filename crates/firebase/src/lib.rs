//! Firebase REST access layer for Timeless Strokes.
//!
//! Every durable operation in the product - sign-in, document reads and
//! writes, image uploads - is delegated to Firebase over its public REST
//! surfaces:
//!
//! - Cloud Firestore v1 (`firestore.googleapis.com`) for the `orders`,
//!   `users`, and `pendingUsers` collections
//! - Identity Toolkit v1 (`identitytoolkit.googleapis.com`) for password
//!   sign-in and account creation
//! - Cloud Storage for Firebase v0 (`firebasestorage.googleapis.com`) for
//!   inspiration image uploads
//!
//! # Architecture
//!
//! [`Firebase`] bundles the three protocol clients behind one handle that is
//! cheap to clone into application state. Domain operations live in the
//! repository types ([`orders::OrdersStore`], [`users::UsersStore`]), which
//! borrow the handle plus an optional caller session - there is no ambient
//! "current user"; callers that act on behalf of a signed-in identity pass
//! that identity's session in explicitly.
//!
//! Emulator host overrides (`FIRESTORE_EMULATOR_HOST`,
//! `FIREBASE_AUTH_EMULATOR_HOST`, `FIREBASE_STORAGE_EMULATOR_HOST`) redirect
//! the derived endpoints; the integration tests point them at an in-process
//! mock.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
mod conversions;
pub mod error;
pub mod firestore;
pub mod orders;
pub mod storage;
pub mod users;
pub mod value;

pub use auth::{AuthClient, AuthSession};
pub use config::{ConfigError, FirebaseConfig};
pub use error::FirebaseError;
pub use firestore::{Document, FirestoreClient};
pub use orders::{InspirationUpload, NewOrderForm, OrdersStore};
pub use storage::StorageClient;
pub use users::UsersStore;

/// Bundle of the three Firebase protocol clients.
///
/// Cheap to clone (each client is `Arc`-backed); hold one per process in the
/// application state.
#[derive(Clone)]
pub struct Firebase {
    firestore: FirestoreClient,
    storage: StorageClient,
    auth: AuthClient,
}

impl Firebase {
    /// Build the protocol clients from configuration.
    #[must_use]
    pub fn new(config: &FirebaseConfig) -> Self {
        Self {
            firestore: FirestoreClient::new(config),
            storage: StorageClient::new(config),
            auth: AuthClient::new(config),
        }
    }

    /// The Firestore document client.
    #[must_use]
    pub const fn firestore(&self) -> &FirestoreClient {
        &self.firestore
    }

    /// The Storage object client.
    #[must_use]
    pub const fn storage(&self) -> &StorageClient {
        &self.storage
    }

    /// The Identity Toolkit client.
    #[must_use]
    pub const fn auth(&self) -> &AuthClient {
        &self.auth
    }
}
