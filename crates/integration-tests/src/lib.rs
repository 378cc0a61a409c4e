//! Test support: an in-process mock of the Firebase REST surfaces.
//!
//! The mock speaks just enough of the three protocols the product uses -
//! Firestore documents, Identity Toolkit accounts, Storage uploads - to let
//! the real clients run against it unmodified. Tests point the clients here
//! through the emulator host overrides in `FirebaseConfig`.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)]

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use secrecy::SecretString;
use serde_json::{Value, json};

use timeless_strokes_firebase::FirebaseConfig;
use timeless_strokes_firebase::config::EmulatorHosts;

/// A registered account in the mock identity provider.
#[derive(Debug, Clone)]
pub struct Account {
    pub uid: String,
    pub password: String,
}

/// Shared mutable state behind the mock.
#[derive(Default)]
pub struct MockState {
    /// collection -> document id -> typed `fields` object.
    collections: Mutex<HashMap<String, BTreeMap<String, Value>>>,
    /// email -> account.
    accounts: Mutex<HashMap<String, Account>>,
    /// Uploaded object names, in arrival order.
    uploads: Mutex<Vec<String>>,
    /// Uploads whose object name contains this marker are rejected.
    fail_upload_marker: Mutex<Option<String>>,
    next_id: AtomicU64,
}

impl MockState {
    /// Seed a document with already-typed fields.
    pub fn seed(&self, collection: &str, id: &str, fields: Value) {
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_owned())
            .or_default()
            .insert(id.to_owned(), fields);
    }

    /// Register an identity-provider account.
    pub fn add_account(&self, email: &str, password: &str, uid: &str) {
        self.accounts.lock().unwrap().insert(
            email.to_owned(),
            Account {
                uid: uid.to_owned(),
                password: password.to_owned(),
            },
        );
    }

    /// Reject any upload whose object name contains `marker`.
    pub fn fail_uploads_containing(&self, marker: &str) {
        *self.fail_upload_marker.lock().unwrap() = Some(marker.to_owned());
    }

    /// Snapshot of one collection's typed documents.
    #[must_use]
    pub fn documents(&self, collection: &str) -> BTreeMap<String, Value> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Names of every upload that reached the object store.
    #[must_use]
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    fn fresh_id(&self) -> String {
        format!("doc-{}", self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

/// A running mock backend.
pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl MockBackend {
    /// Bind the mock on an ephemeral port and serve it in the background.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState::default());
        let router = mock_router(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock listener");
        let addr = listener.local_addr().expect("mock listener addr");

        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self { addr, state }
    }

    /// A `FirebaseConfig` whose emulator overrides all point at this mock.
    #[must_use]
    pub fn firebase_config(&self) -> FirebaseConfig {
        let host = self.addr.to_string();
        FirebaseConfig {
            api_key: SecretString::from("test-api-key"),
            auth_domain: "mock.firebaseapp.test".to_owned(),
            project_id: "mock-project".to_owned(),
            storage_bucket: "mock-project.appspot.test".to_owned(),
            messaging_sender_id: "0".to_owned(),
            app_id: "1:0:web:mock".to_owned(),
            emulators: EmulatorHosts {
                firestore: Some(host.clone()),
                auth: Some(host.clone()),
                storage: Some(host),
            },
        }
    }
}

fn mock_router(state: Arc<MockState>) -> Router {
    Router::new()
        .route(
            "/v1/projects/{project}/databases/(default)/documents/{collection}",
            get(list_documents).post(create_document),
        )
        .route(
            "/v1/projects/{project}/databases/(default)/documents/{collection}/{id}",
            get(get_document).patch(patch_document).delete(delete_document),
        )
        .route(
            "/identitytoolkit.googleapis.com/v1/{endpoint}",
            post(account_endpoint),
        )
        .route("/v0/b/{bucket}/o", post(upload_object))
        .with_state(state)
}

fn document_name(project: &str, collection: &str, id: &str) -> String {
    format!("projects/{project}/databases/(default)/documents/{collection}/{id}")
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": { "code": 404, "message": "NOT_FOUND", "status": "NOT_FOUND" } })),
    )
        .into_response()
}

async fn list_documents(
    State(state): State<Arc<MockState>>,
    Path((project, collection)): Path<(String, String)>,
) -> Response {
    let documents: Vec<Value> = state
        .documents(&collection)
        .into_iter()
        .map(|(id, fields)| {
            json!({
                "name": document_name(&project, &collection, &id),
                "fields": fields,
            })
        })
        .collect();

    if documents.is_empty() {
        Json(json!({})).into_response()
    } else {
        Json(json!({ "documents": documents })).into_response()
    }
}

async fn create_document(
    State(state): State<Arc<MockState>>,
    Path((project, collection)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    let id = params
        .get("documentId")
        .cloned()
        .unwrap_or_else(|| state.fresh_id());
    let fields = body.get("fields").cloned().unwrap_or_else(|| json!({}));
    state.seed(&collection, &id, fields.clone());

    Json(json!({
        "name": document_name(&project, &collection, &id),
        "fields": fields,
    }))
    .into_response()
}

async fn get_document(
    State(state): State<Arc<MockState>>,
    Path((project, collection, id)): Path<(String, String, String)>,
) -> Response {
    match state.documents(&collection).get(&id) {
        Some(fields) => Json(json!({
            "name": document_name(&project, &collection, &id),
            "fields": fields,
        }))
        .into_response(),
        None => not_found(),
    }
}

async fn patch_document(
    State(state): State<Arc<MockState>>,
    Path((project, collection, id)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let mut collections = state.collections.lock().unwrap();
    let Some(fields) = collections
        .get_mut(&collection)
        .and_then(|docs| docs.get_mut(&id))
    else {
        return not_found();
    };

    // Merge the patched fields; the real service honors updateMask, and the
    // clients under test only ever send the masked fields.
    if let (Some(existing), Some(patch)) = (
        fields.as_object_mut(),
        body.get("fields").and_then(Value::as_object),
    ) {
        for (key, value) in patch {
            existing.insert(key.clone(), value.clone());
        }
    }

    Json(json!({
        "name": document_name(&project, &collection, &id),
        "fields": fields,
    }))
    .into_response()
}

async fn delete_document(
    State(state): State<Arc<MockState>>,
    Path((_project, collection, id)): Path<(String, String, String)>,
) -> Response {
    let mut collections = state.collections.lock().unwrap();
    let removed = collections
        .get_mut(&collection)
        .and_then(|docs| docs.remove(&id));
    match removed {
        Some(_) => Json(json!({})).into_response(),
        None => not_found(),
    }
}

async fn account_endpoint(
    State(state): State<Arc<MockState>>,
    Path(endpoint): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let email = body.get("email").and_then(Value::as_str).unwrap_or_default();
    let password = body
        .get("password")
        .and_then(Value::as_str)
        .unwrap_or_default();

    match endpoint.as_str() {
        "accounts:signInWithPassword" => {
            let accounts = state.accounts.lock().unwrap();
            match accounts.get(email) {
                Some(account) if account.password == password => Json(json!({
                    "localId": account.uid,
                    "email": email,
                    "idToken": format!("token-{}", account.uid),
                    "refreshToken": "refresh",
                    "expiresIn": "3600",
                }))
                .into_response(),
                _ => (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": { "code": 400, "message": "INVALID_LOGIN_CREDENTIALS" }
                    })),
                )
                    .into_response(),
            }
        }
        "accounts:signUp" => {
            let mut accounts = state.accounts.lock().unwrap();
            if accounts.contains_key(email) {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": { "code": 400, "message": "EMAIL_EXISTS" } })),
                )
                    .into_response();
            }
            let uid = format!("uid-{}", accounts.len() + 1);
            accounts.insert(
                email.to_owned(),
                Account {
                    uid: uid.clone(),
                    password: password.to_owned(),
                },
            );
            Json(json!({
                "localId": uid,
                "email": email,
                "idToken": format!("token-{uid}"),
                "refreshToken": "refresh",
                "expiresIn": "3600",
            }))
            .into_response()
        }
        _ => not_found(),
    }
}

async fn upload_object(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
    _body: Bytes,
) -> Response {
    let name = params.get("name").cloned().unwrap_or_default();

    let marker = state.fail_upload_marker.lock().unwrap().clone();
    if let Some(marker) = marker
        && name.contains(&marker)
    {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": { "code": 403, "message": "PERMISSION_DENIED", "status": "PERMISSION_DENIED" }
            })),
        )
            .into_response();
    }

    state.uploads.lock().unwrap().push(name.clone());
    Json(json!({ "name": name, "downloadTokens": "test-token" })).into_response()
}
