//! Cloud Firestore REST v1 document client.
//!
//! Collection-scoped create/get/list/update/delete over
//! `.../databases/(default)/documents`. Field values go through the
//! [`crate::value`] codec; this client deals only in decoded JSON.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value, json};
use tracing::{debug, instrument};

use crate::config::FirebaseConfig;
use crate::error::FirebaseError;
use crate::value::decode_fields;

/// Page size for listing; collections here are small, so this usually means
/// one request.
const LIST_PAGE_SIZE: u32 = 300;

/// A decoded Firestore document.
#[derive(Debug, Clone)]
pub struct Document {
    /// Document id (last segment of the resource name).
    pub id: String,
    /// Decoded field data as plain JSON.
    pub data: Value,
}

/// Client for the Firestore REST surface.
#[derive(Clone)]
pub struct FirestoreClient {
    inner: Arc<FirestoreClientInner>,
}

struct FirestoreClientInner {
    client: reqwest::Client,
    /// `.../v1/projects/{id}/databases/(default)/documents`
    root: String,
    api_key: SecretString,
}

impl FirestoreClient {
    /// Create a new Firestore client for the configured project.
    #[must_use]
    pub fn new(config: &FirebaseConfig) -> Self {
        Self {
            inner: Arc::new(FirestoreClientInner {
                client: reqwest::Client::new(),
                root: config.firestore_root(),
                api_key: config.api_key.clone(),
            }),
        }
    }

    /// Fetch every document in a collection, following page tokens.
    ///
    /// # Errors
    ///
    /// Returns a classified [`FirebaseError`] if the service rejects the
    /// request or a response cannot be decoded.
    #[instrument(skip(self, session_token))]
    pub async fn list_all(
        &self,
        collection: &str,
        session_token: Option<&str>,
    ) -> Result<Vec<Document>, FirebaseError> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let url = format!("{}/{collection}", self.inner.root);
            let mut request = self
                .request(self.inner.client.get(&url), session_token)
                .query(&[("pageSize", LIST_PAGE_SIZE.to_string())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let body = self.send(request).await?;
            if let Some(items) = body.get("documents").and_then(Value::as_array) {
                for item in items {
                    if let Some(doc) = parse_document(item) {
                        documents.push(doc);
                    }
                }
            }

            page_token = body
                .get("nextPageToken")
                .and_then(Value::as_str)
                .map(ToOwned::to_owned);
            if page_token.is_none() {
                break;
            }
        }

        debug!(collection, count = documents.len(), "listed documents");
        Ok(documents)
    }

    /// Fetch a single document, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a classified [`FirebaseError`] on any failure other than a
    /// missing document.
    #[instrument(skip(self, session_token))]
    pub async fn get(
        &self,
        collection: &str,
        id: &str,
        session_token: Option<&str>,
    ) -> Result<Option<Document>, FirebaseError> {
        let url = format!("{}/{collection}/{id}", self.inner.root);
        let request = self.request(self.inner.client.get(&url), session_token);

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        // A missing document and a missing database both report 404; only the
        // former is a normal outcome. The database case carries its own
        // status string and still classifies as NotFound for the caller of
        // list/create, but for point reads we treat any plain 404 as absent.
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(FirebaseError::classify(status.as_u16(), &text));
        }

        let body: Value = serde_json::from_str(&text)?;
        Ok(parse_document(&body))
    }

    /// Create a document with a service-generated id; returns the decoded
    /// document (including that id).
    ///
    /// # Errors
    ///
    /// Returns a classified [`FirebaseError`] if the write is rejected.
    #[instrument(skip(self, fields, session_token))]
    pub async fn create(
        &self,
        collection: &str,
        fields: Map<String, Value>,
        session_token: Option<&str>,
    ) -> Result<Document, FirebaseError> {
        let url = format!("{}/{collection}", self.inner.root);
        let request = self
            .request(self.inner.client.post(&url), session_token)
            .json(&json!({ "fields": fields }));

        let body = self.send(request).await?;
        parse_document(&body).ok_or_else(|| FirebaseError::Failed {
            status: 200,
            detail: "create response missing document name".to_owned(),
        })
    }

    /// Create (or overwrite) a document at a caller-chosen id.
    ///
    /// # Errors
    ///
    /// Returns a classified [`FirebaseError`] if the write is rejected.
    #[instrument(skip(self, fields, session_token))]
    pub async fn create_with_id(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
        session_token: Option<&str>,
    ) -> Result<(), FirebaseError> {
        let url = format!("{}/{collection}", self.inner.root);
        let request = self
            .request(self.inner.client.post(&url), session_token)
            .query(&[("documentId", id)])
            .json(&json!({ "fields": fields }));

        self.send(request).await?;
        Ok(())
    }

    /// Patch the named fields of a document, leaving the rest untouched.
    ///
    /// # Errors
    ///
    /// Returns a classified [`FirebaseError`] if the update is rejected.
    #[instrument(skip(self, fields, session_token))]
    pub async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
        session_token: Option<&str>,
    ) -> Result<(), FirebaseError> {
        let url = format!("{}/{collection}/{id}", self.inner.root);
        let mask: Vec<(&str, String)> = fields
            .keys()
            .map(|key| ("updateMask.fieldPaths", key.clone()))
            .collect();
        let request = self
            .request(self.inner.client.patch(&url), session_token)
            .query(&mask)
            .json(&json!({ "fields": fields }));

        self.send(request).await?;
        Ok(())
    }

    /// Delete a document.
    ///
    /// # Errors
    ///
    /// Returns a classified [`FirebaseError`] if the delete is rejected.
    #[instrument(skip(self, session_token))]
    pub async fn delete(
        &self,
        collection: &str,
        id: &str,
        session_token: Option<&str>,
    ) -> Result<(), FirebaseError> {
        let url = format!("{}/{collection}/{id}", self.inner.root);
        let request = self.request(self.inner.client.delete(&url), session_token);
        self.send(request).await?;
        Ok(())
    }

    /// Attach the project key and, when a caller session is provided, its
    /// bearer credential.
    fn request(
        &self,
        builder: reqwest::RequestBuilder,
        session_token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let builder = builder.query(&[("key", self.inner.api_key.expose_secret())]);
        match session_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and decode the JSON body, classifying failures.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, FirebaseError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(FirebaseError::classify(status.as_u16(), &text));
        }

        Ok(serde_json::from_str(&text)?)
    }
}

/// Decode a raw document body (resource name + typed fields).
fn parse_document(body: &Value) -> Option<Document> {
    let name = body.get("name")?.as_str()?;
    let id = name.rsplit('/').next()?.to_owned();
    let fields = body
        .get("fields")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    Some(Document {
        id,
        data: decode_fields(&fields),
    })
}
