//! Cloud Storage for Firebase REST v0 object client.
//!
//! Uploads land under the configured bucket; the returned value is a
//! retrievable download URL carrying the object's access token, which is what
//! gets stored on the order document.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::instrument;

use crate::config::FirebaseConfig;
use crate::error::FirebaseError;

/// Client for the storage bucket's object endpoints.
#[derive(Clone)]
pub struct StorageClient {
    inner: Arc<StorageClientInner>,
}

struct StorageClientInner {
    client: reqwest::Client,
    /// `.../v0/b/{bucket}`
    root: String,
    api_key: SecretString,
}

impl StorageClient {
    /// Create a new object-store client for the configured bucket.
    #[must_use]
    pub fn new(config: &FirebaseConfig) -> Self {
        Self {
            inner: Arc::new(StorageClientInner {
                client: reqwest::Client::new(),
                root: config.storage_root(),
                api_key: config.api_key.clone(),
            }),
        }
    }

    /// Upload one object and resolve its download URL.
    ///
    /// # Errors
    ///
    /// Returns a classified [`FirebaseError`] if the upload is rejected or
    /// the metadata response cannot be decoded.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, FirebaseError> {
        let url = format!("{}/o", self.inner.root);
        let response = self
            .inner
            .client
            .post(&url)
            .query(&[
                ("uploadType", "media"),
                ("name", path),
                ("key", self.inner.api_key.expose_secret()),
            ])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(FirebaseError::classify(status.as_u16(), &text));
        }

        let metadata: Value = serde_json::from_str(&text)?;
        Ok(self.download_url(path, &metadata))
    }

    /// Resolve the public download URL for an uploaded object.
    ///
    /// Objects uploaded through the app get a per-object access token in
    /// their metadata (`downloadTokens`); without one the bare media URL is
    /// returned and access is governed by storage rules alone.
    fn download_url(&self, path: &str, metadata: &Value) -> String {
        let encoded = urlencoding::encode(path);
        let base = format!("{}/o/{encoded}?alt=media", self.inner.root);

        match metadata
            .get("downloadTokens")
            .and_then(Value::as_str)
            .and_then(|tokens| tokens.split(',').next())
            .filter(|token| !token.is_empty())
        {
            Some(token) => format!("{base}&token={token}"),
            None => base,
        }
    }
}
