//! Remote hosting asset store.
//!
//! Uploads assets to a generic HTTP hosting endpoint via multipart POST.
//! The endpoint is expected to respond `200` with a JSON body containing
//! the public URL of the stored asset: `{"url": "https://..."}`.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::StoreError;

use super::AssetStore;

/// Expected response body from the remote hosting endpoint.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: Option<String>,
}

/// Asset store backed by an external hosting service.
///
/// This backend is best-effort by design: the publisher treats its
/// failures as warnings, never as publish failures.
#[derive(Debug, Clone)]
pub struct RemoteAssetStore {
    client: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl RemoteAssetStore {
    /// Create a store uploading to `endpoint`, optionally authenticating
    /// with a bearer `api_key`.
    pub fn new(endpoint: Url, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
        }
    }

    /// The configured upload endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl AssetStore for RemoteAssetStore {
    async fn put(&self, name: &str, data: Bytes, content_type: &str) -> Result<String, StoreError> {
        let part = reqwest::multipart::Part::bytes(data.to_vec())
            .file_name(name.to_string())
            .mime_str(content_type)
            .map_err(|e| StoreError::Upload(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .text("name", name.to_string())
            .part("file", part);

        let mut request = self.client.post(self.endpoint.clone()).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Upload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Upload(format!(
                "remote host returned status {}",
                status
            )));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Upload(e.to_string()))?;

        let url = body.url.ok_or(StoreError::MissingUrl)?;
        debug!(name = name, url = %url, "uploaded asset to remote host");
        Ok(url)
    }
}
