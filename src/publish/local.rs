//! Local filesystem asset store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::StoreError;

use super::AssetStore;

/// Asset store backed by a directory of the local filesystem.
///
/// Files are written under `root` and addressed by joining the configured
/// public prefix with the file name, e.g. `/static/slices/<name>`. This is
/// the always-available primary backend.
#[derive(Debug, Clone)]
pub struct LocalAssetStore {
    root: PathBuf,
    public_prefix: String,
}

impl LocalAssetStore {
    /// Create a store rooted at `root`, addressing files under
    /// `public_prefix` (trailing slashes are stripped).
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        let public_prefix = public_prefix.into().trim_end_matches('/').to_string();
        Self {
            root: root.into(),
            public_prefix,
        }
    }

    /// Directory the store writes into.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path a given asset name maps to.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn put(
        &self,
        name: &str,
        data: Bytes,
        _content_type: &str,
    ) -> Result<String, StoreError> {
        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.path_for(name);
        tokio::fs::write(&path, &data).await?;

        let url = format!("{}/{}", self.public_prefix, name);
        debug!(path = %path.display(), url = %url, "stored asset locally");
        Ok(url)
    }
}
