//! Local-primary, remote-additive publish orchestration.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::error::{PublishError, StoreError};
use crate::map::Region;
use crate::slicer::Slice;

use super::{AssetStore, LocalAssetStore, RemoteAssetStore};

/// Default bound on concurrently dispatched publish operations.
pub const DEFAULT_PUBLISH_WORKERS: usize = 4;

/// Content type published for every slice.
const SLICE_CONTENT_TYPE: &str = "image/png";

/// Which backend produced the URL of a published asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Local filesystem store (the primary)
    Local,

    /// External hosting service (best-effort)
    Remote,
}

impl StorageBackend {
    /// Stable lowercase name, used in JSON responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Local => "local",
            StorageBackend::Remote => "remote",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A slice that has been persisted, paired with its fetchable URL.
#[derive(Debug, Clone)]
pub struct PublishedAsset {
    /// The region the underlying slice was cut from
    pub region: Region,

    /// Fetchable URL referencing the slice (remote when the remote upload
    /// succeeded, local otherwise)
    pub url: String,

    /// Backend that produced [`url`](Self::url)
    pub backend: StorageBackend,

    /// File name of the durable local artifact
    pub file_name: String,

    /// Path of the durable local artifact
    pub local_path: PathBuf,
}

/// Non-fatal events accumulated during publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishWarning {
    /// No remote host is configured; publishing is local-only this session
    RemoteUnconfigured,

    /// Remote upload failed; the local URL was retained
    RemoteFailed { region_index: usize, reason: String },

    /// The slice could not be persisted at all and was dropped
    SliceDropped { region_index: usize, reason: String },
}

impl fmt::Display for PublishWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishWarning::RemoteUnconfigured => {
                write!(f, "remote host not configured; publishing locally only")
            }
            PublishWarning::RemoteFailed {
                region_index,
                reason,
            } => write!(
                f,
                "remote upload failed for slice {} (local URL retained): {}",
                region_index, reason
            ),
            PublishWarning::SliceDropped {
                region_index,
                reason,
            } => write!(f, "slice {} dropped: {}", region_index, reason),
        }
    }
}

/// Result of publishing a batch of slices.
#[derive(Debug)]
pub struct PublishOutcome {
    /// Published assets in slice order
    pub assets: Vec<PublishedAsset>,

    /// Accumulated warnings
    pub warnings: Vec<PublishWarning>,
}

/// Publishes slices to local storage first, then mirrors them to the
/// remote host when one is configured.
///
/// The local write is the durable artifact and the only hard requirement;
/// remote hosting is additive. Batch publishing dispatches concurrently,
/// bounded by a small worker limit so the storage backends are not
/// overwhelmed.
#[derive(Clone)]
pub struct AssetPublisher {
    local: LocalAssetStore,
    remote: Option<RemoteAssetStore>,
    workers: usize,
}

impl AssetPublisher {
    /// Create a publisher over the given backends.
    pub fn new(local: LocalAssetStore, remote: Option<RemoteAssetStore>) -> Self {
        Self {
            local,
            remote,
            workers: DEFAULT_PUBLISH_WORKERS,
        }
    }

    /// Override the publish worker bound.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Whether a remote host is configured.
    pub fn remote_configured(&self) -> bool {
        self.remote.is_some()
    }

    /// The local store backing this publisher.
    pub fn local(&self) -> &LocalAssetStore {
        &self.local
    }

    /// Publish one named blob: local first, then best-effort remote.
    ///
    /// Returns the chosen URL, the backend that produced it, and the
    /// remote failure reason when the remote path was attempted and lost.
    ///
    /// # Errors
    ///
    /// Fails only when the local write fails.
    async fn publish_one(
        &self,
        name: &str,
        data: Bytes,
    ) -> Result<(String, StorageBackend, Option<String>), StoreError> {
        let local_url = self
            .local
            .put(name, data.clone(), SLICE_CONTENT_TYPE)
            .await?;

        if let Some(remote) = &self.remote {
            match remote.put(name, data, SLICE_CONTENT_TYPE).await {
                Ok(remote_url) => return Ok((remote_url, StorageBackend::Remote, None)),
                Err(e) => {
                    return Ok((local_url, StorageBackend::Local, Some(e.to_string())));
                }
            }
        }

        Ok((local_url, StorageBackend::Local, None))
    }

    /// Publish every slice of a session, concurrently with a bounded
    /// worker pool, preserving slice order in the returned assets.
    ///
    /// Slices whose local write fails are dropped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::NoPublishedAssets`] only when zero slices
    /// could be persisted.
    pub async fn publish_all(
        &self,
        session_id: &str,
        slices: &[Slice],
    ) -> Result<PublishOutcome, PublishError> {
        let mut warnings = Vec::new();

        if self.remote.is_none() {
            let warning = PublishWarning::RemoteUnconfigured;
            warn!("{}", warning);
            warnings.push(warning);
        }

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks: JoinSet<(usize, String, Result<_, StoreError>)> = JoinSet::new();

        for (pos, slice) in slices.iter().enumerate() {
            let data = match slice.encode_png() {
                Ok(data) => data,
                Err(e) => {
                    let warning = PublishWarning::SliceDropped {
                        region_index: slice.region.index,
                        reason: format!("PNG encoding failed: {}", e),
                    };
                    warn!("{}", warning);
                    warnings.push(warning);
                    continue;
                }
            };

            // Namespace artifact names by session so concurrent sessions
            // never collide in the shared static directory.
            let name = format!("{}_{}", session_id, slice.file_name());
            let publisher = self.clone();
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (
                        pos,
                        name,
                        Err(StoreError::Upload("publish worker pool closed".to_string())),
                    );
                };
                let result = publisher.publish_one(&name, data).await;
                (pos, name, result)
            });
        }

        let mut results: Vec<Option<(String, String, StorageBackend, Option<String>)>> =
            vec![None; slices.len()];

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((pos, name, Ok((url, backend, remote_failure)))) => {
                    results[pos] = Some((name, url, backend, remote_failure));
                }
                Ok((pos, _, Err(e))) => {
                    let warning = PublishWarning::SliceDropped {
                        region_index: slices[pos].region.index,
                        reason: e.to_string(),
                    };
                    warn!("{}", warning);
                    warnings.push(warning);
                }
                Err(join_err) => {
                    error!("publish task failed: {}", join_err);
                }
            }
        }

        let mut assets = Vec::new();
        for (pos, slot) in results.into_iter().enumerate() {
            let Some((name, url, backend, remote_failure)) = slot else {
                continue;
            };
            if let Some(reason) = remote_failure {
                let warning = PublishWarning::RemoteFailed {
                    region_index: slices[pos].region.index,
                    reason,
                };
                warn!("{}", warning);
                warnings.push(warning);
            }
            assets.push(PublishedAsset {
                region: slices[pos].region.clone(),
                url,
                backend,
                local_path: self.local.path_for(&name),
                file_name: name,
            });
        }

        if assets.is_empty() {
            return Err(PublishError::NoPublishedAssets {
                failed: slices.len(),
            });
        }

        debug!(
            published = assets.len(),
            warnings = warnings.len(),
            "published session slices"
        );
        info!(
            session_id = session_id,
            published = assets.len(),
            "slices published"
        );

        Ok(PublishOutcome { assets, warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slicer::{slice_regions, SourceImage};
    use httpmock::prelude::*;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;

    fn test_slices(count: usize) -> Vec<Slice> {
        let img = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            100,
            100 * count as u32,
            image::Rgba([1, 2, 3, 255]),
        ));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        let source = SourceImage::decode(&out.into_inner()).unwrap();

        let regions: Vec<Region> = (0..count)
            .map(|i| Region {
                index: i,
                left: 0,
                top: (i as i64) * 100,
                right: 100,
                bottom: (i as i64 + 1) * 100,
                href: Some(format!("https://example.com/{}", i)),
                alt: None,
                title: None,
            })
            .collect();

        slice_regions(&source, &regions).unwrap().slices
    }

    #[tokio::test]
    async fn test_local_only_publish_warns_once_about_remote() {
        let dir = tempfile::tempdir().unwrap();
        let publisher =
            AssetPublisher::new(LocalAssetStore::new(dir.path(), "/static/slices"), None);

        let outcome = publisher.publish_all("sess", &test_slices(3)).await.unwrap();

        assert_eq!(outcome.assets.len(), 3);
        assert_eq!(
            outcome
                .warnings
                .iter()
                .filter(|w| matches!(w, PublishWarning::RemoteUnconfigured))
                .count(),
            1
        );
        for (i, asset) in outcome.assets.iter().enumerate() {
            assert_eq!(asset.region.index, i);
            assert_eq!(asset.backend, StorageBackend::Local);
            assert_eq!(asset.url, format!("/static/slices/sess_slice_{}.png", i));
            assert!(asset.local_path.exists());
        }
    }

    #[tokio::test]
    async fn test_remote_success_wins_over_local_url() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/upload");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"url": "https://cdn.test/hosted.png"}"#);
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let remote = RemoteAssetStore::new(server.url("/upload").parse().unwrap(), None);
        let publisher = AssetPublisher::new(
            LocalAssetStore::new(dir.path(), "/static/slices"),
            Some(remote),
        );

        let outcome = publisher.publish_all("sess", &test_slices(1)).await.unwrap();

        assert_eq!(outcome.assets[0].backend, StorageBackend::Remote);
        assert_eq!(outcome.assets[0].url, "https://cdn.test/hosted.png");
        // Local artifact still exists as the durable copy
        assert!(outcome.assets[0].local_path.exists());
        assert!(outcome.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_to_local() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/upload");
                then.status(500);
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let remote = RemoteAssetStore::new(server.url("/upload").parse().unwrap(), None);
        let publisher = AssetPublisher::new(
            LocalAssetStore::new(dir.path(), "/static/slices"),
            Some(remote),
        );

        let outcome = publisher.publish_all("sess", &test_slices(2)).await.unwrap();

        assert_eq!(outcome.assets.len(), 2);
        for asset in &outcome.assets {
            assert_eq!(asset.backend, StorageBackend::Local);
        }
        assert_eq!(
            outcome
                .warnings
                .iter()
                .filter(|w| matches!(w, PublishWarning::RemoteFailed { .. }))
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn test_publish_preserves_slice_order() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = AssetPublisher::new(
            LocalAssetStore::new(dir.path(), "/static/slices"),
            None,
        )
        .with_workers(2);

        let outcome = publisher.publish_all("sess", &test_slices(8)).await.unwrap();

        let indices: Vec<usize> = outcome.assets.iter().map(|a| a.region.index).collect();
        assert_eq!(indices, (0..8).collect::<Vec<_>>());
    }
}
