//! Asset publishing: persisting slices and yielding fetchable URLs.
//!
//! Two independent [`AssetStore`] implementations sit behind the
//! [`AssetPublisher`]: local disk (the primary, always-available backend)
//! and an optional remote hosting endpoint (best-effort, additive). A
//! remote failure never fails a publish; the local result is retained.

mod local;
mod publisher;
mod remote;
mod store;

pub use local::LocalAssetStore;
pub use publisher::{
    AssetPublisher, PublishOutcome, PublishWarning, PublishedAsset, StorageBackend,
    DEFAULT_PUBLISH_WORKERS,
};
pub use remote::RemoteAssetStore;
pub use store::AssetStore;
