//! Storage backend contract.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreError;

/// A storage backend that accepts a named binary blob and returns a stable
/// fetch URL for it.
///
/// Every call creates exactly one durable artifact; stores perform no
/// deduplication. Callers needing dedup must fingerprint content
/// themselves.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Persist `data` under `name` and return its fetchable URL.
    async fn put(&self, name: &str, data: Bytes, content_type: &str) -> Result<String, StoreError>;
}
