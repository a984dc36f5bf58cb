//! Object store abstraction.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StorageResult;

/// Minimal object store surface the uploaders need.
///
/// Writing to an existing key replaces the stored object.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes under `key`.
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()>;

    /// Issue a time-limited GET URL for `key`.
    async fn presign_get(&self, key: &str, expires_in: Duration) -> StorageResult<String>;
}
