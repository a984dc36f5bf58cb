//! Upload stage: store transcoded audio under the video identifier.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use tubeaudio_models::{TranscodedMedia, UploadResult, VideoId, AUDIO_CONTENT_TYPE};

use crate::error::UploadError;
use crate::store::ObjectStore;

/// Lifetime of presigned access URLs.
pub const DEFAULT_PRESIGN_EXPIRY: Duration = Duration::from_secs(15 * 60);

/// Stores transcoded audio.
///
/// The identifier is the object key, so uploading the same identifier twice
/// overwrites the earlier object instead of failing.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Get the name of this uploader for logging.
    fn name(&self) -> &'static str;

    /// Store the audio under `key`.
    async fn upload(&self, key: &VideoId, media: TranscodedMedia) -> Result<UploadResult, UploadError>;
}

/// Uploader that only stores the object.
#[derive(Clone)]
pub struct PlainUploader {
    store: Arc<dyn ObjectStore>,
}

impl PlainUploader {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Uploader for PlainUploader {
    fn name(&self) -> &'static str {
        "plain"
    }

    async fn upload(&self, key: &VideoId, media: TranscodedMedia) -> Result<UploadResult, UploadError> {
        let size = media.len();
        self.store
            .put_object(key.as_str(), media.into_bytes(), AUDIO_CONTENT_TYPE)
            .await?;
        info!("Stored {} bytes at {}", size, key);
        Ok(UploadResult::without_url())
    }
}

/// Uploader that stores the object and issues a time-limited GET URL.
#[derive(Clone)]
pub struct PresignedUploader {
    store: Arc<dyn ObjectStore>,
    expires_in: Duration,
}

impl PresignedUploader {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            expires_in: DEFAULT_PRESIGN_EXPIRY,
        }
    }

    /// Set the presigned URL lifetime.
    pub fn with_expiry(mut self, expires_in: Duration) -> Self {
        self.expires_in = expires_in;
        self
    }
}

#[async_trait]
impl Uploader for PresignedUploader {
    fn name(&self) -> &'static str {
        "presigned"
    }

    async fn upload(&self, key: &VideoId, media: TranscodedMedia) -> Result<UploadResult, UploadError> {
        let size = media.len();
        self.store
            .put_object(key.as_str(), media.into_bytes(), AUDIO_CONTENT_TYPE)
            .await?;
        info!("Stored {} bytes at {}", size, key);

        let url = self.store.presign_get(key.as_str(), self.expires_in).await?;
        debug!("Presigned {} for {:?}", key, self.expires_in);
        Ok(UploadResult::with_url(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::memory::MemoryStore;

    fn key() -> VideoId {
        VideoId::parse("abc123").unwrap()
    }

    #[tokio::test]
    async fn test_plain_upload_returns_no_url() {
        let store = MemoryStore::new();
        let uploader = PlainUploader::new(Arc::new(store.clone()));

        let result = uploader
            .upload(&key(), TranscodedMedia(b"mp3".to_vec()))
            .await
            .unwrap();

        assert_eq!(result.access_url, None);
        let stored = store.get("abc123").unwrap();
        assert_eq!(stored.data, b"mp3");
        assert_eq!(stored.content_type, "audio/mpeg");
    }

    #[tokio::test]
    async fn test_presigned_upload_returns_url() {
        let store = MemoryStore::new();
        let uploader = PresignedUploader::new(Arc::new(store.clone()));

        let result = uploader
            .upload(&key(), TranscodedMedia(b"mp3".to_vec()))
            .await
            .unwrap();

        let url = result.access_url.unwrap();
        assert!(url.contains("abc123"));
        assert!(url.contains("expires=900"));
    }

    #[tokio::test]
    async fn test_reupload_same_key_overwrites() {
        let store = MemoryStore::new();
        let uploader = PresignedUploader::new(Arc::new(store.clone()))
            .with_expiry(Duration::from_secs(60));

        uploader
            .upload(&key(), TranscodedMedia(b"first".to_vec()))
            .await
            .unwrap();
        uploader
            .upload(&key(), TranscodedMedia(b"second".to_vec()))
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("abc123").unwrap().data, b"second");
    }

    struct FailingStore;

    #[async_trait]
    impl ObjectStore for FailingStore {
        async fn put_object(&self, _: &str, _: Vec<u8>, _: &str) -> crate::StorageResult<()> {
            Err(StorageError::upload_failed("bucket unreachable"))
        }

        async fn presign_get(&self, _: &str, _: Duration) -> crate::StorageResult<String> {
            unreachable!("presign must not run after a failed put")
        }
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_upload_error() {
        let uploader = PresignedUploader::new(Arc::new(FailingStore));
        let err = uploader
            .upload(&key(), TranscodedMedia(b"x".to_vec()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("bucket unreachable"));
    }
}
