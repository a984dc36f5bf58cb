//! Per-item stage payloads.

use std::fmt;

/// Content type of stored audio objects.
pub const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// Media fetched for one video.
#[derive(Clone)]
pub struct DownloadResult {
    /// Raw container bytes as produced by the fetch tool
    pub content: Vec<u8>,
    /// Human-readable title of the video
    pub title: String,
}

impl fmt::Debug for DownloadResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadResult")
            .field("content_len", &self.content.len())
            .field("title", &self.title)
            .finish()
    }
}

/// Audio payload in the target encoding.
#[derive(Clone, PartialEq, Eq)]
pub struct TranscodedMedia(pub Vec<u8>);

impl TranscodedMedia {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Debug for TranscodedMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TranscodedMedia({} bytes)", self.0.len())
    }
}

/// Outcome of storing the audio.
///
/// `access_url` is only present for uploaders that issue a time-limited
/// presigned URL. Its absence is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadResult {
    pub access_url: Option<String>,
}

impl UploadResult {
    pub fn without_url() -> Self {
        Self { access_url: None }
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            access_url: Some(url.into()),
        }
    }
}
