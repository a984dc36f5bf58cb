//! Capability traits for the media stages of the pipeline.

use async_trait::async_trait;

use tubeaudio_models::{DownloadResult, TranscodedMedia, VideoId};

use crate::error::{DownloadError, TranscodeError};

/// Fetches the media for a video identifier.
///
/// Implementations must not retry internally.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Get the name of this downloader for logging.
    fn name(&self) -> &'static str;

    /// Fetch the media and its title.
    async fn download(&self, video_id: &VideoId) -> Result<DownloadResult, DownloadError>;
}

/// Converts fetched media into the target audio encoding.
///
/// Implementations must not perform network or queue I/O.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Get the name of this transcoder for logging.
    fn name(&self) -> &'static str;

    /// Transcode the given media bytes.
    async fn transcode(&self, input: Vec<u8>) -> Result<TranscodedMedia, TranscodeError>;
}
