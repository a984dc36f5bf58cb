//! Worker error types.

use thiserror::Error;

use tubeaudio_media::{DownloadError, MediaError, TranscodeError};
use tubeaudio_models::DecodeError;
use tubeaudio_notify::NotifyError;
use tubeaudio_queue::QueueError;
use tubeaudio_storage::{StorageError, UploadError};

pub type WorkerResult<T> = Result<T, WorkerError>;

/// Errors that stop the worker from starting or running.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("Notifier error: {0}")]
    Notify(#[from] NotifyError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Task failed: {0}")]
    TaskFailed(String),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn task_failed(msg: impl Into<String>) -> Self {
        Self::TaskFailed(msg.into())
    }
}

/// Failure of one pipeline stage for one item.
///
/// Terminal for the item; the runner logs it and moves on.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),

    #[error("Notify failed: {0}")]
    Notify(#[from] NotifyError),
}

impl StageError {
    /// Name of the stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            StageError::Decode(_) => "decode",
            StageError::Download(_) => "download",
            StageError::Transcode(_) => "transcode",
            StageError::Upload(_) => "upload",
            StageError::Notify(_) => "notify",
        }
    }

    /// Whether processing the same body again would fail the same way.
    ///
    /// Only decode failures qualify: the body itself is bad. Everything
    /// else depends on an external tool or service.
    pub fn is_permanent(&self) -> bool {
        matches!(self, StageError::Decode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        let decode = StageError::from(DecodeError::MissingIdentifier("https://youtu.be/watch".into()));
        assert_eq!(decode.stage(), "decode");
        assert!(decode.is_permanent());

        let download = StageError::from(DownloadError::new("yt-dlp exited with 1"));
        assert_eq!(download.stage(), "download");
        assert!(!download.is_permanent());

        let notify = StageError::from(NotifyError::UnexpectedStatus {
            status: 500,
            body: String::new(),
        });
        assert_eq!(notify.stage(), "notify");
        assert!(!notify.is_permanent());
    }

    #[test]
    fn test_stage_error_display_keeps_cause() {
        let err = StageError::from(UploadError::new("bucket unreachable"));
        assert!(err.to_string().contains("bucket unreachable"));
    }
}
