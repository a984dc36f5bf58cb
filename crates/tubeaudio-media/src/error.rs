//! Error types for media operations.

use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while invoking external media tools.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{0} not found in PATH")]
    ToolNotFound(String),

    #[error(
        "{tool} command failed: {message}{}",
        .stderr.as_deref().map(|s| format!(": {}", s.trim())).unwrap_or_default()
    )]
    ToolFailed {
        tool: String,
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("{tool} timed out after {secs} seconds")]
    Timeout { tool: String, secs: u64 },

    #[error("Expected output not produced: {0}")]
    MissingOutput(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create a tool failure error.
    pub fn tool_failed(
        tool: impl Into<String>,
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a missing output error.
    pub fn missing_output(message: impl Into<String>) -> Self {
        Self::MissingOutput(message.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Failure to fetch a video.
///
/// Tool invocation failures, network failures and unknown identifiers all
/// surface as this one kind; the wrapped [`MediaError`] carries the detail.
#[derive(Debug, Error)]
#[error("Download failed: {0}")]
pub struct DownloadError(#[from] pub MediaError);

impl DownloadError {
    /// Create a download error from a plain message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(MediaError::tool_failed("download", message, None, None))
    }
}

/// Failure to convert fetched media to the target audio encoding.
#[derive(Debug, Error)]
#[error("Transcode failed: {0}")]
pub struct TranscodeError(#[from] pub MediaError);

impl TranscodeError {
    /// Create a transcode error from a plain message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(MediaError::invalid_input(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_failure_display_includes_stderr() {
        let err = DownloadError::from(MediaError::tool_failed(
            "yt-dlp",
            "exited with non-zero status",
            Some("ERROR: Video unavailable\n".to_string()),
            Some(1),
        ));
        assert_eq!(
            err.to_string(),
            "Download failed: yt-dlp command failed: exited with non-zero status: ERROR: Video unavailable"
        );

        let bare = MediaError::tool_failed("ffmpeg", "killed", None, None);
        assert_eq!(bare.to_string(), "ffmpeg command failed: killed");
    }
}
