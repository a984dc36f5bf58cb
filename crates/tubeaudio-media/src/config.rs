//! Media tool configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration shared by the download and transcode stages.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// yt-dlp binary
    pub ytdlp_path: String,
    /// FFmpeg binary
    pub ffmpeg_path: String,
    /// yt-dlp format selector
    pub download_quality: String,
    /// Prefix the video identifier is appended to when building the fetch URL
    pub source_url_prefix: String,
    /// MP3 bitrate passed to FFmpeg
    pub audio_bitrate: String,
    /// Upper bound for a single tool invocation
    pub tool_timeout: Duration,
    /// Scratch directory for tool I/O (system temp dir when unset)
    pub work_dir: Option<PathBuf>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: "yt-dlp".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            download_quality: "best".to_string(),
            source_url_prefix: "https://www.youtube.com/watch?v=".to_string(),
            audio_bitrate: "192k".to_string(),
            tool_timeout: Duration::from_secs(1800), // 30 minutes
            work_dir: None,
        }
    }
}

impl MediaConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ytdlp_path: std::env::var("YTDLP_PATH").unwrap_or(defaults.ytdlp_path),
            ffmpeg_path: std::env::var("FFMPEG_PATH").unwrap_or(defaults.ffmpeg_path),
            download_quality: std::env::var("DOWNLOAD_QUALITY")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.download_quality),
            source_url_prefix: std::env::var("MEDIA_SOURCE_URL")
                .unwrap_or(defaults.source_url_prefix),
            audio_bitrate: std::env::var("AUDIO_BITRATE").unwrap_or(defaults.audio_bitrate),
            tool_timeout: std::env::var("MEDIA_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.tool_timeout),
            work_dir: std::env::var("WORKER_WORK_DIR").ok().map(PathBuf::from),
        }
    }

    /// Create a fresh scratch directory, removed when the handle drops.
    pub(crate) fn scratch_dir(&self, prefix: &str) -> std::io::Result<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix);
        match &self.work_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                builder.tempdir_in(dir)
            }
            None => builder.tempdir(),
        }
    }
}
