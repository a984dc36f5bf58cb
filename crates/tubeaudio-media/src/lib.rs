//! Media stages for the TubeAudio worker.
//!
//! This crate provides:
//! - `Downloader` / `Transcoder` capability traits
//! - yt-dlp backed downloader
//! - FFmpeg backed MP3 transcoder
//! - Type-safe FFmpeg command building and a timed CLI runner

pub mod command;
pub mod config;
pub mod download;
pub mod error;
pub mod stage;
pub mod transcode;

pub use command::{FfmpegCommand, ToolOutput, ToolRunner};
pub use config::MediaConfig;
pub use download::YtDlpDownloader;
pub use error::{DownloadError, MediaError, MediaResult, TranscodeError};
pub use stage::{Downloader, Transcoder};
pub use transcode::FfmpegTranscoder;
