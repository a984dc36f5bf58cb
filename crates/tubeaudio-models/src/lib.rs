//! Shared data models for the TubeAudio worker.
//!
//! This crate provides:
//! - The queue envelope and its decoder
//! - Video identifiers
//! - Per-item stage payloads (download, transcode, upload)
//! - Completion events announced downstream

pub mod envelope;
pub mod event;
pub mod media;
pub mod video;

pub use envelope::{decode_video_id, DecodeError, DecodeResult, Envelope, VIDEO_ID_PARAM};
pub use event::{CompletionEvent, EventFormat};
pub use media::{DownloadResult, TranscodedMedia, UploadResult, AUDIO_CONTENT_TYPE};
pub use video::VideoId;
