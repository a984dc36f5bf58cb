//! Completion events announced after an item has been stored.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::video::VideoId;

/// Which fields a deployment includes in its completion events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFormat {
    /// `{"videoID": ...}` only
    Minimal,
    /// `videoID`, plus `title` and `url` when known
    #[default]
    Enriched,
}

impl EventFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventFormat::Minimal => "minimal",
            EventFormat::Enriched => "enriched",
        }
    }
}

impl FromStr for EventFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimal" => Ok(EventFormat::Minimal),
            "enriched" => Ok(EventFormat::Enriched),
            other => Err(format!("unknown event format '{}'", other)),
        }
    }
}

/// Message announcing that a work item has been fully processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
    #[serde(rename = "videoID")]
    pub video_id: VideoId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl CompletionEvent {
    /// Event carrying only the identifier.
    pub fn minimal(video_id: VideoId) -> Self {
        Self {
            video_id,
            title: None,
            url: None,
        }
    }

    /// Event carrying title and access URL where available.
    pub fn enriched(video_id: VideoId, title: impl Into<String>, url: Option<String>) -> Self {
        Self {
            video_id,
            title: Some(title.into()),
            url,
        }
    }

    /// Build an event shaped for the given deployment format.
    pub fn build(
        format: EventFormat,
        video_id: VideoId,
        title: impl Into<String>,
        url: Option<String>,
    ) -> Self {
        match format {
            EventFormat::Minimal => Self::minimal(video_id),
            EventFormat::Enriched => Self::enriched(video_id, title, url),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
