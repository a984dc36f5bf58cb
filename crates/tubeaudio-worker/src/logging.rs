//! Structured per-item logging.
//!
//! Every line carries the queue item ID, and the video ID once the body has
//! been decoded, so one item's progress can be followed across stages.

use chrono::{DateTime, Utc};
use tracing::{error, info, Span};

use tubeaudio_models::VideoId;

use crate::error::StageError;

/// Item logger with consistent fields.
#[derive(Debug, Clone)]
pub struct ItemLogger {
    item_id: String,
    video_id: Option<String>,
}

impl ItemLogger {
    pub fn new(item_id: &str) -> Self {
        Self {
            item_id: item_id.to_string(),
            video_id: None,
        }
    }

    /// Attach the decoded video ID to subsequent lines.
    pub fn set_video_id(&mut self, video_id: &VideoId) {
        self.video_id = Some(video_id.to_string());
    }

    fn video(&self) -> &str {
        self.video_id.as_deref().unwrap_or("-")
    }

    /// Log the start of processing with how long the item sat in the buffer.
    pub fn log_received(&self, received_at: DateTime<Utc>) {
        info!(
            item_id = %self.item_id,
            queued_ms = queued_millis(received_at, Utc::now()),
            "Item received"
        );
    }

    /// Log a completed stage transition.
    pub fn log_stage(&self, stage: &str, message: &str) {
        info!(
            item_id = %self.item_id,
            video_id = %self.video(),
            stage = stage,
            "{}", message
        );
    }

    /// Log the error that ended processing for this item.
    pub fn log_failure(&self, err: &StageError) {
        error!(
            item_id = %self.item_id,
            video_id = %self.video(),
            stage = err.stage(),
            permanent = err.is_permanent(),
            "Item failed: {}", err
        );
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn video_id(&self) -> Option<&str> {
        self.video_id.as_deref()
    }

    /// Create a tracing span for one pipeline invocation.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("item", item_id = %self.item_id)
    }
}

/// Milliseconds between retrieval and the start of processing, floored at zero.
fn queued_millis(received_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    now.signed_duration_since(received_at).num_milliseconds().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_queued_millis() {
        let now = Utc::now();
        assert_eq!(queued_millis(now - Duration::milliseconds(250), now), 250);
        assert_eq!(queued_millis(now, now), 0);
        // Clock skew never reports negative latency.
        assert_eq!(queued_millis(now + Duration::seconds(1), now), 0);
    }

    #[test]
    fn test_video_id_attached_after_decode() {
        let mut logger = ItemLogger::new("1700000000000-0");
        assert_eq!(logger.item_id(), "1700000000000-0");
        assert_eq!(logger.video_id(), None);

        logger.set_video_id(&VideoId::parse("abc123").unwrap());
        assert_eq!(logger.video_id(), Some("abc123"));
    }
}
