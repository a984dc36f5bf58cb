//! Work queue capability and its configuration.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AcknowledgeError, QueueResult};
use crate::item::WorkItem;

/// Parameters of one retrieval round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveRequest {
    /// Upper bound on items returned
    pub max_items: usize,
    /// How long to wait for items to become available (zero = return immediately)
    pub wait: Duration,
    /// How long retrieved items stay hidden from other consumers
    pub lease: Duration,
}

/// A queue the worker pulls items from and acknowledges them on.
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Retrieve up to `request.max_items` pending items.
    ///
    /// Returning an empty batch is normal when nothing is pending.
    async fn receive(&self, request: &ReceiveRequest) -> QueueResult<Vec<WorkItem>>;

    /// Permanently remove an item from the queue.
    async fn acknowledge(&self, item: WorkItem) -> Result<(), AcknowledgeError>;
}

/// Queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Redis URL
    pub redis_url: String,
    /// Stream holding work items
    pub stream_name: String,
    /// Consumer group name
    pub consumer_group: String,
    /// Max items per retrieval round; also the internal buffer capacity
    pub batch_size: usize,
    /// Poll wait per retrieval round
    pub poll_wait: Duration,
    /// Item lease (visibility timeout)
    pub lease: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379".to_string(),
            stream_name: "tubeaudio:downloads".to_string(),
            consumer_group: "tubeaudio:workers".to_string(),
            batch_size: 2,
            poll_wait: Duration::ZERO,
            lease: Duration::from_secs(60),
        }
    }
}

impl QueueConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            stream_name: std::env::var("QUEUE_STREAM")
                .unwrap_or_else(|_| "tubeaudio:downloads".to_string()),
            consumer_group: std::env::var("QUEUE_CONSUMER_GROUP")
                .unwrap_or_else(|_| "tubeaudio:workers".to_string()),
            batch_size: std::env::var("QUEUE_BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(2)
                .max(1),
            poll_wait: Duration::from_secs(
                std::env::var("QUEUE_POLL_WAIT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0),
            ),
            lease: Duration::from_secs(
                std::env::var("QUEUE_LEASE_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
        }
    }

    /// Retrieval parameters derived from this config.
    pub fn receive_request(&self) -> ReceiveRequest {
        ReceiveRequest {
            max_items: self.batch_size,
            wait: self.poll_wait,
            lease: self.lease,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_config_defaults() {
        let config = QueueConfig::default();
        assert_eq!(config.batch_size, 2);
        assert_eq!(config.poll_wait, Duration::ZERO);
        assert_eq!(config.lease, Duration::from_secs(60));
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        std::env::set_var("QUEUE_BATCH_SIZE", "5");
        std::env::set_var("QUEUE_POLL_WAIT_SECS", "20");
        std::env::remove_var("QUEUE_LEASE_SECS");

        let request = QueueConfig::from_env().receive_request();
        assert_eq!(request.max_items, 5);
        assert_eq!(request.wait, Duration::from_secs(20));
        assert_eq!(request.lease, Duration::from_secs(60));

        std::env::remove_var("QUEUE_BATCH_SIZE");
        std::env::remove_var("QUEUE_POLL_WAIT_SECS");
    }

    #[test]
    #[serial]
    fn test_zero_batch_size_clamped() {
        std::env::set_var("QUEUE_BATCH_SIZE", "0");
        assert_eq!(QueueConfig::from_env().batch_size, 1);
        std::env::remove_var("QUEUE_BATCH_SIZE");
    }
}
