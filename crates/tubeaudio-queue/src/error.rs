//! Queue error types.

use thiserror::Error;

pub type QueueResult<T> = Result<T, QueueError>;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    #[error("Enqueue failed: {0}")]
    EnqueueFailed(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

impl QueueError {
    pub fn connection_failed(msg: impl Into<String>) -> Self {
        Self::ConnectionFailed(msg.into())
    }

    pub fn receive_failed(msg: impl Into<String>) -> Self {
        Self::ReceiveFailed(msg.into())
    }
}

/// Failure to remove an item from the queue.
///
/// Not fatal: the item stays pending and becomes visible again when its
/// lease expires.
#[derive(Debug, Error)]
#[error("Acknowledge failed for {message_id}: {source}")]
pub struct AcknowledgeError {
    pub message_id: String,
    #[source]
    pub source: QueueError,
}

impl AcknowledgeError {
    pub fn new(message_id: impl Into<String>, source: QueueError) -> Self {
        Self {
            message_id: message_id.into(),
            source,
        }
    }
}
