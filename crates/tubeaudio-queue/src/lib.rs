//! Work queue for the TubeAudio worker.
//!
//! This crate provides:
//! - The `WorkQueue` capability trait (receive batches, acknowledge items)
//! - `WorkItem` handles carrying a single-use acknowledgement token
//! - A Redis Streams implementation using a consumer group, where an
//!   unacknowledged item becomes visible again once its lease expires

pub mod error;
pub mod item;
pub mod queue;
pub mod redis_stream;

pub use error::{AcknowledgeError, QueueError, QueueResult};
pub use item::{AckToken, WorkItem};
pub use queue::{QueueConfig, ReceiveRequest, WorkQueue};
pub use redis_stream::RedisStreamQueue;
