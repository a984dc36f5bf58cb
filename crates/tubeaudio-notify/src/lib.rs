//! Completion notifiers.
//!
//! This crate provides the `Notifier` capability trait and two
//! interchangeable transports for announcing a processed video:
//! - Redis pub/sub publish to a named topic
//! - Synchronous HTTP POST to a discovered service endpoint

pub mod error;
pub mod http;
pub mod notifier;
pub mod pubsub;
pub mod topics;

pub use error::{NotifyError, NotifyResult};
pub use http::{HttpNotifier, HttpNotifierConfig};
pub use notifier::Notifier;
pub use pubsub::PubSubNotifier;
pub use topics::{TopicMap, DOWNLOAD_COMPLETE_TOPIC};
