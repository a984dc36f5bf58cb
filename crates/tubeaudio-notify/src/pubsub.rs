//! Completion events via Redis Pub/Sub.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::{debug, warn};

use tubeaudio_models::CompletionEvent;

use crate::error::NotifyResult;
use crate::notifier::Notifier;

/// Publishes completion events to a pub/sub topic.
///
/// Waits for the server to accept the publish, not for any subscriber to
/// consume it.
pub struct PubSubNotifier {
    conn: MultiplexedConnection,
    topic: String,
}

impl PubSubNotifier {
    /// Connect to Redis and bind to a topic.
    pub async fn connect(redis_url: &str, topic: impl Into<String>) -> NotifyResult<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self {
            conn,
            topic: topic.into(),
        })
    }
}

#[async_trait]
impl Notifier for PubSubNotifier {
    fn name(&self) -> &'static str {
        "pubsub"
    }

    async fn notify(&self, event: &CompletionEvent) -> NotifyResult<()> {
        let payload = event.to_json()?;
        let mut conn = self.conn.clone();

        let receivers: i64 = conn.publish(&self.topic, payload).await?;
        if receivers == 0 {
            warn!("Published completion for {} to '{}' with no subscribers", event.video_id, self.topic);
        } else {
            debug!(
                "Published completion for {} to '{}' ({} subscribers)",
                event.video_id, self.topic, receivers
            );
        }
        Ok(())
    }
}
