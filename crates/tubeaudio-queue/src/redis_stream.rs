//! Work queue on Redis Streams.
//!
//! Items are stream entries with a `body` field. The worker reads through a
//! consumer group, so a delivered entry sits in the group's pending list
//! until it is acknowledged. Entries left pending for longer than the lease
//! are reclaimed on the next retrieval round, which gives the same
//! visibility-timeout semantics as a hosted queue.
//!
//! The lease is not extended while an item is buffered or being processed.
//! An item still in flight when its lease runs out is reclaimed like any
//! abandoned one and can be handled a second time, either here or by another
//! consumer in the group. Its first acknowledgement removes the entry; the
//! later one finds nothing to remove. Set the lease above the longest
//! expected buffer wait plus processing time.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::streams::{StreamAutoClaimReply, StreamId, StreamReadReply};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AcknowledgeError, QueueError, QueueResult};
use crate::item::WorkItem;
use crate::queue::{QueueConfig, ReceiveRequest, WorkQueue};

/// Stream entry field holding the message body.
pub const BODY_FIELD: &str = "body";

/// Redis Streams consumer-group queue.
pub struct RedisStreamQueue {
    config: QueueConfig,
    consumer_name: String,
    // Blocking reads get their own connection so acknowledgements never
    // queue up behind a long XREADGROUP BLOCK.
    read_conn: MultiplexedConnection,
    write_conn: MultiplexedConnection,
}

impl RedisStreamQueue {
    /// Connect to Redis.
    pub async fn connect(config: QueueConfig) -> QueueResult<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        let read_conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| QueueError::connection_failed(e.to_string()))?;
        let write_conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| QueueError::connection_failed(e.to_string()))?;

        let consumer_name = format!("worker-{}", Uuid::new_v4());
        info!(
            "Connected to queue stream '{}' as consumer '{}'",
            config.stream_name, consumer_name
        );

        Ok(Self {
            config,
            consumer_name,
            read_conn,
            write_conn,
        })
    }

    /// Create the consumer group (and stream) if missing.
    ///
    /// The group starts at the beginning of the stream so a backlog that
    /// predates the worker is processed too.
    pub async fn init(&self) -> QueueResult<()> {
        let mut conn = self.write_conn.clone();

        let result: Result<(), redis::RedisError> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg("0")
            .arg("MKSTREAM")
            .query_async(&mut conn)
            .await;

        match result {
            Ok(()) => info!("Created consumer group: {}", self.config.consumer_group),
            Err(e) if e.to_string().contains("BUSYGROUP") => {
                debug!("Consumer group already exists: {}", self.config.consumer_group);
            }
            Err(e) => return Err(QueueError::Redis(e)),
        }

        Ok(())
    }

    /// Append a message body to the stream. Returns the message ID.
    pub async fn enqueue(&self, body: &str) -> QueueResult<String> {
        let mut conn = self.write_conn.clone();

        let message_id: String = redis::cmd("XADD")
            .arg(&self.config.stream_name)
            .arg("*")
            .arg(BODY_FIELD)
            .arg(body)
            .query_async(&mut conn)
            .await
            .map_err(|e| QueueError::EnqueueFailed(e.to_string()))?;

        debug!("Enqueued message {}", message_id);
        Ok(message_id)
    }

    /// Take over entries whose lease has expired.
    ///
    /// Includes entries this consumer still holds in flight; see the module
    /// docs.
    async fn reclaim_expired(
        &self,
        conn: &mut MultiplexedConnection,
        request: &ReceiveRequest,
    ) -> QueueResult<Vec<WorkItem>> {
        let reply: StreamAutoClaimReply = redis::cmd("XAUTOCLAIM")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg(&self.consumer_name)
            .arg(request.lease.as_millis() as u64)
            .arg("0-0")
            .arg("COUNT")
            .arg(request.max_items)
            .query_async(conn)
            .await?;

        let items: Vec<WorkItem> = reply.claimed.iter().map(to_work_item).collect();
        if !items.is_empty() {
            info!("Reclaimed {} item(s) with expired lease", items.len());
        }
        Ok(items)
    }

    /// Read entries never delivered to this group before.
    async fn read_new(
        &self,
        conn: &mut MultiplexedConnection,
        count: usize,
        request: &ReceiveRequest,
    ) -> QueueResult<Vec<WorkItem>> {
        let mut cmd = redis::cmd("XREADGROUP");
        cmd.arg("GROUP")
            .arg(&self.config.consumer_group)
            .arg(&self.consumer_name)
            .arg("COUNT")
            .arg(count);

        // BLOCK 0 means "forever" to Redis; a zero wait must not block at all
        if !request.wait.is_zero() {
            cmd.arg("BLOCK").arg(request.wait.as_millis() as u64);
        }

        cmd.arg("STREAMS").arg(&self.config.stream_name).arg(">");

        let reply: Option<StreamReadReply> = cmd.query_async(conn).await?;

        Ok(reply
            .map(|reply| {
                reply
                    .keys
                    .iter()
                    .flat_map(|key| key.ids.iter())
                    .map(to_work_item)
                    .collect()
            })
            .unwrap_or_default())
    }
}

fn to_work_item(entry: &StreamId) -> WorkItem {
    let body: String = entry.get(BODY_FIELD).unwrap_or_else(|| {
        warn!("Stream entry {} has no '{}' field", entry.id, BODY_FIELD);
        String::new()
    });
    WorkItem::new(entry.id.clone(), body)
}

#[async_trait]
impl WorkQueue for RedisStreamQueue {
    async fn receive(&self, request: &ReceiveRequest) -> QueueResult<Vec<WorkItem>> {
        if request.max_items == 0 {
            return Err(QueueError::receive_failed("max_items must be at least 1"));
        }

        let mut conn = self.read_conn.clone();

        let mut items = self.reclaim_expired(&mut conn, request).await?;
        let remaining = request.max_items.saturating_sub(items.len());
        if remaining > 0 {
            items.extend(self.read_new(&mut conn, remaining, request).await?);
        }

        if !items.is_empty() {
            debug!("Received {} item(s)", items.len());
        }
        Ok(items)
    }

    async fn acknowledge(&self, item: WorkItem) -> Result<(), AcknowledgeError> {
        let token = item.into_token();
        let mut conn = self.write_conn.clone();

        redis::pipe()
            .atomic()
            .cmd("XACK")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg(token.as_str())
            .ignore()
            .cmd("XDEL")
            .arg(&self.config.stream_name)
            .arg(token.as_str())
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| AcknowledgeError::new(token.as_str(), QueueError::Redis(e)))?;

        debug!("Acknowledged item: {}", token.as_str());
        Ok(())
    }
}
