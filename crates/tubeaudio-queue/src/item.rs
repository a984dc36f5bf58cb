//! Work items handed out by the queue.

use chrono::{DateTime, Utc};

/// Single-use token that removes an item from the queue.
///
/// Not `Clone`: consuming the owning [`WorkItem`] is the only way to obtain
/// it, so an item can be acknowledged at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct AckToken(String);

impl AckToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One unit of queued input.
#[derive(Debug)]
pub struct WorkItem {
    id: String,
    body: String,
    received_at: DateTime<Utc>,
    token: AckToken,
}

impl WorkItem {
    /// Create an item whose acknowledgement token is its message ID.
    pub fn new(id: impl Into<String>, body: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            token: AckToken(id.clone()),
            id,
            body: body.into(),
            received_at: Utc::now(),
        }
    }

    /// Queue-assigned message ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Raw message body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// When this worker retrieved the item.
    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// Give up the item in exchange for its acknowledgement token.
    pub fn into_token(self) -> AckToken {
        self.token
    }
}
