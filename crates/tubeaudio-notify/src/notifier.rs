//! Notifier capability.

use async_trait::async_trait;

use tubeaudio_models::CompletionEvent;

use crate::error::NotifyResult;

/// Announces that a video has been processed.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Get the name of this transport for logging.
    fn name(&self) -> &'static str;

    /// Deliver the event, waiting for the transport to accept it.
    async fn notify(&self, event: &CompletionEvent) -> NotifyResult<()>;
}
