//! Item acknowledgement once the pipeline is done with it.

use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, error, info};

use tubeaudio_queue::{WorkItem, WorkQueue};

use crate::runner::ItemOutcome;

/// When a finished item is removed from the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryMode {
    /// Acknowledge every item, whatever the outcome. A failed item is
    /// never retried.
    #[default]
    AtMostOnce,
    /// Acknowledge successes and permanent failures only. Items that failed
    /// in a download, transcode, upload or notify stage stay pending and are
    /// redelivered when their lease expires.
    RedeliverOnFailure,
}

impl DeliveryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMode::AtMostOnce => "at_most_once",
            DeliveryMode::RedeliverOnFailure => "redeliver_on_failure",
        }
    }
}

impl FromStr for DeliveryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "at_most_once" => Ok(DeliveryMode::AtMostOnce),
            "redeliver_on_failure" => Ok(DeliveryMode::RedeliverOnFailure),
            other => Err(format!("unknown delivery mode '{}'", other)),
        }
    }
}

/// Removes finished items from the queue.
pub struct LifecycleManager {
    queue: Arc<dyn WorkQueue>,
    mode: DeliveryMode,
}

impl LifecycleManager {
    pub fn new(queue: Arc<dyn WorkQueue>, mode: DeliveryMode) -> Self {
        Self { queue, mode }
    }

    /// Whether an item with this outcome should be acknowledged.
    pub fn should_acknowledge(&self, outcome: &ItemOutcome) -> bool {
        match self.mode {
            DeliveryMode::AtMostOnce => true,
            DeliveryMode::RedeliverOnFailure => outcome
                .error
                .as_ref()
                .map_or(true, |err| err.is_permanent()),
        }
    }

    /// Settle an item the runner has finished with.
    ///
    /// Acknowledgement failures are logged and swallowed; the item then
    /// reappears after its lease expires. Returns whether the item was
    /// acknowledged.
    pub async fn finish(&self, item: WorkItem, outcome: &ItemOutcome) -> bool {
        let item_id = item.id().to_string();

        if !self.should_acknowledge(outcome) {
            info!(
                item_id = %item_id,
                "Leaving item pending for redelivery after lease expiry"
            );
            return false;
        }

        match self.queue.acknowledge(item).await {
            Ok(()) => {
                debug!(item_id = %item_id, "Message deleted");
                true
            }
            Err(e) => {
                error!(item_id = %item_id, "Failed to acknowledge item: {}", e);
                false
            }
        }
    }
}
