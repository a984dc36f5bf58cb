//! Queue listener: feeds retrieved items into the bounded buffer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use tubeaudio_queue::{ReceiveRequest, WorkItem, WorkQueue};

use crate::retry::{Backoff, FailureTracker};

/// Pause after an empty round when the queue was polled without waiting.
const EMPTY_POLL_DELAY: Duration = Duration::from_millis(100);

/// Consecutive retrieval errors logged before suppression kicks in.
const MAX_LOGGED_FAILURES: u32 = 5;

/// Why the listener returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerExit {
    /// Shutdown was signalled
    Shutdown,
    /// The runner dropped the buffer's receiving side
    BufferClosed,
}

/// Producer side of the pipeline.
pub struct QueueListener {
    queue: Arc<dyn WorkQueue>,
    request: ReceiveRequest,
    backoff: Backoff,
    empty_poll_delay: Duration,
}

impl QueueListener {
    pub fn new(queue: Arc<dyn WorkQueue>, request: ReceiveRequest) -> Self {
        Self {
            queue,
            request,
            backoff: Backoff::default(),
            empty_poll_delay: EMPTY_POLL_DELAY,
        }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_empty_poll_delay(mut self, delay: Duration) -> Self {
        self.empty_poll_delay = delay;
        self
    }

    /// Retrieve batches forever, pushing each item onto `buffer` in
    /// retrieval order.
    ///
    /// Pushing waits while the buffer is full. Retrieval errors are logged
    /// and retried with backoff. Only shutdown or a closed buffer ends the
    /// loop.
    ///
    /// Shutdown is observed between rounds. A receive already in progress
    /// runs to completion and its items are buffered, so nothing the queue
    /// has delivered is left waiting out its lease. Dropping the shutdown
    /// sender counts as a shutdown signal.
    pub async fn run(
        mut self,
        buffer: mpsc::Sender<WorkItem>,
        mut shutdown: watch::Receiver<bool>,
    ) -> ListenerExit {
        info!(
            "Queue listener started (batch: {}, wait: {:?}, lease: {:?})",
            self.request.max_items, self.request.wait, self.request.lease
        );

        let mut failures = FailureTracker::new(MAX_LOGGED_FAILURES);

        loop {
            if *shutdown.borrow() || shutdown.has_changed().is_err() {
                info!("Shutdown signal received, stopping listener");
                return ListenerExit::Shutdown;
            }

            let result = self.queue.receive(&self.request).await;

            let delay = match result {
                Ok(items) => {
                    failures.record_success();
                    self.backoff.reset();

                    if items.is_empty() {
                        if self.request.wait.is_zero() {
                            Some(self.empty_poll_delay)
                        } else {
                            None
                        }
                    } else {
                        debug!("Buffering {} item(s)", items.len());
                        for item in items {
                            if buffer.send(item).await.is_err() {
                                info!("Buffer closed, stopping listener");
                                return ListenerExit::BufferClosed;
                            }
                        }
                        None
                    }
                }
                Err(e) => {
                    let delay = self.backoff.next_delay();
                    if failures.record_failure() {
                        error!("Failed to receive from queue (retrying in {:?}): {}", delay, e);
                    }
                    Some(delay)
                }
            };

            if let Some(delay) = delay {
                // Loop top decides whether a change means stop.
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = shutdown.changed() => {}
                }
            }
        }
    }
}
