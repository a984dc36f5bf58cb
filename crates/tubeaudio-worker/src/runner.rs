//! Pipeline runner: drives one item at a time through the stages.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, Instrument};

use tubeaudio_media::{Downloader, Transcoder};
use tubeaudio_models::{decode_video_id, CompletionEvent, EventFormat, VideoId};
use tubeaudio_notify::Notifier;
use tubeaudio_queue::WorkItem;
use tubeaudio_storage::Uploader;

use crate::error::StageError;
use crate::lifecycle::LifecycleManager;
use crate::logging::ItemLogger;

/// Pipeline states in order. A failed stage jumps straight to `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineState {
    Received,
    Decoded,
    Downloaded,
    Transcoded,
    Uploaded,
    Notified,
    Done,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Received => "received",
            PipelineState::Decoded => "decoded",
            PipelineState::Downloaded => "downloaded",
            PipelineState::Transcoded => "transcoded",
            PipelineState::Uploaded => "uploaded",
            PipelineState::Notified => "notified",
            PipelineState::Done => "done",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running one item through the pipeline.
#[derive(Debug)]
pub struct ItemOutcome {
    /// Identifier, if decoding got that far
    pub video_id: Option<VideoId>,
    /// Last state reached successfully before `Done`
    pub reached: PipelineState,
    /// The error that ended processing early
    pub error: Option<StageError>,
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Concrete stage implementations the runner calls.
#[derive(Clone)]
pub struct Stages {
    pub downloader: Arc<dyn Downloader>,
    pub transcoder: Arc<dyn Transcoder>,
    pub uploader: Arc<dyn Uploader>,
    pub notifier: Arc<dyn Notifier>,
}

impl fmt::Debug for Stages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stages")
            .field("downloader", &self.downloader.name())
            .field("transcoder", &self.transcoder.name())
            .field("uploader", &self.uploader.name())
            .field("notifier", &self.notifier.name())
            .finish()
    }
}

struct Progress {
    video_id: Option<VideoId>,
    reached: PipelineState,
}

impl Progress {
    fn advance(&mut self, state: PipelineState, logger: &ItemLogger, message: &str) {
        self.reached = state;
        logger.log_stage(state.as_str(), message);
    }
}

/// Consumes buffered items strictly one at a time.
pub struct PipelineRunner {
    stages: Stages,
    event_format: EventFormat,
    lifecycle: LifecycleManager,
}

impl PipelineRunner {
    pub fn new(stages: Stages, event_format: EventFormat, lifecycle: LifecycleManager) -> Self {
        Self {
            stages,
            event_format,
            lifecycle,
        }
    }

    /// Run until the buffer's sender side is dropped and the buffer is empty.
    ///
    /// Returns the number of items handled.
    pub async fn run(self, mut buffer: mpsc::Receiver<WorkItem>) -> usize {
        info!("Pipeline runner started with stages {:?}", self.stages);

        let mut handled = 0usize;
        while let Some(item) = buffer.recv().await {
            self.handle(item).await;
            handled += 1;
        }

        info!("Buffer closed, runner stopping after {} item(s)", handled);
        handled
    }

    /// Process one item, then settle it with the lifecycle manager.
    pub async fn handle(&self, item: WorkItem) -> ItemOutcome {
        let outcome = self.process(&item).await;
        self.lifecycle.finish(item, &outcome).await;
        outcome
    }

    /// Drive one item through decode, download, transcode, upload and notify.
    ///
    /// Never fails: a stage error is logged and recorded in the outcome.
    pub async fn process(&self, item: &WorkItem) -> ItemOutcome {
        let mut logger = ItemLogger::new(item.id());
        let span = logger.create_span();

        async move {
            logger.log_received(item.received_at());

            let mut progress = Progress {
                video_id: None,
                reached: PipelineState::Received,
            };

            let error = match self.drive(item.body(), &mut logger, &mut progress).await {
                Ok(()) => None,
                Err(err) => {
                    logger.log_failure(&err);
                    Some(err)
                }
            };

            ItemOutcome {
                video_id: progress.video_id,
                reached: progress.reached,
                error,
            }
        }
        .instrument(span)
        .await
    }

    async fn drive(
        &self,
        body: &str,
        logger: &mut ItemLogger,
        progress: &mut Progress,
    ) -> Result<(), StageError> {
        let video_id = decode_video_id(body)?;
        logger.set_video_id(&video_id);
        progress.video_id = Some(video_id.clone());
        progress.advance(PipelineState::Decoded, logger, "Decoded video identifier");

        let download = self.stages.downloader.download(&video_id).await?;
        progress.advance(
            PipelineState::Downloaded,
            logger,
            &format!("Downloaded {} bytes ({})", download.content.len(), download.title),
        );

        let transcoded = self.stages.transcoder.transcode(download.content).await?;
        progress.advance(
            PipelineState::Transcoded,
            logger,
            &format!("Transcoded to {} bytes", transcoded.len()),
        );

        let upload = self.stages.uploader.upload(&video_id, transcoded).await?;
        progress.advance(PipelineState::Uploaded, logger, "Uploaded audio");

        let event = CompletionEvent::build(
            self.event_format,
            video_id.clone(),
            download.title,
            upload.access_url,
        );
        self.stages.notifier.notify(&event).await?;
        progress.advance(PipelineState::Notified, logger, "Published completion event");

        info!("Video processed: {}", video_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states_are_ordered() {
        assert!(PipelineState::Received < PipelineState::Decoded);
        assert!(PipelineState::Uploaded < PipelineState::Notified);
        assert!(PipelineState::Notified < PipelineState::Done);
        assert_eq!(PipelineState::Transcoded.to_string(), "transcoded");
    }
}
