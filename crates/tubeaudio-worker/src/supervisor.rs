//! Process supervisor: wires concrete stages from configuration and runs
//! the listener/runner pair.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use tubeaudio_media::{FfmpegTranscoder, ToolRunner, YtDlpDownloader};
use tubeaudio_notify::{HttpNotifier, Notifier, PubSubNotifier};
use tubeaudio_queue::{RedisStreamQueue, ReceiveRequest, WorkQueue};
use tubeaudio_storage::{ObjectStore, PlainUploader, PresignedUploader, S3Client, Uploader};

use crate::config::{NotifierKind, UploaderKind, WorkerConfig};
use crate::error::{WorkerError, WorkerResult};
use crate::lifecycle::LifecycleManager;
use crate::listener::QueueListener;
use crate::runner::{PipelineRunner, Stages};

/// Owns the configuration and the worker's two tasks.
pub struct Supervisor {
    config: Arc<WorkerConfig>,
}

impl Supervisor {
    pub fn new(config: WorkerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Connect to the queue and every stage backend, then run until ctrl-c.
    pub async fn run(&self) -> WorkerResult<()> {
        let queue = RedisStreamQueue::connect(self.config.queue.clone()).await?;
        queue.init().await?;
        let queue: Arc<dyn WorkQueue> = Arc::new(queue);

        let stages = self.build_stages().await?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(forward_shutdown(tokio::signal::ctrl_c(), shutdown_tx));

        let handled = self.run_with(queue, stages, shutdown_rx).await?;
        info!("Worker stopped after handling {} item(s)", handled);
        Ok(())
    }

    /// Build the configured stage implementations.
    pub async fn build_stages(&self) -> WorkerResult<Stages> {
        let media = &self.config.media;
        for tool in [&media.ytdlp_path, &media.ffmpeg_path] {
            if let Err(e) = ToolRunner::new(tool.as_str(), media.tool_timeout).check() {
                warn!("{}; items will fail until it is installed", e);
            }
        }

        let store: Arc<dyn ObjectStore> = Arc::new(S3Client::new(self.config.storage.clone()).await?);
        let uploader: Arc<dyn Uploader> = match self.config.uploader {
            UploaderKind::Plain => Arc::new(PlainUploader::new(store)),
            UploaderKind::Presigned => {
                Arc::new(PresignedUploader::new(store).with_expiry(self.config.presign_expiry))
            }
        };

        let notifier: Arc<dyn Notifier> = match &self.config.notifier {
            NotifierKind::PubSub { topic } => {
                Arc::new(PubSubNotifier::connect(&self.config.queue.redis_url, topic.as_str()).await?)
            }
            NotifierKind::Http(http) => Arc::new(HttpNotifier::new(http.clone())?),
        };

        let stages = Stages {
            downloader: Arc::new(YtDlpDownloader::new(media.clone())),
            transcoder: Arc::new(FfmpegTranscoder::new(media.clone())),
            uploader,
            notifier,
        };
        info!("Stages configured: {:?}", stages);
        Ok(stages)
    }

    /// Run the listener and runner against the given queue and stages.
    ///
    /// Returns once shutdown has been signalled and every buffered item has
    /// been handled. Returns the number of items handled.
    pub async fn run_with(
        &self,
        queue: Arc<dyn WorkQueue>,
        stages: Stages,
        shutdown: watch::Receiver<bool>,
    ) -> WorkerResult<usize> {
        let request: ReceiveRequest = self.config.queue.receive_request();
        let (buffer_tx, buffer_rx) = mpsc::channel(request.max_items.max(1));

        let lifecycle = LifecycleManager::new(Arc::clone(&queue), self.config.delivery);
        let runner = PipelineRunner::new(stages, self.config.event_format, lifecycle);
        let listener = QueueListener::new(queue, request);

        info!(
            "Starting worker (delivery: {}, events: {})",
            self.config.delivery.as_str(),
            self.config.event_format.as_str()
        );

        let listener_task = tokio::spawn(listener.run(buffer_tx, shutdown));
        let runner_task = tokio::spawn(runner.run(buffer_rx));

        let exit = listener_task
            .await
            .map_err(|e| WorkerError::task_failed(format!("listener: {}", e)))?;
        info!("Listener exited: {:?}", exit);

        // Listener dropped its sender; the runner drains what is left
        runner_task
            .await
            .map_err(|e| WorkerError::task_failed(format!("runner: {}", e)))
    }
}

/// Signal `shutdown` once `signal` resolves.
///
/// When the signal cannot be awaited the sender is held until the task is
/// dropped, so the listener keeps running instead of seeing a closed channel.
pub async fn forward_shutdown<F>(signal: F, shutdown: watch::Sender<bool>)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            info!("Received shutdown signal");
            let _ = shutdown.send(true);
        }
        Err(e) => {
            warn!("Unable to listen for shutdown signal, running until killed: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::time::Duration;

    #[tokio::test]
    async fn test_signal_sets_shutdown() {
        let (tx, mut rx) = watch::channel(false);
        tokio::spawn(forward_shutdown(async { Ok(()) }, tx));

        rx.changed().await.unwrap();
        assert!(*rx.borrow());
    }

    #[tokio::test]
    async fn test_failed_signal_keeps_sender_alive() {
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(forward_shutdown(
            async { Err(io::Error::new(io::ErrorKind::Other, "no signal handler")) },
            tx,
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.has_changed().is_ok());
        assert!(!*rx.borrow());

        handle.abort();
    }
}
