//! Queue-driven audio extraction worker.
//!
//! This crate provides:
//! - Queue listener feeding a bounded in-process buffer
//! - Sequential pipeline runner (decode, download, transcode, upload, notify)
//! - Lifecycle manager acknowledging finished items
//! - Supervisor wiring configured stages and handling shutdown

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod listener;
pub mod logging;
pub mod retry;
pub mod runner;
pub mod supervisor;

pub use config::{NotifierKind, UploaderKind, WorkerConfig};
pub use error::{StageError, WorkerError, WorkerResult};
pub use lifecycle::{DeliveryMode, LifecycleManager};
pub use listener::{ListenerExit, QueueListener};
pub use logging::ItemLogger;
pub use retry::{Backoff, FailureTracker};
pub use runner::{ItemOutcome, PipelineRunner, PipelineState, Stages};
pub use supervisor::Supervisor;
