//! Worker configuration.
//!
//! Read once at startup and shared read-only afterwards.

use std::str::FromStr;
use std::time::Duration;

use tubeaudio_media::MediaConfig;
use tubeaudio_models::EventFormat;
use tubeaudio_notify::{HttpNotifierConfig, TopicMap, DOWNLOAD_COMPLETE_TOPIC};
use tubeaudio_queue::QueueConfig;
use tubeaudio_storage::{S3Config, DEFAULT_PRESIGN_EXPIRY};

use crate::error::{WorkerError, WorkerResult};
use crate::lifecycle::DeliveryMode;

/// Which upload stage to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploaderKind {
    /// Store only
    Plain,
    /// Store and issue a presigned GET URL
    #[default]
    Presigned,
}

impl FromStr for UploaderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(UploaderKind::Plain),
            "presigned" => Ok(UploaderKind::Presigned),
            other => Err(format!("unknown uploader kind '{}'", other)),
        }
    }
}

/// Which notification transport to use, with its settings.
#[derive(Debug, Clone)]
pub enum NotifierKind {
    /// Publish to a pub/sub topic
    PubSub { topic: String },
    /// POST to a downstream service
    Http(HttpNotifierConfig),
}

impl NotifierKind {
    pub fn name(&self) -> &'static str {
        match self {
            NotifierKind::PubSub { .. } => "pubsub",
            NotifierKind::Http(_) => "http",
        }
    }
}

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub queue: QueueConfig,
    pub media: MediaConfig,
    pub storage: S3Config,
    pub uploader: UploaderKind,
    /// Lifetime of presigned URLs
    pub presign_expiry: Duration,
    pub notifier: NotifierKind,
    pub event_format: EventFormat,
    pub delivery: DeliveryMode,
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> WorkerResult<Self> {
        let storage = S3Config::from_env().map_err(|e| WorkerError::config_error(e.to_string()))?;

        let uploader = parse_env::<UploaderKind>("UPLOADER_KIND")?.unwrap_or_default();
        let event_format = parse_env::<EventFormat>("NOTIFY_EVENT_FORMAT")?.unwrap_or_default();
        let delivery = parse_env::<DeliveryMode>("DELIVERY_MODE")?.unwrap_or_default();

        let presign_expiry = std::env::var("PRESIGN_EXPIRY_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_PRESIGN_EXPIRY);

        let notifier = notifier_from_env()?;

        Ok(Self {
            queue: QueueConfig::from_env(),
            media: MediaConfig::from_env(),
            storage,
            uploader,
            presign_expiry,
            notifier,
            event_format,
            delivery,
        })
    }
}

fn notifier_from_env() -> WorkerResult<NotifierKind> {
    let kind = std::env::var("NOTIFIER_KIND").unwrap_or_else(|_| "pubsub".to_string());

    match kind.trim().to_ascii_lowercase().as_str() {
        "pubsub" => {
            let topics = TopicMap::from_env().map_err(|e| WorkerError::config_error(e.to_string()))?;
            let topic = topics
                .require(DOWNLOAD_COMPLETE_TOPIC)
                .map_err(|e| WorkerError::config_error(e.to_string()))?;
            Ok(NotifierKind::PubSub {
                topic: topic.to_string(),
            })
        }
        "http" => HttpNotifierConfig::from_env()
            .map(NotifierKind::Http)
            .map_err(|e| WorkerError::config_error(e.to_string())),
        other => Err(WorkerError::config_error(format!(
            "unknown notifier kind '{}'",
            other
        ))),
    }
}

/// Parse an optional enum-valued variable. Unset or blank is `None`.
fn parse_env<T>(key: &str) -> WorkerResult<Option<T>>
where
    T: FromStr<Err = String>,
{
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .parse()
            .map(Some)
            .map_err(|e| WorkerError::config_error(format!("{}: {}", key, e))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: &[&str] = &[
        "S3_BUCKET_NAME",
        "UPLOADER_KIND",
        "NOTIFY_EVENT_FORMAT",
        "DELIVERY_MODE",
        "PRESIGN_EXPIRY_SECS",
        "NOTIFIER_KIND",
        "NOTIFY_TOPICS",
        "NOTIFY_SERVICE_HOST",
    ];

    fn clear_env() {
        for key in KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_uploader_kind_parse() {
        assert_eq!("plain".parse::<UploaderKind>().unwrap(), UploaderKind::Plain);
        assert_eq!(" Presigned ".parse::<UploaderKind>().unwrap(), UploaderKind::Presigned);
        assert!("s3".parse::<UploaderKind>().is_err());
    }

    #[test]
    #[serial]
    fn test_defaults_with_pubsub() {
        clear_env();
        std::env::set_var("S3_BUCKET_NAME", "downloads");
        std::env::set_var("NOTIFY_TOPICS", r#"{"downloadCompleteTopic":"download-complete"}"#);

        let config = WorkerConfig::from_env().unwrap();
        assert_eq!(config.uploader, UploaderKind::Presigned);
        assert_eq!(config.presign_expiry, Duration::from_secs(900));
        assert_eq!(config.event_format, EventFormat::Enriched);
        assert_eq!(config.delivery, DeliveryMode::AtMostOnce);
        match config.notifier {
            NotifierKind::PubSub { topic } => assert_eq!(topic, "download-complete"),
            other => panic!("unexpected notifier: {:?}", other),
        }

        clear_env();
    }

    #[test]
    #[serial]
    fn test_http_notifier_selected() {
        clear_env();
        std::env::set_var("S3_BUCKET_NAME", "downloads");
        std::env::set_var("NOTIFIER_KIND", "http");
        std::env::set_var("NOTIFY_SERVICE_HOST", "api.internal:8080");
        std::env::set_var("UPLOADER_KIND", "plain");
        std::env::set_var("NOTIFY_EVENT_FORMAT", "minimal");

        let config = WorkerConfig::from_env().unwrap();
        assert_eq!(config.uploader, UploaderKind::Plain);
        assert_eq!(config.event_format, EventFormat::Minimal);
        assert_eq!(config.notifier.name(), "http");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_required_keys_are_config_errors() {
        clear_env();
        assert!(matches!(WorkerConfig::from_env(), Err(WorkerError::ConfigError(_))));

        std::env::set_var("S3_BUCKET_NAME", "downloads");
        // pubsub without a topic map
        assert!(matches!(WorkerConfig::from_env(), Err(WorkerError::ConfigError(_))));

        std::env::set_var("NOTIFY_TOPICS", r#"{"otherTopic":"x"}"#);
        assert!(matches!(WorkerConfig::from_env(), Err(WorkerError::ConfigError(_))));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_enum_value_rejected() {
        clear_env();
        std::env::set_var("S3_BUCKET_NAME", "downloads");
        std::env::set_var("NOTIFY_TOPICS", r#"{"downloadCompleteTopic":"t"}"#);
        std::env::set_var("DELIVERY_MODE", "exactly_once");

        let err = WorkerConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("DELIVERY_MODE"));

        clear_env();
    }
}
