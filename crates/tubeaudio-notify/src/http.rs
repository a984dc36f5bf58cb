//! Completion events via HTTP callback.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use tubeaudio_models::CompletionEvent;

use crate::error::{NotifyError, NotifyResult};
use crate::notifier::Notifier;

/// Path completion events are POSTed to.
pub const COMPLETE_PATH: &str = "/complete";

/// Configuration for the HTTP notifier.
#[derive(Debug, Clone)]
pub struct HttpNotifierConfig {
    /// Service-discovery host of the downstream service
    pub service_host: String,
    /// Request timeout
    pub timeout: Duration,
}

impl HttpNotifierConfig {
    /// Create config from environment variables.
    pub fn from_env() -> NotifyResult<Self> {
        let service_host = std::env::var("NOTIFY_SERVICE_HOST")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| NotifyError::config("NOTIFY_SERVICE_HOST not set"))?;

        Ok(Self {
            service_host,
            timeout: Duration::from_secs(
                std::env::var("NOTIFY_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        })
    }

    /// Full endpoint URL.
    ///
    /// A bare host gets `http://`; a host that already names a scheme is
    /// used as-is.
    pub fn endpoint(&self) -> String {
        let host = self.service_host.trim().trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            format!("{}{}", host, COMPLETE_PATH)
        } else {
            format!("http://{}{}", host, COMPLETE_PATH)
        }
    }
}

/// POSTs completion events as JSON to a downstream service.
pub struct HttpNotifier {
    http: Client,
    endpoint: String,
}

impl HttpNotifier {
    /// Create a new HTTP notifier.
    pub fn new(config: HttpNotifierConfig) -> NotifyResult<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint(),
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn notify(&self, event: &CompletionEvent) -> NotifyResult<()> {
        debug!("POST {} for {}", self.endpoint, event.video_id);

        let response = self.http.post(&self.endpoint).json(event).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tubeaudio_models::VideoId;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn notifier_for(server: &MockServer) -> HttpNotifier {
        HttpNotifier::new(HttpNotifierConfig {
            service_host: server.uri(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn event() -> CompletionEvent {
        CompletionEvent::enriched(
            VideoId::parse("abc123").unwrap(),
            "Title",
            Some("https://bucket/abc123".to_string()),
        )
    }

    #[test]
    fn test_endpoint_from_bare_host() {
        let config = HttpNotifierConfig {
            service_host: "api.tubeaudio.local:8080/".to_string(),
            timeout: Duration::from_secs(1),
        };
        assert_eq!(config.endpoint(), "http://api.tubeaudio.local:8080/complete");
    }

    #[tokio::test]
    async fn test_posts_json_event() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/complete"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "videoID": "abc123",
                "title": "Title",
                "url": "https://bucket/abc123"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        notifier_for(&server).notify(&event()).await.unwrap();
    }

    #[tokio::test]
    async fn test_non_200_is_error() {
        for status in [201u16, 404, 500] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/complete"))
                .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
                .mount(&server)
                .await;

            let err = notifier_for(&server).notify(&event()).await.unwrap_err();
            match err {
                NotifyError::UnexpectedStatus { status: got, body } => {
                    assert_eq!(got, status);
                    assert_eq!(body, "nope");
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_is_error() {
        let notifier = HttpNotifier::new(HttpNotifierConfig {
            service_host: "http://127.0.0.1:1".to_string(),
            timeout: Duration::from_secs(2),
        })
        .unwrap();
        assert!(matches!(
            notifier.notify(&event()).await,
            Err(NotifyError::Network(_))
        ));
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        std::env::set_var("NOTIFY_SERVICE_HOST", "complete.svc");
        std::env::remove_var("NOTIFY_TIMEOUT_SECS");
        let config = HttpNotifierConfig::from_env().unwrap();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.endpoint(), "http://complete.svc/complete");

        std::env::remove_var("NOTIFY_SERVICE_HOST");
        assert!(HttpNotifierConfig::from_env().is_err());
    }
}
