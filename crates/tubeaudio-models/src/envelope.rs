//! Queue envelope decoding.
//!
//! A work item body is a JSON wrapper whose `Message` field holds a video URL.
//! The identifier lives in the `v` query parameter of that URL:
//!
//! ```text
//! {"Message": "https://www.youtube.com/watch?v=abc123"}  ->  abc123
//! ```

use serde::Deserialize;
use thiserror::Error;
use url::{ParseError, Url};

use crate::video::VideoId;

/// Query parameter carrying the video identifier.
pub const VIDEO_ID_PARAM: &str = "v";

/// Base that scheme-less and relative message URLs are resolved against.
/// Only the query string is read, so the host never matters.
const RELATIVE_BASE: &str = "http://localhost/";

/// Result type for envelope decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Reasons a queue message body cannot be turned into a [`VideoId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Malformed URL: {0}")]
    MalformedUrl(String),

    #[error("Video identifier not found in URL: {0}")]
    MissingIdentifier(String),
}

impl DecodeError {
    /// Short, stable name of the failure reason for structured logs.
    pub fn reason(&self) -> &'static str {
        match self {
            DecodeError::MalformedEnvelope(_) => "malformed_envelope",
            DecodeError::MalformedUrl(_) => "malformed_url",
            DecodeError::MissingIdentifier(_) => "missing_identifier",
        }
    }
}

/// JSON wrapper around the payload URL.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(rename = "Message", alias = "message")]
    pub message: String,
}

impl Envelope {
    /// Parse an envelope from a raw message body.
    pub fn from_body(body: &str) -> DecodeResult<Self> {
        serde_json::from_str(body).map_err(|e| DecodeError::MalformedEnvelope(e.to_string()))
    }

    /// Extract the video identifier from the wrapped URL.
    ///
    /// Producers often send `youtube.com/watch?v=...` without a scheme, so
    /// relative input is accepted and resolved against a fixed base.
    pub fn video_id(&self) -> DecodeResult<VideoId> {
        let url = parse_lenient(self.message.trim())
            .map_err(|e| DecodeError::MalformedUrl(format!("{}: {}", self.message, e)))?;

        // First occurrence wins when the parameter repeats
        url.query_pairs()
            .find(|(key, _)| key == VIDEO_ID_PARAM)
            .and_then(|(_, value)| VideoId::parse(value.into_owned()))
            .ok_or_else(|| DecodeError::MissingIdentifier(self.message.clone()))
    }
}

fn parse_lenient(input: &str) -> Result<Url, ParseError> {
    match Url::parse(input) {
        Err(ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(RELATIVE_BASE)?;
            Url::options().base_url(Some(&base)).parse(input)
        }
        result => result,
    }
}

/// Decode a raw queue message body into a video identifier.
///
/// Pure: no I/O, no side effects. JSON is validated before any URL parsing.
pub fn decode_video_id(body: &str) -> DecodeResult<VideoId> {
    Envelope::from_body(body)?.video_id()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_watch_url() {
        let id = decode_video_id(r#"{"Message":"https://youtu.be/watch?v=abc123"}"#).unwrap();
        assert_eq!(id.as_str(), "abc123");
    }

    #[test]
    fn test_decode_with_extra_params() {
        let bodies = [
            r#"{"Message":"https://www.youtube.com/watch?list=PL1&v=xyz&t=42s"}"#,
            r#"{"Message":"https://www.youtube.com/watch?v=xyz#comments"}"#,
            r#"{"Message":"  https://m.youtube.com/watch?feature=share&v=xyz  "}"#,
        ];
        for body in bodies {
            assert_eq!(decode_video_id(body).unwrap().as_str(), "xyz", "{}", body);
        }
    }

    #[test]
    fn test_decode_percent_encoded_value() {
        let id = decode_video_id(r#"{"Message":"https://host/watch?v=a%2Db"}"#).unwrap();
        assert_eq!(id.as_str(), "a-b");
    }

    #[test]
    fn test_first_value_wins() {
        let id = decode_video_id(r#"{"Message":"https://host/watch?v=first&v=second"}"#).unwrap();
        assert_eq!(id.as_str(), "first");
    }

    #[test]
    fn test_lowercase_field_name_accepted() {
        let id = decode_video_id(r#"{"message":"https://host/watch?v=abc"}"#).unwrap();
        assert_eq!(id.as_str(), "abc");
    }

    #[test]
    fn test_missing_identifier() {
        let err = decode_video_id(r#"{"Message":"https://youtu.be/watch"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingIdentifier(_)));
        assert_eq!(err.reason(), "missing_identifier");
    }

    #[test]
    fn test_empty_identifier_is_missing() {
        let err = decode_video_id(r#"{"Message":"https://youtu.be/watch?v="}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingIdentifier(_)));
    }

    #[test]
    fn test_malformed_json_before_url_parsing() {
        // The URL inside would also be invalid; JSON must fail first.
        for body in ["", "not json", r#"{"Message": "::::""#, r#"{"Other":"x"}"#, "[]"] {
            let err = decode_video_id(body).unwrap_err();
            assert!(matches!(err, DecodeError::MalformedEnvelope(_)), "{}", body);
        }
    }

    #[test]
    fn test_scheme_less_and_relative_urls() {
        let bodies = [
            r#"{"Message":"youtube.com/watch?v=abc"}"#,
            r#"{"Message":"www.youtube.com/watch?v=abc"}"#,
            r#"{"Message":"/watch?v=abc"}"#,
            r#"{"Message":"watch?v=abc"}"#,
            r#"{"Message":"?v=abc"}"#,
        ];
        for body in bodies {
            assert_eq!(decode_video_id(body).unwrap().as_str(), "abc", "{}", body);
        }
    }

    #[test]
    fn test_relative_url_without_identifier() {
        let err = decode_video_id(r#"{"Message":"youtube.com/watch"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingIdentifier(_)));
    }

    #[test]
    fn test_malformed_url() {
        for body in [r#"{"Message":"http://[::1"}"#, r#"{"Message":"https://:80/watch?v=abc"}"#] {
            let err = decode_video_id(body).unwrap_err();
            assert!(matches!(err, DecodeError::MalformedUrl(_)), "{}", body);
        }
    }
}
