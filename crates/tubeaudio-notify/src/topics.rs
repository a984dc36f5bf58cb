//! Topic map parsing.

use std::collections::HashMap;

use crate::error::{NotifyError, NotifyResult};

/// Logical name of the topic completion events are published to.
pub const DOWNLOAD_COMPLETE_TOPIC: &str = "downloadCompleteTopic";

/// Topic identifiers keyed by logical topic name.
///
/// Parsed from a JSON object such as
/// `{"downloadCompleteTopic": "tubeaudio:download-complete"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicMap(HashMap<String, String>);

impl TopicMap {
    pub fn parse(json: &str) -> NotifyResult<Self> {
        let map: HashMap<String, String> = serde_json::from_str(json)
            .map_err(|e| NotifyError::config(format!("invalid topic map: {}", e)))?;
        Ok(Self(map))
    }

    /// Parse from `NOTIFY_TOPICS`.
    pub fn from_env() -> NotifyResult<Self> {
        let json = std::env::var("NOTIFY_TOPICS")
            .map_err(|_| NotifyError::config("NOTIFY_TOPICS not set"))?;
        Self::parse(&json)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Look up a topic that must be present and non-empty.
    pub fn require(&self, name: &str) -> NotifyResult<&str> {
        self.get(name)
            .filter(|topic| !topic.trim().is_empty())
            .ok_or_else(|| NotifyError::config(format!("topic '{}' missing from topic map", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_topic_map() {
        let topics = TopicMap::parse(r#"{"downloadCompleteTopic":"done","other":"x"}"#).unwrap();
        assert_eq!(topics.require(DOWNLOAD_COMPLETE_TOPIC).unwrap(), "done");
        assert_eq!(topics.get("other"), Some("x"));
    }

    #[test]
    fn test_missing_or_empty_topic() {
        let topics = TopicMap::parse(r#"{"downloadCompleteTopic":""}"#).unwrap();
        assert!(topics.require(DOWNLOAD_COMPLETE_TOPIC).is_err());
        assert!(TopicMap::default().require(DOWNLOAD_COMPLETE_TOPIC).is_err());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(TopicMap::parse("not json"), Err(NotifyError::Config(_))));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var("NOTIFY_TOPICS", r#"{"downloadCompleteTopic":"t1"}"#);
        let topics = TopicMap::from_env().unwrap();
        assert_eq!(topics.get(DOWNLOAD_COMPLETE_TOPIC), Some("t1"));

        std::env::remove_var("NOTIFY_TOPICS");
        assert!(TopicMap::from_env().is_err());
    }
}
