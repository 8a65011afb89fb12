//! Notification message types
//!
//! ntfy streams one JSON object per line. Only `event == "message"` carries
//! user content; `open` and `keepalive` are connection housekeeping.

use serde::Deserialize;

use crate::registry::Topic;

/// Event kind of a real published message
pub const EVENT_MESSAGE: &str = "message";

/// A line of the ntfy JSON stream as sent on the wire
#[derive(Debug, Clone, Deserialize)]
pub struct WireMessage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub time: Option<i64>,
    pub event: String,
    /// Bare topic name, not the full URL
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// A decoded message from a topic's stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    /// `message`, `open`, `keepalive`, ...
    pub event_kind: String,
    /// Fully qualified topic the message arrived on
    pub topic: Topic,
    /// Message body
    pub body: String,
    /// Optional title
    pub title: Option<String>,
    /// Optional priority (1-5)
    pub priority: Option<u8>,
    /// Optional tags
    pub tags: Option<Vec<String>>,
    /// Server-assigned message ID
    pub id: Option<String>,
    /// Unix timestamp of the message
    pub time: Option<i64>,
}

impl NotificationMessage {
    /// Create a plain message event
    pub fn new(topic: Topic, body: impl Into<String>) -> Self {
        Self {
            event_kind: EVENT_MESSAGE.to_string(),
            topic,
            body: body.into(),
            title: None,
            priority: None,
            tags: None,
            id: None,
            time: None,
        }
    }

    /// Decode one stream line, stamping it with the connector's topic
    pub fn from_line(topic: &Topic, line: &[u8]) -> serde_json::Result<Self> {
        let wire: WireMessage = serde_json::from_slice(line)?;
        Ok(Self::from_wire(topic, wire))
    }

    /// Convert a wire record, stamping it with the connector's topic
    pub fn from_wire(topic: &Topic, wire: WireMessage) -> Self {
        Self {
            event_kind: wire.event,
            topic: topic.clone(),
            body: wire.message.unwrap_or_default(),
            title: wire.title.filter(|t| !t.is_empty()),
            priority: wire.priority,
            tags: wire.tags,
            id: wire.id,
            time: wire.time,
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the event kind
    pub fn with_event_kind(mut self, kind: impl Into<String>) -> Self {
        self.event_kind = kind.into();
        self
    }

    /// Whether this is a real message rather than a control event
    pub fn is_message(&self) -> bool {
        self.event_kind == EVENT_MESSAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_message() {
        let topic = Topic::new("https://ntfy.sh/alerts");
        let line = br#"{"id":"abc","time":1700000000,"event":"message","topic":"alerts","message":"disk full","title":"Server","priority":4,"tags":["warning","disk"]}"#;

        let msg = NotificationMessage::from_line(&topic, line).unwrap();

        assert!(msg.is_message());
        assert_eq!(msg.topic, topic);
        assert_eq!(msg.body, "disk full");
        assert_eq!(msg.title.as_deref(), Some("Server"));
        assert_eq!(msg.priority, Some(4));
        assert_eq!(
            msg.tags,
            Some(vec!["warning".to_string(), "disk".to_string()])
        );
        assert_eq!(msg.id.as_deref(), Some("abc"));
        assert_eq!(msg.time, Some(1_700_000_000));
    }

    #[test]
    fn test_decode_keepalive() {
        let topic = Topic::new("https://ntfy.sh/alerts");
        let line = br#"{"id":"x","time":1,"event":"keepalive","topic":"alerts"}"#;

        let msg = NotificationMessage::from_line(&topic, line).unwrap();

        assert!(!msg.is_message());
        assert!(msg.body.is_empty());
    }

    #[test]
    fn test_decode_invalid() {
        let topic = Topic::new("https://ntfy.sh/alerts");
        assert!(NotificationMessage::from_line(&topic, b"not json").is_err());
        assert!(NotificationMessage::from_line(&topic, br#"{"topic":"x"}"#).is_err());
    }
}
