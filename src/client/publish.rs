//! Publishing
//!
//! Options map to ntfy's `X-Title`, `X-Priority` and `X-Tags` headers.
//! Empty values are never sent.

use async_trait::async_trait;

use crate::error::Result;
use crate::registry::Topic;

/// Optional publish parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishOptions {
    /// Message title
    pub title: Option<String>,
    /// Priority, numeric (`1`-`5`) or named (`high`, `urgent`, ...)
    pub priority: Option<String>,
    /// Tags, sent comma-separated
    pub tags: Vec<String>,
}

impl PublishOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the priority
    pub fn priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Add a tag
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Header pairs to send, skipping empty values
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = Vec::with_capacity(3);

        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            headers.push(("X-Title", title.to_string()));
        }
        if let Some(priority) = self.priority.as_deref().filter(|p| !p.is_empty()) {
            headers.push(("X-Priority", priority.to_string()));
        }
        let tags: Vec<&str> = self
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if !tags.is_empty() {
            headers.push(("X-Tags", tags.join(",")));
        }

        headers
    }
}

/// Something that can publish a message to a topic
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `body` to `topic`
    async fn publish(&self, topic: &Topic, body: &str, options: &PublishOptions) -> Result<()>;
}
