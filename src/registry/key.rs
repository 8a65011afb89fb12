//! Routing keys
//!
//! Topics and chat channels are both opaque to the bridge. They are wrapped
//! in newtypes so a channel can never be passed where a topic is expected.

use std::fmt;

/// Fully qualified topic key, e.g. `https://ntfy.sh/alerts`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Topic(String);

impl Topic {
    /// Wrap an already qualified topic URL
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Build a topic key from a server base URL and a topic name
    ///
    /// A trailing slash on `base_url` is ignored. If `name` already carries
    /// an `http://` or `https://` scheme it is used as-is.
    pub fn resolve(base_url: &str, name: &str) -> Self {
        if has_scheme(name) {
            return Self::new(name);
        }
        let base = base_url.trim_end_matches('/');
        let name = name.trim_start_matches('/');
        Self(format!("{}/{}", base, name))
    }

    /// The topic key as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display form without the URI scheme
    pub fn short(&self) -> &str {
        let s = self.0.as_str();
        s.strip_prefix("http://")
            .or_else(|| s.strip_prefix("https://"))
            .unwrap_or(s)
    }

    /// URL of the newline-delimited JSON feed for this topic
    pub fn json_url(&self) -> String {
        format!("{}/json", self.0)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn has_scheme(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Opaque chat destination identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(String);

impl ChannelId {
    /// Wrap a platform channel identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ChannelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
