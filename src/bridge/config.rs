//! Bridge configuration

use std::time::Duration;

use crate::client::config::DEFAULT_MESSAGE_BUFFER;
use crate::client::ClientConfig;

/// Server used when a command has no `--server`
pub const DEFAULT_BASE_URL: &str = "https://ntfy.sh";

/// Reaction used to acknowledge a successful command
pub const DEFAULT_ACK_EMOJI: &str = "✅";

/// Bridge configuration options
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Default ntfy server, without trailing slash
    pub base_url: String,

    /// Reaction added to successfully handled commands
    pub ack_emoji: String,

    /// Capacity of the shared notification channel
    pub message_buffer: usize,

    /// ntfy client settings
    pub client: ClientConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            ack_emoji: DEFAULT_ACK_EMOJI.to_string(),
            message_buffer: DEFAULT_MESSAGE_BUFFER,
            client: ClientConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Create a config with a custom default server
    pub fn with_base_url(url: impl Into<String>) -> Self {
        Self::default().base_url(url)
    }

    /// Set the default server
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the acknowledgement reaction
    pub fn ack_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.ack_emoji = emoji.into();
        self
    }

    /// Set the notification channel capacity (at least 1)
    pub fn message_buffer(mut self, capacity: usize) -> Self {
        self.message_buffer = capacity.max(1);
        self
    }

    /// Set the reconnect delay of stream connectors
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.client.retry_delay = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();

        assert_eq!(config.base_url, "https://ntfy.sh");
        assert_eq!(config.ack_emoji, "✅");
        assert_eq!(config.message_buffer, 256);
        assert_eq!(config.client.retry_delay, Duration::from_secs(5));
    }

    #[test]
    fn test_base_url_trims_slash() {
        let config = BridgeConfig::with_base_url("https://ntfy.example.com///");

        assert_eq!(config.base_url, "https://ntfy.example.com");
    }

    #[test]
    fn test_builder_chaining() {
        let config = BridgeConfig::default()
            .ack_emoji("👍")
            .message_buffer(0)
            .retry_delay(Duration::from_millis(100));

        assert_eq!(config.ack_emoji, "👍");
        assert_eq!(config.message_buffer, 1);
        assert_eq!(config.client.retry_delay, Duration::from_millis(100));
    }
}
