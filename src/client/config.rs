//! ntfy client configuration

use std::time::Duration;

use super::lines::DEFAULT_MAX_LINE_LENGTH;

/// Delay between reconnection attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Capacity of the shared notification channel
pub const DEFAULT_MESSAGE_BUFFER: usize = 256;

/// ntfy client configuration options
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Fixed delay before reconnecting a failed stream
    pub retry_delay: Duration,

    /// TCP/TLS connect timeout
    pub connect_timeout: Duration,

    /// Timeout for publish requests (streams have none)
    pub publish_timeout: Duration,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Longest stream line accepted before the connection is dropped
    pub max_line_length: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            retry_delay: DEFAULT_RETRY_DELAY,
            connect_timeout: Duration::from_secs(10),
            publish_timeout: Duration::from_secs(30),
            user_agent: concat!("ntfybot/", env!("CARGO_PKG_VERSION")).to_string(),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

impl ClientConfig {
    /// Set the reconnect delay
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the stream line length limit
    pub fn max_line_length(mut self, bytes: usize) -> Self {
        self.max_line_length = bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();

        assert_eq!(config.retry_delay, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert!(config.user_agent.starts_with("ntfybot/"));
        assert_eq!(config.max_line_length, 1024 * 1024);
    }

    #[test]
    fn test_builder_chaining() {
        let config = ClientConfig::default()
            .retry_delay(Duration::from_millis(50))
            .max_line_length(64);

        assert_eq!(config.retry_delay, Duration::from_millis(50));
        assert_eq!(config.max_line_length, 64);
        assert_eq!(config.publish_timeout, Duration::from_secs(30));
    }
}
