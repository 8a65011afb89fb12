//! Error types for the bridge
//!
//! A single crate-wide error enum. Command parsing errors live in
//! [`crate::bridge::command::CommandError`] because their text is shown
//! to chat users verbatim.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level HTTP failure (connect, read, TLS)
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The notification server answered with a non-success status
    #[error("unexpected response {0} from server")]
    UnexpectedStatus(u16),

    /// A streamed record could not be decoded
    #[error("invalid message from server: {0}")]
    Decode(#[from] serde_json::Error),

    /// A streamed record exceeded the line length limit
    #[error("line longer than {0} bytes from server")]
    LineTooLong(usize),

    /// The subscription stream ended without an error
    #[error("stream closed by server")]
    StreamClosed,

    /// Chat platform failure (connection, send, reaction)
    #[error("chat error: {0}")]
    Chat(String),

    /// Invalid or missing configuration
    #[error("config error: {0}")]
    Config(String),

    /// Config file could not be parsed
    #[error("invalid config file: {0}")]
    ConfigFormat(#[from] serde_yaml::Error),

    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a chat error from anything printable
    pub fn chat(msg: impl Into<String>) -> Self {
        Error::Chat(msg.into())
    }

    /// Create a config error from anything printable
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message() {
        let err = Error::UnexpectedStatus(404);
        assert_eq!(err.to_string(), "unexpected response 404 from server");
    }

    #[test]
    fn test_decode_from_serde() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{nope")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Decode(_)));
    }
}
