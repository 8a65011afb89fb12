//! ntfy client implementation
//!
//! Provides the notification-service side of the bridge:
//! - Publishing messages to a topic
//! - One reconnecting JSON stream per subscribed topic
//! - Decoding of the newline-delimited message format

pub mod config;
pub mod connector;
pub mod lines;
pub mod message;
pub mod ntfy;
pub mod publish;

pub use config::ClientConfig;
pub use connector::StreamConnector;
pub use message::NotificationMessage;
pub use ntfy::NtfyClient;
pub use publish::{PublishOptions, Publisher};
