//! ntfy HTTP client
//!
//! One `reqwest::Client` shared by publishing and by every stream connector.
//! The client owns the sending half of the notification channel and hands a
//! clone to each connector it launches.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::registry::{StreamLauncher, Topic};

use super::config::ClientConfig;
use super::connector::StreamConnector;
use super::message::NotificationMessage;
use super::publish::{PublishOptions, Publisher};

/// ntfy client
///
/// # Example
/// ```no_run
/// use ntfy_bridge::client::{ClientConfig, NtfyClient, PublishOptions};
/// use ntfy_bridge::registry::Topic;
///
/// # async fn example() -> ntfy_bridge::error::Result<()> {
/// let (client, _messages) = NtfyClient::new(ClientConfig::default(), 256)?;
///
/// let topic = Topic::resolve("https://ntfy.sh", "mytopic");
/// client
///     .publish(&topic, "hello", &PublishOptions::new().title("Hi"))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct NtfyClient {
    http: reqwest::Client,
    config: ClientConfig,
    sink: mpsc::Sender<NotificationMessage>,
}

impl NtfyClient {
    /// Create a client and the notification channel its connectors feed.
    ///
    /// Returns the client and the receiving half of the channel.
    pub fn new(
        config: ClientConfig,
        buffer: usize,
    ) -> Result<(Self, mpsc::Receiver<NotificationMessage>)> {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        Ok((Self::with_sink(config, tx)?, rx))
    }

    /// Create a client that feeds an existing channel
    pub fn with_sink(config: ClientConfig, sink: mpsc::Sender<NotificationMessage>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { http, config, sink })
    }

    /// Build a connector for `topic` sharing this client's connection pool
    pub fn connector(&self, topic: Topic) -> StreamConnector {
        StreamConnector::new(
            self.http.clone(),
            topic,
            self.sink.clone(),
            &self.config,
        )
    }

    /// Publish a plain-text message to a topic
    ///
    /// A response status of 300 or above is an error.
    pub async fn publish(&self, topic: &Topic, body: &str, options: &PublishOptions) -> Result<()> {
        let mut request = self
            .http
            .post(topic.as_str())
            .timeout(self.config.publish_timeout)
            .body(body.to_string());

        for (name, value) in options.headers() {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        if status >= 300 {
            return Err(Error::UnexpectedStatus(status));
        }

        tracing::debug!(topic = %topic, status = status, "Message published");

        Ok(())
    }
}

impl StreamLauncher for NtfyClient {
    fn launch(&self, topic: Topic, cancel: CancellationToken) -> JoinHandle<()> {
        let connector = self.connector(topic);
        tokio::spawn(connector.run(cancel))
    }
}

#[async_trait]
impl Publisher for NtfyClient {
    async fn publish(&self, topic: &Topic, body: &str, options: &PublishOptions) -> Result<()> {
        NtfyClient::publish(self, topic, body, options).await
    }
}
