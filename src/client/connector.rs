//! Per-topic stream connector
//!
//! Holds a long-lived `GET <topic>/json` request open and forwards every
//! decoded message event to the shared notification channel. Any failure
//! ends the current connection; the connector waits a fixed delay and
//! starts over until it is cancelled.

use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::registry::Topic;

use super::config::ClientConfig;
use super::lines::LineBuffer;
use super::message::NotificationMessage;

/// How a single connection attempt ended without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// Nobody is reading notifications anymore
    SinkClosed,
}

/// Reconnecting stream reader for a single topic
pub struct StreamConnector {
    http: reqwest::Client,
    topic: Topic,
    sink: mpsc::Sender<NotificationMessage>,
    retry_delay: Duration,
    max_line: usize,
}

impl StreamConnector {
    /// Create a connector for `topic` that pushes messages into `sink`
    pub fn new(
        http: reqwest::Client,
        topic: Topic,
        sink: mpsc::Sender<NotificationMessage>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            http,
            topic,
            sink,
            retry_delay: config.retry_delay,
            max_line: config.max_line_length,
        }
    }

    /// Run until cancelled, reconnecting after every failure
    ///
    /// Cancellation interrupts a pending connect, a blocked read or send,
    /// and the retry delay.
    pub async fn run(self, cancel: CancellationToken) {
        let mut attempt: u64 = 0;

        loop {
            attempt += 1;

            let result = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.connect_once() => result,
            };

            match result {
                Ok(Outcome::SinkClosed) => {
                    tracing::debug!(topic = %self.topic, "Notification channel closed");
                    break;
                }
                Err(e) => {
                    tracing::warn!(
                        topic = %self.topic,
                        attempt = attempt,
                        error = %e,
                        retry_in_ms = self.retry_delay.as_millis() as u64,
                        "Connection failed"
                    );
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.retry_delay) => {}
            }
        }

        tracing::info!(topic = %self.topic, attempts = attempt, "Connector exited");
    }

    /// One connection: connect, stream lines, decode, forward
    ///
    /// Returns an error for every way the stream can end except the sink
    /// going away, including a clean end of body.
    async fn connect_once(&self) -> Result<Outcome> {
        let response = self.http.get(self.topic.json_url()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UnexpectedStatus(status.as_u16()));
        }

        tracing::debug!(topic = %self.topic, "Stream connected");

        let mut lines = LineBuffer::with_max_line(self.max_line);
        let mut body = response.bytes_stream();

        while let Some(chunk) = body.next().await {
            lines.push(&chunk?);

            while let Some(line) = lines.next_line()? {
                // A bad line drops the whole connection
                let message = NotificationMessage::from_line(&self.topic, &line)?;

                if !message.is_message() {
                    tracing::trace!(
                        topic = %self.topic,
                        event = %message.event_kind,
                        "Control event"
                    );
                    continue;
                }

                tracing::debug!(topic = %self.topic, id = ?message.id, "Message received");

                if self.sink.send(message).await.is_err() {
                    return Ok(Outcome::SinkClosed);
                }
            }
        }

        Err(Error::StreamClosed)
    }
}
