//! Notification fan-out
//!
//! Drains the shared notification channel and posts every message event to
//! each channel subscribed to its topic. Sends are independent: one failing
//! channel is logged and skipped.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::chat::ChatAdapter;
use crate::client::NotificationMessage;
use crate::registry::SubscriptionRegistry;

/// Chat text for a notification
///
/// `**<topic>**` on the first line (with `: <title>` appended when the
/// message has one), the body on the next.
pub fn format_message(message: &NotificationMessage) -> String {
    match message.title.as_deref() {
        Some(title) => format!("**{}**: {}\n{}", message.topic.short(), title, message.body),
        None => format!("**{}**\n{}", message.topic.short(), message.body),
    }
}

/// Routes notification messages to chat channels
pub struct MessageRouter {
    registry: Arc<SubscriptionRegistry>,
    chat: Arc<dyn ChatAdapter>,
}

impl MessageRouter {
    /// Create a router reading subscriptions from `registry`
    pub fn new(registry: Arc<SubscriptionRegistry>, chat: Arc<dyn ChatAdapter>) -> Self {
        Self { registry, chat }
    }

    /// Deliver one message to every subscribed channel
    ///
    /// Returns the number of channels it was delivered to.
    pub async fn route(&self, message: &NotificationMessage) -> usize {
        if !message.is_message() {
            return 0;
        }

        let channels = self.registry.channels_for(&message.topic).await;
        if channels.is_empty() {
            tracing::debug!(topic = %message.topic, "No subscribers for message");
            return 0;
        }

        let text = format_message(message);
        let mut delivered = 0;

        for channel in &channels {
            match self.chat.send(channel, &text).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        topic = %message.topic,
                        channel = %channel,
                        error = %e,
                        "Failed to forward message"
                    );
                }
            }
        }

        tracing::debug!(
            topic = %message.topic,
            channels = channels.len(),
            delivered = delivered,
            "Message forwarded"
        );

        delivered
    }

    /// Route messages until `shutdown` fires or the channel closes
    pub async fn run(
        &self,
        mut messages: mpsc::Receiver<NotificationMessage>,
        shutdown: CancellationToken,
    ) {
        loop {
            let message = tokio::select! {
                _ = shutdown.cancelled() => break,
                message = messages.recv() => match message {
                    Some(message) => message,
                    None => break,
                },
            };

            self.route(&message).await;
        }

        tracing::debug!("Message router stopped");
    }
}
