//! Command dispatch
//!
//! Turns a chat message addressed to the bot into registry and publish
//! operations. Success is acknowledged with a reaction; anything else is
//! answered with a text reply. Nothing here is fatal.

use std::sync::Arc;

use crate::chat::{ChatAdapter, ChatMessage};
use crate::client::Publisher;
use crate::registry::SubscriptionRegistry;

use super::command::{tokenize, Command, USAGE};
use super::config::BridgeConfig;

/// What to send back for a handled command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// React to the command message
    Ack,
    /// Reply with text in the command's channel
    Reply(String),
}

/// Executes chat commands
pub struct CommandDispatcher {
    registry: Arc<SubscriptionRegistry>,
    publisher: Arc<dyn Publisher>,
    chat: Arc<dyn ChatAdapter>,
    base_url: String,
    ack_emoji: String,
}

impl CommandDispatcher {
    /// Create a dispatcher
    pub fn new(
        config: &BridgeConfig,
        registry: Arc<SubscriptionRegistry>,
        publisher: Arc<dyn Publisher>,
        chat: Arc<dyn ChatAdapter>,
    ) -> Self {
        Self {
            registry,
            publisher,
            chat,
            base_url: config.base_url.clone(),
            ack_emoji: config.ack_emoji.clone(),
        }
    }

    /// Handle an inbound chat message
    ///
    /// Messages whose first word is not the bot's mention are ignored.
    /// Returns whether the message was addressed to the bot.
    pub async fn handle(&self, message: &ChatMessage) -> bool {
        let Some(line) = strip_mention(&message.text, &self.chat.mention_self()) else {
            return false;
        };

        tracing::debug!(
            channel = %message.channel,
            sender = %message.sender,
            command = %line,
            "Command received"
        );

        let response = match tokenize(line) {
            Ok(args) => match Command::parse(&args, &self.base_url) {
                Ok(command) => self.execute(message, command).await,
                Err(e) => Response::Reply(e.to_string()),
            },
            Err(e) => Response::Reply(e.to_string()),
        };

        self.respond(message, response).await;
        true
    }

    /// Run a parsed command on behalf of `message`'s channel
    pub async fn execute(&self, message: &ChatMessage, command: Command) -> Response {
        let channel = &message.channel;

        match command {
            Command::Publish {
                topic,
                message: body,
                options,
            } => match self.publisher.publish(&topic, &body, &options).await {
                Ok(()) => {
                    tracing::info!(topic = %topic, channel = %channel, "Published message");
                    Response::Ack
                }
                Err(e) => {
                    tracing::warn!(topic = %topic, channel = %channel, error = %e, "Publish failed");
                    Response::Reply(e.to_string())
                }
            },
            Command::Subscribe { topic } => {
                self.registry.subscribe(&topic, channel).await;
                Response::Ack
            }
            Command::Unsubscribe { topic } => {
                self.registry.unsubscribe(&topic, channel).await;
                Response::Ack
            }
            Command::List => {
                let topics = self.registry.topics_for(channel).await;
                if topics.is_empty() {
                    Response::Reply("No subscriptions in this channel".to_string())
                } else {
                    let lines: Vec<String> =
                        topics.iter().map(|t| format!("- {}", t.short())).collect();
                    Response::Reply(format!("Subscribed to:\n{}", lines.join("\n")))
                }
            }
            Command::Help => Response::Reply(USAGE.to_string()),
            Command::Unknown(word) => Response::Reply(format!("command not found: {}", word)),
        }
    }

    async fn respond(&self, message: &ChatMessage, response: Response) {
        let result = match &response {
            Response::Ack => {
                self.chat
                    .react(&message.channel, &message.id, &self.ack_emoji)
                    .await
            }
            Response::Reply(text) => self.chat.send(&message.channel, text).await,
        };

        if let Err(e) = result {
            tracing::warn!(
                channel = %message.channel,
                message_id = %message.id,
                error = %e,
                "Failed to respond to command"
            );
        }
    }
}

/// The text after the mention, if the message starts with it
fn strip_mention<'a>(text: &'a str, mention: &str) -> Option<&'a str> {
    let text = text.trim_start();
    let first = text.split_whitespace().next()?;
    if first != mention {
        return None;
    }
    Some(&text[first.len()..])
}
