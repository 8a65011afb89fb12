//! Chat events
//!
//! Adapters translate platform callbacks into these and push them onto the
//! channel returned by [`ChatAdapter::connect`](super::ChatAdapter::connect).

use crate::registry::ChannelId;

/// An inbound chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Platform message ID (used for reactions)
    pub id: String,

    /// Channel the message was posted in
    pub channel: ChannelId,

    /// Author of the message
    pub sender: String,

    /// Raw message text
    pub text: String,
}

impl ChatMessage {
    /// Create a new message
    pub fn new(
        id: impl Into<String>,
        channel: impl Into<ChannelId>,
        sender: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            channel: channel.into(),
            sender: sender.into(),
            text: text.into(),
        }
    }
}

/// Events produced by a chat adapter
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// A message was posted
    Message(ChatMessage),

    /// The platform connection failed; the bridge stops
    Error(String),
}
