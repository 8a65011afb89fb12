//! Chat platform boundary
//!
//! The bridge talks to a chat platform only through [`ChatAdapter`].
//! Platform SDKs live behind it; this crate ships an in-memory adapter used
//! by tests and by the console mode of the `ntfybot` binary.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::registry::ChannelId;

pub mod event;
pub mod memory;

pub use event::{ChatEvent, ChatMessage};
pub use memory::MemoryChat;

/// Connection to a chat platform
#[async_trait]
pub trait ChatAdapter: Send + Sync {
    /// Connect to the platform and start delivering events
    ///
    /// Failure here is fatal for the bridge.
    async fn connect(&self) -> Result<mpsc::Receiver<ChatEvent>>;

    /// Post `text` to `channel`
    async fn send(&self, channel: &ChannelId, text: &str) -> Result<()>;

    /// Add a reaction to a message
    async fn react(&self, channel: &ChannelId, message_id: &str, emoji: &str) -> Result<()>;

    /// The token that addresses a message to the bridge itself
    fn mention_self(&self) -> String;

    /// Disconnect from the platform
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
