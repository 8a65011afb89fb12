//! In-memory chat adapter
//!
//! Records everything the bridge sends and lets callers inject inbound
//! messages. With echo enabled, output is also printed to stdout, which is
//! how the binary's console mode talks to a terminal.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::registry::ChannelId;

use super::event::{ChatEvent, ChatMessage};
use super::ChatAdapter;

/// Default mention token of the in-memory bot
pub const DEFAULT_MENTION: &str = "@ntfy";

/// A message sent by the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub channel: ChannelId,
    pub text: String,
}

/// A reaction added by the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub channel: ChannelId,
    pub message_id: String,
    pub emoji: String,
}

/// Chat adapter backed by in-process channels
pub struct MemoryChat {
    mention: String,
    events_tx: mpsc::Sender<ChatEvent>,
    events_rx: Mutex<Option<mpsc::Receiver<ChatEvent>>>,
    sent: Mutex<Vec<SentMessage>>,
    reactions: Mutex<Vec<Reaction>>,
    failing: Mutex<HashSet<ChannelId>>,
    next_id: AtomicU64,
    echo: bool,
}

impl MemoryChat {
    /// Create an adapter that answers to `mention`
    pub fn new(mention: impl Into<String>) -> Self {
        let (events_tx, events_rx) = mpsc::channel(64);

        Self {
            mention: mention.into(),
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
            sent: Mutex::new(Vec::new()),
            reactions: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            next_id: AtomicU64::new(1),
            echo: false,
        }
    }

    /// Print sends and reactions to stdout
    pub fn with_echo(mut self) -> Self {
        self.echo = true;
        self
    }

    /// Handle for injecting events from another task
    pub fn events(&self) -> mpsc::Sender<ChatEvent> {
        self.events_tx.clone()
    }

    /// Post an inbound message as `sender` in `channel`
    ///
    /// Returns the generated message ID.
    pub async fn post(
        &self,
        channel: impl Into<ChannelId>,
        sender: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<String> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed).to_string();
        let message = ChatMessage::new(id.clone(), channel, sender, text);

        self.events_tx
            .send(ChatEvent::Message(message))
            .await
            .map_err(|_| Error::chat("chat event channel closed"))?;

        Ok(id)
    }

    /// Make every send to `channel` fail
    pub fn fail_sends_to(&self, channel: impl Into<ChannelId>) {
        lock(&self.failing).insert(channel.into());
    }

    /// Everything sent so far
    pub fn sent(&self) -> Vec<SentMessage> {
        lock(&self.sent).clone()
    }

    /// Texts sent to one channel
    pub fn sent_to(&self, channel: &ChannelId) -> Vec<String> {
        lock(&self.sent)
            .iter()
            .filter(|m| &m.channel == channel)
            .map(|m| m.text.clone())
            .collect()
    }

    /// Reactions added so far
    pub fn reactions(&self) -> Vec<Reaction> {
        lock(&self.reactions).clone()
    }
}

impl Default for MemoryChat {
    fn default() -> Self {
        Self::new(DEFAULT_MENTION)
    }
}

#[async_trait]
impl ChatAdapter for MemoryChat {
    async fn connect(&self) -> Result<mpsc::Receiver<ChatEvent>> {
        lock(&self.events_rx)
            .take()
            .ok_or_else(|| Error::chat("already connected"))
    }

    async fn send(&self, channel: &ChannelId, text: &str) -> Result<()> {
        if lock(&self.failing).contains(channel) {
            return Err(Error::chat(format!("cannot send to channel {}", channel)));
        }

        if self.echo {
            println!("[{}] {}", channel, text);
        }

        lock(&self.sent).push(SentMessage {
            channel: channel.clone(),
            text: text.to_string(),
        });

        Ok(())
    }

    async fn react(&self, channel: &ChannelId, message_id: &str, emoji: &str) -> Result<()> {
        if self.echo {
            println!("[{}] {} (message {})", channel, emoji, message_id);
        }

        lock(&self.reactions).push(Reaction {
            channel: channel.clone(),
            message_id: message_id.to_string(),
            emoji: emoji.to_string(),
        });

        Ok(())
    }

    fn mention_self(&self) -> String {
        self.mention.clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_once() {
        let chat = MemoryChat::default();

        assert!(chat.connect().await.is_ok());
        assert!(matches!(chat.connect().await, Err(Error::Chat(_))));
    }

    #[tokio::test]
    async fn test_post_delivers_event() {
        let chat = MemoryChat::new("@bot");
        let mut events = chat.connect().await.unwrap();

        let id = chat.post("general", "alice", "@bot help").await.unwrap();

        match events.recv().await.unwrap() {
            ChatEvent::Message(msg) => {
                assert_eq!(msg.id, id);
                assert_eq!(msg.channel, ChannelId::new("general"));
                assert_eq!(msg.sender, "alice");
                assert_eq!(msg.text, "@bot help");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_records_sends_and_failures() {
        let chat = MemoryChat::default();
        let ok = ChannelId::new("ok");
        let broken = ChannelId::new("broken");
        chat.fail_sends_to(broken.clone());

        chat.send(&ok, "hello").await.unwrap();
        assert!(chat.send(&broken, "hello").await.is_err());
        chat.react(&ok, "7", "✅").await.unwrap();

        assert_eq!(chat.sent_to(&ok), vec!["hello".to_string()]);
        assert!(chat.sent_to(&broken).is_empty());
        assert_eq!(chat.reactions()[0].emoji, "✅");
    }
}
