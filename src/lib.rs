//! # ntfy-bridge
//!
//! A chat bot that bridges chat channels and [ntfy](https://ntfy.sh) topics.
//!
//! Users address the bot in a channel to publish to a topic, or to
//! subscribe the channel to a topic. Every message published to a
//! subscribed topic is posted to each channel subscribed to it.
//!
//! - [`registry`]: topic → channel bookkeeping, one connector per topic
//! - [`client`]: ntfy publishing and reconnecting JSON streams
//! - [`bridge`]: command dispatch, message fan-out and the run loop
//! - [`chat`]: the chat platform boundary
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use ntfy_bridge::chat::MemoryChat;
//! use ntfy_bridge::{Bridge, BridgeConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> ntfy_bridge::error::Result<()> {
//! let chat = Arc::new(MemoryChat::new("@ntfy"));
//! let bridge = Bridge::new(BridgeConfig::default(), chat.clone())?;
//!
//! let shutdown = CancellationToken::new();
//! let running = tokio::spawn(bridge.run(shutdown.clone()));
//!
//! chat.post("general", "alice", "@ntfy subscribe alerts").await?;
//!
//! shutdown.cancel();
//! running.await.expect("bridge task panicked")?;
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod chat;
pub mod client;
pub mod error;
pub mod registry;
pub mod settings;

#[cfg(test)]
pub(crate) mod testing;

pub use bridge::{Bridge, BridgeConfig};
pub use client::{NotificationMessage, NtfyClient, PublishOptions};
pub use error::{Error, Result};
pub use registry::{ChannelId, SubscriptionRegistry, Topic};
