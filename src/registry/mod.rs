//! Subscription registry
//!
//! The registry maps topics to the chat channels that want them and owns one
//! connector per subscribed topic.
//!
//! # Architecture
//!
//! ```text
//!                       Arc<SubscriptionRegistry>
//!                  ┌──────────────────────────────┐
//!                  │ subscriptions: HashMap<Topic, │
//!                  │   SubscriptionEntry {        │
//!                  │     channels,                │
//!                  │     connector: cancel+task,  │
//!                  │   }                          │
//!                  │ >                            │
//!                  └──────────────┬───────────────┘
//!                                 │
//!         ┌───────────────────────┼───────────────────────┐
//!         │                       │                       │
//!         ▼                       ▼                       ▼
//!   [Dispatcher]             [Launcher]               [Router]
//!   subscribe()/             launch(topic,            channels_for()
//!   unsubscribe()            cancel) ──► connector       │
//!                                           │            ▼
//!                                           └─► mpsc ──► chat.send()
//! ```
//!
//! Every connector token is a child of the registry's shutdown token, so a
//! single `shutdown()` reaches all of them.

pub mod entry;
pub mod key;
pub mod launcher;
pub mod store;

pub use entry::SubscriptionStats;
pub use key::{ChannelId, Topic};
pub use launcher::StreamLauncher;
pub use store::SubscriptionRegistry;
