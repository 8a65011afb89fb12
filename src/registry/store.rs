//! Subscription registry implementation
//!
//! The central registry that tracks which chat channels want which topics,
//! and owns the connector of every topic that has at least one channel.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::entry::{ConnectorState, SubscriptionEntry, SubscriptionStats};
use super::key::{ChannelId, Topic};
use super::launcher::StreamLauncher;

/// Central registry for all subscriptions
///
/// Channels and connector state live in the same map entry behind a single
/// `RwLock`, so a topic and its connector always appear and disappear
/// together. Fan-out lookups take the read side.
pub struct SubscriptionRegistry {
    /// Map of topic to subscription entry
    subscriptions: RwLock<HashMap<Topic, SubscriptionEntry>>,

    /// Starts connectors for newly subscribed topics
    launcher: Arc<dyn StreamLauncher>,

    /// Parent of every connector's cancellation token
    shutdown: CancellationToken,
}

impl SubscriptionRegistry {
    /// Create a new registry that starts connectors through `launcher`
    pub fn new(launcher: Arc<dyn StreamLauncher>) -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            launcher,
            shutdown: CancellationToken::new(),
        }
    }

    /// Subscribe a channel to a topic
    ///
    /// The first subscriber of a topic starts its connector. Subscribing a
    /// channel that is already subscribed changes nothing.
    /// Returns `true` if a new connector was started.
    pub async fn subscribe(&self, topic: &Topic, channel: &ChannelId) -> bool {
        let mut subscriptions = self.subscriptions.write().await;

        if self.shutdown.is_cancelled() {
            tracing::warn!(topic = %topic, channel = %channel, "Subscribe after shutdown ignored");
            return false;
        }

        if let Some(entry) = subscriptions.get_mut(topic) {
            if entry.channels.insert(channel.clone()) {
                tracing::info!(
                    topic = %topic,
                    channel = %channel,
                    channels = entry.channel_count(),
                    "Channel subscribed (existing topic)"
                );
            } else {
                tracing::debug!(topic = %topic, channel = %channel, "Channel already subscribed");
            }
            return false;
        }

        let cancel = self.shutdown.child_token();
        let task = self.launcher.launch(topic.clone(), cancel.clone());
        let mut entry = SubscriptionEntry::new(ConnectorState::new(cancel, task));
        entry.channels.insert(channel.clone());
        subscriptions.insert(topic.clone(), entry);

        tracing::info!(
            topic = %topic,
            channel = %channel,
            "Channel subscribed (new topic, connector started)"
        );

        true
    }

    /// Unsubscribe a channel from a topic
    ///
    /// When the last channel leaves, the topic entry is removed and its
    /// connector cancelled. Unknown topics and channels are ignored.
    /// Returns `true` if a connector was stopped.
    pub async fn unsubscribe(&self, topic: &Topic, channel: &ChannelId) -> bool {
        let mut subscriptions = self.subscriptions.write().await;

        let Some(entry) = subscriptions.get_mut(topic) else {
            tracing::debug!(topic = %topic, channel = %channel, "Unsubscribe from unknown topic");
            return false;
        };

        if !entry.channels.remove(channel) {
            tracing::debug!(topic = %topic, channel = %channel, "Channel was not subscribed");
            return false;
        }

        if !entry.channels.is_empty() {
            tracing::info!(
                topic = %topic,
                channel = %channel,
                channels = entry.channel_count(),
                "Channel unsubscribed"
            );
            return false;
        }

        if let Some(entry) = subscriptions.remove(topic) {
            // The task observes the token on its own; no need to join here.
            let _ = entry.connector.stop();
        }

        tracing::info!(
            topic = %topic,
            channel = %channel,
            "No more subscriptions, connector stopped"
        );

        true
    }

    /// Snapshot of the channels subscribed to a topic
    pub async fn channels_for(&self, topic: &Topic) -> Vec<ChannelId> {
        let subscriptions = self.subscriptions.read().await;

        subscriptions
            .get(topic)
            .map(SubscriptionEntry::channels)
            .unwrap_or_default()
    }

    /// Check if a channel is subscribed to a topic
    pub async fn is_subscribed(&self, topic: &Topic, channel: &ChannelId) -> bool {
        let subscriptions = self.subscriptions.read().await;

        subscriptions
            .get(topic)
            .map(|entry| entry.channels.contains(channel))
            .unwrap_or(false)
    }

    /// Topics a channel is subscribed to, sorted
    pub async fn topics_for(&self, channel: &ChannelId) -> Vec<Topic> {
        let subscriptions = self.subscriptions.read().await;

        let mut topics: Vec<Topic> = subscriptions
            .iter()
            .filter(|(_, entry)| entry.channels.contains(channel))
            .map(|(topic, _)| topic.clone())
            .collect();
        topics.sort();
        topics
    }

    /// Get subscription statistics for a topic
    pub async fn get_stats(&self, topic: &Topic) -> Option<SubscriptionStats> {
        let subscriptions = self.subscriptions.read().await;

        subscriptions.get(topic).map(|entry| SubscriptionStats {
            channel_count: entry.channel_count(),
            connector_active: !entry.connector.is_cancelled(),
            age: entry.age(),
        })
    }

    /// Get total number of subscribed topics
    pub async fn topic_count(&self) -> usize {
        self.subscriptions.read().await.len()
    }

    /// Stop every connector and clear all subscriptions
    ///
    /// Waits for connector tasks to exit. Later `subscribe` calls are ignored.
    pub async fn shutdown(&self) {
        let entries: Vec<(Topic, SubscriptionEntry)> = {
            let mut subscriptions = self.subscriptions.write().await;
            self.shutdown.cancel();
            subscriptions.drain().collect()
        };

        let count = entries.len();
        for (topic, entry) in entries {
            if let Some(task) = entry.connector.stop() {
                if let Err(e) = task.await {
                    tracing::warn!(topic = %topic, error = %e, "Connector task failed");
                }
            }
        }

        tracing::info!(topics = count, "Subscription registry shut down");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::task::JoinHandle;

    use super::*;

    /// Launcher that counts started and finished connectors
    #[derive(Default)]
    struct CountingLauncher {
        started: Arc<AtomicUsize>,
        stopped: Arc<AtomicUsize>,
    }

    impl CountingLauncher {
        fn started(&self) -> usize {
            self.started.load(Ordering::SeqCst)
        }

        fn stopped(&self) -> usize {
            self.stopped.load(Ordering::SeqCst)
        }
    }

    impl StreamLauncher for CountingLauncher {
        fn launch(&self, _topic: Topic, cancel: CancellationToken) -> JoinHandle<()> {
            self.started.fetch_add(1, Ordering::SeqCst);
            let stopped = Arc::clone(&self.stopped);
            tokio::spawn(async move {
                cancel.cancelled().await;
                stopped.fetch_add(1, Ordering::SeqCst);
            })
        }
    }

    fn setup() -> (Arc<CountingLauncher>, SubscriptionRegistry) {
        let launcher = Arc::new(CountingLauncher::default());
        let registry = SubscriptionRegistry::new(launcher.clone());
        (launcher, registry)
    }

    async fn wait_for(counter: impl Fn() -> usize, expected: usize) {
        for _ in 0..100 {
            if counter() == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(counter(), expected);
    }

    #[tokio::test]
    async fn test_subscribe_idempotent() {
        let (launcher, registry) = setup();
        let topic = Topic::new("https://ntfy.sh/alerts");
        let channel = ChannelId::new("general");

        assert!(registry.subscribe(&topic, &channel).await);
        assert!(!registry.subscribe(&topic, &channel).await);

        assert_eq!(registry.channels_for(&topic).await, vec![channel]);
        assert_eq!(registry.topic_count().await, 1);
        assert_eq!(launcher.started(), 1);
    }

    #[tokio::test]
    async fn test_second_channel_shares_connector() {
        let (launcher, registry) = setup();
        let topic = Topic::new("https://ntfy.sh/alerts");

        assert!(registry.subscribe(&topic, &ChannelId::new("b")).await);
        assert!(!registry.subscribe(&topic, &ChannelId::new("a")).await);

        assert_eq!(
            registry.channels_for(&topic).await,
            vec![ChannelId::new("a"), ChannelId::new("b")]
        );
        assert_eq!(launcher.started(), 1);

        let stats = registry.get_stats(&topic).await.unwrap();
        assert_eq!(stats.channel_count, 2);
        assert!(stats.connector_active);
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_is_noop() {
        let (launcher, registry) = setup();
        let topic = Topic::new("https://ntfy.sh/alerts");

        assert!(!registry.unsubscribe(&topic, &ChannelId::new("x")).await);

        registry.subscribe(&topic, &ChannelId::new("a")).await;
        assert!(!registry.unsubscribe(&topic, &ChannelId::new("x")).await);

        assert_eq!(registry.channels_for(&topic).await.len(), 1);
        assert_eq!(launcher.started(), 1);
        assert_eq!(launcher.stopped(), 0);
    }

    #[tokio::test]
    async fn test_last_unsubscribe_stops_connector() {
        let (launcher, registry) = setup();
        let topic = Topic::new("https://ntfy.sh/alerts");
        let a = ChannelId::new("a");
        let b = ChannelId::new("b");

        registry.subscribe(&topic, &a).await;
        registry.subscribe(&topic, &b).await;

        assert!(!registry.unsubscribe(&topic, &a).await);
        assert_eq!(launcher.stopped(), 0);

        assert!(registry.unsubscribe(&topic, &b).await);
        assert!(registry.channels_for(&topic).await.is_empty());
        assert!(registry.get_stats(&topic).await.is_none());
        assert_eq!(registry.topic_count().await, 0);

        let stopped = Arc::clone(&launcher.stopped);
        wait_for(move || stopped.load(Ordering::SeqCst), 1).await;
    }

    #[tokio::test]
    async fn test_resubscribe_starts_new_connector() {
        let (launcher, registry) = setup();
        let topic = Topic::new("https://ntfy.sh/alerts");
        let channel = ChannelId::new("a");

        registry.subscribe(&topic, &channel).await;
        registry.unsubscribe(&topic, &channel).await;
        assert!(registry.subscribe(&topic, &channel).await);

        assert_eq!(launcher.started(), 2);
    }

    #[tokio::test]
    async fn test_topics_for_channel() {
        let (_launcher, registry) = setup();
        let channel = ChannelId::new("a");
        let t1 = Topic::new("https://ntfy.sh/one");
        let t2 = Topic::new("https://ntfy.sh/two");

        registry.subscribe(&t2, &channel).await;
        registry.subscribe(&t1, &channel).await;
        registry.subscribe(&t1, &ChannelId::new("b")).await;

        assert_eq!(registry.topics_for(&channel).await, vec![t1.clone(), t2]);
        assert!(registry.is_subscribed(&t1, &channel).await);
        assert!(!registry.is_subscribed(&t1, &ChannelId::new("c")).await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_subscribe_and_unsubscribe() {
        let (launcher, registry) = setup();
        let registry = Arc::new(registry);
        let topic = Topic::new("https://ntfy.sh/alerts");
        let channels: Vec<ChannelId> = (0..8).map(|i| ChannelId::new(format!("c{}", i))).collect();

        let mut tasks = Vec::new();
        for i in 0..64 {
            let registry = Arc::clone(&registry);
            let topic = topic.clone();
            let channel = channels[i % channels.len()].clone();
            tasks.push(tokio::spawn(async move {
                registry.subscribe(&topic, &channel).await
            }));
        }
        let mut started = 0;
        for task in tasks {
            if task.await.unwrap() {
                started += 1;
            }
        }

        assert_eq!(started, 1);
        assert_eq!(launcher.started(), 1);
        assert_eq!(registry.channels_for(&topic).await, channels);

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let topic = topic.clone();
                let all = channels.clone();
                tokio::spawn(async move {
                    let mut last = all.len();
                    for _ in 0..200 {
                        let snapshot = registry.channels_for(&topic).await;
                        assert!(snapshot.len() <= last);
                        assert!(snapshot.windows(2).all(|w| w[0] < w[1]));
                        assert!(snapshot.iter().all(|c| all.contains(c)));
                        last = snapshot.len();
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();
        let writers: Vec<_> = channels
            .iter()
            .cloned()
            .map(|channel| {
                let registry = Arc::clone(&registry);
                let topic = topic.clone();
                tokio::spawn(async move { registry.unsubscribe(&topic, &channel).await })
            })
            .collect();

        let mut stopped = 0;
        for writer in writers {
            if writer.await.unwrap() {
                stopped += 1;
            }
        }
        for reader in readers {
            reader.await.unwrap();
        }

        assert_eq!(stopped, 1);
        assert_eq!(registry.topic_count().await, 0);
        assert!(registry.channels_for(&topic).await.is_empty());
        let stopped = Arc::clone(&launcher.stopped);
        wait_for(move || stopped.load(Ordering::SeqCst), 1).await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_everything() {
        let (launcher, registry) = setup();
        let channel = ChannelId::new("a");

        registry.subscribe(&Topic::new("https://ntfy.sh/one"), &channel).await;
        registry.subscribe(&Topic::new("https://ntfy.sh/two"), &channel).await;

        registry.shutdown().await;

        assert_eq!(launcher.stopped(), 2);
        assert_eq!(registry.topic_count().await, 0);

        // Ignored once shut down
        assert!(!registry.subscribe(&Topic::new("https://ntfy.sh/three"), &channel).await);
        assert_eq!(launcher.started(), 2);
    }
}
