//! Subscription entry types
//!
//! This module defines the per-topic state stored in the registry.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::key::ChannelId;

/// Connector bookkeeping for a single topic
///
/// Cancelled when dropped, so removing an entry from the registry always
/// tears its connector down.
pub struct ConnectorState {
    /// Cancels the connector task
    pub(super) cancel: CancellationToken,

    /// Handle of the spawned connector task
    pub(super) task: Option<JoinHandle<()>>,
}

impl ConnectorState {
    pub(super) fn new(cancel: CancellationToken, task: JoinHandle<()>) -> Self {
        Self {
            cancel,
            task: Some(task),
        }
    }

    /// Cancel the connector and hand back its task for joining
    pub(super) fn stop(mut self) -> Option<JoinHandle<()>> {
        self.cancel.cancel();
        self.task.take()
    }

    /// Whether the connector has been told to stop
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for ConnectorState {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Entry for a single topic in the registry
pub struct SubscriptionEntry {
    /// Channels receiving this topic's messages
    pub(super) channels: BTreeSet<ChannelId>,

    /// The topic's live connector
    pub(super) connector: ConnectorState,

    /// When the first channel subscribed
    pub created_at: Instant,
}

impl SubscriptionEntry {
    pub(super) fn new(connector: ConnectorState) -> Self {
        Self {
            channels: BTreeSet::new(),
            connector,
            created_at: Instant::now(),
        }
    }

    /// Number of subscribed channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Sorted copy of the subscribed channels
    pub fn channels(&self) -> Vec<ChannelId> {
        self.channels.iter().cloned().collect()
    }

    /// Time since the topic got its first subscriber
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}

/// Statistics for a subscribed topic
#[derive(Debug, Clone)]
pub struct SubscriptionStats {
    /// Number of subscribed channels
    pub channel_count: usize,
    /// Whether the connector is still running
    pub connector_active: bool,
    /// Time since the first subscription
    pub age: Duration,
}
