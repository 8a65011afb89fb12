//! Connector launch seam
//!
//! The registry decides *when* a topic needs a live connection; the launcher
//! decides *how* to run one. Keeping this behind a trait lets the registry
//! stay free of any HTTP code.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::key::Topic;

/// Spawns a long-running connector for a topic
pub trait StreamLauncher: Send + Sync {
    /// Spawn a connector for `topic` that runs until `cancel` fires
    ///
    /// Called with the registry lock held, so implementations must only
    /// spawn and return.
    fn launch(&self, topic: Topic, cancel: CancellationToken) -> JoinHandle<()>;
}
