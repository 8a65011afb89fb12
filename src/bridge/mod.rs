//! The chat ↔ ntfy bridge
//!
//! Wires the chat adapter, the subscription registry and the ntfy client
//! together and runs the two consumption loops:
//!
//! ```text
//!   chat events ──► CommandDispatcher ──► registry.subscribe()/unsubscribe()
//!                                    └──► client.publish()
//!
//!   connectors ──► mpsc<NotificationMessage> ──► MessageRouter ──► chat.send()
//! ```

pub mod command;
pub mod config;
pub mod dispatcher;
pub mod router;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::chat::{ChatAdapter, ChatEvent};
use crate::client::{NotificationMessage, NtfyClient, Publisher};
use crate::error::{Error, Result};
use crate::registry::{StreamLauncher, SubscriptionRegistry};

pub use command::{Command, CommandError};
pub use config::BridgeConfig;
pub use dispatcher::{CommandDispatcher, Response};
pub use router::{format_message, MessageRouter};

/// A running bridge between one chat adapter and ntfy
pub struct Bridge {
    config: BridgeConfig,
    chat: Arc<dyn ChatAdapter>,
    registry: Arc<SubscriptionRegistry>,
    dispatcher: CommandDispatcher,
    router: MessageRouter,
    messages: mpsc::Receiver<NotificationMessage>,
}

impl Bridge {
    /// Create a bridge backed by a real ntfy client
    pub fn new(config: BridgeConfig, chat: Arc<dyn ChatAdapter>) -> Result<Self> {
        let (client, messages) = NtfyClient::new(config.client.clone(), config.message_buffer)?;
        let client = Arc::new(client);

        Ok(Self::with_parts(
            config,
            chat,
            client.clone(),
            client,
            messages,
        ))
    }

    /// Create a bridge from explicit parts
    ///
    /// `messages` must be the channel that connectors started by `launcher`
    /// write to.
    pub fn with_parts(
        config: BridgeConfig,
        chat: Arc<dyn ChatAdapter>,
        launcher: Arc<dyn StreamLauncher>,
        publisher: Arc<dyn Publisher>,
        messages: mpsc::Receiver<NotificationMessage>,
    ) -> Self {
        let registry = Arc::new(SubscriptionRegistry::new(launcher));
        let dispatcher = CommandDispatcher::new(
            &config,
            Arc::clone(&registry),
            publisher,
            Arc::clone(&chat),
        );
        let router = MessageRouter::new(Arc::clone(&registry), Arc::clone(&chat));

        Self {
            config,
            chat,
            registry,
            dispatcher,
            router,
            messages,
        }
    }

    /// Get a reference to the subscription registry
    pub fn registry(&self) -> &Arc<SubscriptionRegistry> {
        &self.registry
    }

    /// Run the bridge until `shutdown` fires or the chat connection fails
    ///
    /// Connects the chat adapter first; failing to connect is returned
    /// immediately. On exit every connector is cancelled and joined.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        let Bridge {
            config,
            chat,
            registry,
            dispatcher,
            router,
            messages,
        } = self;

        let events = chat.connect().await?;

        tracing::info!(
            mention = %chat.mention_self(),
            base_url = %config.base_url,
            "Bridge running"
        );

        let chat_loop = async {
            let result = handle_chat_events(&dispatcher, events, &shutdown).await;
            // Either way the router has nothing left to do
            shutdown.cancel();
            result
        };
        let router_loop = router.run(messages, shutdown.clone());

        let (result, ()) = tokio::join!(chat_loop, router_loop);

        registry.shutdown().await;

        if let Err(e) = chat.close().await {
            tracing::warn!(error = %e, "Failed to close chat connection");
        }

        match &result {
            Ok(()) => tracing::info!("Bridge stopped"),
            Err(e) => tracing::error!(error = %e, "Bridge stopped with error"),
        }

        result
    }
}

async fn handle_chat_events(
    dispatcher: &CommandDispatcher,
    mut events: mpsc::Receiver<ChatEvent>,
    shutdown: &CancellationToken,
) -> Result<()> {
    loop {
        let event = tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            event = events.recv() => event,
        };

        match event {
            Some(ChatEvent::Message(message)) => {
                dispatcher.handle(&message).await;
            }
            Some(ChatEvent::Error(e)) => return Err(Error::Chat(e)),
            None => {
                tracing::info!("Chat event stream closed");
                return Ok(());
            }
        }
    }
}
