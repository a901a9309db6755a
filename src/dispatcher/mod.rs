//! Dispatcher — the event loop connecting channels to product search.
//!
//! Listens on all started channels, recognizes the Hebrew search
//! trigger, and replies with up to three product cards per trigger.
//! Triggers for the same chat are processed strictly in order; distinct
//! chats run concurrently.

mod replies;
mod trigger;

#[cfg(test)]
mod tests;

use metzia_core::{
    message::{IncomingMessage, OutgoingMessage},
    traits::{Channel, ProductSource},
};
use metzia_products::affiliate::AffiliateResolver;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use self::trigger::TriggerMatch;

/// Products presented per search, regardless of how many the source returns.
pub const MAX_PRODUCTS: usize = 3;

/// The central dispatcher routing chat triggers to product replies.
pub struct Dispatcher {
    source: Arc<dyn ProductSource>,
    resolver: AffiliateResolver,
    channels: HashMap<String, Arc<dyn Channel>>,
    /// Client for fetching product images.
    http: reqwest::Client,
    /// Chats with a reply pipeline in flight. Further triggers for the
    /// same chat are buffered here and drained in arrival order.
    active_chats: Mutex<HashMap<String, Vec<(IncomingMessage, TriggerMatch)>>>,
}

impl Dispatcher {
    /// Create a new dispatcher.
    pub fn new(
        source: Arc<dyn ProductSource>,
        resolver: AffiliateResolver,
        channels: HashMap<String, Arc<dyn Channel>>,
    ) -> Self {
        Self {
            source,
            resolver,
            channels,
            http: reqwest::Client::new(),
            active_chats: Mutex::new(HashMap::new()),
        }
    }

    /// Run the main event loop.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!(
            "Metzia dispatcher running | source: {} | channels: {}",
            self.source.name(),
            self.channels.keys().cloned().collect::<Vec<_>>().join(", "),
        );

        let (tx, mut rx) = mpsc::channel::<IncomingMessage>(256);

        for (name, channel) in &self.channels {
            let mut channel_rx = channel
                .start()
                .await
                .map_err(|e| anyhow::anyhow!("failed to start channel {name}: {e}"))?;
            let tx = tx.clone();
            let channel_name = name.clone();

            tokio::spawn(async move {
                while let Some(msg) = channel_rx.recv().await {
                    if tx.send(msg).await.is_err() {
                        info!("dispatcher receiver dropped, stopping {channel_name} forwarder");
                        break;
                    }
                }
            });

            info!("Channel started: {name}");
        }

        drop(tx);

        // Main event loop with graceful shutdown.
        loop {
            tokio::select! {
                Some(incoming) = rx.recv() => {
                    let dispatcher = self.clone();
                    tokio::spawn(async move {
                        dispatcher.dispatch_message(incoming).await;
                    });
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        // Stop all channels.
        for (name, channel) in &self.channels {
            if let Err(e) = channel.stop().await {
                warn!("failed to stop channel {name}: {e}");
            }
        }

        info!("Shutdown complete.");
        Ok(())
    }

    /// Route one inbound message: parse the trigger, then queue or run.
    ///
    /// Non-trigger messages are discarded here with no side effects at
    /// all. Matched triggers serialize per chat: if the chat already has
    /// a reply pipeline running, the trigger is buffered and drained in
    /// order once the pipeline finishes.
    pub(super) async fn dispatch_message(self: Arc<Self>, incoming: IncomingMessage) {
        let Some(matched) = trigger::match_trigger(incoming.text.trim()) else {
            debug!("[{}] no trigger in message, ignoring", incoming.channel);
            return;
        };

        let Some(chat_key) = chat_key(&incoming) else {
            debug!("[{}] trigger without reply target, ignoring", incoming.channel);
            return;
        };

        {
            let mut active = self.active_chats.lock().await;
            if let Some(queue) = active.get_mut(&chat_key) {
                info!("buffered trigger for busy chat {chat_key}");
                queue.push((incoming, matched));
                return;
            }
            // Mark chat as active (empty buffer).
            active.insert(chat_key.clone(), Vec::new());
        }

        self.handle_trigger(&incoming, &matched).await;

        // Drain any triggers buffered for this chat while it was busy.
        loop {
            let next = {
                let mut active = self.active_chats.lock().await;
                match active.get_mut(&chat_key) {
                    Some(queue) if !queue.is_empty() => Some(queue.remove(0)),
                    _ => {
                        // Nothing buffered, chat is idle again.
                        active.remove(&chat_key);
                        None
                    }
                }
            };

            match next {
                Some((buffered, matched)) => {
                    info!("processing buffered trigger for {chat_key}");
                    self.handle_trigger(&buffered, &matched).await;
                }
                None => break,
            }
        }
    }

    /// Send a plain text reply to the originating chat.
    pub(super) async fn send_text(&self, incoming: &IncomingMessage, text: &str) {
        let msg = OutgoingMessage {
            text: text.to_string(),
            reply_target: incoming.reply_target.clone(),
        };

        if let Some(channel) = self.channels.get(&incoming.channel) {
            if let Err(e) = channel.send(msg).await {
                error!("failed to send reply: {e}");
            }
        }
    }
}

/// Serialization key for a chat: channel plus reply target.
fn chat_key(incoming: &IncomingMessage) -> Option<String> {
    incoming
        .reply_target
        .as_ref()
        .map(|target| format!("{}:{target}", incoming.channel))
}
