use crate::{
    error::MetziaError,
    message::{IncomingMessage, OutgoingMessage},
    product::Product,
};
use async_trait::async_trait;

/// Product source trait.
///
/// Both the offline mock and the live API-backed search implement this
/// trait, so the dispatcher never knows which one serves a process.
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Human-readable source name.
    fn name(&self) -> &str;

    /// Search for products matching a keyword, in relevance order.
    async fn search(&self, keyword: &str) -> Result<Vec<Product>, MetziaError>;
}

/// Messaging Channel trait.
///
/// Every messaging platform (WhatsApp today) implements this trait to
/// receive and send messages.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Start listening for incoming messages.
    /// Returns a receiver that yields incoming messages.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<IncomingMessage>, MetziaError>;

    /// Send a text reply back through this channel.
    async fn send(&self, message: OutgoingMessage) -> Result<(), MetziaError>;

    /// Send image bytes with an optional caption.
    async fn send_image(
        &self,
        _target: &str,
        _image: &[u8],
        _caption: &str,
    ) -> Result<(), MetziaError> {
        Ok(())
    }

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), MetziaError>;
}
