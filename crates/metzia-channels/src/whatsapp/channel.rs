//! Channel trait implementation for WhatsApp.

use super::send::{image_mimetype, retry_send, split_message};
use super::WhatsAppChannel;
use async_trait::async_trait;
use metzia_core::{
    error::MetziaError,
    message::{IncomingMessage, OutgoingMessage},
    traits::Channel,
};
use tokio::sync::mpsc;
use tracing::info;
use wacore_binary::jid::Jid;

impl WhatsAppChannel {
    /// Send a text message to a JID string (user@s.whatsapp.net or group@g.us).
    async fn send_text(&self, jid_str: &str, text: &str) -> Result<(), MetziaError> {
        let client_guard = self.client.lock().await;
        let client = client_guard
            .as_ref()
            .ok_or_else(|| MetziaError::Channel("whatsapp client not connected".into()))?;

        let jid: Jid = jid_str
            .parse()
            .map_err(|e| MetziaError::Channel(format!("invalid whatsapp JID '{jid_str}': {e}")))?;

        for chunk in split_message(text, 4096) {
            let msg = waproto::whatsapp::Message {
                conversation: Some(chunk.to_string()),
                ..Default::default()
            };
            let msg_id = retry_send(client, &jid, msg).await?;
            // Track sent message ID to ignore our own echo.
            self.sent_ids.lock().await.insert(msg_id);
        }

        Ok(())
    }

    /// Upload image bytes and send them as an image message to a JID.
    async fn send_image_impl(
        &self,
        jid_str: &str,
        image: &[u8],
        caption: &str,
    ) -> Result<(), MetziaError> {
        let client_guard = self.client.lock().await;
        let client = client_guard
            .as_ref()
            .ok_or_else(|| MetziaError::Channel("whatsapp client not connected".into()))?;

        let jid: Jid = jid_str
            .parse()
            .map_err(|e| MetziaError::Channel(format!("invalid whatsapp JID '{jid_str}': {e}")))?;

        let upload = client
            .upload(image.to_vec(), whatsapp_rust::download::MediaType::Image)
            .await
            .map_err(|e| MetziaError::Channel(format!("whatsapp image upload failed: {e}")))?;

        let msg = waproto::whatsapp::Message {
            image_message: Some(Box::new(waproto::whatsapp::message::ImageMessage {
                mimetype: Some(image_mimetype(image).to_string()),
                caption: (!caption.is_empty()).then(|| caption.to_string()),
                url: Some(upload.url),
                direct_path: Some(upload.direct_path),
                media_key: Some(upload.media_key),
                file_enc_sha256: Some(upload.file_enc_sha256),
                file_sha256: Some(upload.file_sha256),
                file_length: Some(upload.file_length),
                ..Default::default()
            })),
            ..Default::default()
        };

        let msg_id = retry_send(client, &jid, msg).await?;
        self.sent_ids.lock().await.insert(msg_id);

        Ok(())
    }
}

#[async_trait]
impl Channel for WhatsAppChannel {
    fn name(&self) -> &str {
        "whatsapp"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, MetziaError> {
        let (tx, rx) = mpsc::channel(64);
        self.build_and_run_bot(tx).await?;
        info!("WhatsApp channel started");
        Ok(rx)
    }

    async fn send(&self, message: OutgoingMessage) -> Result<(), MetziaError> {
        let target = message
            .reply_target
            .as_deref()
            .ok_or_else(|| MetziaError::Channel("no reply_target on outgoing message".into()))?;

        self.send_text(target, &message.text).await
    }

    async fn send_image(
        &self,
        target: &str,
        image: &[u8],
        caption: &str,
    ) -> Result<(), MetziaError> {
        self.send_image_impl(target, image, caption).await
    }

    async fn stop(&self) -> Result<(), MetziaError> {
        info!("WhatsApp channel stopped");
        *self.client.lock().await = None;
        Ok(())
    }
}
