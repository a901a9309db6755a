//! Bot lifecycle — building and running the WhatsApp bot.

use super::events::handle_whatsapp_message;
use super::qr::generate_qr_terminal;
use super::WhatsAppChannel;
use metzia_core::{error::MetziaError, message::IncomingMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use wacore::types::events::Event;
use whatsapp_rust::bot::Bot;
use whatsapp_rust_sqlite_storage::SqliteStore;
use whatsapp_rust_tokio_transport::TokioWebSocketTransportFactory;
use whatsapp_rust_ureq_http_client::UreqHttpClient;

impl WhatsAppChannel {
    /// Build the WhatsApp bot with the event handler and run it in the background.
    pub(super) async fn build_and_run_bot(
        &self,
        tx: mpsc::Sender<IncomingMessage>,
    ) -> Result<(), MetziaError> {
        let db_path = self.session_db_path();
        let allowed_users = self.config.allowed_users.clone();
        let client_handle = self.client.clone();

        info!("WhatsApp bot building (session: {db_path})...");

        let backend = Arc::new(SqliteStore::new(&db_path).await.map_err(|e| {
            MetziaError::Channel(format!("whatsapp session store init failed: {e}"))
        })?);

        let tx_events = tx;
        let client_for_event = client_handle.clone();
        let sent_ids_for_event = self.sent_ids.clone();

        let mut bot = Bot::builder()
            .with_backend(backend)
            .with_transport_factory(TokioWebSocketTransportFactory::new())
            .with_http_client(UreqHttpClient::new())
            .with_device_props(
                Some("Metzia".to_string()),
                None,
                Some(waproto::whatsapp::device_props::PlatformType::Desktop),
            )
            .on_event(move |event, client| {
                let tx = tx_events.clone();
                let allowed = allowed_users.clone();
                let client_store = client_for_event.clone();
                let sent_ids = sent_ids_for_event.clone();
                async move {
                    match event {
                        Event::PairingQrCode { code, .. } => {
                            info!("WhatsApp QR code generated, scan to pair");
                            match generate_qr_terminal(&code) {
                                Ok(qr) => println!("{qr}"),
                                Err(e) => warn!("failed to render QR code: {e}"),
                            }
                        }
                        Event::PairSuccess(_) => {
                            info!("WhatsApp pairing successful");
                        }
                        Event::Connected(_) => {
                            info!("✅ הבוט עלה ועובד");
                            *client_store.lock().await = Some(client);
                        }
                        Event::Disconnected(_) => {
                            warn!("WhatsApp disconnected");
                            *client_store.lock().await = None;
                        }
                        Event::LoggedOut(_) => {
                            warn!("WhatsApp logged out, session invalidated");
                            *client_store.lock().await = None;
                        }
                        Event::Message(msg, info) => {
                            handle_whatsapp_message(*msg, info, &tx, &allowed, &sent_ids).await;
                        }
                        _ => {}
                    }
                }
            })
            .build()
            .await
            .map_err(|e| MetziaError::Channel(format!("whatsapp bot build failed: {e}")))?;

        // Store client reference immediately if already connected.
        *client_handle.lock().await = Some(bot.client());

        // Run bot in background.
        let _handle = bot
            .run()
            .await
            .map_err(|e| MetziaError::Channel(format!("whatsapp bot run failed: {e}")))?;

        info!("WhatsApp bot started");
        Ok(())
    }
}
