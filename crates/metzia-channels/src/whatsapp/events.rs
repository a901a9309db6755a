//! Incoming WhatsApp message handling -- filtering, unwrapping, and forwarding.

use metzia_core::message::IncomingMessage;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Process an incoming WhatsApp message event.
///
/// Filters out the bot's own echoes, applies the optional allow-list,
/// unwraps nested message wrappers, and forwards plain text (direct or
/// group, the bot serves both) to the dispatcher.
pub(super) async fn handle_whatsapp_message(
    msg: waproto::whatsapp::Message,
    info: wacore::types::message::MessageInfo,
    tx: &mpsc::Sender<IncomingMessage>,
    allowed: &[String],
    sent_ids: &Arc<Mutex<HashSet<String>>>,
) {
    let is_group = info.source.is_group;
    let sender = info.source.sender.user.clone();

    debug!(
        "WA msg: is_group={}, is_from_me={}, sender={}, chat={}",
        is_group, info.source.is_from_me, sender, info.source.chat.user,
    );

    // Replies the bot sent must not come back around as triggers.
    if sent_ids.lock().await.remove(&info.id) {
        debug!("skipping own echo: {}", info.id);
        return;
    }
    if info.source.is_from_me {
        return;
    }

    if !allowed.is_empty() && !allowed.contains(&sender) {
        warn!("ignoring whatsapp message from unauthorized {sender}");
        return;
    }

    // Unwrap nested wrappers (device_sent, ephemeral, view_once).
    let inner = msg
        .device_sent_message
        .as_ref()
        .and_then(|d| d.message.as_deref())
        .or_else(|| {
            msg.ephemeral_message
                .as_ref()
                .and_then(|e| e.message.as_deref())
        })
        .or_else(|| {
            msg.view_once_message
                .as_ref()
                .and_then(|v| v.message.as_deref())
        })
        .unwrap_or(&msg);

    let text = inner
        .conversation
        .as_deref()
        .or_else(|| {
            inner
                .extended_text_message
                .as_ref()
                .and_then(|e| e.text.as_deref())
        })
        .unwrap_or("")
        .to_string();

    // Media-only messages carry no trigger phrase.
    if text.is_empty() {
        return;
    }

    let chat_jid = info.source.chat.to_string();
    let sender_name = if info.push_name.is_empty() {
        sender.clone()
    } else {
        info.push_name.clone()
    };

    let incoming = IncomingMessage {
        id: Uuid::new_v4(),
        channel: "whatsapp".to_string(),
        sender_id: sender,
        sender_name: Some(sender_name),
        text,
        timestamp: chrono::Utc::now(),
        reply_target: Some(chat_jid),
        is_group,
    };

    if tx.send(incoming).await.is_err() {
        info!("whatsapp channel receiver dropped");
    }
}
