//! The product reply pipeline for one matched trigger.

use super::trigger::TriggerMatch;
use super::{Dispatcher, MAX_PRODUCTS};
use metzia_core::{error::MetziaError, message::IncomingMessage, product::ResolvedProduct};
use metzia_products::caption::product_caption;
use std::time::Duration;
use tracing::{error, info, warn};

/// Pause after a successful media send, before its caption.
const MEDIA_PACING: Duration = Duration::from_millis(300);
/// Pause between consecutive product cards.
const PRODUCT_PACING: Duration = Duration::from_millis(500);
/// Bound on fetching a product image.
const MEDIA_FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Generic failure reply. One message for every search failure, so chat
/// users never see internal details.
pub(super) const SEARCH_FAILED_REPLY: &str = "❌ לא הצלחתי להביא תוצאות כרגע. נסה שוב עוד מעט.";

impl Dispatcher {
    /// Run the full reply pipeline for one matched trigger.
    pub(super) async fn handle_trigger(&self, incoming: &IncomingMessage, matched: &TriggerMatch) {
        let keyword = &matched.keyword;
        info!(
            "[{}] {} triggered a search: {keyword}",
            incoming.channel,
            incoming.sender_name.as_deref().unwrap_or("unknown"),
        );

        self.send_text(incoming, &format!("🔍 מחפש לך באליאקספרס: “{keyword}”..."))
            .await;

        let products = match self.source.search(keyword).await {
            Ok(products) => products,
            Err(e) => {
                error!("[{}] search for '{keyword}' failed: {e}", incoming.channel);
                self.send_text(incoming, SEARCH_FAILED_REPLY).await;
                return;
            }
        };

        if products.is_empty() {
            info!("[{}] no results for '{keyword}'", incoming.channel);
        }

        for product in products.into_iter().take(MAX_PRODUCTS) {
            let resolved = self.resolver.resolve_product(product).await;

            if self.send_product_image(incoming, &resolved).await {
                tokio::time::sleep(MEDIA_PACING).await;
            }

            self.send_text(incoming, &product_caption(&resolved)).await;
            tokio::time::sleep(PRODUCT_PACING).await;
        }
    }

    /// Best-effort image card: fetch the product image and send it as media.
    ///
    /// Returns whether a media message went out. Failures here are
    /// explicit fallback branches, never fatal: the caption still
    /// follows and the loop moves on to the next product.
    async fn send_product_image(
        &self,
        incoming: &IncomingMessage,
        resolved: &ResolvedProduct,
    ) -> bool {
        let Some(image_url) = resolved.product.image.as_deref() else {
            return false;
        };
        let Some(target) = incoming.reply_target.as_deref() else {
            return false;
        };
        let Some(channel) = self.channels.get(&incoming.channel) else {
            return false;
        };

        let bytes = match self.fetch_image(image_url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("image fetch failed for {image_url}, sending caption only: {e}");
                return false;
            }
        };

        match channel.send_image(target, &bytes, "").await {
            Ok(()) => true,
            Err(e) => {
                warn!("image send failed, sending caption only: {e}");
                false
            }
        }
    }

    /// Download image bytes from a product image URL.
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, MetziaError> {
        let resp = self
            .http
            .get(url)
            .timeout(MEDIA_FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| MetziaError::Channel(format!("image download failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(MetziaError::Channel(format!(
                "image download returned {}",
                resp.status()
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| MetziaError::Channel(format!("image read failed: {e}")))?;

        Ok(bytes.to_vec())
    }
}
