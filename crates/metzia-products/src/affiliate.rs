//! Affiliate link generation with fallback to the plain URL.

use crate::extract;
use metzia_core::{
    config::SearchConfig,
    error::MetziaError,
    product::{Product, ResolvedProduct},
};
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

/// Gateway method name for affiliate link generation.
const LINK_METHOD: &str = "aliexpress.affiliate.link.generate";
/// Bound on the link-generation round-trip.
const RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Rewrites product URLs into tracked affiliate links.
///
/// Resolution is strictly best-effort: with no endpoint configured the
/// input comes back untouched without a network call, and every failure
/// mode falls back to the input. A reply pipeline must never abort
/// because link generation is down.
pub struct AffiliateResolver {
    config: SearchConfig,
    client: reqwest::Client,
}

impl AffiliateResolver {
    /// Create a new resolver from search config.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Resolve a product URL to an affiliate link, or return it unchanged.
    pub async fn resolve(&self, product_url: &str) -> String {
        let Some(base) = self.config.api_base.as_deref().filter(|b| !b.is_empty()) else {
            return product_url.to_string();
        };

        match self.try_resolve(base, product_url).await {
            Ok(link) => link,
            Err(e) => {
                warn!("affiliate link generation failed, keeping plain url: {e}");
                product_url.to_string()
            }
        }
    }

    /// Attach an affiliate link to a product, falling back to its own URL.
    pub async fn resolve_product(&self, product: Product) -> ResolvedProduct {
        let affiliate_url = self.resolve(&product.url).await;
        ResolvedProduct {
            product,
            affiliate_url,
        }
    }

    async fn try_resolve(&self, base: &str, product_url: &str) -> Result<String, MetziaError> {
        let mut params = vec![
            ("method", LINK_METHOD.to_string()),
            ("app_key", self.config.app_key.clone().unwrap_or_default()),
            ("source_values", product_url.to_string()),
        ];
        if let Some(tracking_id) = self.config.tracking_id.as_deref().filter(|t| !t.is_empty()) {
            params.push(("tracking_id", tracking_id.to_string()));
        }

        let resp = self
            .client
            .get(base)
            .timeout(RESOLVE_TIMEOUT)
            .query(&params)
            .send()
            .await
            .map_err(|e| MetziaError::Search(format!("link request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(MetziaError::Search(format!(
                "link endpoint returned {}",
                resp.status()
            )));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| MetziaError::Search(format!("link response parse failed: {e}")))?;

        extract::promotion_link(&data)
            .ok_or_else(|| MetziaError::Search("no promotion link in response".into()))
    }
}
