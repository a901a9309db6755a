//! AliExpress Open Platform product search.
//!
//! Issues a single affiliate product query per search and normalizes
//! the heterogeneous response entries into [`Product`] values.

use crate::extract;
use async_trait::async_trait;
use metzia_core::{
    config::SearchConfig, error::MetziaError, product::Product, traits::ProductSource,
};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Gateway method name for affiliate product queries.
const QUERY_METHOD: &str = "aliexpress.affiliate.product.query";
/// First page only; 20 offers is plenty for the three presented.
const PAGE_NO: u32 = 1;
const PAGE_SIZE: u32 = 20;
/// Bound on the search round-trip.
const SEARCH_TIMEOUT: Duration = Duration::from_secs(20);
/// Entries kept from a response, however many the gateway returns.
const MAX_RESULTS: usize = 3;

/// Product source backed by the Open Platform affiliate API.
pub struct OpenPlatformSource {
    config: SearchConfig,
    client: reqwest::Client,
}

impl OpenPlatformSource {
    /// Create a new source from search config.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Map one raw result entry into the normalized product shape.
    ///
    /// Field names vary across gateway versions; each field prefers the
    /// primary name and falls back to the alternate one.
    fn map_product(raw: &Value) -> Product {
        Product {
            title: extract::string_field(raw, "productTitle", "title").unwrap_or_default(),
            image: extract::string_field(raw, "productMainImageUrl", "imageUrl"),
            rating: extract::string_field(raw, "evaluateRate", "averageRating"),
            price: extract::price_field(raw),
            url: extract::string_field(raw, "productDetailUrl", "detailUrl").unwrap_or_default(),
        }
    }
}

#[async_trait]
impl ProductSource for OpenPlatformSource {
    fn name(&self) -> &str {
        "open-platform"
    }

    async fn search(&self, keyword: &str) -> Result<Vec<Product>, MetziaError> {
        let base = self
            .config
            .api_base
            .as_deref()
            .filter(|b| !b.is_empty())
            .ok_or_else(|| MetziaError::Config("search.api_base is not set".into()))?;
        let app_key = self.config.app_key.clone().unwrap_or_default();

        debug!("open-platform: GET {base} keywords={keyword}");

        let resp = self
            .client
            .get(base)
            .timeout(SEARCH_TIMEOUT)
            .query(&[
                ("method", QUERY_METHOD),
                ("app_key", app_key.as_str()),
                ("keywords", keyword),
                ("page_no", PAGE_NO.to_string().as_str()),
                ("page_size", PAGE_SIZE.to_string().as_str()),
                ("target_currency", self.config.currency.as_str()),
                ("target_language", self.config.language.as_str()),
                ("country", self.config.country.as_str()),
            ])
            .send()
            .await
            .map_err(|e| MetziaError::Search(format!("product query failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(MetziaError::Search(format!(
                "product query returned {status}: {body}"
            )));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| MetziaError::Search(format!("product query parse failed: {e}")))?;

        let raw = extract::result_list(&data).unwrap_or(&[]);
        Ok(raw.iter().take(MAX_RESULTS).map(Self::map_product).collect())
    }
}
