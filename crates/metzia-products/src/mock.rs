//! Deterministic offline product source.
//!
//! Serves whenever no Open Platform app key is configured, so the whole
//! reply pipeline can run without network access or credentials.

use async_trait::async_trait;
use metzia_core::{error::MetziaError, product::Product, traits::ProductSource};

/// Mock variants: label, rating, price. Prices escalate from A to C.
const VARIANTS: [(&str, &str, &str); 3] = [
    ("A", "4.7", "₪59.90"),
    ("B", "4.8", "₪74.50"),
    ("C", "4.6", "₪88.00"),
];

/// Offline product source with deterministic results.
pub struct MockSource;

#[async_trait]
impl ProductSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    /// Always returns exactly three synthetic products for the keyword.
    async fn search(&self, keyword: &str) -> Result<Vec<Product>, MetziaError> {
        Ok(VARIANTS
            .iter()
            .map(|(label, rating, price)| Product {
                title: format!("{keyword} דגם {label}"),
                image: Some(format!(
                    "https://via.placeholder.com/800x800.png?text={}",
                    urlencoding::encode(&format!("{keyword} {label}"))
                )),
                rating: Some((*rating).to_string()),
                price: Some((*price).to_string()),
                url: format!("https://aliexpress.com/item/EXAMPLE_{label}"),
            })
            .collect())
    }
}
