use serde::{Deserialize, Serialize};

/// A normalized product returned by a product source.
///
/// Created fresh for every search and never mutated afterwards; the
/// affiliate link is attached by wrapping in [`ResolvedProduct`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    /// Main image URL, when the source provides one.
    pub image: Option<String>,
    /// Rating as reported by the source (a number or free text).
    pub rating: Option<String>,
    /// Display price, already formatted with its currency.
    pub price: Option<String>,
    /// Product detail URL at the source.
    pub url: String,
}

/// A product plus its resolved affiliate link.
///
/// `affiliate_url` is the plain product URL whenever link generation is
/// unavailable or failed. Exists only while a reply is being built.
#[derive(Debug, Clone)]
pub struct ResolvedProduct {
    pub product: Product,
    pub affiliate_url: String,
}
