//! Hebrew product caption formatting.

use metzia_core::product::ResolvedProduct;

/// Shown when the source reports no rating.
const NO_RATING: &str = "N/A";
/// Shown when the source reports no price.
const NO_PRICE: &str = "בדוק בקישור";

/// Fixed marketing tagline under the product title.
fn marketing_copy(title: &str) -> String {
    format!("✨ {title}\n✅ איכות מעולה במחיר משתלם\n🚚 משלוח לישראל | קנייה בטוחה")
}

/// Build the caption text for one product card.
///
/// Deterministic and total: absent rating and price render fixed
/// placeholders, the link line carries the resolved affiliate URL.
pub fn product_caption(p: &ResolvedProduct) -> String {
    let lines = [
        format!("🛒 {}", p.product.title),
        marketing_copy(&p.product.title),
        String::new(),
        format!(
            "⭐ דירוג: {}",
            p.product.rating.as_deref().unwrap_or(NO_RATING)
        ),
        format!(
            "💰 מחיר: {}",
            p.product.price.as_deref().unwrap_or(NO_PRICE)
        ),
        format!("🔗 קישור: {}", p.affiliate_url),
    ];
    lines.join("\n")
}
