//! Best-effort extraction from Open Platform responses.
//!
//! The gateway nests results differently across versions, so every
//! lookup probes an ordered list of JSON pointer paths and takes the
//! first hit. New shape variants extend the path lists.

use serde_json::Value;

/// Known nesting variants for the product search result list.
const RESULT_LIST_PATHS: [&str; 2] = [
    "/response/result/result_list",
    "/resp/result/result_list",
];

/// Known nesting variants for the first generated promotion link.
const PROMOTION_LINK_PATHS: [&str; 2] = [
    "/response/result/promotion_links/0/promotion_link",
    "/resp/result/promotion_links/0/promotion_link",
];

/// The result array under the first matching path, if any.
pub(crate) fn result_list(data: &Value) -> Option<&[Value]> {
    RESULT_LIST_PATHS
        .iter()
        .find_map(|path| data.pointer(path))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
}

/// The first promotion link under the first matching path, if any.
pub(crate) fn promotion_link(data: &Value) -> Option<String> {
    PROMOTION_LINK_PATHS
        .iter()
        .find_map(|path| data.pointer(path))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// A field with a preferred and a fallback name, rendered as text.
pub(crate) fn string_field(obj: &Value, primary: &str, fallback: &str) -> Option<String> {
    field_text(obj.get(primary)).or_else(|| field_text(obj.get(fallback)))
}

/// Display price for a raw result entry.
///
/// An (amount, currency) pair beats the raw `price` field, and the app
/// price beats the plain sale price.
pub(crate) fn price_field(obj: &Value) -> Option<String> {
    price_pair(obj, "appSalePrice", "appSalePriceCurrency")
        .or_else(|| price_pair(obj, "salePrice", "salePriceCurrency"))
        .or_else(|| field_text(obj.get("price")))
}

fn price_pair(obj: &Value, amount_key: &str, currency_key: &str) -> Option<String> {
    let amount = field_text(obj.get(amount_key))?;
    let currency = field_text(obj.get(currency_key))?;
    Some(format!("{amount} {currency}"))
}

/// Render a scalar JSON field as text (the API mixes numbers and strings).
fn field_text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}
