use serde_json::Value;
use tracing::debug;

use crate::node::Node;
use crate::record::{AppRecord, InAppPurchases, RawRecord};

/// One coercion strategy. Strategies for a field are tried in order and the
/// first `Some` wins.
pub type Attempt<T> = fn(&Value) -> Option<T>;

pub const RATING_ATTEMPTS: &[Attempt<f64>] = &[float_from_number, float_from_text];
pub const COUNT_ATTEMPTS: &[Attempt<i64>] = &[int_from_integer, int_from_text];

const FREE_PRICES: &[&str] = &["0", "0.0", "Free", ""];

const PURCHASE_KEYWORDS: &[&str] = &[
    "in-app purchases",
    "offers in-app purchases",
    "offers in app purchases",
];

/// Coerce a raw record into the fixed output schema. Total: values that
/// cannot be coerced become `None` or the field default.
pub fn normalize(raw: RawRecord) -> AppRecord {
    let description = trimmed(&raw.description);
    let in_app_purchases = in_app_purchases(&raw.in_app_purchases, description.as_deref());

    let record = AppRecord {
        app_id: raw.app_id,
        title: trimmed(&raw.title),
        developer: trimmed(&raw.developer),
        category: trimmed(&raw.category),
        rating: coerce(&raw.rating, RATING_ATTEMPTS),
        reviews_count: coerce(&raw.reviews_count, COUNT_ATTEMPTS),
        installs: trimmed(&raw.installs).filter(|s| !s.is_empty()),
        price: price(&raw.price),
        in_app_purchases,
        description,
        release_date: raw.release_date.text(),
        last_updated: raw.last_updated.text(),
        version: raw.version.text(),
        screenshots: screenshots(&raw.screenshots),
        icon_url: trimmed(&raw.icon_url),
        developer_website: trimmed(&raw.developer_website),
    };

    debug!(?record, "normalized record");
    record
}

pub fn coerce<T>(value: &Value, attempts: &[Attempt<T>]) -> Option<T> {
    if value.is_null() {
        return None;
    }
    let out = attempts.iter().find_map(|attempt| attempt(value));
    if out.is_none() {
        debug!(%value, "unable to coerce value");
    }
    out
}

// -------------------------
// Numeric attempts
// -------------------------

fn float_from_number(value: &Value) -> Option<f64> {
    value.as_f64()
}

fn float_from_text(value: &Value) -> Option<f64> {
    let s = value.as_str()?;
    s.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
}

fn int_from_integer(value: &Value) -> Option<i64> {
    value.as_i64()
}

/// Count text such as `"1,234"`, `"10,000+"` or `"UserDownloads:1000000"`.
fn int_from_text(value: &Value) -> Option<i64> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let cleaned = text.replace([',', '+'], "");
    let cleaned = cleaned.trim();
    // first colon only
    let digits = match cleaned.split_once(':') {
        Some((_, rest)) => rest,
        None => cleaned,
    };
    digits.trim().parse::<i64>().ok()
}

// -------------------------
// Text and list fields
// -------------------------

fn trimmed(value: &Value) -> Option<String> {
    value.text().map(|s| s.trim().to_string())
}

fn price(value: &Value) -> String {
    let Some(text) = value.text() else {
        return match value {
            Value::Null => "Free".to_string(),
            other => other.to_string(),
        };
    };
    let text = text.trim();
    if FREE_PRICES.contains(&text) {
        "Free".to_string()
    } else {
        text.to_string()
    }
}

fn in_app_purchases(value: &Value, description: Option<&str>) -> InAppPurchases {
    match value {
        Value::Bool(b) => return InAppPurchases::Flag(*b),
        Value::Array(items) => {
            let names: Vec<String> = items.iter().filter_map(Node::text).collect();
            if !names.is_empty() {
                return InAppPurchases::Items(names);
            }
        }
        _ => {}
    }

    let desc = description.unwrap_or_default().to_lowercase();
    InAppPurchases::Flag(PURCHASE_KEYWORDS.iter().any(|k| desc.contains(k)))
}

fn screenshots(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(Node::text).collect(),
        other => other.text().into_iter().collect(),
    }
}
