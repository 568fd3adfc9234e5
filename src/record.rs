use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Output schema keys, in serialization order.
pub const FIELDS: [&str; 16] = [
    "appId",
    "title",
    "developer",
    "category",
    "rating",
    "reviewsCount",
    "installs",
    "price",
    "inAppPurchases",
    "description",
    "releaseDate",
    "lastUpdated",
    "version",
    "screenshots",
    "iconUrl",
    "developerWebsite",
];

// -------------------------
// Raw (extractor output)
// -------------------------

/// Best-effort extraction result. Values carry whatever shape the page had.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRecord {
    pub app_id: String,
    pub title: Value,
    pub developer: Value,
    pub category: Value,
    pub rating: Value,
    pub reviews_count: Value,
    pub installs: Value,
    pub price: Value,
    pub in_app_purchases: Value,
    pub description: Value,
    pub release_date: Value,
    pub last_updated: Value,
    pub version: Value,
    pub screenshots: Value,
    pub icon_url: Value,
    pub developer_website: Value,
}

// -------------------------
// Normalized (exported)
// -------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InAppPurchases {
    Flag(bool),
    Items(Vec<String>),
}

impl Default for InAppPurchases {
    fn default() -> Self {
        InAppPurchases::Flag(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRecord {
    pub app_id: String,
    pub title: Option<String>,
    pub developer: Option<String>,
    pub category: Option<String>,
    pub rating: Option<f64>,
    pub reviews_count: Option<i64>,
    pub installs: Option<String>,
    pub price: String,
    pub in_app_purchases: InAppPurchases,
    pub description: Option<String>,
    pub release_date: Option<String>,
    pub last_updated: Option<String>,
    pub version: Option<String>,
    pub screenshots: Vec<String>,
    pub icon_url: Option<String>,
    pub developer_website: Option<String>,
}

impl From<AppRecord> for RawRecord {
    fn from(record: AppRecord) -> Self {
        let in_app_purchases = match record.in_app_purchases {
            InAppPurchases::Flag(b) => Value::Bool(b),
            InAppPurchases::Items(items) => Value::from(items),
        };
        RawRecord {
            app_id: record.app_id,
            title: record.title.into(),
            developer: record.developer.into(),
            category: record.category.into(),
            rating: record.rating.into(),
            reviews_count: record.reviews_count.into(),
            installs: record.installs.into(),
            price: record.price.into(),
            in_app_purchases,
            description: record.description.into(),
            release_date: record.release_date.into(),
            last_updated: record.last_updated.into(),
            version: record.version.into(),
            screenshots: record.screenshots.into(),
            icon_url: record.icon_url.into(),
            developer_website: record.developer_website.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_record_reads_partial_json() {
        let raw: RawRecord = serde_json::from_value(json!({
            "appId": "com.example.app",
            "rating": "4,5",
            "screenshots": "http://x/1.png"
        }))
        .unwrap();
        assert_eq!(raw.app_id, "com.example.app");
        assert_eq!(raw.rating, json!("4,5"));
        assert!(raw.title.is_null());
    }

    #[test]
    fn in_app_purchases_serializes_untagged() {
        assert_eq!(serde_json::to_value(InAppPurchases::Flag(true)).unwrap(), json!(true));
        assert_eq!(
            serde_json::to_value(InAppPurchases::Items(vec!["Coins".into()])).unwrap(),
            json!(["Coins"])
        );
    }
}
