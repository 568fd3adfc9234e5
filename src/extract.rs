use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use crate::node::Node;
use crate::record::RawRecord;

const APPLICATION_TYPE: &str = "SoftwareApplication";

/// Description phrases that mark an app as monetized.
const PURCHASE_TRIGGERS: &[&str] = &[
    "in-app purchases",
    "offers in-app purchases",
    "offers in app purchases",
    "contains ads",
];

/// Extract a best-effort raw record from a details page.
///
/// Structured data wins, `og:` meta tags fill the gaps, and the in-app
/// purchase flag is guessed from the description. Malformed markup never
/// fails the call; the worst case is a record with only `app_id` set.
pub fn parse(html: &str, app_id: &str) -> RawRecord {
    let doc = Html::parse_document(html);
    let ld = find_structured_data(&doc).unwrap_or(Value::Null);

    let meta_title = meta_content(&doc, "og:title");
    let meta_desc = meta_content(&doc, "og:description");
    let meta_image = meta_content(&doc, "og:image");

    let title = ld.field("name").or(&meta_title).clone();
    let description = ld.field("description").or(&meta_desc).clone();
    let icon_url = image_url(ld.field("image"))
        .map(Value::String)
        .unwrap_or(Value::Null)
        .or(&meta_image)
        .clone();

    let (developer, developer_website) = developer_info(ld.field("author").or(ld.field("publisher")));

    let category = ld
        .field("applicationCategory")
        .or(ld.field("genre"))
        .clone();

    let rating_block = ld.field("aggregateRating");
    let rating = rating_block.field("ratingValue").clone();
    let reviews_count = rating_block
        .field("ratingCount")
        .or(rating_block.field("reviewCount"))
        .clone();

    let offer = ld.field("offers").first_object();
    let price = format_price(offer.field("price"), offer.field("priceCurrency"));

    let in_app_purchases = description
        .text()
        .map(|d| mentions_purchases(&d))
        .unwrap_or(false);

    let record = RawRecord {
        app_id: app_id.to_string(),
        title,
        developer,
        category,
        rating,
        reviews_count,
        // not reliably exposed by the page
        installs: Value::Null,
        price: Value::String(price),
        in_app_purchases: Value::Bool(in_app_purchases),
        description,
        release_date: ld.field("datePublished").clone(),
        last_updated: ld.field("dateModified").clone(),
        version: ld.field("softwareVersion").clone(),
        screenshots: Value::from(screenshot_urls(ld.field("screenshot"))),
        icon_url,
        developer_website,
    };

    debug!(app_id, ?record, "parsed raw data");
    record
}

// -------------------------
// Structured data
// -------------------------

fn find_structured_data(doc: &Html) -> Option<Value> {
    let scripts = Selector::parse(r#"script[type="application/ld+json"]"#).ok()?;

    for (i, script) in doc.select(&scripts).enumerate() {
        let body: String = script.text().collect();
        let data: Value = match serde_json::from_str(body.trim()) {
            Ok(v) => v,
            Err(e) => {
                debug!(block = i, error = %e, "skipping malformed ld+json block");
                continue;
            }
        };
        if let Some(entry) = application_entry(data) {
            return Some(entry);
        }
    }
    None
}

fn application_entry(data: Value) -> Option<Value> {
    if is_application(&data) {
        return Some(data);
    }
    match data {
        Value::Array(items) => items.into_iter().find_map(application_entry),
        Value::Object(mut map) => match map.remove("@graph") {
            Some(graph @ Value::Array(_)) => application_entry(graph),
            _ => None,
        },
        _ => None,
    }
}

fn is_application(node: &Value) -> bool {
    match node.field("@type") {
        Value::String(t) => t == APPLICATION_TYPE,
        Value::Array(types) => types.iter().any(|t| t.as_str() == Some(APPLICATION_TYPE)),
        _ => false,
    }
}

fn developer_info(author: &Value) -> (Value, Value) {
    let author = match author {
        Value::Array(items) => items.first().unwrap_or(&Value::Null),
        other => other,
    };
    match author {
        Value::Object(_) => (
            author.field("name").clone(),
            author.field("url").or(author.field("sameAs")).clone(),
        ),
        Value::String(_) => (author.clone(), Value::Null),
        _ => (Value::Null, Value::Null),
    }
}

fn format_price(price: &Value, currency: &Value) -> String {
    let free = match price {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s == "0",
        _ => false,
    };
    if free {
        return "Free".to_string();
    }

    let amount = price.text().unwrap_or_else(|| price.to_string());
    match currency.text().filter(|_| currency.truthy()) {
        Some(cur) => format!("{amount} {cur}"),
        None => amount,
    }
}

/// Image reference as a URL: plain strings, `ImageObject` maps, or the first
/// usable entry of a list.
fn image_url(node: &Value) -> Option<String> {
    match node {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(_) => node.field("url").or(node.field("contentUrl")).text(),
        Value::Array(items) => items.iter().find_map(image_url),
        _ => None,
    }
}

fn screenshot_urls(node: &Value) -> Vec<String> {
    match node {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().filter_map(image_url).collect(),
        other => image_url(other).into_iter().collect(),
    }
}

// -------------------------
// Page-level fallbacks
// -------------------------

fn meta_content(doc: &Html, property: &str) -> Value {
    let Ok(sel) = Selector::parse(&format!(r#"meta[property="{property}"]"#)) else {
        return Value::Null;
    };
    doc.select(&sel)
        .next()
        .and_then(|m| m.value().attr("content"))
        .map(|c| Value::String(c.trim().to_string()))
        .unwrap_or(Value::Null)
}

fn mentions_purchases(description: &str) -> bool {
    let lower = description.to_lowercase();
    PURCHASE_TRIGGERS.iter().any(|t| lower.contains(t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(head: &str) -> String {
        format!("<!doctype html><html><head>{head}</head><body><h1>App</h1></body></html>")
    }

    fn ld_block(payload: &str) -> String {
        format!(r#"<script type="application/ld+json">{payload}</script>"#)
    }

    #[test]
    fn reads_software_application_block() {
        let html = page(&ld_block(
            r#"{
                "@context": "https://schema.org",
                "@type": "SoftwareApplication",
                "name": "Puzzle Quest",
                "description": "Match gems. Contains ads.",
                "image": "https://img.example/icon.png",
                "applicationCategory": "GAME_PUZZLE",
                "author": {"@type": "Organization", "name": "Gem Co", "url": "https://gem.example"},
                "aggregateRating": {"ratingValue": "4.7", "ratingCount": "12,345"},
                "offers": [{"price": "1.99", "priceCurrency": "USD"}],
                "softwareVersion": "2.1.0",
                "datePublished": "2020-01-02",
                "dateModified": "2024-05-06",
                "screenshot": ["https://img.example/s1.png", {"@type": "ImageObject", "url": "https://img.example/s2.png"}]
            }"#,
        ));

        let raw = parse(&html, "com.gem.puzzle");
        assert_eq!(raw.app_id, "com.gem.puzzle");
        assert_eq!(raw.title, json!("Puzzle Quest"));
        assert_eq!(raw.developer, json!("Gem Co"));
        assert_eq!(raw.developer_website, json!("https://gem.example"));
        assert_eq!(raw.category, json!("GAME_PUZZLE"));
        assert_eq!(raw.rating, json!("4.7"));
        assert_eq!(raw.reviews_count, json!("12,345"));
        assert_eq!(raw.price, json!("1.99 USD"));
        assert_eq!(raw.in_app_purchases, json!(true));
        assert_eq!(raw.version, json!("2.1.0"));
        assert_eq!(raw.release_date, json!("2020-01-02"));
        assert_eq!(raw.last_updated, json!("2024-05-06"));
        assert_eq!(
            raw.screenshots,
            json!(["https://img.example/s1.png", "https://img.example/s2.png"])
        );
        assert_eq!(raw.icon_url, json!("https://img.example/icon.png"));
        assert!(raw.installs.is_null());
    }

    #[test]
    fn falls_back_to_meta_tags_without_structured_data() {
        let html = page(
            r#"<meta property="og:title" content="  Meta Title ">
               <meta property="og:description" content="A neutral description.">
               <meta property="og:image" content=" https://img.example/og.png ">"#,
        );

        let raw = parse(&html, "com.example.meta");
        assert_eq!(raw.title, json!("Meta Title"));
        assert_eq!(raw.description, json!("A neutral description."));
        assert_eq!(raw.icon_url, json!("https://img.example/og.png"));
        assert!(raw.developer.is_null());
        assert!(raw.developer_website.is_null());
        assert!(raw.release_date.is_null());
        assert!(raw.last_updated.is_null());
        assert!(raw.category.is_null());
        assert!(raw.rating.is_null());
        assert!(raw.reviews_count.is_null());
        assert!(raw.version.is_null());
        assert_eq!(raw.price, json!("Free"));
        assert_eq!(raw.in_app_purchases, json!(false));
        assert_eq!(raw.screenshots, json!([]));
    }

    #[test]
    fn skips_malformed_blocks_and_other_types() {
        let html = page(&format!(
            "{}{}{}",
            ld_block("{ not json"),
            ld_block(r#"{"@type": "WebPage", "name": "Store"}"#),
            ld_block(r#"[{"@type": "BreadcrumbList"}, {"@type": "SoftwareApplication", "name": "Second"}]"#),
        ));
        let raw = parse(&html, "com.example.second");
        assert_eq!(raw.title, json!("Second"));
    }

    #[test]
    fn searches_graph_containers() {
        let html = page(&ld_block(
            r#"{"@context": "https://schema.org", "@graph": [
                {"@type": "Organization", "name": "Org"},
                {"@type": ["SoftwareApplication", "MobileApplication"], "name": "Graphed"}
            ]}"#,
        ));
        assert_eq!(parse(&html, "x").title, json!("Graphed"));
    }

    #[test]
    fn empty_structured_name_uses_meta_title() {
        let html = page(&format!(
            r#"{}<meta property="og:title" content="From Meta">"#,
            ld_block(r#"{"@type": "SoftwareApplication", "name": ""}"#)
        ));
        assert_eq!(parse(&html, "x").title, json!("From Meta"));
    }

    #[test]
    fn developer_from_publisher_string_or_author_list() {
        let html = page(&ld_block(
            r#"{"@type": "SoftwareApplication", "publisher": "Solo Dev"}"#,
        ));
        let raw = parse(&html, "x");
        assert_eq!(raw.developer, json!("Solo Dev"));
        assert!(raw.developer_website.is_null());

        let html = page(&ld_block(
            r#"{"@type": "SoftwareApplication", "author": [{"name": "First", "sameAs": "https://first.example"}, {"name": "Second"}]}"#,
        ));
        let raw = parse(&html, "x");
        assert_eq!(raw.developer, json!("First"));
        assert_eq!(raw.developer_website, json!("https://first.example"));
    }

    #[test]
    fn price_formatting() {
        assert_eq!(format_price(&Value::Null, &Value::Null), "Free");
        assert_eq!(format_price(&json!(0), &json!("USD")), "Free");
        assert_eq!(format_price(&json!("0"), &json!("USD")), "Free");
        assert_eq!(format_price(&json!(4.99), &json!("EUR")), "4.99 EUR");
        assert_eq!(format_price(&json!("2.49"), &Value::Null), "2.49");
        assert_eq!(format_price(&json!("2.49"), &json!("")), "2.49");
    }

    #[test]
    fn category_falls_back_to_genre() {
        let html = page(&ld_block(r#"{"@type": "SoftwareApplication", "genre": "Tools"}"#));
        assert_eq!(parse(&html, "x").category, json!("Tools"));
    }

    #[test]
    fn garbage_input_yields_defaults() {
        let raw = parse("<<<not html at all", "com.example.empty");
        assert_eq!(raw.app_id, "com.example.empty");
        assert!(raw.title.is_null());
        assert!(raw.description.is_null());
        assert_eq!(raw.price, json!("Free"));
        assert_eq!(raw.screenshots, json!([]));
    }
}
