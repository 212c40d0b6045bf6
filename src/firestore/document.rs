use crate::firestore::value::Value;
use crate::listing::Product;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Top-level collection holding one document per product
pub const PRODUCTS_COLLECTION: &str = "products";

/// Sub-collection under each product holding one document per day
pub const HISTORY_COLLECTION: &str = "history";

static PRODUCT_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"i\.(\d+)\.(\d+)").expect("valid regex"));
static LEADING_FLOAT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+\.?\d*|\.\d+)").expect("valid regex"));

/// A Firestore document as sent to and returned by the REST API
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name, only present on documents read back from the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub fields: BTreeMap<String, Value>,

    #[serde(default, skip_serializing)]
    pub create_time: Option<String>,

    #[serde(default, skip_serializing)]
    pub update_time: Option<String>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Stable product key from a listing URL.
///
/// Shopee product URLs end in `-i.<shop id>.<item id>`; the key is `<shop id>_<item id>`.
pub fn product_id(url: &str) -> Option<String> {
    PRODUCT_ID.captures(url).map(|caps| format!("{}_{}", &caps[1], &caps[2]))
}

/// Numeric price from its display text, 0 when nothing numeric is left
pub fn parse_price(text: &str) -> f64 {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();

    LEADING_FLOAT.find(&digits).and_then(|m| m.as_str().parse().ok()).unwrap_or(0.0)
}

/// UTC calendar day used as the history document id
pub fn day_key(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d").to_string()
}

pub fn product_path(product_id: &str) -> String {
    format!("{}/{}", PRODUCTS_COLLECTION, product_id)
}

pub fn history_path(product_id: &str, day: &str) -> String {
    format!("{}/{}/{}/{}", PRODUCTS_COLLECTION, product_id, HISTORY_COLLECTION, day)
}

/// Base record, written only the first time a product is seen
pub fn product_document(product: &Product, now: DateTime<Utc>) -> Document {
    Document::new()
        .with_field("name", Value::string(&product.name))
        .with_field("url", Value::string(&product.url))
        .with_field("firstSeenAt", Value::Timestamp(now))
}

/// Daily snapshot, overwritten by every sync on the same day
pub fn history_document(product: &Product, now: DateTime<Utc>) -> Document {
    Document::new()
        .with_field("price", Value::Double(parse_price(&product.price)))
        .with_field("soldCount", Value::Integer(clamp_i64(product.sold_count)))
        .with_field("displayOrder", Value::Integer(clamp_i64(product.display_order)))
        .with_field("timestamp", Value::Timestamp(now))
        .with_field("discountRate", Value::optional_string(product.discount_rate.clone()))
}

fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product() -> Product {
        Product {
            name: "Canvas Tote".to_string(),
            price: "12.90".to_string(),
            url: "https://shopee.sg/Canvas-Tote-i.123456.789012345".to_string(),
            sold_count: 1100,
            discount_rate: None,
            display_order: 7,
            timestamp: Utc::now(),
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-03-01T23:59:59Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_product_id() {
        assert_eq!(product_id("https://shopee.sg/product-name-i.123456.789012345").as_deref(), Some("123456_789012345"));
        assert_eq!(product_id("https://shopee.sg/x-i.1.2?sp_atk=abc").as_deref(), Some("1_2"));
        assert_eq!(product_id("https://shopee.sg/search?keyword=bag"), None);
        assert_eq!(product_id(""), None);
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("15.57"), 15.57);
        assert_eq!(parse_price("$1,234.50"), 1234.5);
        assert_eq!(parse_price("free"), 0.0);
        assert_eq!(parse_price(""), 0.0);
    }

    #[test]
    fn test_paths() {
        assert_eq!(product_path("1_2"), "products/1_2");
        assert_eq!(history_path("1_2", "2025-03-01"), "products/1_2/history/2025-03-01");
    }

    #[test]
    fn test_day_key_is_utc() {
        assert_eq!(day_key(fixed_now()), "2025-03-01");
    }

    #[test]
    fn test_product_document_fields() {
        let doc = product_document(&product(), fixed_now());
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({"fields": {
                "firstSeenAt": {"timestampValue": "2025-03-01T23:59:59Z"},
                "name": {"stringValue": "Canvas Tote"},
                "url": {"stringValue": "https://shopee.sg/Canvas-Tote-i.123456.789012345"}
            }})
        );
    }

    #[test]
    fn test_history_document_fields() {
        let doc = history_document(&product(), fixed_now());
        assert_eq!(doc.field("price"), Some(&Value::Double(12.9)));
        assert_eq!(doc.field("soldCount"), Some(&Value::Integer(1100)));
        assert_eq!(doc.field("displayOrder"), Some(&Value::Integer(7)));
        assert!(doc.field("discountRate").unwrap().is_null());
    }

    #[test]
    fn test_history_document_discount() {
        let mut p = product();
        p.discount_rate = Some("-15%".to_string());
        let doc = history_document(&p, fixed_now());
        assert_eq!(doc.field("discountRate").and_then(Value::as_str), Some("-15%"));
    }

    #[test]
    fn test_server_document_round_trip_metadata() {
        let doc: Document = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/products/1_2",
            "fields": {"name": {"stringValue": "Bag"}},
            "createTime": "2025-03-01T00:00:00.000001Z",
            "updateTime": "2025-03-01T00:00:00.000001Z"
        }))
        .unwrap();

        assert!(doc.name.is_some());
        let encoded = serde_json::to_value(&doc).unwrap();
        assert!(encoded.get("createTime").is_none());
    }
}
