use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

/// Number of result cards Shopee renders per search page
pub const ITEMS_PER_PAGE: u64 = 60;

static SOLD_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\+?\s*sold").expect("valid regex"));
static LEADING_FLOAT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+(\.\d+)?|^\.\d+").expect("valid regex"));
static LEADING_INT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+").expect("valid regex"));

/// A result card as read from the page, before any normalization
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawListing {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub price: String,

    /// Text of the "sold" badge, absent on listings without sales
    #[serde(default)]
    pub sold_text: Option<String>,

    /// Absolute product URL
    #[serde(default)]
    pub url: String,

    /// `aria-label` of the discount badge
    #[serde(default)]
    pub discount_rate: Option<String>,
}

/// A scraped product listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,

    /// Price exactly as displayed, e.g. "15.57"
    pub price: String,

    pub url: String,

    #[serde(default)]
    pub sold_count: u64,

    #[serde(default)]
    pub discount_rate: Option<String>,

    /// 1-based position across all result pages
    #[serde(default)]
    pub display_order: u64,

    pub timestamp: DateTime<Utc>,
}

impl Product {
    /// Normalize a raw card. Cards missing a name, price or URL yield `None`.
    pub fn from_raw(raw: RawListing, page: u32, index: usize, now: DateTime<Utc>) -> Option<Self> {
        let name = raw.name.trim();
        let price = raw.price.trim();
        let url = raw.url.trim();

        if name.is_empty() || price.is_empty() || url.is_empty() {
            return None;
        }

        let sold_count = raw.sold_text.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(parse_sold_count).unwrap_or(0);

        Some(Self {
            name: name.to_string(),
            price: price.to_string(),
            url: url.to_string(),
            sold_count,
            discount_rate: raw.discount_rate,
            display_order: display_order(page, index),
            timestamp: now,
        })
    }
}

/// Parse a sold badge such as `"1.2k+ sold"` or `"35 sold"` into a count
pub fn parse_sold_count(text: &str) -> u64 {
    let cleaned = SOLD_SUFFIX.replacen(text, 1, "");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return 0;
    }

    if let Some(number) = cleaned.strip_suffix(['k', 'K']) {
        return LEADING_FLOAT
            .find(number.trim())
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .map(|thousands| (thousands * 1000.0) as u64)
            .unwrap_or(0);
    }

    LEADING_INT.find(cleaned).and_then(|m| m.as_str().parse().ok()).unwrap_or(0)
}

/// Zero-based result page from the `page` query parameter, 0 when absent
pub fn page_number(url: &str) -> u32 {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.query_pairs().find(|(key, _)| key == "page").map(|(_, value)| value.into_owned()))
        .and_then(|value| LEADING_INT.find(value.trim()).and_then(|m| m.as_str().parse().ok()))
        .unwrap_or(0)
}

/// Position of a card across pages, counting from 1
pub fn display_order(page: u32, index: usize) -> u64 {
    u64::from(page) * ITEMS_PER_PAGE + index as u64 + 1
}
