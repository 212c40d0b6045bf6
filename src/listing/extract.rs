use crate::browser::BrowserSession;
use crate::error::{Result, TrackerError};
use crate::listing::product::{Product, RawListing, page_number};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Container for every product card on a search results page
pub const ITEM_SELECTOR: &str = "li.shopee-search-item-result__item";

/// Payload returned by `extract_listings.js`
#[derive(Debug, Clone, Deserialize)]
pub struct PageSnapshot {
    pub url: String,
    #[serde(default)]
    pub items: Vec<RawListing>,
}

/// Products read from one results page
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    /// Zero-based page the products were read from
    pub page_number: u32,

    pub products: Vec<Product>,

    /// Cards dropped for missing a name, price or URL
    pub skipped: usize,
}

impl PageSnapshot {
    /// Normalize the raw cards, stamping each product with `now`
    pub fn into_report(self, now: DateTime<Utc>) -> ExtractionReport {
        let page = page_number(&self.url);
        let mut products = Vec::with_capacity(self.items.len());
        let mut skipped = 0;

        log::info!("Extracting {} cards (page={})", self.items.len(), page);

        for (index, raw) in self.items.into_iter().enumerate() {
            let flags = (!raw.name.trim().is_empty(), !raw.price.trim().is_empty(), !raw.url.trim().is_empty());
            match Product::from_raw(raw, page, index, now) {
                Some(product) => products.push(product),
                None => {
                    log::warn!("Item {}: incomplete card - name:{}, price:{}, url:{}", index, flags.0, flags.1, flags.2);
                    skipped += 1;
                }
            }
        }

        log::info!("Extracted {} valid products", products.len());

        ExtractionReport { page_number: page, products, skipped }
    }
}

/// Read every product card on the active tab
pub fn extract_products(session: &BrowserSession) -> Result<ExtractionReport> {
    let snapshot: PageSnapshot = session
        .evaluate_json(include_str!("extract_listings.js"))
        .map_err(|e| TrackerError::ExtractionFailed(format!("Failed to read result cards: {}", e)))?;

    Ok(snapshot.into_report(Utc::now()))
}
