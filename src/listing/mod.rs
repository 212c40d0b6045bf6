//! Shopee search result extraction
//!
//! Product cards are read in the page by `extract_listings.js` and normalized here:
//! - RawListing / Product: one result card before and after normalization
//! - ExtractionReport: everything read from one page
//! - PagerState: the BACK / NEXT arrows used to walk result pages

pub mod extract;
pub mod pagination;
pub mod product;

pub use extract::{ExtractionReport, ITEM_SELECTOR, PageSnapshot, extract_products};
pub use pagination::{PagerButton, PagerState, go_next, go_prev, read_pager};
pub use product::{ITEMS_PER_PAGE, Product, RawListing, display_order, page_number, parse_sold_count};

use crate::browser::BrowserSession;
use crate::error::Result;
use std::time::Duration;

/// Shopee renders the grid after the initial load; give it this long to appear
pub const RENDER_TIMEOUT: Duration = Duration::from_secs(5);

/// Wait for the result grid, scroll it into existence, then extract it.
///
/// A page where the grid never shows up yields an empty report rather than an error.
pub fn scrape_current_page(session: &BrowserSession) -> Result<ExtractionReport> {
    if !session.wait_for_selector(ITEM_SELECTOR, RENDER_TIMEOUT)? {
        log::warn!("No result cards appeared within {:?}", RENDER_TIMEOUT);
    }

    session.scroll_to_render(6, Duration::from_millis(400))?;

    extract_products(session)
}

/// Scrape up to `max_pages` result pages starting from the active tab, following NEXT
/// until it is disabled
pub fn scrape_pages(session: &BrowserSession, max_pages: usize) -> Result<Vec<Product>> {
    let mut products = Vec::new();

    for page in 0..max_pages {
        let report = scrape_current_page(session)?;
        log::info!("Page {}: {} products ({} skipped)", report.page_number, report.products.len(), report.skipped);
        products.extend(report.products);

        if page + 1 < max_pages && !go_next(session)? {
            log::info!("NEXT is disabled, stopping after {} pages", page + 1);
            break;
        }
    }

    Ok(products)
}
