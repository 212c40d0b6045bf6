//! # shopee-tracker
//!
//! Scrapes Shopee search result pages through the Chrome DevTools Protocol and keeps a
//! product catalogue with a per-day price history in Cloud Firestore.
//!
//! ## Data model
//!
//! - `products/{shop}_{item}`: name, URL and when the product was first seen. Written
//!   once; later syncs never touch it.
//! - `products/{shop}_{item}/history/{YYYY-MM-DD}`: price, sold count, position in
//!   the results and discount badge. Every sync on the same day overwrites it.
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use shopee_tracker::{BrowserSession, FirestoreClient, FirestoreConfig, LaunchOptions, SyncOptions};
//! use shopee_tracker::listing::scrape_pages;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> shopee_tracker::Result<()> {
//! let session = BrowserSession::launch(LaunchOptions::default())?;
//! session.navigate("https://shopee.sg/search?keyword=tote%20bag")?;
//! session.wait_for_navigation()?;
//!
//! let products = scrape_pages(&session, 3)?;
//!
//! let client = FirestoreClient::new(FirestoreConfig::from_env()?)?;
//! let report = shopee_tracker::upload_products(Arc::new(client), products, SyncOptions::default()).await?;
//! println!("{} saved, {} failed", report.saved, report.failed);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: Browser session management and configuration
//! - [`listing`]: Product card extraction and result-page pagination
//! - [`firestore`]: Firestore REST client, document encoding and the store trait
//! - [`sync`]: Batched, concurrency-limited upload
//! - [`tools`]: BACK / GET / NEXT page controls
//! - [`error`]: Error types and result aliases

pub mod browser;
pub mod error;
pub mod firestore;
pub mod listing;
pub mod sync;
pub mod tools;

pub use browser::{BrowserSession, ConnectionOptions, LaunchOptions};
pub use error::{Result, TrackerError};
pub use firestore::{DocumentStore, FirestoreClient, FirestoreConfig, MemoryStore};
pub use listing::{ExtractionReport, PagerState, Product};
pub use sync::{SyncOptions, SyncReport, sync_products, upload_products};
pub use tools::{Tool, ToolContext, ToolRegistry, ToolResult};
