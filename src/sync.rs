//! Batched upload of scraped products
//!
//! Each product costs up to three requests: a read of its base record, a write of the
//! base record if it did not exist yet, and a write of today's history snapshot.
//! Products are processed in fixed-width batches so at most `concurrency` products
//! are in flight against the API at any time. Repeated listings of one product are
//! written one after another in input order: the first owns the base record and the
//! last owns the day's history.

use crate::error::{Result, TrackerError};
use crate::firestore::{DocumentStore, day_key, history_document, history_path, product_document, product_id, product_path};
use crate::listing::Product;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::task::JoinSet;

pub const DEFAULT_CONCURRENCY: usize = 5;

/// Progress is logged every this many saved products
const PROGRESS_EVERY: usize = 10;

#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// Products uploaded concurrently within one batch
    pub concurrency: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self { concurrency: DEFAULT_CONCURRENCY }
    }
}

impl SyncOptions {
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    fn width(&self) -> usize {
        self.concurrency.max(1)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SyncFailure {
    pub url: String,
    pub reason: String,
}

/// Outcome of one upload run
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SyncReport {
    pub total: usize,
    pub saved: usize,
    pub failed: usize,
    /// Failed products in input order
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }

    pub fn any_saved(&self) -> bool {
        self.saved > 0
    }
}

/// Write one product: base record on first sight, then today's snapshot
async fn save_product(store: &dyn DocumentStore, product: &Product, day: &str, now: DateTime<Utc>) -> Result<()> {
    let id = product_id(&product.url)
        .ok_or_else(|| TrackerError::InvalidArgument(format!("Could not extract product id from {}", product.url)))?;

    let base = product_path(&id);
    if store.get_document(&base).await?.is_none() {
        store.patch_document(&base, &product_document(product, now)).await?;
    }

    store.patch_document(&history_path(&id, day), &history_document(product, now)).await
}

/// Listings that share a product id, with their input positions
type Group = Vec<(usize, Product)>;

/// Group listings by product id in order of first appearance. A promoted copy of an
/// organic listing lands in the same group, so one id is never written by two tasks.
/// Listings without an id each get their own group.
fn group_by_product(products: Vec<Product>) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();

    for (position, product) in products.into_iter().enumerate() {
        match product_id(&product.url) {
            Some(id) => match by_id.entry(id) {
                Entry::Occupied(entry) => groups[*entry.get()].push((position, product)),
                Entry::Vacant(entry) => {
                    entry.insert(groups.len());
                    groups.push(vec![(position, product)]);
                }
            },
            None => groups.push(vec![(position, product)]),
        }
    }

    groups
}

struct Settled {
    position: usize,
    name: String,
    url: String,
    outcome: Result<()>,
}

/// Upload every product, never letting one failure stop the rest
pub async fn sync_products(store: Arc<dyn DocumentStore>, products: Vec<Product>, options: SyncOptions) -> SyncReport {
    let now = Utc::now();
    let day = day_key(now);
    let width = options.width();
    let mut report = SyncReport { total: products.len(), ..Default::default() };

    log::info!("Saving {} products (day: {}, concurrency: {})", products.len(), day, width);

    let mut groups = group_by_product(products).into_iter().peekable();
    while groups.peek().is_some() {
        let batch: Vec<Group> = groups.by_ref().take(width).collect();
        let mut tasks = JoinSet::new();
        let mut pending: HashMap<usize, (String, String)> = HashMap::new();

        for group in batch {
            for (position, product) in &group {
                pending.insert(*position, (product.name.clone(), product.url.clone()));
            }

            let store = Arc::clone(&store);
            let day = day.clone();
            // listings of one product run in input order
            tasks.spawn(async move {
                let mut settled = Vec::with_capacity(group.len());
                for (position, product) in group {
                    let outcome = save_product(store.as_ref(), &product, &day, now).await;
                    settled.push(Settled { position, name: product.name, url: product.url, outcome });
                }
                settled
            });
        }

        let mut settled = Vec::with_capacity(pending.len());
        let mut aborted = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(results) => {
                    for result in results {
                        pending.remove(&result.position);
                        settled.push(result);
                    }
                }
                Err(e) => {
                    log::error!("Upload task aborted: {}", e);
                    aborted = Some(e.to_string());
                }
            }
        }

        // Listings of aborted tasks never reported back
        let reason = aborted.unwrap_or_else(|| "task did not complete".to_string());
        settled.extend(pending.into_iter().map(|(position, (name, url))| Settled {
            position,
            name,
            url,
            outcome: Err(TrackerError::TaskAborted(reason.clone())),
        }));
        settled.sort_by_key(|result| result.position);

        for result in settled {
            match result.outcome {
                Ok(()) => {
                    report.saved += 1;
                    if report.saved % PROGRESS_EVERY == 0 {
                        log::info!("Saved {}/{}", report.saved, report.total);
                    }
                }
                Err(e) => {
                    log::error!("Failed to save {}: {}", result.name.chars().take(30).collect::<String>(), e);
                    report.failures.push(SyncFailure { url: result.url, reason: e.to_string() });
                }
            }
        }
    }

    report.failed = report.failures.len();

    log::info!("Save result: {} saved / {} failed", report.saved, report.failed);

    report
}

/// Request/response entry point used by the CLI: an empty product list is rejected
pub async fn upload_products(store: Arc<dyn DocumentStore>, products: Vec<Product>, options: SyncOptions) -> Result<SyncReport> {
    if products.is_empty() {
        return Err(TrackerError::EmptyUpload);
    }

    Ok(sync_products(store, products, options).await)
}
