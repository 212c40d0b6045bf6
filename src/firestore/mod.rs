//! Cloud Firestore persistence
//!
//! Products are stored as `products/{shop}_{item}` with a per-day snapshot under
//! `products/{shop}_{item}/history/{YYYY-MM-DD}`, written through the REST API.

pub mod client;
pub mod config;
pub mod document;
pub mod store;
pub mod value;

pub use client::FirestoreClient;
pub use config::FirestoreConfig;
pub use document::{Document, day_key, history_document, history_path, parse_price, product_document, product_id, product_path};
pub use store::{DocumentStore, MemoryStore};
pub use value::Value;
