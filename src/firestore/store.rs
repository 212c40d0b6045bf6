use crate::error::{Result, TrackerError};
use crate::firestore::document::Document;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Document-level access to a Firestore-shaped store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a document; `None` when it does not exist
    async fn get_document(&self, path: &str) -> Result<Option<Document>>;

    /// Create or fully replace a document
    async fn patch_document(&self, path: &str, document: &Document) -> Result<()>;
}

/// In-process store keyed by document path, used for dry runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<BTreeMap<String, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored document
    pub fn documents(&self) -> BTreeMap<String, Document> {
        self.documents.lock().map(|docs| docs.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, Document>>> {
        self.documents.lock().map_err(|e| TrackerError::StoreUnavailable(e.to_string()))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_document(&self, path: &str) -> Result<Option<Document>> {
        Ok(self.lock()?.get(path).cloned())
    }

    async fn patch_document(&self, path: &str, document: &Document) -> Result<()> {
        self.lock()?.insert(path.to_string(), document.clone());
        Ok(())
    }
}
