use crate::error::{Result, TrackerError};
use crate::firestore::config::FirestoreConfig;
use crate::firestore::document::Document;
use crate::firestore::store::DocumentStore;
use async_trait::async_trait;
use reqwest::Client;

/// Firestore REST client authenticated with a web API key
#[derive(Debug, Clone)]
pub struct FirestoreClient {
    http: Client,
    config: FirestoreConfig,
}

impl FirestoreClient {
    pub fn new(config: FirestoreConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TrackerError::Config(format!("Failed to create HTTP client: {}", e)))?;

        log::info!("Firestore client ready (project: {}, api key set: {})", config.project_id, !config.api_key.is_empty());

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }

    /// URL of a document relative to the database root, without the key parameter
    pub fn document_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.documents_url(), path.trim_start_matches('/'))
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    /// Any non-success status reads as "absent", so an unreadable base record gets rewritten
    async fn get_document(&self, path: &str) -> Result<Option<Document>> {
        let response = self.http.get(self.document_url(path)).query(&[("key", &self.config.api_key)]).send().await?;

        let status = response.status();
        if !status.is_success() {
            log::debug!("GET {} -> {}", path, status);
            return Ok(None);
        }

        Ok(Some(response.json::<Document>().await?))
    }

    async fn patch_document(&self, path: &str, document: &Document) -> Result<()> {
        let response = self
            .http
            .patch(self.document_url(path))
            .query(&[("key", &self.config.api_key)])
            .json(document)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrackerError::Firestore { status: status.as_u16(), body });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_url() {
        let client = FirestoreClient::new(FirestoreConfig::new("tracker", "key")).unwrap();
        assert_eq!(
            client.document_url("products/1_2/history/2025-03-01"),
            "https://firestore.googleapis.com/v1/projects/tracker/databases/(default)/documents/products/1_2/history/2025-03-01"
        );
        assert_eq!(client.document_url("/products/1_2"), client.document_url("products/1_2"));
    }
}
