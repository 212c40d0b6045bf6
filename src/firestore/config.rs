use crate::error::{Result, TrackerError};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_DATABASE: &str = "(default)";

/// Connection settings for the Firestore REST API
#[derive(Clone)]
pub struct FirestoreConfig {
    pub project_id: String,

    /// Web API key, sent as the `key` query parameter
    pub api_key: String,

    pub database: String,

    /// API root, overridable for the emulator or tests
    pub base_url: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            api_key: api_key.into(),
            database: DEFAULT_DATABASE.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `PROJECT_ID` and `API_KEY`, plus the optional `FIRESTORE_DATABASE` and
    /// `FIRESTORE_BASE_URL`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`FirestoreConfig::from_env`] over an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| TrackerError::Config(format!("{} is not set", key)))
        };

        let mut config = Self::new(required("PROJECT_ID")?, required("API_KEY")?);

        if let Some(database) = lookup("FIRESTORE_DATABASE").filter(|v| !v.is_empty()) {
            config.database = database;
        }
        if let Some(base_url) = lookup("FIRESTORE_BASE_URL").filter(|v| !v.is_empty()) {
            config.base_url = base_url;
        }

        Ok(config)
    }

    /// Root of the document tree, e.g. `.../projects/p/databases/(default)/documents`
    pub fn documents_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.project_id,
            self.database
        )
    }
}

// The API key stays out of logs and panics
impl fmt::Debug for FirestoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirestoreConfig")
            .field("project_id", &self.project_id)
            .field("api_key_set", &!self.api_key.is_empty())
            .field("database", &self.database)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_required() {
        let config = FirestoreConfig::from_lookup(lookup(&[("PROJECT_ID", "tracker"), ("API_KEY", "secret")])).unwrap();
        assert_eq!(config.project_id, "tracker");
        assert_eq!(config.database, DEFAULT_DATABASE);
        assert_eq!(config.documents_url(), "https://firestore.googleapis.com/v1/projects/tracker/databases/(default)/documents");
    }

    #[test]
    fn test_from_lookup_missing_key() {
        let err = FirestoreConfig::from_lookup(lookup(&[("PROJECT_ID", "tracker")])).unwrap_err();
        assert!(err.to_string().contains("API_KEY"));

        let err = FirestoreConfig::from_lookup(lookup(&[("PROJECT_ID", " "), ("API_KEY", "k")])).unwrap_err();
        assert!(err.to_string().contains("PROJECT_ID"));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = FirestoreConfig::from_lookup(lookup(&[
            ("PROJECT_ID", "tracker"),
            ("API_KEY", "secret"),
            ("FIRESTORE_DATABASE", "staging"),
            ("FIRESTORE_BASE_URL", "http://localhost:8080/v1/"),
        ]))
        .unwrap();
        assert_eq!(config.documents_url(), "http://localhost:8080/v1/projects/tracker/databases/staging/documents");
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = FirestoreConfig::new("tracker", "super-secret-key");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret-key"));
        assert!(printed.contains("api_key_set: true"));
    }
}
