use thiserror::Error;

/// Errors produced while driving the browser, scraping listings or talking to Firestore
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("JavaScript evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Listing extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Tool '{0}' not found")]
    ToolNotFound(String),

    #[error("Tool '{tool}' failed: {reason}")]
    ToolExecutionFailed { tool: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Firestore API error: {status} - {body}")]
    Firestore { status: u16, body: String },

    #[error("Document store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Upload task aborted: {0}")]
    TaskAborted(String),

    #[error("No products to upload")]
    EmptyUpload,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
