use thiserror::Error;

/// Main error type for the analytics pipeline
#[derive(Error, Debug)]
pub enum GridironError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transient network error: {0}")]
    TransientNetwork(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Ingestion errors
    #[error("Malformed upstream payload: {0}")]
    MalformedPayload(String),

    // Stream cursor errors
    #[error("Cursor iterator expired: {0}")]
    CursorExpired(String),

    #[error("Stream unavailable: {0}")]
    StreamUnavailable(String),

    #[error("Invalid cursor transition: from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl GridironError {
    /// Errors that the next scheduled poll tick is expected to clear.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GridironError::Http(_)
                | GridironError::TransientNetwork(_)
                | GridironError::StreamUnavailable(_)
        )
    }
}

/// Result type alias for GridironError
pub type Result<T> = std::result::Result<T, GridironError>;
