use thiserror::Error;

/// Result type for store, import and export operations.
pub type Result<T> = std::result::Result<T, LinkError>;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("import rejected: {0}")]
    MalformedImport(String),
    #[error("storage unavailable: {0}")]
    Persistence(String),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
