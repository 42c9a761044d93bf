use thiserror::Error;

/// Errors produced by the store layer.
///
/// Read-side failures (missing or corrupt document) are recovered internally
/// and never reach callers; only write-side failures surface here.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to write the offers document to disk.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize the offer collection.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
