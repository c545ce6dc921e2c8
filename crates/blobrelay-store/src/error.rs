//! Error types for store and catalog operations.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error variants for object-store writes and catalog lookups.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Wraps standard I/O errors from filesystem-backed stores.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend rejected or failed a write.
    #[error("Store backend error: {0}")]
    Backend(String),

    /// The catalog lookup could not complete. Fatal for a run: the pipeline
    /// cannot establish what needs uploading.
    #[error("Catalog error: {0}")]
    Catalog(String),
}
