//! Error types for the upload pipeline.
//!
//! Only run-fatal conditions live here: failures that prevent the pipeline
//! from establishing what needs uploading, or from standing up the pool.
//! Per-file conditions (hash mismatch, unreadable file, exhausted upload
//! retries) are logged and counted, never surfaced as errors.

use thiserror::Error;

use blobrelay_store::StoreError;

/// Result type alias for pipeline operations.
pub type UploadResult<T> = Result<T, UploadError>;

/// Run-fatal pipeline errors.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The blob directory could not be opened or listed.
    #[error("Failed to scan {dir}: {source}")]
    Scan {
        /// Directory that failed to scan.
        dir: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The batched catalog lookup could not complete.
    #[error("Catalog lookup failed: {0}")]
    Catalog(StoreError),

    /// A per-worker store client could not be constructed.
    #[error("Store client construction failed: {0}")]
    StoreInit(StoreError),

    /// The uploader configuration is invalid.
    #[error("Invalid uploader config: {0}")]
    InvalidConfig(String),

    /// A pipeline task panicked or was aborted.
    #[error("Pipeline task failed: {0}")]
    TaskJoin(String),
}
