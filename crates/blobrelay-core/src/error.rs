//! Error types for the core crate.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Error variants for hashing and blob construction.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A claimed blob name is not a valid hex-encoded BLAKE3 digest.
    #[error("Invalid hash name {name:?}: {reason}")]
    InvalidHashName {
        /// The offending filename.
        name: String,
        /// Why it failed to parse.
        reason: String,
    },

    /// A blob's bytes do not hash to its claimed name.
    /// Integrity failure: the file is skipped, never uploaded.
    #[error("Hash mismatch: claimed {claimed}, content hashes to {actual}")]
    HashMismatch {
        /// The hash claimed by the filename.
        claimed: String,
        /// The recomputed content hash.
        actual: String,
    },
}
