//! Blob model: content-addressed unit plus manifest/data classification.

use bytes::Bytes;

use crate::error::{CoreError, CoreResult};
use crate::hash::{blob_hash, BlobHash};
use crate::manifest::Manifest;

/// The two kinds of blob the pipeline distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobKind {
    /// Raw payload data.
    Data,
    /// A stream descriptor document.
    Manifest,
}

impl BlobKind {
    /// Classify bytes by attempting a strict manifest parse: success means
    /// `Manifest`, failure means `Data`.
    ///
    /// This is a heuristic with a known false-positive edge: a data blob
    /// whose bytes happen to satisfy the manifest grammar is classified as a
    /// manifest. Kept as-is pending an out-of-band kind tag in the catalog.
    pub fn classify(data: &[u8]) -> BlobKind {
        if Manifest::parse(data).is_ok() {
            BlobKind::Manifest
        } else {
            BlobKind::Data
        }
    }
}

impl std::fmt::Display for BlobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlobKind::Data => write!(f, "data"),
            BlobKind::Manifest => write!(f, "manifest"),
        }
    }
}

/// An immutable content-addressed blob, validated and classified.
///
/// The only constructor verifies the content against the claimed name, so a
/// `Blob` always satisfies `hash == blake3(bytes)`.
#[derive(Debug, Clone)]
pub struct Blob {
    /// Content hash; also the blob's name and storage key.
    pub hash: BlobHash,
    /// Raw content.
    pub bytes: Bytes,
    /// Manifest or data, per [`BlobKind::classify`].
    pub kind: BlobKind,
}

impl Blob {
    /// Build a blob from a claimed name (the filename) and its bytes.
    ///
    /// Returns `CoreError::HashMismatch` when the content does not hash to
    /// the name, and `CoreError::InvalidHashName` when the name is not a
    /// well-formed hex digest. Both are integrity failures, not
    /// classification failures.
    pub fn from_named_bytes(name: &str, bytes: Bytes) -> CoreResult<Self> {
        let claimed = BlobHash::from_hex(name)?;
        let actual = blob_hash(&bytes);
        if claimed != actual {
            return Err(CoreError::HashMismatch {
                claimed: claimed.to_hex(),
                actual: actual.to_hex(),
            });
        }
        let kind = BlobKind::classify(&bytes);
        Ok(Blob {
            hash: actual,
            bytes,
            kind,
        })
    }
}
