#![warn(missing_docs)]

//! blobrelay core: content addressing, manifest grammar, blob classification
//!
//! A blob is an immutable unit of content-addressed storage named by the
//! BLAKE3 hash of its own bytes. Manifest blobs are structured documents
//! describing a larger composite stream; everything else is raw data.

pub mod blob;
pub mod error;
pub mod hash;
pub mod manifest;

pub use blob::{Blob, BlobKind};
pub use error::{CoreError, CoreResult};
pub use hash::{blob_hash, BlobHash};
pub use manifest::{ChunkRef, Manifest};
