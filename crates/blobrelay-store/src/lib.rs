#![warn(missing_docs)]

//! blobrelay store contracts and backends.
//!
//! The upload pipeline consumes two external collaborators: an object store
//! exposing idempotent per-kind writes, and a catalog answering batched
//! existence queries. Both are traits here; backends implement one key space
//! behind both, so a successful put is observable through the catalog.

pub mod error;
pub mod filesystem;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use filesystem::{FsStore, FsStoreFactory};
pub use memory::{MemoryStore, MemoryStoreStats};
pub use traits::{Catalog, ObjectStore, SharedStoreFactory, StoreFactory};
