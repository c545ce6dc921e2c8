//! Traits for the external collaborators the pipeline consumes.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use blobrelay_core::BlobHash;

use crate::error::StoreResult;

/// Durable object store for content-addressed blobs.
///
/// Both writes are idempotent: calling twice with the same hash and bytes is
/// safe, and re-uploading a key that appeared concurrently is a no-op. The
/// caller must inspect the returned result; failed writes are surfaced, never
/// assumed successful.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store a manifest (stream descriptor) blob.
    async fn put_manifest(&self, hash: &BlobHash, data: &[u8]) -> StoreResult<()>;

    /// Store a raw data blob.
    async fn put_data(&self, hash: &BlobHash, data: &[u8]) -> StoreResult<()>;
}

/// Persisted record of which blob hashes already exist in durable storage.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Single batched existence lookup: returns the subset of `names` that
    /// are already stored. Must be safe to call with an empty batch.
    ///
    /// The result is a point-in-time snapshot; concurrent external uploads
    /// are not re-checked during a run.
    async fn has_blobs(&self, names: &[String]) -> StoreResult<HashSet<String>>;
}

/// Per-worker store construction.
///
/// Each worker holds its own client instance rather than sharing one across
/// the pool, so client state never contends between workers. Injecting the
/// factory keeps construction out of the pipeline and lets tests substitute
/// fakes.
pub trait StoreFactory: Send + Sync {
    /// Build one object-store client.
    fn create(&self) -> StoreResult<Arc<dyn ObjectStore>>;
}

/// Factory that hands every worker a clone of the same store instance.
///
/// Used with in-memory backends, where sharing is the point: tests observe
/// all workers' writes through one store.
pub struct SharedStoreFactory {
    store: Arc<dyn ObjectStore>,
}

impl SharedStoreFactory {
    /// Wrap an existing store.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }
}

impl StoreFactory for SharedStoreFactory {
    fn create(&self) -> StoreResult<Arc<dyn ObjectStore>> {
        Ok(Arc::clone(&self.store))
    }
}
