//! In-memory store backend for tests and local development.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use blobrelay_core::{BlobHash, BlobKind};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::traits::{Catalog, ObjectStore};

/// Operation counters for the in-memory store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStoreStats {
    /// Number of manifest put operations.
    pub manifest_puts: u64,
    /// Number of data put operations.
    pub data_puts: u64,
    /// Number of batched existence lookups.
    pub lookup_batches: u64,
    /// Total bytes stored across all puts.
    pub total_bytes_stored: u64,
}

/// In-memory object store + catalog over one key space.
///
/// A put is immediately visible to `has_blobs`, which is what makes a second
/// pipeline run against the same instance dedup everything to zero.
#[derive(Default)]
pub struct MemoryStore {
    blobs: DashMap<String, (BlobKind, Vec<u8>)>,
    stats: Mutex<MemoryStoreStats>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of operation counters.
    pub fn stats(&self) -> MemoryStoreStats {
        self.stats.lock().unwrap().clone()
    }

    /// Number of stored blobs.
    pub fn stored_count(&self) -> usize {
        self.blobs.len()
    }

    /// Kind of a stored blob, if present.
    pub fn kind_of(&self, name: &str) -> Option<BlobKind> {
        self.blobs.get(name).map(|entry| entry.0)
    }

    /// Pre-seed a blob as already existing, bypassing the put path.
    pub fn seed(&self, name: &str, kind: BlobKind, data: &[u8]) {
        self.blobs.insert(name.to_string(), (kind, data.to_vec()));
    }

    fn put(&self, hash: &BlobHash, kind: BlobKind, data: &[u8]) {
        let mut stats = self.stats.lock().unwrap();
        match kind {
            BlobKind::Manifest => stats.manifest_puts += 1,
            BlobKind::Data => stats.data_puts += 1,
        }
        stats.total_bytes_stored += data.len() as u64;
        drop(stats);
        self.blobs.insert(hash.to_hex(), (kind, data.to_vec()));
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_manifest(&self, hash: &BlobHash, data: &[u8]) -> StoreResult<()> {
        self.put(hash, BlobKind::Manifest, data);
        Ok(())
    }

    async fn put_data(&self, hash: &BlobHash, data: &[u8]) -> StoreResult<()> {
        self.put(hash, BlobKind::Data, data);
        Ok(())
    }
}

#[async_trait]
impl Catalog for MemoryStore {
    async fn has_blobs(&self, names: &[String]) -> StoreResult<HashSet<String>> {
        self.stats.lock().unwrap().lookup_batches += 1;
        Ok(names
            .iter()
            .filter(|name| self.blobs.contains_key(name.as_str()))
            .cloned()
            .collect())
    }
}
