//! Filesystem store backend: one file per blob, named by hex hash.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use blobrelay_core::{BlobHash, BlobKind};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::{Catalog, ObjectStore, StoreFactory};

/// Object store rooted at a local directory.
///
/// Writes go through a temp file followed by a rename, so a crash never
/// leaves a partially written blob under its final name. Existence of the
/// final name is the catalog record.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn put(&self, hash: &BlobHash, kind: BlobKind, data: &[u8]) -> StoreResult<()> {
        let name = hash.to_hex();
        let tmp = self.root.join(format!("{name}.tmp"));
        let dest = self.root.join(&name);
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, &dest).await?;
        debug!(blob = %name, kind = %kind, bytes = data.len(), "stored blob");
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FsStore {
    async fn put_manifest(&self, hash: &BlobHash, data: &[u8]) -> StoreResult<()> {
        self.put(hash, BlobKind::Manifest, data).await
    }

    async fn put_data(&self, hash: &BlobHash, data: &[u8]) -> StoreResult<()> {
        self.put(hash, BlobKind::Data, data).await
    }
}

#[async_trait]
impl Catalog for FsStore {
    async fn has_blobs(&self, names: &[String]) -> StoreResult<HashSet<String>> {
        let mut existing = HashSet::new();
        for name in names {
            // Candidate names come straight from a directory listing; only
            // well-formed hash names can name a stored blob, and rejecting
            // the rest keeps arbitrary paths out of the lookup.
            if BlobHash::from_hex(name).is_err() {
                continue;
            }
            if tokio::fs::try_exists(self.root.join(name))
                .await
                .map_err(|e| StoreError::Catalog(e.to_string()))?
            {
                existing.insert(name.clone());
            }
        }
        Ok(existing)
    }
}

/// Builds one `FsStore` per worker over a shared root.
pub struct FsStoreFactory {
    root: PathBuf,
}

impl FsStoreFactory {
    /// Create a factory for stores rooted at `root`. The directory must
    /// already exist (open the first store via [`FsStore::open`]).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl StoreFactory for FsStoreFactory {
    fn create(&self) -> StoreResult<Arc<dyn ObjectStore>> {
        if !self.root.is_dir() {
            return Err(StoreError::Backend(format!(
                "store root {} is not a directory",
                self.root.display()
            )));
        }
        Ok(Arc::new(FsStore {
            root: self.root.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobrelay_core::blob_hash;

    #[tokio::test]
    async fn put_writes_final_name_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::open(dir.path()).await.unwrap();
        let hash = blob_hash(b"some data");
        store.put_data(&hash, b"some data").await.unwrap();

        let dest = dir.path().join(hash.to_hex());
        assert_eq!(std::fs::read(&dest).unwrap(), b"some data");
        assert!(!dir.path().join(format!("{}.tmp", hash.to_hex())).exists());
    }

    #[tokio::test]
    async fn has_blobs_sees_previous_puts() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::open(dir.path()).await.unwrap();
        let hash = blob_hash(b"manifest-ish");
        store.put_manifest(&hash, b"manifest-ish").await.unwrap();

        let existing = store
            .has_blobs(&[hash.to_hex(), blob_hash(b"missing").to_hex()])
            .await
            .unwrap();
        assert_eq!(existing.len(), 1);
        assert!(existing.contains(&hash.to_hex()));
    }

    #[tokio::test]
    async fn malformed_names_never_exist() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
        let store = FsStore::open(dir.path()).await.unwrap();

        let existing = store
            .has_blobs(&["notes.txt".to_string(), "../escape".to_string()])
            .await
            .unwrap();
        assert!(existing.is_empty());
    }

    #[tokio::test]
    async fn factory_builds_store_per_worker() {
        let dir = tempfile::tempdir().unwrap();
        FsStore::open(dir.path()).await.unwrap();
        let factory = FsStoreFactory::new(dir.path());

        let a = factory.create().unwrap();
        let b = factory.create().unwrap();
        let hash = blob_hash(b"via factory");
        a.put_data(&hash, b"via factory").await.unwrap();
        b.put_data(&hash, b"via factory").await.unwrap();

        assert!(dir.path().join(hash.to_hex()).exists());
    }

    #[tokio::test]
    async fn factory_rejects_missing_root() {
        let factory = FsStoreFactory::new("/nonexistent/blobrelay-root");
        assert!(factory.create().is_err());
    }
}
