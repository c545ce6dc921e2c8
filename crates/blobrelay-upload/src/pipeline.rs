//! The upload pipeline: dispatcher, worker pool, and run driver.
//!
//! One dispatcher feeds a capacity-1 queue (hand-off blocks until a worker
//! accepts or the stop signal fires), a fixed pool of workers drains it, and
//! every completion funnels into the progress aggregator. An in-flight job is
//! always allowed to finish; cancellation only prevents new ones from
//! starting.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use blobrelay_core::{Blob, BlobKind};
use blobrelay_store::{Catalog, ObjectStore, StoreFactory};

use crate::cancel::Stopper;
use crate::config::UploaderConfig;
use crate::error::{UploadError, UploadResult};
use crate::progress::{spawn_aggregator, UploadEvent};
use crate::retry::{RetryExecutor, RetryOutcome};
use crate::scanner::scan_dir;

/// Final accounting for one run. Accurate on both the normal-completion and
/// cancellation paths; fatal errors abort before any of this exists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadSummary {
    /// All filenames discovered by the scanner.
    pub total_candidates: u64,
    /// Candidates the catalog already held at scan time.
    pub already_stored: u64,
    /// Manifest blobs uploaded this run.
    pub manifests_uploaded: u64,
    /// Data blobs uploaded this run.
    pub blobs_uploaded: u64,
    /// Files skipped on hash mismatch.
    pub integrity_skipped: u64,
    /// Files skipped because they could not be read.
    pub read_failures: u64,
    /// Files whose store write failed after retries.
    pub upload_failures: u64,
}

impl UploadSummary {
    /// Total successful uploads.
    pub fn uploaded(&self) -> u64 {
        self.manifests_uploaded + self.blobs_uploaded
    }

    /// Candidates accounted for: already stored, uploaded, or skipped.
    /// Equals `total_candidates` on a run that was not cancelled.
    pub fn accounted(&self) -> u64 {
        self.already_stored
            + self.uploaded()
            + self.integrity_skipped
            + self.read_failures
            + self.upload_failures
    }
}

/// The concurrent blob-upload pipeline.
pub struct Uploader {
    config: UploaderConfig,
    catalog: Arc<dyn Catalog>,
    stores: Arc<dyn StoreFactory>,
}

impl Uploader {
    /// Build an uploader. The catalog answers the batched dedup lookup; the
    /// factory constructs one store client per worker.
    pub fn new(
        config: UploaderConfig,
        catalog: Arc<dyn Catalog>,
        stores: Arc<dyn StoreFactory>,
    ) -> UploadResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            catalog,
            stores,
        })
    }

    /// Run the pipeline over `dir`.
    ///
    /// Scan and catalog failures are fatal and return before any upload
    /// starts. Everything after that is per-file recoverable; the summary is
    /// returned on both normal completion and cancellation.
    pub async fn run(&self, dir: &Path, stopper: &Stopper) -> UploadResult<UploadSummary> {
        let started = Instant::now();

        let names = scan_dir(dir).await?;
        let total = names.len();

        debug!(candidates = total, "checking for existing blobs");
        let existing = self
            .catalog
            .has_blobs(&names)
            .await
            .map_err(UploadError::Catalog)?;
        let planned = (total - existing.len()) as u64;
        info!(planned, "new blobs to upload");

        // Synchronous hand-off: the dispatcher blocks until a worker accepts
        // the job or the stop signal fires.
        let (job_tx, job_rx) = mpsc::channel::<String>(1);
        let job_rx = Arc::new(Mutex::new(job_rx));
        let (event_tx, event_rx) = mpsc::channel::<UploadEvent>(self.config.event_capacity);
        let (aggregator, progress) =
            spawn_aggregator(event_rx, planned, self.config.progress_every, started);

        let retry = RetryExecutor::new(self.config.retry.clone());
        let mut workers = Vec::with_capacity(self.config.worker_count);
        for id in 0..self.config.worker_count {
            let store = self.stores.create().map_err(UploadError::StoreInit)?;
            workers.push(tokio::spawn(worker_loop(
                id,
                dir.to_path_buf(),
                store,
                Arc::clone(&job_rx),
                event_tx.clone(),
                stopper.clone(),
                retry.clone(),
            )));
        }
        // The aggregator must see end-of-events once the workers finish, and
        // the queue must close when the dispatcher and all workers are done.
        drop(event_tx);
        drop(job_rx);

        for name in &names {
            if existing.contains(name) {
                continue;
            }
            tokio::select! {
                biased;
                _ = stopper.stopped() => {
                    warn!("interrupt caught, stopping dispatch");
                    break;
                }
                sent = job_tx.send(name.clone()) => {
                    if sent.is_err() {
                        // Every worker has already exited.
                        break;
                    }
                }
            }
        }
        drop(job_tx);

        for worker in workers {
            worker
                .await
                .map_err(|e| UploadError::TaskJoin(e.to_string()))?;
        }
        aggregator
            .await
            .map_err(|e| UploadError::TaskJoin(e.to_string()))?;

        // Natural completion commits the same transition an interrupt would.
        stopper.stop();

        let counts = progress.borrow().clone();
        let summary = UploadSummary {
            total_candidates: total as u64,
            already_stored: existing.len() as u64,
            manifests_uploaded: counts.manifests_uploaded,
            blobs_uploaded: counts.blobs_uploaded,
            integrity_skipped: counts.integrity_skipped,
            read_failures: counts.read_failures,
            upload_failures: counts.upload_failures,
        };
        info!(
            total = summary.total_candidates,
            manifests = summary.manifests_uploaded,
            blobs = summary.blobs_uploaded,
            already_stored = summary.already_stored,
            skipped = summary.integrity_skipped,
            read_failures = summary.read_failures,
            upload_failures = summary.upload_failures,
            elapsed = ?started.elapsed(),
            "upload run finished"
        );
        Ok(summary)
    }
}

enum Pull {
    Job(String),
    Drained,
    Cancelled,
}

async fn worker_loop(
    id: usize,
    dir: PathBuf,
    store: Arc<dyn ObjectStore>,
    jobs: Arc<Mutex<mpsc::Receiver<String>>>,
    events: mpsc::Sender<UploadEvent>,
    stopper: Stopper,
    retry: RetryExecutor,
) {
    loop {
        let pulled = {
            let mut rx = jobs.lock().await;
            tokio::select! {
                biased;
                _ = stopper.stopped() => Pull::Cancelled,
                job = rx.recv() => match job {
                    Some(name) => Pull::Job(name),
                    None => Pull::Drained,
                },
            }
        };
        let name = match pulled {
            Pull::Job(name) => name,
            Pull::Drained => {
                debug!(worker = id, "worker stopping, queue drained");
                break;
            }
            Pull::Cancelled => {
                debug!(worker = id, "worker stopping on cancellation");
                break;
            }
        };

        let event = process_one(id, &dir, store.as_ref(), &retry, &name).await;
        // Deliver the completion event unless the send would block and the
        // stop signal fires while waiting.
        tokio::select! {
            biased;
            sent = events.send(event) => { let _ = sent; }
            _ = stopper.stopped() => {}
        }
    }
}

async fn process_one(
    worker: usize,
    dir: &Path,
    store: &dyn ObjectStore,
    retry: &RetryExecutor,
    name: &str,
) -> UploadEvent {
    let bytes = match tokio::fs::read(dir.join(name)).await {
        Ok(bytes) => Bytes::from(bytes),
        Err(e) => {
            warn!(worker, blob = %name, error = %e, "failed to read file, skipping");
            return UploadEvent::ReadFailed;
        }
    };

    let blob = match Blob::from_named_bytes(name, bytes) {
        Ok(blob) => blob,
        Err(e) => {
            warn!(worker, blob = %name, error = %e, "integrity check failed, skipping");
            return UploadEvent::IntegritySkip;
        }
    };

    let outcome = match blob.kind {
        BlobKind::Manifest => {
            debug!(worker, blob = %blob.hash, "uploading manifest blob");
            retry
                .execute(|| store.put_manifest(&blob.hash, &blob.bytes))
                .await
        }
        BlobKind::Data => {
            debug!(worker, blob = %blob.hash, "uploading data blob");
            retry
                .execute(|| store.put_data(&blob.hash, &blob.bytes))
                .await
        }
    };

    match outcome {
        RetryOutcome::Success(()) => match blob.kind {
            BlobKind::Manifest => UploadEvent::Manifest,
            BlobKind::Data => UploadEvent::Data,
        },
        RetryOutcome::Exhausted {
            last_error,
            attempts,
        } => {
            error!(
                worker,
                blob = %blob.hash,
                attempts,
                error = %last_error,
                "upload failed, giving up on this blob"
            );
            UploadEvent::UploadFailed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_accounting() {
        let summary = UploadSummary {
            total_candidates: 10,
            already_stored: 4,
            manifests_uploaded: 1,
            blobs_uploaded: 3,
            integrity_skipped: 1,
            read_failures: 1,
            upload_failures: 0,
        };
        assert_eq!(summary.uploaded(), 4);
        assert_eq!(summary.accounted(), summary.total_candidates);
    }
}
