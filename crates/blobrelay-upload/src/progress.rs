//! Progress aggregation: one consumer owns the counters.
//!
//! Workers emit completion events; a single aggregator task serializes all
//! counter updates, logs a progress line on a fixed cadence, and publishes
//! snapshots over a watch channel. The task ends when the event channel
//! closes (all workers are done), so the last published snapshot is exact
//! even on the cancellation path.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Completion event for one upload job. Each job produces exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadEvent {
    /// A manifest blob was uploaded.
    Manifest,
    /// A data blob was uploaded.
    Data,
    /// The file's bytes did not hash to its name; skipped.
    IntegritySkip,
    /// The file could not be read; skipped.
    ReadFailed,
    /// The store write failed after exhausting retries.
    UploadFailed,
}

/// Running counters, mutated only by the aggregator task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Manifest blobs uploaded.
    pub manifests_uploaded: u64,
    /// Data blobs uploaded.
    pub blobs_uploaded: u64,
    /// Files skipped on hash mismatch.
    pub integrity_skipped: u64,
    /// Files skipped because they could not be read.
    pub read_failures: u64,
    /// Files whose store write failed after retries.
    pub upload_failures: u64,
}

impl ProgressSnapshot {
    /// Total successful uploads.
    pub fn uploaded(&self) -> u64 {
        self.manifests_uploaded + self.blobs_uploaded
    }

    /// Total jobs accounted for, successful or not.
    pub fn processed(&self) -> u64 {
        self.uploaded() + self.integrity_skipped + self.read_failures + self.upload_failures
    }

    fn apply(&mut self, event: UploadEvent) {
        match event {
            UploadEvent::Manifest => self.manifests_uploaded += 1,
            UploadEvent::Data => self.blobs_uploaded += 1,
            UploadEvent::IntegritySkip => self.integrity_skipped += 1,
            UploadEvent::ReadFailed => self.read_failures += 1,
            UploadEvent::UploadFailed => self.upload_failures += 1,
        }
    }
}

/// Spawn the aggregator task.
///
/// `planned` is the number of jobs expected this run, `every` the progress
/// cadence, `started` the run's start time for elapsed reporting. Returns the
/// task handle and a watch receiver for the latest snapshot.
pub fn spawn_aggregator(
    mut events: mpsc::Receiver<UploadEvent>,
    planned: u64,
    every: u64,
    started: Instant,
) -> (JoinHandle<()>, watch::Receiver<ProgressSnapshot>) {
    let (tx, rx) = watch::channel(ProgressSnapshot::default());
    let handle = tokio::spawn(async move {
        let mut snapshot = ProgressSnapshot::default();
        while let Some(event) = events.recv().await {
            snapshot.apply(event);
            if matches!(event, UploadEvent::UploadFailed) {
                warn!(
                    failed = snapshot.upload_failures,
                    "upload failure recorded"
                );
            }
            if snapshot.processed() % every == 0 {
                info!(
                    done = snapshot.processed(),
                    planned,
                    elapsed = ?started.elapsed(),
                    "upload progress"
                );
            }
            tx.send_replace(snapshot.clone());
        }
    });
    (handle, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_each_event_kind() {
        let (tx, rx) = mpsc::channel(16);
        let (handle, progress) = spawn_aggregator(rx, 6, 50, Instant::now());

        for event in [
            UploadEvent::Manifest,
            UploadEvent::Data,
            UploadEvent::Data,
            UploadEvent::IntegritySkip,
            UploadEvent::ReadFailed,
            UploadEvent::UploadFailed,
        ] {
            tx.send(event).await.unwrap();
        }
        drop(tx);
        handle.await.unwrap();

        let snapshot = progress.borrow().clone();
        assert_eq!(snapshot.manifests_uploaded, 1);
        assert_eq!(snapshot.blobs_uploaded, 2);
        assert_eq!(snapshot.integrity_skipped, 1);
        assert_eq!(snapshot.read_failures, 1);
        assert_eq!(snapshot.upload_failures, 1);
        assert_eq!(snapshot.uploaded(), 3);
        assert_eq!(snapshot.processed(), 6);
    }

    #[tokio::test]
    async fn terminates_when_channel_closes() {
        let (tx, rx) = mpsc::channel(1);
        let (handle, progress) = spawn_aggregator(rx, 0, 50, Instant::now());
        drop(tx);
        handle.await.unwrap();
        assert_eq!(*progress.borrow(), ProgressSnapshot::default());
    }

    #[tokio::test]
    async fn snapshot_is_published_incrementally() {
        let (tx, rx) = mpsc::channel(1);
        let (handle, mut progress) = spawn_aggregator(rx, 1, 50, Instant::now());

        tx.send(UploadEvent::Data).await.unwrap();
        progress.changed().await.unwrap();
        assert_eq!(progress.borrow().blobs_uploaded, 1);

        drop(tx);
        handle.await.unwrap();
    }
}
