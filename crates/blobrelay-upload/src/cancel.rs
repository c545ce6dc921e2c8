//! Cooperative shutdown signal shared by every pipeline participant.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

/// Process-wide stop signal with exactly two states: running and stopped.
///
/// The `Running -> Stopped` transition commits at most once no matter how
/// many triggers race for it (operator interrupt vs. natural completion of
/// dispatch). Every task waiting in [`Stopper::stopped`] at the moment of
/// transition is woken, and any task checking afterwards observes the stopped
/// state immediately.
#[derive(Clone)]
pub struct Stopper {
    stopped: Arc<AtomicBool>,
    tx: Arc<watch::Sender<bool>>,
}

impl Default for Stopper {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopper {
    /// Create a new stopper in the running state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            stopped: Arc::new(AtomicBool::new(false)),
            tx: Arc::new(tx),
        }
    }

    /// Commit the stop transition. Idempotent: only the first caller wins.
    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            let _ = self.tx.send(true);
            debug!("stop signal committed");
        }
    }

    /// Non-blocking check of the current state.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Wait until the stop transition has committed. Returns immediately if
    /// it already has.
    pub async fn stopped(&self) {
        if self.is_stopped() {
            return;
        }
        // wait_for inspects the current value before parking, so a
        // transition between the check above and here is never missed.
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|stopped| *stopped).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn starts_running() {
        let stopper = Stopper::new();
        assert!(!stopper.is_stopped());
    }

    #[test]
    fn stop_is_observable_and_idempotent() {
        let stopper = Stopper::new();
        stopper.stop();
        stopper.stop();
        assert!(stopper.is_stopped());
    }

    #[test]
    fn clones_share_state() {
        let stopper = Stopper::new();
        let clone = stopper.clone();
        clone.stop();
        assert!(stopper.is_stopped());
    }

    #[tokio::test]
    async fn stopped_returns_immediately_after_stop() {
        let stopper = Stopper::new();
        stopper.stop();
        tokio::time::timeout(Duration::from_secs(1), stopper.stopped())
            .await
            .expect("stopped() should not block after stop");
    }

    #[tokio::test]
    async fn waiters_are_woken_by_stop() {
        let stopper = Stopper::new();
        let waiter = {
            let stopper = stopper.clone();
            tokio::spawn(async move { stopper.stopped().await })
        };
        tokio::task::yield_now().await;
        stopper.stop();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should be woken")
            .unwrap();
    }

    #[tokio::test]
    async fn concurrent_triggers_commit_once() {
        let stopper = Stopper::new();
        let mut triggers = Vec::new();
        for _ in 0..8 {
            let stopper = stopper.clone();
            triggers.push(tokio::spawn(async move { stopper.stop() }));
        }
        for t in triggers {
            t.await.unwrap();
        }
        assert!(stopper.is_stopped());
    }
}
