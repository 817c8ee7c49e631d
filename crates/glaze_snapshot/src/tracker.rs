//! In-flight load accounting.
//!
//! Capturing while an image is still decoding bakes a placeholder into
//! the snapshot. Hosts wrap every decode in a [`LoadGuard`]; capture
//! awaits quiescence (no outstanding guards) before rasterizing.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::error::CaptureError;

/// Shared counter of in-flight loads.
#[derive(Clone, Debug)]
pub struct LoadTracker {
    pending: Arc<watch::Sender<usize>>,
}

impl LoadTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0usize);
        Self {
            pending: Arc::new(tx),
        }
    }

    /// Register an in-flight load; the returned guard releases it on drop.
    pub fn begin_load(&self) -> LoadGuard {
        self.pending.send_modify(|count| *count += 1);
        LoadGuard {
            pending: Arc::clone(&self.pending),
        }
    }

    pub fn pending(&self) -> usize {
        *self.pending.borrow()
    }

    /// Wait until no loads are outstanding, bounded by `timeout`.
    pub async fn wait_quiescent(&self, timeout: Duration) -> Result<(), CaptureError> {
        let mut rx = self.pending.subscribe();
        tokio::time::timeout(timeout, rx.wait_for(|count| *count == 0))
            .await
            .map_err(|_| CaptureError::Timeout)?
            .map_err(|_| CaptureError::Timeout)?;
        Ok(())
    }
}

impl Default for LoadTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII handle for one in-flight load.
#[derive(Debug)]
pub struct LoadGuard {
    pending: Arc<watch::Sender<usize>>,
}

impl Drop for LoadGuard {
    fn drop(&mut self) {
        self.pending
            .send_modify(|count| *count = count.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Runtime::new().expect("tokio runtime")
    }

    #[test]
    fn guards_count_and_release() {
        let tracker = LoadTracker::new();
        assert_eq!(tracker.pending(), 0);

        let a = tracker.begin_load();
        let b = tracker.begin_load();
        assert_eq!(tracker.pending(), 2);

        drop(a);
        assert_eq!(tracker.pending(), 1);
        drop(b);
        assert_eq!(tracker.pending(), 0);
    }

    #[test]
    fn quiescence_resolves_when_loads_finish() {
        let tracker = LoadTracker::new();
        let guard = tracker.begin_load();

        runtime().block_on(async {
            let waiter = tracker.clone();
            let handle = tokio::spawn(async move {
                waiter.wait_quiescent(Duration::from_secs(1)).await
            });

            tokio::time::sleep(Duration::from_millis(10)).await;
            drop(guard);

            handle.await.expect("join").expect("quiescent");
        });
    }

    #[test]
    fn quiescence_times_out_on_stuck_loads() {
        let tracker = LoadTracker::new();
        let _guard = tracker.begin_load();

        let result = runtime()
            .block_on(tracker.wait_quiescent(Duration::from_millis(20)));
        assert!(matches!(result, Err(CaptureError::Timeout)));
    }
}
