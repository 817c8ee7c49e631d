//! Process-wide snapshot cache.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use glaze_core::{EngineConfig, Rect};

use crate::error::CaptureError;
use crate::snapshot::Snapshot;
use crate::source::SnapshotSource;
use crate::tracker::LoadTracker;

/// The snapshot cache shared by every glass element.
///
/// Injectable rather than a global: hosts build one, share it via
/// `Arc`, and tests substitute a fake [`SnapshotSource`]. One capture
/// is in flight at a time; concurrent callers coalesce onto its result.
/// `reset` is the only invalidation - a new capture replaces the cached
/// value, it never edits it.
pub struct SnapshotService {
    source: Arc<dyn SnapshotSource>,
    tracker: LoadTracker,
    config: EngineConfig,
    cached: RwLock<Option<Arc<Snapshot>>>,
    generation: AtomicU64,
    captures: AtomicU64,
    capture_lock: tokio::sync::Mutex<()>,
}

impl SnapshotService {
    pub fn new(source: Arc<dyn SnapshotSource>, config: EngineConfig) -> Self {
        Self {
            source,
            tracker: LoadTracker::new(),
            config,
            cached: RwLock::new(None),
            generation: AtomicU64::new(0),
            captures: AtomicU64::new(0),
            capture_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// The load tracker hosts register decodes with.
    pub fn tracker(&self) -> &LoadTracker {
        &self.tracker
    }

    /// Peek at the cached snapshot without capturing.
    pub fn cached(&self) -> Option<Arc<Snapshot>> {
        self.cached.read().clone()
    }

    /// Drop the cached snapshot. The next capture produces a fresh
    /// instance; elements holding the old `Arc` keep rendering from it
    /// until they re-sync.
    pub fn reset(&self) {
        let had = self.cached.write().take().is_some();
        if had {
            tracing::debug!("snapshot cache reset");
        }
    }

    /// Number of rasterizations performed since construction.
    pub fn capture_count(&self) -> u64 {
        self.captures.load(Ordering::Relaxed)
    }

    /// Capture the page background, reusing the cached snapshot when
    /// one exists.
    ///
    /// Waits for in-flight loads to settle, then applies the configured
    /// settle delay before rasterizing. Errors are non-fatal to the
    /// caller's element: it degrades to a transparent surface.
    pub async fn capture(&self) -> Result<Arc<Snapshot>, CaptureError> {
        if let Some(snapshot) = self.cached() {
            return Ok(snapshot);
        }

        let _permit = self.capture_lock.lock().await;

        // A concurrent caller may have captured while we waited.
        if let Some(snapshot) = self.cached() {
            return Ok(snapshot);
        }

        let snapshot = Arc::new(self.rasterize(None).await?);
        *self.cached.write() = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Capture a specific region without touching the page cache.
    ///
    /// Used for explicit capture targets; the result is not shared, so
    /// it does not displace the page snapshot other elements reference.
    pub async fn capture_region(&self, region: Rect) -> Result<Arc<Snapshot>, CaptureError> {
        let _permit = self.capture_lock.lock().await;
        Ok(Arc::new(self.rasterize(Some(region)).await?))
    }

    async fn rasterize(&self, region: Option<Rect>) -> Result<Snapshot, CaptureError> {
        self.tracker
            .wait_quiescent(Duration::from_millis(self.config.capture_timeout_ms))
            .await?;

        if self.config.settle_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.settle_delay_ms)).await;
        }

        let scale = self.config.scale_factor;
        let bitmap = self.source.rasterize(region, scale).map_err(|e| {
            tracing::warn!("snapshot capture failed: {e}");
            e
        })?;

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        self.captures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            generation,
            width = bitmap.width(),
            height = bitmap.height(),
            "captured snapshot"
        );

        let viewport = region.map(|r| r.size).unwrap_or(self.source.viewport());
        Ok(Snapshot::new(bitmap, scale, viewport, generation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::Bitmap;
    use crate::source::SolidSource;
    use glaze_core::{Color, Size};

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Runtime::new().expect("tokio runtime")
    }

    fn service() -> SnapshotService {
        let source = Arc::new(SolidSource::new(Color::WHITE, Size::new(800.0, 600.0)));
        SnapshotService::new(source, EngineConfig::immediate())
    }

    struct FailingSource;

    impl SnapshotSource for FailingSource {
        fn rasterize(
            &self,
            _region: Option<Rect>,
            _scale: f32,
        ) -> Result<Bitmap, CaptureError> {
            Err(CaptureError::Source("tainted".into()))
        }

        fn viewport(&self) -> Size {
            Size::new(800.0, 600.0)
        }
    }

    #[test]
    fn captures_are_shared_until_reset() {
        let service = service();
        runtime().block_on(async {
            let first = service.capture().await.expect("capture");
            let second = service.capture().await.expect("capture");
            assert!(Arc::ptr_eq(&first, &second));
            assert_eq!(first.generation(), second.generation());
            assert_eq!(service.capture_count(), 1);

            service.reset();
            assert!(service.cached().is_none());

            let third = service.capture().await.expect("capture");
            assert!(!Arc::ptr_eq(&first, &third));
            assert_ne!(first.generation(), third.generation());
            assert_eq!(service.capture_count(), 2);
        });
    }

    #[test]
    fn capture_failure_is_an_error_not_a_panic() {
        let service = SnapshotService::new(Arc::new(FailingSource), EngineConfig::immediate());
        let result = runtime().block_on(service.capture());
        assert!(matches!(result, Err(CaptureError::Source(_))));
        assert!(service.cached().is_none());
    }

    #[test]
    fn regional_capture_does_not_displace_the_page_cache() {
        let service = service();
        runtime().block_on(async {
            let page = service.capture().await.expect("capture");
            let region = service
                .capture_region(Rect::new(0.0, 0.0, 100.0, 50.0))
                .await
                .expect("region capture");

            assert_eq!(region.bitmap().width(), 100);
            assert_eq!(region.bitmap().height(), 50);
            assert!(Arc::ptr_eq(&page, &service.cached().unwrap()));
        });
    }

    #[test]
    fn capture_waits_for_pending_loads() {
        let service = Arc::new(service());
        runtime().block_on(async {
            let guard = service.tracker().begin_load();

            let capturing = Arc::clone(&service);
            let handle = tokio::spawn(async move { capturing.capture().await });

            // The capture cannot complete while a load is outstanding.
            tokio::time::sleep(Duration::from_millis(20)).await;
            assert_eq!(service.capture_count(), 0);

            drop(guard);
            let snapshot = handle.await.expect("join").expect("capture");
            assert_eq!(snapshot.generation(), 1);
        });
    }

    #[test]
    fn stuck_loads_time_out() {
        let service = service();
        let _guard = service.tracker().begin_load();
        let result = runtime().block_on(service.capture());
        assert!(matches!(result, Err(CaptureError::Timeout)));
    }
}
