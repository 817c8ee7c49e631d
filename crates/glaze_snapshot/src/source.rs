//! Host-implemented rasterization.

use glaze_core::{Color, Rect, Size};

use crate::bitmap::Bitmap;
use crate::error::CaptureError;

/// Rasterizes the current visual state of the host's content.
///
/// Implemented by the host (framebuffer readback, an offscreen scene
/// render, a decoded image); the engine only decides *when* to ask.
/// `region` restricts the capture to a sub-rectangle of the page,
/// `None` captures the full viewport. The returned bitmap's pixel
/// dimensions must equal the captured region scaled by `scale_factor`.
pub trait SnapshotSource: Send + Sync {
    fn rasterize(&self, region: Option<Rect>, scale_factor: f32) -> Result<Bitmap, CaptureError>;

    /// Logical size of the full page the source can capture.
    fn viewport(&self) -> Size;
}

/// Uniform-color source for tests and hosts that want the degraded
/// fallback-background path.
#[derive(Debug, Clone)]
pub struct SolidSource {
    color: Color,
    viewport: Size,
}

impl SolidSource {
    pub fn new(color: Color, viewport: Size) -> Self {
        Self { color, viewport }
    }
}

impl SnapshotSource for SolidSource {
    fn rasterize(&self, region: Option<Rect>, scale_factor: f32) -> Result<Bitmap, CaptureError> {
        let size = region.map(|r| r.size).unwrap_or(self.viewport);
        let physical = size.to_physical(scale_factor);
        if physical.is_empty() {
            return Err(CaptureError::Source("empty capture region".into()));
        }
        Ok(Bitmap::solid(self.color, physical.width, physical.height))
    }

    fn viewport(&self) -> Size {
        self.viewport
    }
}
