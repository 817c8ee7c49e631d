//! The captured page background.

use glaze_core::{Rect, Size};

use crate::bitmap::Bitmap;

/// An immutable capture of the page background.
///
/// Shared by `Arc` across every glass element created before the next
/// reset; no element owns it exclusively. The generation counter ties a
/// snapshot to the capture that produced it, so "same snapshot" checks
/// are cheap identity comparisons.
#[derive(Debug)]
pub struct Snapshot {
    bitmap: Bitmap,
    scale_factor: f32,
    viewport: Size,
    generation: u64,
}

impl Snapshot {
    pub(crate) fn new(bitmap: Bitmap, scale_factor: f32, viewport: Size, generation: u64) -> Self {
        Self {
            bitmap,
            scale_factor,
            viewport,
            generation,
        }
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Scale factor the capture was taken at; bitmap dimensions are the
    /// captured region scaled by this.
    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    /// Logical viewport size at capture time.
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Capture generation; increments on every fresh capture.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Map a logical page rect into this snapshot's pixel space,
    /// clipped to the bitmap bounds.
    pub fn source_rect(&self, page_rect: Rect) -> Rect {
        let scaled = page_rect.scaled(self.scale_factor);
        let bounds = Rect::new(
            0.0,
            0.0,
            self.bitmap.width() as f32,
            self.bitmap.height() as f32,
        );
        scaled.intersection(&bounds).unwrap_or(Rect::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glaze_core::Color;

    #[test]
    fn source_rect_scales_and_clips() {
        let snapshot = Snapshot::new(
            Bitmap::solid(Color::BLACK, 800, 600),
            2.0,
            Size::new(400.0, 300.0),
            1,
        );

        let rect = snapshot.source_rect(Rect::new(10.0, 20.0, 100.0, 50.0));
        assert_eq!(rect, Rect::new(20.0, 40.0, 200.0, 100.0));

        // Partially off-snapshot rects clip to the bitmap
        let clipped = snapshot.source_rect(Rect::new(350.0, 0.0, 100.0, 50.0));
        assert_eq!(clipped, Rect::new(700.0, 0.0, 100.0, 100.0));

        // Fully outside yields an empty rect, not a panic
        let outside = snapshot.source_rect(Rect::new(1000.0, 1000.0, 10.0, 10.0));
        assert_eq!(outside, Rect::ZERO);
    }
}
