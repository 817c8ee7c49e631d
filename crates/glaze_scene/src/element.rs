//! The glass element: the base renderable unit.

use smallvec::SmallVec;

use glaze_core::{Color, ControlParams, Liveness, PhysicalSize, Point, Rect, Shape, Size};
use glaze_gpu::{ElementGpu, ProgramKind};
use glaze_snapshot::Snapshot;
use std::sync::Arc;

use crate::options::{ClickCallback, ReadyCallback};
use crate::probe::ContentProbe;

slotmap::new_key_type! {
    /// Stable handle to a glass element in a [`Scene`](crate::Scene).
    pub struct ElementId;
}

/// Container/button specialization of a glass element.
///
/// The two variants share geometry and rendering; they differ in their
/// shape-mask defaults and content-composition strategy (a container
/// wraps arbitrary host content, a button composites a label region
/// and a press-warp interaction).
pub enum ElementKind {
    Container {
        /// Fallback fill when no snapshot is available
        background: Option<Color>,
        /// Restrict the snapshot capture to this page region
        capture_region: Option<Rect>,
    },
    Button {
        label: String,
        /// Label font size in logical pixels
        font_size: f32,
        warp_enabled: bool,
        on_click: Option<ClickCallback>,
        /// Current press-warp amount [0, 1]
        warp: f32,
        /// Press point in target device pixels
        press: Point,
    },
}

impl ElementKind {
    pub fn program_kind(&self) -> ProgramKind {
        match self {
            ElementKind::Container { .. } => ProgramKind::Container,
            ElementKind::Button { .. } => ProgramKind::Button,
        }
    }

    pub fn is_button(&self) -> bool {
        matches!(self, ElementKind::Button { .. })
    }
}

/// The base renderable unit.
///
/// Owns its GPU resource set exclusively; the only shared resource is
/// the snapshot, referenced read-only by `Arc`. Parent/child links are
/// non-owning associations used for coordinate and texture derivation;
/// destroying either side never cascades to the other.
pub struct GlassElement {
    pub(crate) kind: ElementKind,
    pub(crate) shape: Shape,
    pub(crate) params: ControlParams,
    /// Logical size, from the probe (or intrinsic for buttons)
    pub(crate) size: Size,
    /// Device-pixel size of the render target ("canvas")
    pub(crate) physical_size: PhysicalSize,
    /// Parent-relative origin when nested, page-space origin for roots
    pub(crate) offset: Point,
    pub(crate) children: SmallVec<[ElementId; 4]>,
    pub(crate) parent: Option<ElementId>,
    pub(crate) nested: bool,
    pub(crate) probe: Option<Box<dyn ContentProbe>>,
    pub(crate) gpu: Option<ElementGpu>,
    /// Set when this element's program failed to compile; it renders
    /// as fully transparent from then on.
    pub(crate) gpu_failed: bool,
    pub(crate) snapshot: Option<Arc<Snapshot>>,
    pub(crate) liveness: Liveness,
    pub(crate) ready: bool,
    pub(crate) dirty: bool,
    pub(crate) on_ready: Option<ReadyCallback>,
}

impl GlassElement {
    pub(crate) fn new(
        kind: ElementKind,
        shape: Shape,
        params: ControlParams,
        on_ready: Option<ReadyCallback>,
    ) -> Self {
        Self {
            kind,
            shape,
            params,
            size: Size::ZERO,
            physical_size: PhysicalSize::default(),
            offset: Point::ZERO,
            children: SmallVec::new(),
            parent: None,
            nested: false,
            probe: None,
            gpu: None,
            gpu_failed: false,
            snapshot: None,
            liveness: Liveness::new(),
            ready: false,
            dirty: true,
            on_ready,
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn params(&self) -> &ControlParams {
        &self.params
    }

    /// Logical size of the wrapped content.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Device-pixel dimensions of the element's render target.
    pub fn physical_size(&self) -> PhysicalSize {
        self.physical_size
    }

    /// Parent-relative origin when nested, page-space origin otherwise.
    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn is_nested(&self) -> bool {
        self.nested
    }

    /// True once the first frame has rendered.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        self.snapshot.as_ref()
    }

    pub fn gpu(&self) -> Option<&ElementGpu> {
        self.gpu.as_ref()
    }

    /// Label text for buttons, `None` for containers.
    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Button { label, .. } => Some(label),
            ElementKind::Container { .. } => None,
        }
    }

    /// Fallback fill a host should paint when the element has no
    /// snapshot (capture failed or still in flight).
    pub fn background(&self) -> Option<Color> {
        match &self.kind {
            ElementKind::Container { background, .. } => *background,
            ElementKind::Button { .. } => None,
        }
    }

    /// Measure via the probe; buttons fall back to their intrinsic
    /// label-fit size when no probe is installed.
    pub(crate) fn measure(&self) -> Option<Size> {
        if let Some(probe) = &self.probe {
            return probe.measure();
        }
        match &self.kind {
            ElementKind::Button {
                label, font_size, ..
            } => Some(Self::intrinsic_button_size(label, *font_size)),
            ElementKind::Container { .. } => None,
        }
    }

    /// Size a button takes to fit its label: an em-box estimate per
    /// character plus pill padding proportional to the font size.
    pub(crate) fn intrinsic_button_size(label: &str, font_size: f32) -> Size {
        let glyphs = label.chars().count().max(1) as f32;
        let text_width = glyphs * font_size * 0.6;
        Size::new(
            text_width + font_size * 1.8,
            font_size + font_size * 1.2,
        )
    }

    /// Label bounds centered in the target, device pixels.
    pub(crate) fn label_rect(&self, scale_factor: f32) -> Rect {
        match &self.kind {
            ElementKind::Button {
                label, font_size, ..
            } => {
                let glyphs = label.chars().count().max(1) as f32;
                let text = Size::new(glyphs * font_size * 0.6, *font_size).to_physical(scale_factor);
                let target = self.physical_size;
                Rect::new(
                    (target.width.saturating_sub(text.width)) as f32 * 0.5,
                    (target.height.saturating_sub(text.height)) as f32 * 0.5,
                    text.width as f32,
                    text.height as f32,
                )
            }
            ElementKind::Container { .. } => Rect::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intrinsic_button_size_fits_the_label() {
        let small = GlassElement::intrinsic_button_size("Hi", 18.0);
        let long = GlassElement::intrinsic_button_size("Much longer label", 18.0);
        assert!(long.width > small.width);
        assert_eq!(small.height, long.height);
        // Padding keeps even a one-character label tappable
        let tiny = GlassElement::intrinsic_button_size("x", 18.0);
        assert!(tiny.width > 18.0);
    }
}
