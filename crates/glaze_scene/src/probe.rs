//! Host measurement callbacks.
//!
//! The engine never observes host layout itself; it asks a probe the
//! host installed. A probe that cannot currently measure (content
//! detached mid-update) returns `None` and the caller treats the
//! update as a no-op to retry on the next trigger.

use std::sync::Arc;

use parking_lot::Mutex;

use glaze_core::{Point, Size};

/// Measures the content a glass element wraps.
pub trait ContentProbe: Send {
    /// Current logical size of the wrapped content, `None` if detached.
    fn measure(&self) -> Option<Size>;

    /// Page-space origin of the wrapped content, `None` if detached or
    /// the host positions the element manually via `set_offset`.
    fn origin(&self) -> Option<Point>;
}

#[derive(Debug)]
struct FixedProbeState {
    size: Option<Size>,
    origin: Option<Point>,
}

/// A probe backed by explicit values; hosts with static layout and
/// tests use it directly.
///
/// Clones share state, so a host can keep one handle to feed layout
/// changes into while the scene owns the other.
#[derive(Clone, Debug)]
pub struct FixedProbe {
    state: Arc<Mutex<FixedProbeState>>,
}

impl FixedProbe {
    pub fn new(size: Size, origin: Point) -> Self {
        Self {
            state: Arc::new(Mutex::new(FixedProbeState {
                size: Some(size),
                origin: Some(origin),
            })),
        }
    }

    pub fn set_size(&self, size: Size) {
        self.state.lock().size = Some(size);
    }

    pub fn set_origin(&self, origin: Point) {
        self.state.lock().origin = Some(origin);
    }

    /// Simulate detached content: measurements return `None` until new
    /// values are set.
    pub fn detach(&self) {
        let mut state = self.state.lock();
        state.size = None;
        state.origin = None;
    }
}

impl ContentProbe for FixedProbe {
    fn measure(&self) -> Option<Size> {
        self.state.lock().size
    }

    fn origin(&self) -> Option<Point> {
        self.state.lock().origin
    }
}
