//! Glaze Snapshot Provider
//!
//! Produces the rasterized bitmap of the content behind glass elements
//! and caches it per page-load so many elements amortize one capture:
//!
//! - [`Bitmap`]: raw RGBA8 pixel buffer with decode helpers
//! - [`Snapshot`]: an immutable capture plus the scale factor and
//!   viewport it was taken at
//! - [`SnapshotSource`]: the host-implemented rasterizer
//! - [`LoadTracker`]: in-flight image-load accounting the capture
//!   awaits before reading pixels
//! - [`SnapshotService`]: the injectable process-wide cache with
//!   explicit reset
//!
//! The engine never rasterizes host content itself; it asks the source,
//! waits for pending loads to settle plus a short delay, and shares the
//! resulting [`Snapshot`] by reference until the host resets it.

pub mod bitmap;
pub mod error;
pub mod service;
pub mod snapshot;
pub mod source;
pub mod tracker;

pub use bitmap::Bitmap;
pub use error::CaptureError;
pub use service::SnapshotService;
pub use snapshot::Snapshot;
pub use source::{SolidSource, SnapshotSource};
pub use tracker::{LoadGuard, LoadTracker};
