//! Capture error taxonomy.
//!
//! Capture failures are non-fatal by contract: callers degrade to a
//! transparent surface instead of crashing, so these errors exist to be
//! logged and tolerated, not propagated into the host.

use thiserror::Error;

/// Why a snapshot capture produced no bitmap.
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    /// The host rasterizer failed (e.g. protected content it may not read)
    #[error("snapshot source failed: {0}")]
    Source(String),

    /// In-flight loads never settled within the configured timeout
    #[error("timed out waiting for pending loads to settle")]
    Timeout,

    /// The captured bytes did not decode into a valid bitmap
    #[error("failed to decode captured bitmap: {0}")]
    Decode(String),
}
