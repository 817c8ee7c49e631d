//! Engine-wide configuration.

use serde::{Deserialize, Serialize};

/// Tuning for a Glaze engine instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Host device pixel ratio. Render targets and snapshot
    /// sub-rectangles are logical sizes scaled by this.
    pub scale_factor: f32,
    /// Delay after the last in-flight image load settles before a
    /// snapshot is captured, so partially painted frames are skipped.
    pub settle_delay_ms: u64,
    /// Upper bound on waiting for loads to settle; a host that never
    /// goes quiescent fails the capture instead of hanging it.
    pub capture_timeout_ms: u64,
    /// Cap on live glass elements per scene.
    pub max_elements: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl EngineConfig {
    /// Standard configuration for general use.
    pub fn standard() -> Self {
        Self {
            scale_factor: 1.0,
            settle_delay_ms: 200,
            capture_timeout_ms: 5_000,
            max_elements: 256,
        }
    }

    /// Configuration for tests: no settle delay, short timeout.
    pub fn immediate() -> Self {
        Self {
            scale_factor: 1.0,
            settle_delay_ms: 0,
            capture_timeout_ms: 250,
            max_elements: 256,
        }
    }

    /// Set the device pixel ratio (values below 0.5 are treated as 0.5).
    pub fn with_scale_factor(mut self, scale_factor: f32) -> Self {
        self.scale_factor = scale_factor.max(0.5);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_standard() {
        let config = EngineConfig::default();
        assert_eq!(config.settle_delay_ms, 200);
        assert_eq!(config.scale_factor, 1.0);
    }

    #[test]
    fn scale_factor_floor() {
        let config = EngineConfig::standard().with_scale_factor(0.1);
        assert_eq!(config.scale_factor, 0.5);
    }
}
