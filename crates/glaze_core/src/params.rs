//! Control parameters for the glass effect.
//!
//! A flat set of named knobs applied per glass element. Every field is
//! independently overridable; out-of-range inputs clamp to the valid
//! range instead of being rejected, so a host sliding a knob past its
//! end never sees an error.

use crate::color::Color;
use crate::geometry::Vec2;

/// Upper bound for blur radii, in device pixels. Matches the widest
/// spiral the shader samples without visible banding.
pub const MAX_FROST_RADIUS: f32 = 64.0;

/// Upper bound for lighting falloff distances, in logical pixels.
pub const MAX_FALLOFF: f32 = 128.0;

/// Per-element knobs driving blur, refraction, lighting, and tint
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlParams {
    /// Frosting blur radius in device pixels [0, 64]
    pub frost_radius: f32,
    /// Chromatic aberration at the refracting bevel [0, 1]
    pub chromatic_aberration: f32,
    /// Overall opacity of the rendered surface [0, 1]
    pub glass_opacity: f32,
    /// Direction the light comes from (normalized before upload)
    pub light_dir: Vec2,
    /// Strength of the lighting terms [0, 1]
    pub light_strength: f32,
    /// Anti-alias width of the mask edge in pixels [0, 16]
    pub edge_smoothness: f32,
    /// Index of refraction; 1.0 = no bending, clamped to >= 1.0
    pub refraction_index: f32,
    /// Corner radius for the rounded shape, logical pixels, >= 0
    pub corner_radius: f32,
    /// Specular highlight exponent [1, 256]
    pub specular_shininess: f32,
    /// Simulated glass thickness, scales the refraction displacement, > 0
    pub thickness: f32,
    /// Tint color blended over the refracted backdrop
    pub tint: Color,
    /// Tint blend factor [0, 1]
    pub tint_strength: f32,
    /// Apply the shape alpha mask; disabled renders the full quad
    pub use_mask: bool,
    /// Edge highlight line intensity [0, 1]
    pub edge_intensity: f32,
    /// Rim band intensity [0, 1]
    pub rim_intensity: f32,
    /// Base interior glow intensity [0, 1]
    pub base_intensity: f32,
    /// Edge band falloff distance in logical pixels [0, 128]
    pub edge_distance: f32,
    /// Rim band falloff distance in logical pixels [0, 128]
    pub rim_distance: f32,
    /// Base band falloff distance in logical pixels [0, 128]
    pub base_distance: f32,
    /// Extra lighting near corners [0, 1]
    pub corner_boost: f32,
    /// Ripple distortion amount across the surface [0, 1]
    pub ripple: f32,
}

impl Default for ControlParams {
    fn default() -> Self {
        Self {
            frost_radius: 20.0,
            chromatic_aberration: 0.15,
            glass_opacity: 1.0,
            light_dir: Vec2::new(-0.6, -0.8),
            light_strength: 0.6,
            edge_smoothness: 1.5,
            refraction_index: 1.45,
            corner_radius: 24.0,
            specular_shininess: 32.0,
            thickness: 8.0,
            tint: Color::WHITE,
            tint_strength: 0.2,
            use_mask: true,
            edge_intensity: 0.6,
            rim_intensity: 0.35,
            base_intensity: 0.15,
            edge_distance: 2.0,
            rim_distance: 12.0,
            base_distance: 40.0,
            corner_boost: 0.3,
            ripple: 0.0,
        }
    }
}

impl ControlParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the frosting blur radius
    pub fn frost(mut self, radius: f32) -> Self {
        self.frost_radius = radius.clamp(0.0, MAX_FROST_RADIUS);
        self
    }

    /// Set the chromatic aberration amount
    pub fn aberration(mut self, amount: f32) -> Self {
        self.chromatic_aberration = amount.clamp(0.0, 1.0);
        self
    }

    /// Set the surface opacity
    pub fn opacity(mut self, opacity: f32) -> Self {
        self.glass_opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Set the light direction and strength
    pub fn light(mut self, dir: Vec2, strength: f32) -> Self {
        self.light_dir = dir;
        self.light_strength = strength.clamp(0.0, 1.0);
        self
    }

    /// Set the mask anti-alias width
    pub fn smoothness(mut self, width: f32) -> Self {
        self.edge_smoothness = width.clamp(0.0, 16.0);
        self
    }

    /// Set the index of refraction
    pub fn refraction(mut self, ior: f32) -> Self {
        self.refraction_index = ior.max(1.0);
        self
    }

    /// Set the corner radius for the rounded shape
    pub fn radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius.max(0.0);
        self
    }

    /// Set the specular exponent
    pub fn shininess(mut self, exponent: f32) -> Self {
        self.specular_shininess = exponent.clamp(1.0, 256.0);
        self
    }

    /// Set the simulated glass thickness
    pub fn thickness(mut self, thickness: f32) -> Self {
        self.thickness = thickness.max(0.1);
        self
    }

    /// Set the tint color and blend factor
    pub fn tinted(mut self, tint: Color, strength: f32) -> Self {
        self.tint = tint;
        self.tint_strength = strength.clamp(0.0, 1.0);
        self
    }

    /// Enable/disable the shape alpha mask
    pub fn masked(mut self, use_mask: bool) -> Self {
        self.use_mask = use_mask;
        self
    }

    /// Set the three lighting band intensities (edge, rim, base)
    pub fn lighting(mut self, edge: f32, rim: f32, base: f32) -> Self {
        self.edge_intensity = edge.clamp(0.0, 1.0);
        self.rim_intensity = rim.clamp(0.0, 1.0);
        self.base_intensity = base.clamp(0.0, 1.0);
        self
    }

    /// Set the three lighting band falloff distances (edge, rim, base)
    pub fn falloffs(mut self, edge: f32, rim: f32, base: f32) -> Self {
        self.edge_distance = edge.clamp(0.0, MAX_FALLOFF);
        self.rim_distance = rim.clamp(0.0, MAX_FALLOFF);
        self.base_distance = base.clamp(0.0, MAX_FALLOFF);
        self
    }

    /// Set the corner lighting boost
    pub fn corners(mut self, boost: f32) -> Self {
        self.corner_boost = boost.clamp(0.0, 1.0);
        self
    }

    /// Set the ripple distortion amount
    pub fn rippled(mut self, amount: f32) -> Self {
        self.ripple = amount.clamp(0.0, 1.0);
        self
    }

    // Presets

    /// Heavily frosted surface (stronger blur, softer lighting)
    pub fn frosted() -> Self {
        Self::new().frost(36.0).lighting(0.45, 0.3, 0.2).aberration(0.05)
    }

    /// Near-clear polished glass (minimal blur, crisp lighting)
    pub fn polished() -> Self {
        Self::new()
            .frost(4.0)
            .shininess(96.0)
            .lighting(0.8, 0.4, 0.08)
            .aberration(0.25)
    }

    /// Clamp every field into its valid range.
    ///
    /// The builder setters already clamp; this normalizes a struct a
    /// host assembled by hand before it reaches the uniforms.
    pub fn clamped(self) -> Self {
        Self::default()
            .frost(self.frost_radius)
            .aberration(self.chromatic_aberration)
            .opacity(self.glass_opacity)
            .light(self.light_dir, self.light_strength)
            .smoothness(self.edge_smoothness)
            .refraction(self.refraction_index)
            .radius(self.corner_radius)
            .shininess(self.specular_shininess)
            .thickness(self.thickness)
            .tinted(self.tint, self.tint_strength)
            .masked(self.use_mask)
            .lighting(self.edge_intensity, self.rim_intensity, self.base_intensity)
            .falloffs(self.edge_distance, self.rim_distance, self.base_distance)
            .corners(self.corner_boost)
            .rippled(self.ripple)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_clamp_out_of_range_values() {
        let params = ControlParams::new()
            .frost(1000.0)
            .aberration(-3.0)
            .opacity(1.5)
            .refraction(0.2)
            .thickness(-5.0)
            .tinted(Color::WHITE, 1.5)
            .lighting(2.0, -1.0, 0.5);

        assert_eq!(params.frost_radius, MAX_FROST_RADIUS);
        assert_eq!(params.chromatic_aberration, 0.0);
        assert_eq!(params.glass_opacity, 1.0);
        assert_eq!(params.refraction_index, 1.0);
        assert_eq!(params.thickness, 0.1);
        assert_eq!(params.tint_strength, 1.0);
        assert_eq!(params.edge_intensity, 1.0);
        assert_eq!(params.rim_intensity, 0.0);
        assert_eq!(params.base_intensity, 0.5);
    }

    #[test]
    fn clamped_normalizes_hand_assembled_structs() {
        let raw = ControlParams {
            tint_strength: 1.5,
            glass_opacity: -0.2,
            refraction_index: 0.0,
            specular_shininess: 10_000.0,
            ..ControlParams::default()
        };
        let params = raw.clamped();
        assert_eq!(params.tint_strength, 1.0);
        assert_eq!(params.glass_opacity, 0.0);
        assert_eq!(params.refraction_index, 1.0);
        assert_eq!(params.specular_shininess, 256.0);
    }

    #[test]
    fn clamped_is_idempotent_on_valid_params() {
        let params = ControlParams::frosted();
        assert_eq!(params, params.clamped());
    }
}
