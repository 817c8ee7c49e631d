//! GPU-ready uniform data.
//!
//! `GlassUniforms` matches the WGSL `GlassUniforms` struct lane for
//! lane. Everything is packed into `vec4` slots so the layout is
//! identical under std140/WGSL rules and the struct can be uploaded
//! with a single `write_buffer`.

use bytemuck::{Pod, Zeroable};

use glaze_core::{ControlParams, PhysicalSize, Point, Rect};

/// Per-frame values shared by every element rendered that frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInfo {
    /// Monotonic frame counter
    pub frame: u64,
    /// Seconds since engine start (drives ripple animation)
    pub time: f32,
    /// Host scroll offset in logical pixels
    pub scroll_y: f32,
    /// Total scrollable page height in logical pixels
    pub page_height: f32,
}

/// Geometry resolved by the scene for one element, in device pixels.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceGeometry {
    /// Render-target dimensions
    pub target_size: PhysicalSize,
    /// Dimensions of the texture this element samples (page snapshot or
    /// parent target)
    pub source_size: PhysicalSize,
    /// Sub-rectangle of the source texture, device pixels
    pub source_rect: Rect,
    /// Resolved corner radius, device pixels
    pub corner_radius: f32,
    /// Shape id (`Shape::kind_id`)
    pub shape_kind: u32,
    /// Label bounds within the target, device pixels; `Rect::ZERO` when
    /// the element has no label
    pub label_rect: Rect,
    /// Press warp amount [0, 1]
    pub warp: f32,
    /// Press point within the target, device pixels
    pub press: Point,
}

impl SurfaceGeometry {
    pub fn new(target_size: PhysicalSize, source_size: PhysicalSize, source_rect: Rect) -> Self {
        Self {
            target_size,
            source_size,
            source_rect,
            corner_radius: 0.0,
            shape_kind: 0,
            label_rect: Rect::ZERO,
            warp: 0.0,
            press: Point::ZERO,
        }
    }
}

/// Uniform buffer contents (must match the WGSL `GlassUniforms` struct)
///
/// Memory layout, 11 x `vec4<f32>` = 176 bytes:
/// - resolution:  (target_w, target_h, source_w, source_h)
/// - source_rect: (x, y, w, h)
/// - scroll:      (scroll_y_px, page_height_px, time_s, scale_factor)
/// - shape:       (corner_radius_px, edge_smoothness_px, use_mask, shape_kind)
/// - frost:       (frost_radius_px, chromatic_aberration, glass_opacity, thickness_px)
/// - light:       (light_dir_x, light_dir_y, light_strength, specular_shininess)
/// - refraction:  (ior, corner_boost, ripple, warp)
/// - bands:       (edge_intensity, rim_intensity, base_intensity, press_x_px)
/// - falloff:     (edge_distance_px, rim_distance_px, base_distance_px, press_y_px)
/// - tint:        (r, g, b, strength)
/// - label:       (x, y, w, h)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GlassUniforms {
    pub resolution: [f32; 4],
    pub source_rect: [f32; 4],
    pub scroll: [f32; 4],
    pub shape: [f32; 4],
    pub frost: [f32; 4],
    pub light: [f32; 4],
    pub refraction: [f32; 4],
    pub bands: [f32; 4],
    pub falloff: [f32; 4],
    pub tint: [f32; 4],
    pub label: [f32; 4],
}

impl GlassUniforms {
    /// Size of the uniform buffer in bytes.
    pub const SIZE: u64 = std::mem::size_of::<GlassUniforms>() as u64;

    /// Pack control parameters and resolved geometry for upload.
    ///
    /// `params` is re-clamped here so a hand-assembled struct cannot
    /// smuggle out-of-range values past the shader's assumptions.
    /// Logical-pixel knobs (falloff distances, blur radius) are scaled
    /// into device pixels by `scale_factor`.
    pub fn compose(
        params: &ControlParams,
        geometry: &SurfaceGeometry,
        frame: &FrameInfo,
        scale_factor: f32,
    ) -> Self {
        let p = params.clamped();
        let light_dir = p.light_dir.normalized();
        let src = geometry.source_rect;
        let label = geometry.label_rect;

        Self {
            resolution: [
                geometry.target_size.width as f32,
                geometry.target_size.height as f32,
                geometry.source_size.width as f32,
                geometry.source_size.height as f32,
            ],
            source_rect: [src.x(), src.y(), src.width(), src.height()],
            scroll: [
                frame.scroll_y * scale_factor,
                frame.page_height * scale_factor,
                frame.time,
                scale_factor,
            ],
            shape: [
                geometry.corner_radius,
                p.edge_smoothness * scale_factor,
                if p.use_mask { 1.0 } else { 0.0 },
                geometry.shape_kind as f32,
            ],
            frost: [
                p.frost_radius * scale_factor,
                p.chromatic_aberration,
                p.glass_opacity,
                p.thickness * scale_factor,
            ],
            light: [
                light_dir.x,
                light_dir.y,
                p.light_strength,
                p.specular_shininess,
            ],
            refraction: [p.refraction_index, p.corner_boost, p.ripple, geometry.warp],
            bands: [
                p.edge_intensity,
                p.rim_intensity,
                p.base_intensity,
                geometry.press.x,
            ],
            falloff: [
                p.edge_distance * scale_factor,
                p.rim_distance * scale_factor,
                p.base_distance * scale_factor,
                geometry.press.y,
            ],
            tint: [p.tint.r, p.tint.g, p.tint.b, p.tint_strength],
            label: [label.x(), label.y(), label.width(), label.height()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glaze_core::{Color, Vec2};

    fn geometry() -> SurfaceGeometry {
        let mut g = SurfaceGeometry::new(
            PhysicalSize::new(400, 200),
            PhysicalSize::new(800, 600),
            Rect::new(40.0, 60.0, 400.0, 200.0),
        );
        g.corner_radius = 24.0;
        g
    }

    #[test]
    fn layout_is_eleven_vec4_lanes() {
        assert_eq!(GlassUniforms::SIZE, 176);
    }

    #[test]
    fn compose_packs_params_and_geometry() {
        let params = ControlParams::new()
            .radius(24.0)
            .tinted(Color::WHITE, 0.2)
            .frost(20.0);
        let uniforms = GlassUniforms::compose(
            &params,
            &geometry(),
            &FrameInfo::default(),
            1.0,
        );

        assert_eq!(uniforms.resolution, [400.0, 200.0, 800.0, 600.0]);
        assert_eq!(uniforms.source_rect, [40.0, 60.0, 400.0, 200.0]);
        assert_eq!(uniforms.shape[0], 24.0);
        assert_eq!(uniforms.tint[3], 0.2);
        assert_eq!(uniforms.frost[0], 20.0);
    }

    #[test]
    fn compose_clamps_hand_assembled_params() {
        let raw = ControlParams {
            tint_strength: 1.5,
            glass_opacity: 7.0,
            ..ControlParams::default()
        };
        let uniforms =
            GlassUniforms::compose(&raw, &geometry(), &FrameInfo::default(), 1.0);
        assert_eq!(uniforms.tint[3], 1.0);
        assert_eq!(uniforms.frost[2], 1.0);
    }

    #[test]
    fn compose_scales_logical_knobs_by_dpr() {
        let params = ControlParams::new().frost(20.0).falloffs(2.0, 12.0, 40.0);
        let uniforms =
            GlassUniforms::compose(&params, &geometry(), &FrameInfo::default(), 2.0);
        assert_eq!(uniforms.frost[0], 40.0);
        assert_eq!(uniforms.falloff[0], 4.0);
        assert_eq!(uniforms.falloff[1], 24.0);
        assert_eq!(uniforms.falloff[2], 80.0);
    }

    #[test]
    fn light_direction_is_normalized() {
        let params = ControlParams::new().light(Vec2::new(3.0, 4.0), 0.5);
        let uniforms =
            GlassUniforms::compose(&params, &geometry(), &FrameInfo::default(), 1.0);
        let len = (uniforms.light[0].powi(2) + uniforms.light[1].powi(2)).sqrt();
        assert!((len - 1.0).abs() < 1e-6);
    }
}
