//! WGSL shader sources for the glass surface variants.
//!
//! Both variants share one body: a quad vertex stage and a fragment
//! stage that samples the backdrop texture through the element's
//! sub-rectangle, applies spiral Gaussian blur, SDF-normal refraction,
//! banded edge/rim/base lighting, specular, chromatic aberration and
//! tint, masked by the shape SDF. The button variant adds press-warp
//! displacement and a label-region compositing pass on top.
//!
//! All sampling uses `textureSampleLevel` so no call site depends on
//! uniform control flow; the source textures carry a single mip level.

/// Shared uniform declarations, vertex stage, and the glass shading core.
pub const GLASS_COMMON_WGSL: &str = r#"
// ============================================================================
// Glaze Glass Shader - shared core
// ============================================================================

struct GlassUniforms {
    // (target_w, target_h, source_texture_w, source_texture_h) in device px
    resolution: vec4<f32>,
    // Sub-rectangle of the source texture this element samples (x, y, w, h)
    source_rect: vec4<f32>,
    // (scroll_y_px, page_height_px, time_s, scale_factor)
    scroll: vec4<f32>,
    // (corner_radius_px, edge_smoothness_px, use_mask, shape_kind)
    shape: vec4<f32>,
    // (frost_radius_px, chromatic_aberration, glass_opacity, thickness_px)
    frost: vec4<f32>,
    // (light_dir_x, light_dir_y, light_strength, specular_shininess)
    light: vec4<f32>,
    // (index_of_refraction, corner_boost, ripple, warp)
    refraction: vec4<f32>,
    // (edge_intensity, rim_intensity, base_intensity, press_x_px)
    bands: vec4<f32>,
    // (edge_distance_px, rim_distance_px, base_distance_px, press_y_px)
    falloff: vec4<f32>,
    // Tint color, blend strength in .a
    tint: vec4<f32>,
    // Label region within the target (x, y, w, h); zero when unused
    label: vec4<f32>,
}

@group(0) @binding(0) var<uniform> u: GlassUniforms;
@group(0) @binding(1) var source_texture: texture_2d<f32>;
@group(0) @binding(2) var source_sampler: sampler;

const SHAPE_ROUNDED: u32 = 0u;
const SHAPE_CIRCLE: u32 = 1u;
const SHAPE_PILL: u32 = 2u;

// Pixels of displacement per (ior - 1) unit per thickness pixel
const REFRACT_GAIN: f32 = 6.0;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var quad = array<vec2<f32>, 6>(
        vec2<f32>(0.0, 0.0),
        vec2<f32>(1.0, 0.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(0.0, 0.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(0.0, 1.0),
    );

    let uv = quad[vertex_index];
    var out: VertexOutput;
    out.position = vec4<f32>(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0, 0.0, 1.0);
    out.uv = uv;
    return out;
}

// ============================================================================
// Distance field
// ============================================================================

fn sd_surface(p: vec2<f32>, size: vec2<f32>, radius: f32, kind: u32) -> f32 {
    let half_size = size * 0.5;
    if kind == SHAPE_CIRCLE {
        return length(p - half_size) - min(half_size.x, half_size.y);
    }
    // Rounded rect covers the pill too: its radius is half the height
    let r = min(radius, min(half_size.x, half_size.y));
    let q = abs(p - half_size) - half_size + vec2<f32>(r);
    return length(max(q, vec2<f32>(0.0))) + min(max(q.x, q.y), 0.0) - r;
}

// Outward edge normal from the SDF gradient
fn surface_normal(p: vec2<f32>, size: vec2<f32>, radius: f32, kind: u32) -> vec2<f32> {
    let eps = 0.5;
    let d = sd_surface(p, size, radius, kind);
    let g = vec2<f32>(
        sd_surface(p + vec2<f32>(eps, 0.0), size, radius, kind) - d,
        sd_surface(p + vec2<f32>(0.0, eps), size, radius, kind) - d,
    );
    let len = length(g);
    if len < 0.001 {
        return vec2<f32>(0.0, -1.0);
    }
    return g / len;
}

// ============================================================================
// Backdrop sampling
// ============================================================================

fn gaussian_weight(x: f32, sigma: f32) -> f32 {
    return exp(-(x * x) / (2.0 * sigma * sigma));
}

// Golden-angle spiral blur: ring spacing is quadratic so samples crowd
// the center, which kills the checkered artifacts of grid kernels.
fn blur_source(uv: vec2<f32>, blur_radius: f32) -> vec4<f32> {
    if blur_radius < 0.5 {
        return textureSampleLevel(source_texture, source_sampler, uv, 0.0);
    }

    let texel_size = 1.0 / max(u.resolution.zw, vec2<f32>(1.0));
    let sigma = blur_radius * 0.5;
    let golden_angle = 2.39996323;

    var color = textureSampleLevel(source_texture, source_sampler, uv, 0.0);
    var total_weight = 1.0;

    let num_rings = 5;
    let samples_per_ring = 12;

    for (var ring = 1; ring <= num_rings; ring++) {
        let ring_t = f32(ring) / f32(num_rings);
        let ring_radius = blur_radius * ring_t * ring_t;
        let ring_offset = ring_radius * texel_size;

        for (var i = 0; i < samples_per_ring; i++) {
            let angle = f32(i) * (6.283185 / f32(samples_per_ring)) + f32(ring) * golden_angle;
            let offset = vec2<f32>(cos(angle), sin(angle)) * ring_offset;
            let weight = gaussian_weight(ring_radius, sigma);
            color += textureSampleLevel(source_texture, source_sampler, uv + offset, 0.0) * weight;
            total_weight += weight;
        }
    }

    return color / total_weight;
}

// ============================================================================
// Glass shading core
// ============================================================================

fn render_glass(p: vec2<f32>, extra_offset: vec2<f32>) -> vec4<f32> {
    let size = u.resolution.xy;
    let radius = u.shape.x;
    let kind = u32(u.shape.w);
    let aa = max(u.shape.y, 0.5);

    let d = sd_surface(p, size, radius, kind);
    var mask = 1.0 - smoothstep(-aa, aa, d);
    if u.shape.z < 0.5 {
        mask = 1.0;
    }

    let inner = max(0.0, -d);
    let normal = surface_normal(p, size, radius, kind);

    // Refraction bevel: strongest at the rim, quadratic falloff inward,
    // displacement along the edge normal scaled by (ior - 1) * thickness.
    let thickness = max(u.frost.w, 0.1);
    let bevel = 1.0 - clamp(inner / max(thickness, 1.0), 0.0, 1.0);
    let bend = bevel * bevel * (u.refraction.x - 1.0) * thickness * REFRACT_GAIN;
    var offset = normal * bend + extra_offset;

    if u.refraction.z > 0.0 {
        let phase = (p.x + p.y) * 0.05 + u.scroll.z * 2.0;
        offset += vec2<f32>(sin(phase), cos(phase * 1.3)) * u.refraction.z * 4.0;
    }

    // Map the local pixel into the shared source texture through the
    // element's sub-rectangle, keeping scroll alignment.
    let src_scale = u.source_rect.zw / max(size, vec2<f32>(1.0));
    let snap_size = max(u.resolution.zw, vec2<f32>(1.0));
    let base_px = u.source_rect.xy + vec2<f32>(0.0, u.scroll.x) + p * src_scale;
    let uv = (base_px + offset) / snap_size;

    var color = blur_source(uv, u.frost.x).rgb;

    // Chromatic aberration: split red/blue along the refraction offset,
    // visible only where the bevel bends light.
    let ca = u.frost.y * bevel;
    let shift = offset * ca * 0.35 / snap_size;
    let r = textureSampleLevel(source_texture, source_sampler, uv + shift, 0.0).r;
    let b = textureSampleLevel(source_texture, source_sampler, uv - shift, 0.0).b;
    color = vec3<f32>(
        mix(color.r, r, min(ca, 1.0) * 0.5),
        color.g,
        mix(color.b, b, min(ca, 1.0) * 0.5),
    );

    // Banded lighting: a crisp edge line, a wider rim, a faint interior
    // glow, each weighted by its intensity and how much the local edge
    // normal faces the light.
    let light_dir = normalize(vec2<f32>(u.light.x, u.light.y));
    let facing = dot(normal, -light_dir);
    let lit = 0.2 + 0.8 * max(facing, 0.0);

    let edge_w = max(u.falloff.x, 0.5);
    let edge_band = smoothstep(0.0, edge_w * 0.3, inner)
        * (1.0 - smoothstep(edge_w, edge_w * 1.5, inner));

    let rim_w = max(u.falloff.y, 1.0);
    let rim_band = smoothstep(edge_w, rim_w * 0.5, inner)
        * (1.0 - smoothstep(rim_w, rim_w * 2.0, inner));

    let base_glow = exp(-inner / max(u.falloff.z, 1.0));

    let corner = 4.0 * abs(normal.x * normal.y) * u.refraction.y;

    var glow = u.bands.x * edge_band * lit
        + u.bands.y * rim_band * lit * 0.6
        + u.bands.z * base_glow * 0.5;
    glow = glow * (1.0 + corner) * u.light.z;

    let spec = pow(max(facing, 0.0), u.light.w) * u.light.z * bevel * 0.8;

    color += vec3<f32>(glow + spec) * mask;

    color = mix(color, u.tint.rgb, u.tint.a);
    color = clamp(color, vec3<f32>(0.0), vec3<f32>(1.0));

    return vec4<f32>(color, mask * u.frost.z);
}
"#;

/// Container fragment stage: the shared core, unmodified.
pub const CONTAINER_SURFACE_WGSL: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let p = in.uv * u.resolution.xy;
    return render_glass(p, vec2<f32>(0.0));
}
"#;

/// Button fragment stage: press-warp displacement plus label-region
/// compositing so host-drawn label pixels stay legible over the glass.
pub const BUTTON_SURFACE_WGSL: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let p = in.uv * u.resolution.xy;
    let size = u.resolution.xy;

    // Warp pulls the sampled backdrop toward the press point, fading
    // with distance, so the surface appears to dimple under the pointer.
    let warp = u.refraction.w;
    let press = vec2<f32>(u.bands.w, u.falloff.w);
    let reach = max(size.x, size.y);
    let pull = (press - p) * warp * 0.08 * exp(-length(p - press) / reach);

    var color = render_glass(p, pull);

    // Label region: darken the glass behind the label bounds.
    let lr = u.label;
    let active_mask = step(0.5, lr.z);
    let lq = abs(p - lr.xy - lr.zw * 0.5) - lr.zw * 0.5;
    let ld = length(max(lq, vec2<f32>(0.0))) + min(max(lq.x, lq.y), 0.0);
    let label_mask = (1.0 - smoothstep(-1.0, 1.0, ld)) * active_mask;
    color = vec4<f32>(mix(color.rgb, color.rgb * 0.72, label_mask * 0.6), color.a);

    return color;
}
"#;

/// Assemble the full WGSL source for a program kind.
pub fn shader_source(button: bool) -> String {
    let surface = if button {
        BUTTON_SURFACE_WGSL
    } else {
        CONTAINER_SURFACE_WGSL
    };
    format!("{GLASS_COMMON_WGSL}\n{surface}")
}
