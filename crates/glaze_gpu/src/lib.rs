//! Glaze GPU Renderer
//!
//! Renders liquid-glass surfaces with wgpu:
//!
//! - **Shaders**: WGSL container/button variants - SDF shape masks,
//!   spiral Gaussian blur, edge-normal refraction, banded lighting
//! - **Programs**: naga-validated compilation with per-kind pipeline
//!   and bind-group-layout caching
//! - **Textures**: one shared read-only snapshot texture, one offscreen
//!   color target per element
//! - **Renderer**: headless device bring-up, per-element render passes,
//!   target readback

pub mod program;
pub mod renderer;
pub mod shaders;
pub mod texture;
pub mod uniforms;

pub use program::{Program, ProgramKind, ShaderError, ShaderProgramManager};
pub use renderer::{ElementGpu, GlassRenderer, RenderSource, RendererError, SourceKey};
pub use texture::{ElementTarget, SnapshotTexture};
pub use uniforms::{FrameInfo, GlassUniforms, SurfaceGeometry};
