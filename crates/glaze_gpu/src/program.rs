//! Shader program compilation and caching.
//!
//! Programs are compiled once per kind and cached; the bind group
//! layout (the uniform plumbing) is resolved at compile time and reused
//! for every element of that kind. WGSL is validated through naga
//! before the module reaches wgpu, so a broken shader surfaces as a
//! [`ShaderError`] the scene can absorb (that element renders
//! transparent) instead of a panic into the host UI.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::shaders::shader_source;

/// Shader compilation/link failure. Fatal to the requesting element
/// only; never propagated into the host.
#[derive(Debug, Clone, Error)]
pub enum ShaderError {
    #[error("WGSL parse error: {0}")]
    Parse(String),

    #[error("WGSL validation error: {0}")]
    Validation(String),
}

/// The two glass program variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    Container,
    Button,
}

impl ProgramKind {
    fn label(self) -> &'static str {
        match self {
            ProgramKind::Container => "Glass Container",
            ProgramKind::Button => "Glass Button",
        }
    }

    fn is_button(self) -> bool {
        matches!(self, ProgramKind::Button)
    }
}

/// A compiled glass program: pipeline plus its resolved bind group layout.
pub struct Program {
    pub pipeline: wgpu::RenderPipeline,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

/// Compiles and caches one [`Program`] per [`ProgramKind`].
pub struct ShaderProgramManager {
    device: Arc<wgpu::Device>,
    texture_format: wgpu::TextureFormat,
    programs: HashMap<ProgramKind, Program>,
}

impl ShaderProgramManager {
    pub fn new(device: Arc<wgpu::Device>, texture_format: wgpu::TextureFormat) -> Self {
        Self {
            device,
            texture_format,
            programs: HashMap::new(),
        }
    }

    /// Get the compiled program for `kind`, compiling on first use.
    pub fn get_or_compile(&mut self, kind: ProgramKind) -> Result<&Program, ShaderError> {
        if !self.programs.contains_key(&kind) {
            let program = self.compile(kind)?;
            self.programs.insert(kind, program);
            tracing::debug!(kind = kind.label(), "compiled glass program");
        }
        Ok(&self.programs[&kind])
    }

    fn compile(&self, kind: ProgramKind) -> Result<Program, ShaderError> {
        let source = shader_source(kind.is_button());
        validate_wgsl(&source)?;

        // Validation happened above, so module creation cannot trip
        // wgpu's internal panic path.
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(kind.label()),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });

        let bind_group_layout =
            self.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Glass Bind Group Layout"),
                    entries: &[
                        // Uniforms
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                        },
                        // Source texture (page snapshot or parent target)
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: wgpu::TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                        },
                        // Source sampler
                        wgpu::BindGroupLayoutEntry {
                            binding: 2,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ],
                });

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Glass Pipeline Layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

        let blend_state = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                operation: wgpu::BlendOperation::Add,
            },
        };

        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(kind.label()),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: Some("vs_main"),
                    buffers: &[],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.texture_format,
                        blend: Some(blend_state),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            });

        Ok(Program {
            pipeline,
            bind_group_layout,
        })
    }
}

/// Parse and validate a WGSL source with naga.
pub fn validate_wgsl(source: &str) -> Result<(), ShaderError> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| ShaderError::Parse(e.emit_to_string(source)))?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|e| ShaderError::Validation(format!("{e:?}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_variants_validate() {
        validate_wgsl(&shader_source(false)).expect("container shader");
        validate_wgsl(&shader_source(true)).expect("button shader");
    }

    #[test]
    fn broken_wgsl_is_an_error_not_a_panic() {
        let result = validate_wgsl("fn fs_main( { nonsense");
        assert!(matches!(result, Err(ShaderError::Parse(_))));
    }
}
