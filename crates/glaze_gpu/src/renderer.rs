//! GPU renderer for glass surfaces.
//!
//! Owns the wgpu device/queue, the shared snapshot texture, and the
//! per-element render passes. Each glass element draws one quad into
//! its own offscreen target, sampling either the page snapshot or its
//! parent element's target.

use std::sync::Arc;

use thiserror::Error;

use glaze_core::PhysicalSize;
use glaze_snapshot::{Bitmap, Snapshot};

use crate::program::{ProgramKind, ShaderError, ShaderProgramManager};
use crate::texture::{ElementTarget, SnapshotTexture};
use crate::uniforms::GlassUniforms;

/// Error type for renderer bring-up and readback.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("no suitable GPU adapter found")]
    AdapterNotFound,

    #[error("failed to request GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error("target readback failed: {0}")]
    Readback(String),
}

/// Identity of the texture an element samples, for bind-group reuse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKey {
    /// The shared page snapshot at a capture generation
    Snapshot(u64),
    /// Another element's render target
    Target(u64),
}

/// The backdrop a draw samples from.
pub enum RenderSource<'a> {
    /// A resident page snapshot (see [`GlassRenderer::sync_snapshot`])
    Snapshot { generation: u64 },
    /// An explicit texture view, typically a parent element's target
    View {
        view: &'a wgpu::TextureView,
        key: SourceKey,
    },
}

/// Resident snapshot generations kept before the oldest is evicted.
/// More than one is live only while elements straddle a reset.
const MAX_RESIDENT_SNAPSHOTS: usize = 4;

/// Per-element GPU resource set.
///
/// Owned exclusively by its glass element: created on mount, dropped on
/// teardown. Only the snapshot texture is shared, and that read-only.
pub struct ElementGpu {
    kind: ProgramKind,
    target: ElementTarget,
    uniform_buffer: wgpu::Buffer,
    bind_group: Option<wgpu::BindGroup>,
    bound_source: Option<SourceKey>,
}

impl ElementGpu {
    pub fn kind(&self) -> ProgramKind {
        self.kind
    }

    pub fn target(&self) -> &ElementTarget {
        &self.target
    }

    pub fn target_size(&self) -> PhysicalSize {
        self.target.size()
    }
}

/// The glass renderer.
pub struct GlassRenderer {
    #[allow(dead_code)]
    instance: wgpu::Instance,
    #[allow(dead_code)]
    adapter: wgpu::Adapter,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    programs: ShaderProgramManager,
    sampler: wgpu::Sampler,
    snapshots: Vec<SnapshotTexture>,
}

impl GlassRenderer {
    fn preferred_backends() -> wgpu::Backends {
        #[cfg(target_os = "macos")]
        {
            wgpu::Backends::METAL
        }
        #[cfg(target_os = "windows")]
        {
            wgpu::Backends::DX12
        }
        #[cfg(target_os = "linux")]
        {
            wgpu::Backends::VULKAN
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
        {
            wgpu::Backends::PRIMARY
        }
    }

    /// Create a renderer without a surface. Glass surfaces are always
    /// offscreen; the host composites the targets itself.
    pub async fn new() -> Result<Self, RendererError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: Self::preferred_backends(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RendererError::AdapterNotFound)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Glaze GPU Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                },
                None,
            )
            .await?;

        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Glass Source Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let programs =
            ShaderProgramManager::new(Arc::clone(&device), wgpu::TextureFormat::Rgba8Unorm);

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            programs,
            sampler,
            snapshots: Vec::new(),
        })
    }

    /// Blocking constructor for hosts without an async entry point.
    pub fn new_blocking() -> Result<Self, RendererError> {
        pollster::block_on(Self::new())
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Wait for in-flight GPU work to finish.
    pub fn poll(&self) {
        self.device.poll(wgpu::Maintain::Wait);
    }

    /// Make a snapshot generation resident, uploading it on first sight.
    ///
    /// Elements created before a reset keep sampling their old
    /// generation until they re-sync; a new capture replaces, never
    /// edits, so a bounded set of generations stays resident and the
    /// oldest is evicted past the cap.
    pub fn sync_snapshot(&mut self, snapshot: &Snapshot) {
        if self
            .snapshots
            .iter()
            .any(|tex| tex.generation() == snapshot.generation())
        {
            return;
        }
        tracing::debug!(generation = snapshot.generation(), "uploading snapshot texture");
        self.snapshots
            .push(SnapshotTexture::upload(&self.device, &self.queue, snapshot));
        if self.snapshots.len() > MAX_RESIDENT_SNAPSHOTS {
            self.snapshots.remove(0);
        }
    }

    /// The resident texture for a capture generation, if any.
    pub fn snapshot_texture(&self, generation: u64) -> Option<&SnapshotTexture> {
        self.snapshots
            .iter()
            .find(|tex| tex.generation() == generation)
    }

    /// Allocate the GPU resource set for one element.
    ///
    /// Compiles the program for `kind` on first use; a compile failure
    /// is fatal to this element only.
    pub fn create_element(
        &mut self,
        kind: ProgramKind,
        size: PhysicalSize,
    ) -> Result<ElementGpu, ShaderError> {
        self.programs.get_or_compile(kind)?;

        let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Glass Uniforms"),
            size: GlassUniforms::SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(ElementGpu {
            kind,
            target: ElementTarget::new(&self.device, size),
            uniform_buffer,
            bind_group: None,
            bound_source: None,
        })
    }

    /// Resize an element's target. Idempotent: an unchanged size keeps
    /// the existing texture (and its id, so bind groups stay valid in
    /// children sampling it).
    pub fn resize_element(&self, gpu: &mut ElementGpu, size: PhysicalSize) {
        if gpu.target.size() == size {
            return;
        }
        gpu.target = ElementTarget::new(&self.device, size);
    }

    /// Render one element into its target.
    ///
    /// Binds the cached program, uploads the uniforms, draws the quad.
    /// The bind group is rebuilt only when the sampled source changed.
    /// Returns `Ok(false)` without drawing when the requested snapshot
    /// generation is not resident yet (retried next frame).
    pub fn render_element(
        &mut self,
        gpu: &mut ElementGpu,
        source: RenderSource<'_>,
        uniforms: &GlassUniforms,
    ) -> Result<bool, ShaderError> {
        let (source_view, source_key) = match source {
            RenderSource::Snapshot { generation } => {
                let Some(texture) = self
                    .snapshots
                    .iter()
                    .find(|tex| tex.generation() == generation)
                else {
                    tracing::trace!(generation, "snapshot generation not resident, skipping draw");
                    return Ok(false);
                };
                (texture.view(), SourceKey::Snapshot(generation))
            }
            RenderSource::View { view, key } => (view, key),
        };

        let program = self.programs.get_or_compile(gpu.kind)?;

        self.queue
            .write_buffer(&gpu.uniform_buffer, 0, bytemuck::bytes_of(uniforms));

        if gpu.bound_source != Some(source_key) || gpu.bind_group.is_none() {
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Glass Bind Group"),
                layout: &program.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: gpu.uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(source_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            });
            gpu.bind_group = Some(bind_group);
            gpu.bound_source = Some(source_key);
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Glass Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Glass Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: gpu.target.view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&program.pipeline);
            if let Some(bind_group) = gpu.bind_group.as_ref() {
                render_pass.set_bind_group(0, bind_group, &[]);
            }
            render_pass.draw(0..6, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(true)
    }

    /// Read an element's rendered target back into a bitmap.
    pub fn read_target(&self, target: &ElementTarget) -> Result<Bitmap, RendererError> {
        let size = target.size();
        let bytes_per_row = (size.width * 4).next_multiple_of(256);
        let buffer_size = bytes_per_row as u64 * size.height as u64;

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Glass Readback Buffer"),
            size: buffer_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Glass Readback Encoder"),
            });

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: target.texture(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(size.height),
                },
            },
            wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
        );

        self.queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|e| RendererError::Readback(e.to_string()))?
            .map_err(|e| RendererError::Readback(e.to_string()))?;

        let data = buffer_slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((size.width * size.height * 4) as usize);
        for row in 0..size.height {
            let start = (row * bytes_per_row) as usize;
            pixels.extend_from_slice(&data[start..start + (size.width * 4) as usize]);
        }
        drop(data);
        buffer.unmap();

        Bitmap::from_rgba(pixels, size.width, size.height)
            .map_err(|e| RendererError::Readback(e.to_string()))
    }
}
