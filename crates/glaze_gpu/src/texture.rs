//! GPU textures: the shared snapshot and per-element render targets.

use std::sync::atomic::{AtomicU64, Ordering};

use glaze_core::PhysicalSize;
use glaze_snapshot::Snapshot;

/// Monotonic id source for render targets, so bind-group caches can
/// tell when an element started sampling a different texture.
static NEXT_TARGET_ID: AtomicU64 = AtomicU64::new(1);

/// The page snapshot uploaded to the GPU.
///
/// Read-only after upload and shared by every element rendering from
/// the same capture generation; re-uploaded only when a new generation
/// arrives.
pub struct SnapshotTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    generation: u64,
    size: PhysicalSize,
}

impl SnapshotTexture {
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, snapshot: &Snapshot) -> Self {
        let bitmap = snapshot.bitmap();
        let size = wgpu::Extent3d {
            width: bitmap.width(),
            height: bitmap.height(),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Glass Snapshot"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bitmap.pixels(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(bitmap.width() * 4),
                rows_per_image: Some(bitmap.height()),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            generation: snapshot.generation(),
            size: bitmap.size(),
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn size(&self) -> PhysicalSize {
        self.size
    }
}

/// Offscreen color target owned by one glass element - its "canvas".
///
/// Hosts composite the view into their own layout; nested children
/// sample it as their backdrop.
pub struct ElementTarget {
    id: u64,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: PhysicalSize,
}

impl ElementTarget {
    pub fn new(device: &wgpu::Device, size: PhysicalSize) -> Self {
        let extent = wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Glass Element Target"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            id: NEXT_TARGET_ID.fetch_add(1, Ordering::Relaxed),
            texture,
            view,
            size,
        }
    }

    /// Stable identity for bind-group cache invalidation; changes when
    /// the target is recreated (e.g. on resize).
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn size(&self) -> PhysicalSize {
        self.size
    }
}
