//! wgpu Render Target Pool
//!
//! [`TexturePool`] backed by real `wgpu` textures. Each pooled texture keeps
//! a default view plus one single-mip view per level, built once on
//! creation, so mip-chain passes never create views per frame.
//!
//! # Memory Strategy
//!
//! - Released textures stay in the free buckets for reuse.
//! - The pool grows on demand when no compatible free texture exists.
//! - Call [`WgpuTexturePool::trim`] once per frame (or after a resolution
//!   change) to drop textures that have not been reused for a while.

use super::{TextureDesc, TextureId, TexturePool, TextureRecycler};

/// A pooled render target with its pre-built views.
pub struct GpuTarget {
    pub texture: wgpu::Texture,
    /// All mips.
    pub view: wgpu::TextureView,
    /// `mip_views[n]` covers mip `n` only.
    pub mip_views: Vec<wgpu::TextureView>,
}

fn texture_descriptor(desc: &TextureDesc) -> wgpu::TextureDescriptor<'static> {
    wgpu::TextureDescriptor {
        label: Some(desc.label),
        size: wgpu::Extent3d {
            width: desc.width.max(1),
            height: desc.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: desc.mip_level_count,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: desc.format,
        usage: desc.usage,
        view_formats: &[],
    }
}

impl GpuTarget {
    fn create(device: &wgpu::Device, desc: &TextureDesc) -> Self {
        let texture = device.create_texture(&texture_descriptor(desc));
        let view_of = |base_mip_level, mip_level_count| {
            texture.create_view(&wgpu::TextureViewDescriptor {
                label: Some(desc.label),
                base_mip_level,
                mip_level_count,
                ..Default::default()
            })
        };

        let view = view_of(0, None);
        let mip_views = (0..texture.mip_level_count())
            .map(|level| view_of(level, Some(1)))
            .collect();

        Self {
            texture,
            view,
            mip_views,
        }
    }
}

/// GPU render target pool.
pub struct WgpuTexturePool {
    device: wgpu::Device,
    targets: TextureRecycler<GpuTarget>,
}

impl WgpuTexturePool {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            device: device.clone(),
            targets: TextureRecycler::new(),
        }
    }

    /// Default (all mips) view of an active texture.
    #[must_use]
    #[inline]
    pub fn view(&self, id: TextureId) -> Option<&wgpu::TextureView> {
        self.targets.get(id).map(|t| &t.view)
    }

    /// Single-mip view of an active texture.
    #[must_use]
    #[inline]
    pub fn mip_view(&self, id: TextureId, mip_level: u32) -> Option<&wgpu::TextureView> {
        self.targets
            .get(id)
            .and_then(|t| t.mip_views.get(mip_level as usize))
    }

    /// Raw texture, e.g. for `copy_texture_to_texture`.
    #[must_use]
    #[inline]
    pub fn texture(&self, id: TextureId) -> Option<&wgpu::Texture> {
        self.targets.get(id).map(|t| &t.texture)
    }

    /// Releases free textures idle for more than `max_idle_frames` trims.
    pub fn trim(&mut self, max_idle_frames: u32) {
        self.targets.trim(max_idle_frames);
    }

    /// Number of textures currently handed out.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.targets.active_count()
    }

    /// Number of `wgpu` textures created so far.
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.targets.created_count()
    }

    /// Total number of textures managed by the pool (active and free).
    #[must_use]
    pub fn total_texture_count(&self) -> usize {
        self.targets.active_count() + self.targets.free_count()
    }
}

impl TexturePool for WgpuTexturePool {
    fn acquire(&mut self, desc: &TextureDesc) -> TextureId {
        let device = &self.device;
        self.targets.acquire(desc, |desc| GpuTarget::create(device, desc))
    }

    fn release(&mut self, id: TextureId) {
        self.targets.release(id);
    }
}
