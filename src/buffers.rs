//! Per-View Render Buffers
//!
//! [`RenderBuffers`] is the scene-buffer context of one view: the GBuffer
//! channels, the primary depth buffer, motion vectors, and the lazily
//! created per-view targets that persist across frames (the SSR temporal
//! history and the half-resolution depth).
//!
//! Persistent targets are released by [`RenderBuffers::prepare`] when they
//! have not been used for [`LAZY_FRAMES_COUNT`] frames, and by
//! [`RenderBuffers::release`] when the view goes away.

use crate::encoder::SsrCommandEncoder;
use crate::pool::{TextureDesc, TextureId, TexturePool};
use crate::sizing::Extent;
use crate::temporal::TemporalHistory;

/// Frames a lazily created per-view target may go unused before release.
pub const LAZY_FRAMES_COUNT: u64 = 4;

/// Format of the half-resolution depth.
pub const HALF_RES_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R32Float;

#[derive(Debug, Clone, Copy)]
struct HalfResDepth {
    id: TextureId,
    extent: Extent,
    last_frame: u64,
}

/// Scene buffers of one view.
#[derive(Debug)]
pub struct RenderBuffers {
    extent: Extent,
    /// GBuffer channels (color, normals/roughness, material).
    pub gbuffer: [TextureId; 3],
    /// Primary full-resolution depth.
    pub depth_buffer: TextureId,
    /// Per-pixel motion vectors, when the host renders them.
    pub motion_vectors: Option<TextureId>,
    temporal_ssr: TemporalHistory,
    half_res_depth: Option<HalfResDepth>,
}

impl RenderBuffers {
    #[must_use]
    pub fn new(width: u32, height: u32, gbuffer: [TextureId; 3], depth_buffer: TextureId) -> Self {
        Self {
            extent: Extent::new(width, height),
            gbuffer,
            depth_buffer,
            motion_vectors: None,
            temporal_ssr: TemporalHistory::new(),
            half_res_depth: None,
        }
    }

    #[must_use]
    pub fn with_motion_vectors(mut self, motion_vectors: TextureId) -> Self {
        self.motion_vectors = Some(motion_vectors);
        self
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.extent.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.extent.height
    }

    #[inline]
    #[must_use]
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Changes the view size. Per-view targets are resized lazily on next use.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.extent = Extent::new(width, height);
    }

    // ── Temporal history slot ──────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub fn temporal_ssr(&self) -> &TemporalHistory {
        &self.temporal_ssr
    }

    #[inline]
    pub fn temporal_ssr_mut(&mut self) -> &mut TemporalHistory {
        &mut self.temporal_ssr
    }

    // ── Half-resolution depth ──────────────────────────────────────────────

    /// Returns a half-resolution copy of the depth buffer for `frame`.
    ///
    /// The texture is (re)acquired when missing or mis-sized, and the depth
    /// downscale is recorded at most once per frame.
    pub fn request_half_res_depth(
        &mut self,
        pool: &mut dyn TexturePool,
        encoder: &mut dyn SsrCommandEncoder,
        frame: u64,
    ) -> TextureId {
        let extent = self.extent.divided(2).mip(0);

        let mut target = match self.half_res_depth {
            Some(current) if current.extent == extent => current,
            stale => {
                if let Some(stale) = stale {
                    pool.release(stale.id);
                }
                let desc = TextureDesc::new_2d(
                    extent.width,
                    extent.height,
                    HALF_RES_DEPTH_FORMAT,
                    "SSR.HalfResDepth",
                );
                HalfResDepth {
                    id: pool.acquire(&desc),
                    extent,
                    last_frame: u64::MAX,
                }
            }
        };

        if target.last_frame != frame {
            encoder.downscale_depth(self.depth_buffer, target.id, extent);
            target.last_frame = frame;
        }

        self.half_res_depth = Some(target);
        target.id
    }

    // ── Lifetime ───────────────────────────────────────────────────────────

    /// Releases lazily created targets unused for more than
    /// [`LAZY_FRAMES_COUNT`] frames. Call once per frame before rendering.
    pub fn prepare(&mut self, pool: &mut dyn TexturePool, frame: u64) {
        if self.temporal_ssr.release_if_stale(pool, frame, LAZY_FRAMES_COUNT) {
            log::debug!("SSR temporal history released after {LAZY_FRAMES_COUNT} idle frames");
        }

        if let Some(depth) = self.half_res_depth
            && depth.last_frame.saturating_add(LAZY_FRAMES_COUNT) < frame
        {
            pool.release(depth.id);
            self.half_res_depth = None;
        }
    }

    /// Releases every per-view target. Call when the view is destroyed.
    pub fn release(&mut self, pool: &mut dyn TexturePool) {
        self.temporal_ssr.release(pool);
        if let Some(depth) = self.half_res_depth.take() {
            pool.release(depth.id);
        }
    }
}
