//! Temporal History
//!
//! The one piece of SSR state that outlives an invocation: a full-resolution
//! reflections image reprojected by the next frame's temporal pass. It is
//! owned by the view's [`RenderBuffers`](crate::buffers::RenderBuffers),
//! never by the pass, so every view keeps its own history.
//!
//! # Lifecycle
//!
//! ```text
//!  frame N (temporal on)                      frame N+1
//!  ─────────────────────                      ─────────
//!  ensure(extent, N)  ── size differs? ──►    release + acquire
//!        │
//!  Temporal pass: resolve + history ──► scratch
//!        │
//!  copy scratch → history, release scratch
//!        │
//!  Mix reads history                          reprojects history
//! ```
//!
//! On a camera cut the history is neither read nor written; its content is
//! simply not trusted until the next non-cut frame overwrites it.

use crate::pool::{TextureDesc, TextureId, TexturePool};
use crate::sizing::Extent;

/// Format of the history and of the temporal pass output.
pub const TEMPORAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Pool label of the history texture.
pub const TEMPORAL_LABEL: &str = "SSR.TemporalSSR";

/// Period (seconds) the temporal jitter time wraps around.
const TEMPORAL_TIME_PERIOD: f32 = 10.0;

/// Time-varying jitter input of the temporal pass.
///
/// Returns the offset of `total_seconds` from the nearest multiple of
/// [`TEMPORAL_TIME_PERIOD`], keeping the value small enough for full `f32`
/// precision in the shader.
#[inline]
#[must_use]
pub fn compute_temporal_time(total_seconds: f32) -> f32 {
    let integral = (total_seconds / TEMPORAL_TIME_PERIOD).round() * TEMPORAL_TIME_PERIOD;
    total_seconds - integral
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HistoryTexture {
    id: TextureId,
    extent: Extent,
}

/// Persistent cross-frame reflections history of one view.
#[derive(Debug, Default)]
pub struct TemporalHistory {
    texture: Option<HistoryTexture>,
    last_frame: u64,
    allocations: u64,
}

impl TemporalHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The history texture, if allocated.
    #[inline]
    #[must_use]
    pub fn texture(&self) -> Option<TextureId> {
        self.texture.map(|t| t.id)
    }

    /// Size of the history texture, if allocated.
    #[inline]
    #[must_use]
    pub fn extent(&self) -> Option<Extent> {
        self.texture.map(|t| t.extent)
    }

    /// Frame index of the last invocation that used the history.
    #[inline]
    #[must_use]
    pub fn last_frame(&self) -> u64 {
        self.last_frame
    }

    /// Number of times a history texture has been acquired.
    #[inline]
    #[must_use]
    pub fn allocation_count(&self) -> u64 {
        self.allocations
    }

    /// Records `frame` and makes sure the history is `extent` sized.
    ///
    /// A missing history, or one of a different size, is released and
    /// reacquired before anyone reads it.
    pub fn ensure(&mut self, pool: &mut dyn TexturePool, extent: Extent, frame: u64) -> TextureId {
        self.last_frame = frame;

        if let Some(current) = self.texture
            && current.extent == extent
        {
            return current.id;
        }

        if let Some(stale) = self.texture.take() {
            log::debug!(
                "SSR temporal history resized {}x{} -> {}x{}",
                stale.extent.width,
                stale.extent.height,
                extent.width,
                extent.height
            );
            pool.release(stale.id);
        }

        let desc = TextureDesc::new_2d(extent.width, extent.height, TEMPORAL_FORMAT, TEMPORAL_LABEL);
        let id = pool.acquire(&desc);
        self.texture = Some(HistoryTexture { id, extent });
        self.allocations += 1;
        id
    }

    /// Replaces the history with an already acquired texture, releasing the
    /// previous one. Ownership of `id` moves to the history.
    pub fn replace(&mut self, pool: &mut dyn TexturePool, id: TextureId, extent: Extent) {
        if let Some(old) = self.texture.replace(HistoryTexture { id, extent })
            && old.id != id
        {
            pool.release(old.id);
        }
    }

    /// Releases the history texture, if any.
    pub fn release(&mut self, pool: &mut dyn TexturePool) {
        if let Some(old) = self.texture.take() {
            pool.release(old.id);
        }
    }

    /// Releases the history if it has not been used for more than
    /// `max_idle_frames` frames. Returns `true` when released.
    pub fn release_if_stale(&mut self, pool: &mut dyn TexturePool, frame: u64, max_idle_frames: u64) -> bool {
        if self.texture.is_some() && self.last_frame + max_idle_frames < frame {
            self.release(pool);
            return true;
        }
        false
    }
}
