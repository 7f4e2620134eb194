//! SSR Render Context
//!
//! Everything one invocation of the pass needs, borrowed from the host for
//! the duration of the call. Field-level borrows let the pass hand the pool
//! and the encoder to different collaborators within the same call.

use crate::buffers::RenderBuffers;
use crate::encoder::SsrCommandEncoder;
use crate::gi::GiProviders;
use crate::pool::TexturePool;
use crate::quality::Quality;
use crate::settings::{GlobalIlluminationMode, SsrSettings};
use crate::view::RenderView;

/// Frame-level state of the host renderer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInfo {
    /// Monotonic frame counter.
    pub frame_index: u64,
    /// History is not valid this frame (teleport, cut to another camera).
    pub is_camera_cut: bool,
    /// Unscaled time since start, in seconds.
    pub time_seconds: f32,
}

/// Context for one [`render`](crate::pass::ScreenSpaceReflectionsPass::render) call.
pub struct SsrRenderContext<'a> {
    pub view: &'a RenderView,
    /// The view's scene buffers, including the temporal history slot.
    pub buffers: &'a mut RenderBuffers,
    pub settings: &'a SsrSettings,
    /// Renderer-wide SSR quality tier.
    pub quality: Quality,
    /// Renderer-wide global illumination technique.
    pub gi_mode: GlobalIlluminationMode,
    pub frame: FrameInfo,
    pub pool: &'a mut dyn TexturePool,
    pub encoder: &'a mut dyn SsrCommandEncoder,
    /// Full-scene tracing collaborators, when the host has them.
    pub gi: Option<GiProviders<'a>>,
}
