//! Command Submission
//!
//! The SSR pass records its work through [`SsrCommandEncoder`], a thin
//! command-stream abstraction over the host's GPU context. Every call is a
//! synchronous submission into one ordered stream; the pass relies on
//! submission order only.
//!
//! Draws are fully described by [`FullscreenDraw`]: program, viewport, render
//! target and the complete list of shader resources for that draw. Nothing
//! stays bound between draws except the shared parameter block and the scene
//! inputs set through [`SsrCommandEncoder::set_parameters`] and
//! [`SsrCommandEncoder::bind_scene_inputs`].

use smallvec::SmallVec;

use crate::pool::TextureId;
use crate::program::ProgramId;
use crate::sizing::Extent;
use crate::uniforms::SsrUniforms;

/// Handle to a GPU buffer owned by a collaborator (e.g. the surface atlas).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BufferId(pub u32);

/// A view of a pooled texture: all mips, or a single mip level.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TextureView {
    pub texture: TextureId,
    pub mip: Option<u32>,
}

impl TextureView {
    #[inline]
    #[must_use]
    pub const fn full(texture: TextureId) -> Self {
        Self { texture, mip: None }
    }

    #[inline]
    #[must_use]
    pub const fn mip(texture: TextureId, level: u32) -> Self {
        Self {
            texture,
            mip: Some(level),
        }
    }
}

/// A resource bound to a shader input slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ShaderResource {
    Texture(TextureView),
    /// 3D texture, bound with a volume view.
    Volume(TextureId),
    Buffer(BufferId),
}

/// One shader input slot. `resource: None` binds an explicit null resource.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ResourceBinding {
    pub slot: u32,
    pub resource: Option<ShaderResource>,
}

impl ResourceBinding {
    #[inline]
    #[must_use]
    pub const fn texture(slot: u32, view: TextureView) -> Self {
        Self {
            slot,
            resource: Some(ShaderResource::Texture(view)),
        }
    }

    #[inline]
    #[must_use]
    pub const fn null(slot: u32) -> Self {
        Self {
            slot,
            resource: None,
        }
    }
}

/// GBuffer channels and depth, bound once at slots 0..=3 for every SSR draw.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SceneInputs {
    pub gbuffer: [TextureId; 3],
    /// Full- or half-resolution depth, per the depth resolution setting.
    pub depth: TextureId,
}

/// A fullscreen-triangle draw.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FullscreenDraw {
    pub label: &'static str,
    pub program: ProgramId,
    pub viewport: Extent,
    pub target: TextureView,
    pub inputs: SmallVec<[ResourceBinding; 8]>,
}

/// Filter applied by the host's multi-scaler when building a mip chain.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FilterMode {
    /// Separable 9-tap gaussian blur.
    GaussianBlur9,
}

/// One blur-and-downsample step: `src` → (`tmp`) → `dst`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MipFilter {
    pub mode: FilterMode,
    /// Size of the destination mip.
    pub extent: Extent,
    pub src: TextureView,
    pub dst: TextureView,
    /// Intermediate target for the horizontal pass.
    pub tmp: TextureView,
}

/// Command submission collaborator.
pub trait SsrCommandEncoder {
    /// Uploads and binds the shared parameter block.
    fn set_parameters(&mut self, parameters: &SsrUniforms);

    /// Binds GBuffer channels and depth for subsequent draws.
    fn bind_scene_inputs(&mut self, inputs: &SceneInputs);

    fn draw_fullscreen(&mut self, draw: &FullscreenDraw);

    /// Runs a separable blur-and-downsample step. May clobber the bound
    /// parameter block and scene inputs.
    fn filter(&mut self, filter: &MipFilter);

    /// Downscales `src` depth into `dst` (`extent` is the size of `dst`).
    fn downscale_depth(&mut self, src: TextureId, dst: TextureId, extent: Extent);

    /// Copies the whole of `src` into `dst`; both must share size and format.
    fn copy_texture(&mut self, src: TextureId, dst: TextureId);

    fn push_debug_group(&mut self, _label: &str) {}

    fn pop_debug_group(&mut self) {}
}
