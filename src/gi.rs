//! Full-Scene Tracing Binding
//!
//! When the view renders dynamic global illumination, the ray-trace pass can
//! fall back to the global signed distance field and the global surface
//! atlas for rays that leave the screen. Both are owned by external
//! subsystems; this module only asks them for their per-frame data and
//! packages it for the ray-trace draw.
//!
//! Augmentation is all-or-nothing: the distance field is queried first and
//! the surface atlas only if that succeeded. Any failure silently falls back
//! to screen-space tracing for the frame.

use smallvec::SmallVec;

use crate::encoder::{BufferId, ResourceBinding, ShaderResource, SsrCommandEncoder, TextureView};
use crate::pool::TextureId;
use crate::settings::{GlobalIlluminationMode, ReflectionsTraceMode, SsrSettings};
use crate::uniforms::{GlobalSdfConstants, SsrUniforms, SurfaceAtlasConstants};
use crate::view::{RenderView, ViewFlags};

/// First shader slot of the full-scene tracing resources (slots 7..=13).
pub const GI_FIRST_SLOT: u32 = 7;

/// Per-frame output of the global distance field subsystem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalSdfBinding {
    pub texture: Option<TextureId>,
    pub texture_mip: Option<TextureId>,
    pub constants: GlobalSdfConstants,
}

/// Per-frame output of the global surface atlas subsystem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceAtlasBinding {
    pub chunks: Option<BufferId>,
    pub culled_objects: Option<BufferId>,
    pub objects: Option<BufferId>,
    pub atlas_depth: TextureId,
    pub atlas_lighting: TextureId,
    pub constants: SurfaceAtlasConstants,
}

/// Global signed distance field collaborator.
pub trait GlobalSdfProvider {
    /// Updates the distance field for `view`. `None` when unavailable.
    fn render(&mut self, view: &RenderView, encoder: &mut dyn SsrCommandEncoder) -> Option<GlobalSdfBinding>;
}

/// Global surface atlas collaborator.
pub trait SurfaceAtlasProvider {
    /// Updates the surface atlas for `view`. `None` when unavailable.
    fn render(&mut self, view: &RenderView, encoder: &mut dyn SsrCommandEncoder) -> Option<SurfaceAtlasBinding>;
}

/// The two collaborators, as handed to the pass for one invocation.
pub struct GiProviders<'a> {
    pub sdf: &'a mut dyn GlobalSdfProvider,
    pub surface_atlas: &'a mut dyn SurfaceAtlasProvider,
}

/// Successful augmentation for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GiBinding {
    pub sdf: GlobalSdfBinding,
    pub surface_atlas: SurfaceAtlasBinding,
}

impl GiBinding {
    /// Merges both constant blocks into the shared parameter block.
    pub fn apply(&self, parameters: &mut SsrUniforms) {
        parameters.global_sdf = self.sdf.constants;
        parameters.global_surface_atlas = self.surface_atlas.constants;
    }

    /// Resources for the ray-trace draw, slots 7..=13 in order: SDF volume,
    /// SDF mip volume, atlas chunks, culled objects, objects, atlas depth,
    /// atlas lighting.
    #[must_use]
    pub fn trace_bindings(&self) -> SmallVec<[ResourceBinding; 7]> {
        let atlas = &self.surface_atlas;
        let resources = [
            self.sdf.texture.map(ShaderResource::Volume),
            self.sdf.texture_mip.map(ShaderResource::Volume),
            atlas.chunks.map(ShaderResource::Buffer),
            atlas.culled_objects.map(ShaderResource::Buffer),
            atlas.objects.map(ShaderResource::Buffer),
            Some(ShaderResource::Texture(TextureView::full(atlas.atlas_depth))),
            Some(ShaderResource::Texture(TextureView::full(atlas.atlas_lighting))),
        ];

        resources
            .into_iter()
            .zip(GI_FIRST_SLOT..)
            .map(|(resource, slot)| ResourceBinding { slot, resource })
            .collect()
    }
}

/// Whether full-scene augmentation should be attempted at all.
#[inline]
#[must_use]
pub fn gi_requested(settings: &SsrSettings, view: &RenderView, gi_mode: GlobalIlluminationMode) -> bool {
    settings.trace_mode == ReflectionsTraceMode::SoftwareTracing
        && view.flags.contains(ViewFlags::GI)
        && gi_mode == GlobalIlluminationMode::Ddgi
}

/// Queries the collaborators in order and returns the binding when both succeed.
pub fn try_bind(
    providers: Option<&mut GiProviders<'_>>,
    settings: &SsrSettings,
    view: &RenderView,
    gi_mode: GlobalIlluminationMode,
    encoder: &mut dyn SsrCommandEncoder,
) -> Option<GiBinding> {
    if !gi_requested(settings, view, gi_mode) {
        return None;
    }

    let Some(providers) = providers else {
        log::trace!("SSR: full-scene tracing requested without GI providers");
        return None;
    };

    let Some(sdf) = providers.sdf.render(view, encoder) else {
        log::trace!("SSR: global SDF unavailable, screen-space tracing only");
        return None;
    };
    let Some(surface_atlas) = providers.surface_atlas.render(view, encoder) else {
        log::trace!("SSR: global surface atlas unavailable, screen-space tracing only");
        return None;
    };

    Some(GiBinding { sdf, surface_atlas })
}
