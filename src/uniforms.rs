//! SSR Parameter Block
//!
//! GPU-layout structures shared by every SSR program. One [`SsrUniforms`] is
//! built per invocation and bound unchanged for the whole pass sequence.
//!
//! All structures are `#[repr(C)]` + [`Pod`] with 16-byte multiple sizes so
//! they can be uploaded with a single `bytemuck::bytes_of`. The shader's
//! declared block size is validated against [`SSR_PARAMETER_BLOCK_SIZE`]
//! before any program is created.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::quality::QualityProfile;
use crate::settings::SsrSettings;
use crate::sizing::SsrResolutions;
use crate::view::RenderView;

/// Size in bytes the SSR shader must declare for parameter slot 0.
pub const SSR_PARAMETER_BLOCK_SIZE: usize = std::mem::size_of::<SsrUniforms>();

// ============================================================================
// GBuffer decode data
// ============================================================================

/// Data the shaders need to decode the GBuffer and reconstruct positions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct GBufferData {
    /// See [`RenderView::view_info`].
    pub view_info: Vec4,
    /// See [`RenderView::screen_size`].
    pub screen_size: Vec4,
    pub view_pos: Vec3,
    pub view_far: f32,
    pub inv_view_matrix: Mat4,
    pub inv_projection_matrix: Mat4,
}

impl GBufferData {
    #[must_use]
    pub fn from_view(view: &RenderView) -> Self {
        Self {
            view_info: view.view_info(),
            screen_size: view.screen_size(),
            view_pos: view.position(),
            view_far: view.far,
            inv_view_matrix: view.view.inverse(),
            inv_projection_matrix: view.projection.inverse(),
        }
    }
}

// ============================================================================
// Full-scene tracing constants (filled by the GI collaborators)
// ============================================================================

/// Global signed distance field cascade description.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct GlobalSdfConstants {
    /// `xyz` cascade center, `w` cascade extent.
    pub cascade_pos_distance: [Vec4; 4],
    pub cascade_voxel_size: Vec4,
    pub cascades_count: u32,
    pub resolution: f32,
    pub near_surface_distance: f32,
    pub(crate) __pad: f32,
}

/// Global surface atlas description.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct SurfaceAtlasConstants {
    pub view_pos: Vec3,
    pub light_shadows_strength: f32,
    pub view_far_plane: f32,
    pub resolution: f32,
    pub chunk_size: f32,
    pub objects_buffer_capacity: u32,
}

// ============================================================================
// SsrUniforms
// ============================================================================

/// The shared per-invocation parameter block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct SsrUniforms {
    pub gbuffer: GBufferData,

    pub max_color_miplevel: f32,
    pub trace_size_max: f32,
    pub max_trace_samples: f32,
    pub roughness_fade: f32,

    pub ssr_texel_size: Vec2,
    pub temporal_time: f32,
    pub brdf_bias: f32,

    pub world_anti_self_occlusion_bias: f32,
    pub edge_fade_factor: f32,
    pub temporal_response: f32,
    pub temporal_scale: f32,

    pub ray_trace_step: f32,
    pub temporal_effect: f32,
    pub intensity: f32,
    pub fade_out_distance: f32,

    pub view_matrix: Mat4,
    pub view_projection_matrix: Mat4,

    pub global_sdf: GlobalSdfConstants,
    pub global_surface_atlas: SurfaceAtlasConstants,
}

impl SsrUniforms {
    /// Builds the block for one invocation.
    ///
    /// Temporal fields are left disabled (`temporal_effect = 0`,
    /// `temporal_time = 0`); see [`enable_temporal`](Self::enable_temporal).
    /// GI constants stay zeroed until a binding is merged.
    #[must_use]
    pub fn new(
        view: &RenderView,
        settings: &SsrSettings,
        sizes: &SsrResolutions,
        profile: &QualityProfile,
    ) -> Self {
        let trace = sizes.trace;
        let max_color_miplevel = if settings.use_color_buffer_mips {
            sizes.color_buffer_mips as f32 - 2.0
        } else {
            0.0
        };

        Self {
            gbuffer: GBufferData::from_view(view),

            max_color_miplevel,
            trace_size_max: trace.max_dimension() as f32,
            max_trace_samples: profile.max_trace_samples as f32,
            roughness_fade: settings.roughness_fade(),

            ssr_texel_size: Vec2::new(1.0 / trace.width as f32, 1.0 / trace.height as f32),
            temporal_time: 0.0,
            brdf_bias: settings.brdf_bias,

            world_anti_self_occlusion_bias: settings.world_anti_self_occlusion_bias,
            edge_fade_factor: settings.edge_fade_factor,
            temporal_response: settings.temporal_response,
            temporal_scale: settings.temporal_scale,

            ray_trace_step: settings.depth_resolution.divisor() as f32
                / sizes.frame.width as f32,
            temporal_effect: 0.0,
            intensity: settings.intensity,
            fade_out_distance: settings.effective_fade_out_distance(),

            view_matrix: view.view,
            view_projection_matrix: view.view_projection(),

            global_sdf: GlobalSdfConstants::default(),
            global_surface_atlas: SurfaceAtlasConstants::default(),
        }
    }

    /// Turns on temporal accumulation with the given jitter time.
    pub fn enable_temporal(&mut self, temporal_time: f32) {
        self.temporal_effect = 1.0;
        self.temporal_time = temporal_time;
    }
}
