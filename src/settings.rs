//! Screen Space Reflections Configuration
//!
//! This module defines SSR settings as pure data, following the same pattern
//! as the engine's other post-processing settings (`SsaoSettings`,
//! `BloomSettings`): public fields, a tuned [`Default`], and a few builder
//! helpers. Settings are immutable for the duration of a frame.
//!
//! Clamping is applied when the pass builds its parameter block, never by
//! mutating the user's values, so a round-trip through serde preserves
//! exactly what was configured.
//!
//! # Usage
//!
//! ```rust,ignore
//! use myth_ssr::settings::{SsrSettings, ResolutionMode, ReflectionsTraceMode};
//!
//! let settings = SsrSettings::default()
//!     .with_trace_mode(ReflectionsTraceMode::SoftwareTracing)
//!     .with_ray_trace_resolution(ResolutionMode::Full)
//!     .with_temporal(false);
//! ```

use serde::{Deserialize, Serialize};

/// Minimum fade-out distance written to the parameter block.
pub const MIN_FADE_OUT_DISTANCE: f32 = 100.0;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Where reflection rays are traced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReflectionsTraceMode {
    /// Screen-space depth/color only.
    #[default]
    ScreenTracing,
    /// Screen-space tracing augmented with the global distance field and
    /// surface atlas when global illumination is available.
    SoftwareTracing,
}

/// Resolution of an intermediate buffer relative to the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResolutionMode {
    Full,
    #[default]
    Half,
}

impl ResolutionMode {
    /// Integer divisor applied to the frame dimensions.
    #[inline]
    #[must_use]
    pub fn divisor(self) -> u32 {
        match self {
            Self::Full => 1,
            Self::Half => 2,
        }
    }
}

/// Active renderer-wide global illumination technique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GlobalIlluminationMode {
    #[default]
    None,
    /// Dynamic diffuse global illumination (probe volumes over the global
    /// distance field and surface atlas).
    Ddgi,
}

// ---------------------------------------------------------------------------
// SsrSettings
// ---------------------------------------------------------------------------

/// Per-view screen-space reflections configuration.
///
/// | Field                            | Default         |
/// |----------------------------------|-----------------|
/// | `intensity`                      | `1.0`           |
/// | `trace_mode`                     | `ScreenTracing` |
/// | `depth_resolution`               | `Half`          |
/// | `ray_trace_pass_resolution`      | `Half`          |
/// | `brdf_bias`                      | `0.82`          |
/// | `roughness_threshold`            | `0.4`           |
/// | `world_anti_self_occlusion_bias` | `0.1`           |
/// | `resolve_samples`                | `4`             |
/// | `edge_fade_factor`               | `0.1`           |
/// | `fade_out_distance`              | `5000.0`        |
/// | `use_color_buffer_mips`          | `true`          |
/// | `temporal_effect`                | `true`          |
/// | `temporal_response`              | `0.8`           |
/// | `temporal_scale`                 | `8.0`           |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsrSettings {
    /// Scale applied to the final reflections contribution.
    pub intensity: f32,

    /// Screen-space only, or full-scene augmented tracing.
    pub trace_mode: ReflectionsTraceMode,

    /// Depth buffer resolution sampled by the ray-trace pass.
    ///
    /// Anything other than `Full` requests the view's half-resolution depth,
    /// which is cheaper to march through.
    pub depth_resolution: ResolutionMode,

    /// Resolution of the ray-trace and resolve passes.
    pub ray_trace_pass_resolution: ResolutionMode,

    /// Bias of the importance-sampled reflection direction. Lower values
    /// spread rays wider on rough surfaces.
    pub brdf_bias: f32,

    /// Surfaces rougher than this receive no screen-space reflections.
    /// Saturated to `[0, 1]`.
    pub roughness_threshold: f32,

    /// World-space offset along the normal before tracing, to avoid
    /// self-intersection.
    pub world_anti_self_occlusion_bias: f32,

    /// Samples taken by the resolve pass (1, 2, 4 or 8+).
    pub resolve_samples: u32,

    /// Fades reflections near the screen edges.
    pub edge_fade_factor: f32,

    /// Distance (world units) over which reflections fade out.
    /// Floored at [`MIN_FADE_OUT_DISTANCE`].
    pub fade_out_distance: f32,

    /// Builds a blurred mip chain of the scene color so rough surfaces
    /// sample coarser mips.
    pub use_color_buffer_mips: bool,

    /// Enables temporal accumulation against the view's history buffer.
    pub temporal_effect: bool,

    /// Blend weight of the reprojected history.
    pub temporal_response: f32,

    /// Scale of the history rejection window.
    pub temporal_scale: f32,
}

impl Default for SsrSettings {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            trace_mode: ReflectionsTraceMode::ScreenTracing,
            depth_resolution: ResolutionMode::Half,
            ray_trace_pass_resolution: ResolutionMode::Half,
            brdf_bias: 0.82,
            roughness_threshold: 0.4,
            world_anti_self_occlusion_bias: 0.1,
            resolve_samples: 4,
            edge_fade_factor: 0.1,
            fade_out_distance: 5000.0,
            use_color_buffer_mips: true,
            temporal_effect: true,
            temporal_response: 0.8,
            temporal_scale: 8.0,
        }
    }
}

impl SsrSettings {
    /// Creates new SSR settings with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_trace_mode(mut self, mode: ReflectionsTraceMode) -> Self {
        self.trace_mode = mode;
        self
    }

    #[must_use]
    pub fn with_ray_trace_resolution(mut self, mode: ResolutionMode) -> Self {
        self.ray_trace_pass_resolution = mode;
        self
    }

    #[must_use]
    pub fn with_depth_resolution(mut self, mode: ResolutionMode) -> Self {
        self.depth_resolution = mode;
        self
    }

    #[must_use]
    pub fn with_temporal(mut self, enabled: bool) -> Self {
        self.temporal_effect = enabled;
        self
    }

    #[must_use]
    pub fn with_color_buffer_mips(mut self, enabled: bool) -> Self {
        self.use_color_buffer_mips = enabled;
        self
    }

    #[must_use]
    pub fn with_resolve_samples(mut self, samples: u32) -> Self {
        self.resolve_samples = samples;
        self
    }

    /// Roughness threshold as written to the parameter block.
    #[inline]
    #[must_use]
    pub fn roughness_fade(&self) -> f32 {
        self.roughness_threshold.clamp(0.0, 1.0)
    }

    /// Fade-out distance as written to the parameter block.
    #[inline]
    #[must_use]
    pub fn effective_fade_out_distance(&self) -> f32 {
        self.fade_out_distance.max(MIN_FADE_OUT_DISTANCE)
    }
}
