//! Screen Space Reflections Pass
//!
//! Orchestrates the SSR pipeline for one view per frame. The per-pixel math
//! lives in the shader; this pass plans resolutions, acquires and releases
//! the intermediate targets, selects program variants and records the draws
//! in dependency order.
//!
//! # Data Flow
//!
//! ```text
//!  light buffer ─┐
//!  reflections ──┼─► Combine ──► ColorBuffer0 (½ res, mip 0)
//!  BRDF LUT ─────┘                    │
//!                          [mips] blur chain (ping-pong via ColorBuffer1)
//!                                     │
//!  depth (full / ½) ──────────► Ray Trace ──► TraceBuffer ──► Resolve ──► ResolveBuffer
//!  [GI] SDF + surface atlas ──────┘                                            │
//!                                           ┌──────────────────────────────────┤
//!                                 [temporal]▼                                  │
//!  history + motion vectors ──► Temporal ──► scratch ──copy──► history         │
//!                                                                │             │
//!                                                                ▼             ▼
//!                                                   Mix (alpha blend) ──► reflections
//! ```
//!
//! # Resources
//!
//! | Target              | Size            | Format          | Lifetime          |
//! |---------------------|-----------------|-----------------|-------------------|
//! | `SSR.ColorBuffer0`  | ½ frame, mips   | `Rg11b10Ufloat` | invocation        |
//! | `SSR.ColorBuffer1`  | ½ frame, mips   | `Rg11b10Ufloat` | invocation (blur) |
//! | `SSR.TraceBuffer`   | frame / divisor | `Rgba16Float`   | invocation        |
//! | `SSR.ResolveBuffer` | frame / divisor | `Rgba16Float`   | invocation        |
//! | `SSR.TemporalSSR`   | frame           | `Rgba16Float`   | scratch + history |
//!
//! Every skip condition is checked before the first acquisition, so a skipped
//! invocation never touches the pool or the destination target.

use smallvec::smallvec;

use crate::assets::{AssetLoader, ReloadSubscription, ShaderAsset, TextureAsset};
use crate::context::SsrRenderContext;
use crate::encoder::{
    FilterMode, FullscreenDraw, MipFilter, ResourceBinding, SceneInputs, TextureView,
};
use crate::errors::{Result, SsrError};
use crate::gi;
use crate::pool::{TextureDesc, TextureId, TexturePool};
use crate::program::{BlendMode, ProgramId, ProgramVariants};
use crate::quality::{QualityProfile, RESOLVE_VARIANT_COUNT};
use crate::readiness::PassReadiness;
use crate::settings::ResolutionMode;
use crate::sizing::SsrResolutions;
use crate::temporal::{TEMPORAL_FORMAT, TEMPORAL_LABEL, compute_temporal_time};
use crate::uniforms::{SSR_PARAMETER_BLOCK_SIZE, SsrUniforms};

/// Asset name of the SSR shader.
pub const SSR_SHADER_NAME: &str = "Shaders/SSR";

/// Asset name of the pre-integrated BRDF lookup texture.
pub const PRE_INTEGRATED_GF_NAME: &str = "Engine/Textures/PreIntegratedGF";

/// Parameter block slot holding [`SsrUniforms`].
pub const PARAMETER_BLOCK_SLOT: u32 = 0;

/// Generic texture input slots of the SSR programs.
pub const TEXTURE0: u32 = 4;
pub const TEXTURE1: u32 = 5;
pub const TEXTURE2: u32 = 6;

const COLOR_BUFFER_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rg11b10Ufloat;
const TRACE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
const DEBUG_GROUP: &str = "Screen Space Reflections";

/// Why an invocation did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Assets loading, shader invalid, or programs missing.
    NotReady,
    /// Orthographic projections are not supported.
    Orthographic,
    /// Frame width or height below the minimum.
    FrameTooSmall,
}

/// Result of one [`ScreenSpaceReflectionsPass::render`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SsrOutcome {
    /// The full pass sequence was recorded.
    Rendered {
        /// Rays used the global SDF and surface atlas.
        augmented: bool,
        /// Temporal accumulation ran and updated the history.
        temporal: bool,
    },
    /// Nothing was allocated or recorded.
    Skipped(SkipReason),
}

impl SsrOutcome {
    #[inline]
    #[must_use]
    pub fn is_rendered(self) -> bool {
        matches!(self, Self::Rendered { .. })
    }
}

// ============================================================================
// Programs
// ============================================================================

struct SsrPrograms {
    combine: ProgramVariants<1>,
    ray_trace: ProgramVariants<2>,
    resolve: ProgramVariants<RESOLVE_VARIANT_COUNT>,
    temporal: ProgramVariants<1>,
    mix: ProgramVariants<1>,
}

/// Program ids for one invocation.
#[derive(Clone, Copy)]
struct FramePrograms {
    combine: ProgramId,
    /// Screen-space only, then GI augmented.
    ray_trace: [ProgramId; 2],
    resolve: ProgramId,
    temporal: ProgramId,
    mix: ProgramId,
}

impl SsrPrograms {
    const fn new() -> Self {
        Self {
            combine: ProgramVariants::new("PS_CombinePass", BlendMode::Opaque),
            ray_trace: ProgramVariants::new("PS_RayTracePass", BlendMode::Opaque),
            resolve: ProgramVariants::new("PS_ResolvePass", BlendMode::Opaque),
            temporal: ProgramVariants::new("PS_TemporalPass", BlendMode::Opaque),
            mix: ProgramVariants::new("PS_MixPass", BlendMode::AlphaBlend),
        }
    }

    fn is_valid(&self) -> bool {
        self.combine.is_valid()
            && self.ray_trace.is_valid()
            && self.resolve.is_valid()
            && self.temporal.is_valid()
            && self.mix.is_valid()
    }

    fn create(&mut self, shader: &mut dyn ShaderAsset) -> Result<()> {
        self.combine.create(shader)?;
        self.ray_trace.create(shader)?;
        self.resolve.create(shader)?;
        self.temporal.create(shader)?;
        self.mix.create(shader)
    }

    fn release(&mut self, shader: &mut dyn ShaderAsset) {
        self.combine.release(shader);
        self.ray_trace.release(shader);
        self.resolve.release(shader);
        self.temporal.release(shader);
        self.mix.release(shader);
    }

    fn clear(&mut self) {
        self.combine.clear();
        self.ray_trace.clear();
        self.resolve.clear();
        self.temporal.clear();
        self.mix.clear();
    }

    fn select(&self, resolve_pass_index: usize) -> Option<FramePrograms> {
        Some(FramePrograms {
            combine: self.combine.get(0)?,
            ray_trace: [self.ray_trace.get(0)?, self.ray_trace.get(1)?],
            resolve: self.resolve.get(resolve_pass_index)?,
            temporal: self.temporal.get(0)?,
            mix: self.mix.get(0)?,
        })
    }
}

// ============================================================================
// Pass
// ============================================================================

/// Screen-space reflections pass.
///
/// One instance serves every view; per-view state lives in the view's
/// [`RenderBuffers`](crate::buffers::RenderBuffers).
pub struct ScreenSpaceReflectionsPass {
    readiness: PassReadiness,

    // === Assets ===
    shader: Option<Box<dyn ShaderAsset>>,
    pre_integrated_gf: Option<Box<dyn TextureAsset>>,
    reload: Option<ReloadSubscription>,

    // === Pipelines (built lazily once the shader validates) ===
    programs: SsrPrograms,

    /// Set once the current shader generation has been reported invalid.
    diagnostic_reported: bool,
}

impl Default for ScreenSpaceReflectionsPass {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenSpaceReflectionsPass {
    #[must_use]
    pub fn new() -> Self {
        Self {
            readiness: PassReadiness::Uninitialized,
            shader: None,
            pre_integrated_gf: None,
            reload: None,
            programs: SsrPrograms::new(),
            diagnostic_reported: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        "Screen Space Reflections"
    }

    /// Current readiness. A reload announced by the shader counts as
    /// `ResourcesPending` even before it is applied.
    #[must_use]
    pub fn readiness(&self) -> PassReadiness {
        if self.reload.as_ref().is_some_and(ReloadSubscription::is_pending) {
            return self.readiness.invalidated();
        }
        self.readiness
    }

    /// Requests the shader and the BRDF lookup texture and subscribes to
    /// shader reloads. Calling it again on an initialized pass is a no-op.
    pub fn init(&mut self, loader: &mut dyn AssetLoader) -> Result<()> {
        if self.readiness != PassReadiness::Uninitialized {
            return Ok(());
        }

        let mut shader = loader
            .load_shader(SSR_SHADER_NAME)
            .ok_or_else(|| SsrError::AssetNotFound(SSR_SHADER_NAME.to_string()))?;
        let lut = loader
            .load_texture(PRE_INTEGRATED_GF_NAME)
            .ok_or_else(|| SsrError::AssetNotFound(PRE_INTEGRATED_GF_NAME.to_string()))?;

        self.reload = Some(shader.subscribe_reload());
        self.shader = Some(shader);
        self.pre_integrated_gf = Some(lut);
        self.readiness = self.readiness.requested();
        log::debug!("SSR: assets requested, waiting for resources");
        Ok(())
    }

    /// Applies announced shader reloads: releases every program variant
    /// while the old shader still owns them. Returns `true` if a reload was
    /// pending.
    ///
    /// Hosts call this from their reload notification; [`render`](Self::render)
    /// calls it as well, so a reload is never missed.
    pub fn apply_reloads(&mut self) -> bool {
        let reloaded = self.reload.as_ref().is_some_and(|reload| reload.drain() > 0);
        if reloaded {
            self.invalidate();
        }
        reloaded
    }

    /// Releases every program variant and returns to `ResourcesPending`.
    ///
    /// The synchronous reload hook: the next [`render`](Self::render)
    /// re-validates the shader before drawing again. Announced reload events
    /// are consumed.
    pub fn invalidate(&mut self) {
        if let Some(reload) = &self.reload {
            reload.drain();
        }
        match self.shader.as_deref_mut() {
            Some(shader) => self.programs.release(shader),
            None => self.programs.clear(),
        }
        self.diagnostic_reported = false;

        let next = self.readiness.invalidated();
        if next != self.readiness {
            log::debug!("SSR: shader reloaded, pipelines released");
        }
        self.readiness = next;
    }

    /// Releases programs, unsubscribes from reloads and drops the assets.
    pub fn dispose(&mut self) {
        if let Some(shader) = self.shader.as_deref_mut() {
            self.programs.release(shader);
            if let Some(reload) = self.reload.take() {
                shader.unsubscribe_reload(reload.id());
            }
        }
        self.programs.clear();
        self.reload = None;
        self.shader = None;
        self.pre_integrated_gf = None;
        self.diagnostic_reported = false;
        self.readiness = PassReadiness::Uninitialized;
    }

    // ========================================================================
    // Readiness
    // ========================================================================

    /// Applies pending reloads and polls the assets. Returns `true` when ready.
    fn poll_setup(&mut self) -> bool {
        self.apply_reloads();

        match self.readiness {
            PassReadiness::Ready => return true,
            PassReadiness::Uninitialized => return false,
            PassReadiness::ResourcesPending => {}
        }

        let (Some(shader), Some(lut)) = (self.shader.as_deref_mut(), self.pre_integrated_gf.as_deref())
        else {
            return false;
        };
        if !shader.is_loaded() || !lut.is_loaded() {
            log::trace!("SSR: waiting for assets");
            return false;
        }

        let actual = shader.parameter_block_size(PARAMETER_BLOCK_SLOT);
        if actual != Some(SSR_PARAMETER_BLOCK_SIZE) {
            if !self.diagnostic_reported {
                let err = SsrError::InvalidParameterBlockSize {
                    shader: shader.name().to_string(),
                    slot: PARAMETER_BLOCK_SLOT,
                    expected: SSR_PARAMETER_BLOCK_SIZE,
                    actual,
                };
                log::error!("{err}");
                self.diagnostic_reported = true;
            }
            return false;
        }

        if !self.programs.is_valid() {
            if let Err(err) = self.programs.create(shader) {
                if !self.diagnostic_reported {
                    log::error!("{err}");
                    self.diagnostic_reported = true;
                }
                self.programs.release(shader);
                return false;
            }
            log::info!("SSR: created pipeline programs for '{}'", shader.name());
        }

        self.readiness = self.readiness.validated();
        log::debug!("SSR: pass ready");
        true
    }

    // ========================================================================
    // Render
    // ========================================================================

    /// Renders reflections for the context's view and alpha-blends them into
    /// `reflections_rt`. `light_buffer` is the lit scene color.
    pub fn render(
        &mut self,
        ctx: &mut SsrRenderContext<'_>,
        reflections_rt: TextureId,
        light_buffer: TextureId,
    ) -> SsrOutcome {
        if !self.poll_setup() {
            return SsrOutcome::Skipped(SkipReason::NotReady);
        }

        let view = ctx.view;
        let settings = ctx.settings;

        if view.is_orthographic() {
            log::trace!("SSR: skipped for orthographic view");
            return SsrOutcome::Skipped(SkipReason::Orthographic);
        }

        let Some(sizes) = SsrResolutions::compute(
            ctx.buffers.width(),
            ctx.buffers.height(),
            settings.ray_trace_pass_resolution,
        ) else {
            log::trace!(
                "SSR: skipped for {}x{} frame",
                ctx.buffers.width(),
                ctx.buffers.height()
            );
            return SsrOutcome::Skipped(SkipReason::FrameTooSmall);
        };

        let Some(lut) = self.pre_integrated_gf.as_ref().and_then(|lut| lut.texture()) else {
            return SsrOutcome::Skipped(SkipReason::NotReady);
        };
        let profile = QualityProfile::resolve(ctx.quality, settings.resolve_samples);
        let Some(programs) = self.programs.select(profile.resolve_pass_index) else {
            return SsrOutcome::Skipped(SkipReason::NotReady);
        };

        ctx.encoder.push_debug_group(DEBUG_GROUP);
        let outcome = record(ctx, &programs, &sizes, &profile, lut, reflections_rt, light_buffer);
        ctx.encoder.pop_debug_group();
        outcome
    }
}

// ============================================================================
// Pass sequence
// ============================================================================

fn record(
    ctx: &mut SsrRenderContext<'_>,
    programs: &FramePrograms,
    sizes: &SsrResolutions,
    profile: &QualityProfile,
    lut: TextureId,
    reflections_rt: TextureId,
    light_buffer: TextureId,
) -> SsrOutcome {
    let view = ctx.view;
    let settings = ctx.settings;
    let frame = ctx.frame;
    let use_temporal = settings.temporal_effect && !frame.is_camera_cut;

    // ─── Shared parameter block ───

    let mut parameters = SsrUniforms::new(view, settings, sizes, profile);

    let history = if use_temporal {
        parameters.enable_temporal(compute_temporal_time(frame.time_seconds));
        Some(
            ctx.buffers
                .temporal_ssr_mut()
                .ensure(ctx.pool, sizes.temporal, frame.frame_index),
        )
    } else {
        None
    };

    let gi_binding = gi::try_bind(ctx.gi.as_mut(), settings, view, ctx.gi_mode, ctx.encoder);
    if let Some(binding) = &gi_binding {
        binding.apply(&mut parameters);
    }
    let augmented = gi_binding.is_some();

    let depth = match settings.depth_resolution {
        ResolutionMode::Full => ctx.buffers.depth_buffer,
        ResolutionMode::Half => {
            ctx.buffers
                .request_half_res_depth(ctx.pool, ctx.encoder, frame.frame_index)
        }
    };
    let scene_inputs = SceneInputs {
        gbuffer: ctx.buffers.gbuffer,
        depth,
    };

    ctx.encoder.set_parameters(&parameters);
    ctx.encoder.bind_scene_inputs(&scene_inputs);

    // ─── Combine ───

    let color_desc = TextureDesc::new_2d(
        sizes.color_buffer.width,
        sizes.color_buffer.height,
        COLOR_BUFFER_FORMAT,
        "SSR.ColorBuffer0",
    )
    .with_mips(sizes.color_buffer_mips);
    let color_buffer0 = ctx.pool.acquire(&color_desc);

    ctx.encoder.draw_fullscreen(&FullscreenDraw {
        label: "SSR Combine",
        program: programs.combine,
        viewport: sizes.color_buffer,
        target: TextureView::mip(color_buffer0, 0),
        inputs: smallvec![
            ResourceBinding::texture(TEXTURE0, TextureView::full(light_buffer)),
            ResourceBinding::texture(TEXTURE1, TextureView::full(reflections_rt)),
            ResourceBinding::texture(TEXTURE2, TextureView::full(lut)),
        ],
    });

    // ─── Color buffer mip chain ───

    let color_buffer1 = if settings.use_color_buffer_mips {
        let scratch = ctx.pool.acquire(&TextureDesc {
            label: "SSR.ColorBuffer1",
            ..color_desc
        });

        for level in 1..sizes.color_buffer_mips {
            ctx.encoder.filter(&MipFilter {
                mode: FilterMode::GaussianBlur9,
                extent: sizes.color_buffer.mip(level),
                src: TextureView::mip(color_buffer0, level - 1),
                dst: TextureView::mip(color_buffer0, level),
                tmp: TextureView::mip(scratch, level),
            });
        }

        // The filter may have rebound its own parameters and inputs.
        ctx.encoder.set_parameters(&parameters);
        ctx.encoder.bind_scene_inputs(&scene_inputs);
        Some(scratch)
    } else {
        None
    };

    // ─── Ray trace ───

    let trace_buffer = ctx.pool.acquire(&TextureDesc::new_2d(
        sizes.trace.width,
        sizes.trace.height,
        TRACE_FORMAT,
        "SSR.TraceBuffer",
    ));

    let mut trace_inputs = smallvec![ResourceBinding::texture(
        TEXTURE0,
        TextureView::full(color_buffer0)
    )];
    if let Some(binding) = &gi_binding {
        trace_inputs.extend(binding.trace_bindings());
    }
    ctx.encoder.draw_fullscreen(&FullscreenDraw {
        label: "SSR Ray Trace",
        program: programs.ray_trace[usize::from(augmented)],
        viewport: sizes.trace,
        target: TextureView::full(trace_buffer),
        inputs: trace_inputs,
    });

    // ─── Resolve ───

    let resolve_buffer = ctx.pool.acquire(&TextureDesc::new_2d(
        sizes.resolve.width,
        sizes.resolve.height,
        TRACE_FORMAT,
        "SSR.ResolveBuffer",
    ));

    ctx.encoder.draw_fullscreen(&FullscreenDraw {
        label: "SSR Resolve",
        program: programs.resolve,
        viewport: sizes.resolve,
        target: TextureView::full(resolve_buffer),
        inputs: smallvec![ResourceBinding::texture(
            TEXTURE0,
            TextureView::full(trace_buffer)
        )],
    });

    // ─── Temporal ───

    let reflections_buffer = match history {
        Some(history) => {
            let motion_vectors = ctx.buffers.motion_vectors;
            if motion_vectors.is_none() {
                log::warn!("SSR: temporal accumulation without motion vectors");
            }

            let scratch = ctx.pool.acquire(&TextureDesc::new_2d(
                sizes.temporal.width,
                sizes.temporal.height,
                TEMPORAL_FORMAT,
                TEMPORAL_LABEL,
            ));

            ctx.encoder.draw_fullscreen(&FullscreenDraw {
                label: "SSR Temporal",
                program: programs.temporal,
                viewport: sizes.temporal,
                target: TextureView::full(scratch),
                inputs: smallvec![
                    ResourceBinding::texture(TEXTURE0, TextureView::full(resolve_buffer)),
                    ResourceBinding::texture(TEXTURE1, TextureView::full(history)),
                    motion_vectors.map_or(ResourceBinding::null(TEXTURE2), |mv| {
                        ResourceBinding::texture(TEXTURE2, TextureView::full(mv))
                    }),
                ],
            });

            ctx.encoder.copy_texture(scratch, history);
            ctx.pool.release(scratch);
            history
        }
        None => resolve_buffer,
    };

    // ─── Mix ───

    ctx.encoder.draw_fullscreen(&FullscreenDraw {
        label: "SSR Mix",
        program: programs.mix,
        viewport: sizes.frame,
        target: TextureView::full(reflections_rt),
        inputs: smallvec![ResourceBinding::texture(
            TEXTURE0,
            TextureView::full(reflections_buffer)
        )],
    });

    // Reverse acquisition order, so the pool hands out the same ids next frame.
    release_all(
        ctx.pool,
        [Some(resolve_buffer), Some(trace_buffer), color_buffer1, Some(color_buffer0)],
    );

    SsrOutcome::Rendered {
        augmented,
        temporal: history.is_some(),
    }
}

fn release_all<const N: usize>(pool: &mut dyn TexturePool, textures: [Option<TextureId>; N]) {
    for id in textures.into_iter().flatten() {
        pool.release(id);
    }
}
