#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Screen-space reflections pass orchestration.
//!
//! The crate plans the SSR intermediate targets for a view, drives the
//! `Combine → [blur] → RayTrace → Resolve → [Temporal] → Mix` sequence and
//! owns the lifecycle of the per-view temporal history. GPU work is recorded
//! through the [`SsrCommandEncoder`] and [`TexturePool`] collaborators, so
//! the whole sequence runs against any backend (or a recording mock).

pub mod assets;
pub mod buffers;
pub mod context;
pub mod encoder;
pub mod errors;
pub mod gi;
pub mod pass;
pub mod pool;
pub mod program;
pub mod quality;
pub mod readiness;
pub mod settings;
pub mod sizing;
pub mod temporal;
pub mod uniforms;
pub mod view;

pub use assets::{AssetLoader, ReloadEvent, ReloadSubscription, ShaderAsset, SubscriptionId, TextureAsset};
pub use buffers::{LAZY_FRAMES_COUNT, RenderBuffers};
pub use context::{FrameInfo, SsrRenderContext};
pub use encoder::{SsrCommandEncoder, TextureView};
pub use errors::{Result, SsrError};
pub use gi::{GiProviders, GlobalSdfProvider, SurfaceAtlasProvider};
pub use pass::{ScreenSpaceReflectionsPass, SkipReason, SsrOutcome};
pub use pool::{TextureDesc, TextureId, TexturePool, TextureRecycler, WgpuTexturePool};
pub use quality::{Quality, QualityProfile};
pub use readiness::PassReadiness;
pub use settings::{GlobalIlluminationMode, ReflectionsTraceMode, ResolutionMode, SsrSettings};
pub use sizing::{Extent, SsrResolutions};
pub use temporal::TemporalHistory;
pub use uniforms::SsrUniforms;
pub use view::{RenderView, ViewFlags};
