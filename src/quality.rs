//! Quality Parameter Resolver
//!
//! Pure mapping from the renderer-wide SSR quality tier and the per-view
//! resolve sample count to the numeric knobs consumed by the tracing and
//! resolve programs.
//!
//! | Tier     | Max trace samples |
//! |----------|-------------------|
//! | `Low`    | 20                |
//! | `Medium` | 55                |
//! | `High`   | 70                |
//! | `Ultra`  | 120               |
//!
//! The resolve program has four compiled variants covering 1, 2, 4 and 8+
//! samples; [`resolve_resolve_variant`] picks the index.

use serde::{Deserialize, Serialize};

/// Trace sample budget used for a quality value outside the known tiers.
///
/// Only reachable through [`resolve_max_samples_raw`], when the host stores
/// the tier as an unvalidated integer.
pub const FALLBACK_MAX_TRACE_SAMPLES: u32 = 60;

/// Number of compiled resolve program variants.
pub const RESOLVE_VARIANT_COUNT: usize = 4;

/// Renderer-wide quality tier for screen-space reflections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Quality {
    Low = 0,
    #[default]
    Medium = 1,
    High = 2,
    Ultra = 3,
}

impl Quality {
    /// All tiers in ascending order.
    pub const ALL: [Quality; 4] = [Self::Low, Self::Medium, Self::High, Self::Ultra];

    /// Converts a raw tier index, returning `None` when out of range.
    #[inline]
    #[must_use]
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Low),
            1 => Some(Self::Medium),
            2 => Some(Self::High),
            3 => Some(Self::Ultra),
            _ => None,
        }
    }
}

/// Maximum number of ray-march samples for a quality tier.
#[inline]
#[must_use]
pub fn resolve_max_samples(tier: Quality) -> u32 {
    match tier {
        Quality::Low => 20,
        Quality::Medium => 55,
        Quality::High => 70,
        Quality::Ultra => 120,
    }
}

/// Same as [`resolve_max_samples`] for a raw tier index.
///
/// Unknown values map to [`FALLBACK_MAX_TRACE_SAMPLES`].
#[inline]
#[must_use]
pub fn resolve_max_samples_raw(raw: u8) -> u32 {
    Quality::from_raw(raw).map_or(FALLBACK_MAX_TRACE_SAMPLES, resolve_max_samples)
}

/// Index of the resolve program variant for a requested sample count.
///
/// `>= 8 → 3`, `>= 4 → 2`, `>= 2 → 1`, otherwise `0`.
#[inline]
#[must_use]
pub fn resolve_resolve_variant(sample_count: u32) -> usize {
    match sample_count {
        8.. => 3,
        4..=7 => 2,
        2..=3 => 1,
        _ => 0,
    }
}

/// Per-invocation tracing/resolve parameters derived from quality settings.
///
/// Not persisted; recomputed on every call to `render`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityProfile {
    pub max_trace_samples: u32,
    pub resolve_pass_index: usize,
}

impl QualityProfile {
    #[must_use]
    pub fn resolve(tier: Quality, resolve_samples: u32) -> Self {
        Self {
            max_trace_samples: resolve_max_samples(tier),
            resolve_pass_index: resolve_resolve_variant(resolve_samples),
        }
    }
}
