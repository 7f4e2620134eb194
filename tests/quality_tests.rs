//! Quality & Sizing Tests
//!
//! Tests for:
//! - resolve_max_samples: tier table, monotonicity, raw fallback
//! - resolve_resolve_variant: boundaries between the four variants
//! - QualityProfile: combined per-invocation parameters
//! - SsrResolutions: per-pass sizes, mip counts, minimum frame guard

use myth_ssr::quality::{
    FALLBACK_MAX_TRACE_SAMPLES, resolve_max_samples, resolve_max_samples_raw,
    resolve_resolve_variant,
};
use myth_ssr::sizing::{MIN_FRAME_DIMENSION, mip_levels_count};
use myth_ssr::{Extent, Quality, QualityProfile, ResolutionMode, SsrResolutions};

// ============================================================================
// Max trace samples
// ============================================================================

#[test]
fn max_samples_match_tier_table() {
    assert_eq!(resolve_max_samples(Quality::Low), 20);
    assert_eq!(resolve_max_samples(Quality::Medium), 55);
    assert_eq!(resolve_max_samples(Quality::High), 70);
    assert_eq!(resolve_max_samples(Quality::Ultra), 120);
}

#[test]
fn max_samples_strictly_increase_with_tier() {
    let samples: Vec<u32> = Quality::ALL.iter().map(|&t| resolve_max_samples(t)).collect();
    assert!(samples.windows(2).all(|w| w[0] < w[1]), "{samples:?}");
}

#[test]
fn raw_tier_falls_back_to_60() {
    assert_eq!(resolve_max_samples_raw(0), 20);
    assert_eq!(resolve_max_samples_raw(3), 120);
    assert_eq!(resolve_max_samples_raw(4), FALLBACK_MAX_TRACE_SAMPLES);
    assert_eq!(resolve_max_samples_raw(u8::MAX), 60);
}

// ============================================================================
// Resolve variant
// ============================================================================

#[test]
fn resolve_variant_boundaries() {
    let cases = [
        (0, 0),
        (1, 0),
        (2, 1),
        (3, 1),
        (4, 2),
        (7, 2),
        (8, 3),
        (9, 3),
        (u32::MAX, 3),
    ];
    for (samples, variant) in cases {
        assert_eq!(resolve_resolve_variant(samples), variant, "samples = {samples}");
    }
}

#[test]
fn profile_combines_both_lookups() {
    let profile = QualityProfile::resolve(Quality::High, 8);
    assert_eq!(
        profile,
        QualityProfile {
            max_trace_samples: 70,
            resolve_pass_index: 3
        }
    );
    assert_eq!(QualityProfile::resolve(Quality::default(), 4).max_trace_samples, 55);
}

// ============================================================================
// Resource sizing
// ============================================================================

#[test]
fn full_hd_half_resolution() {
    let sizes = SsrResolutions::compute(1920, 1080, ResolutionMode::Half).unwrap();

    assert_eq!(sizes.frame, Extent::new(1920, 1080));
    assert_eq!(sizes.trace, Extent::new(960, 540));
    assert_eq!(sizes.resolve, Extent::new(960, 540));
    assert_eq!(sizes.color_buffer, Extent::new(960, 540));
    assert_eq!(sizes.temporal, Extent::new(1920, 1080));
    assert_eq!(sizes.color_buffer_mips, 10);
}

#[test]
fn full_resolution_tracing_keeps_half_res_color() {
    let sizes = SsrResolutions::compute(1920, 1080, ResolutionMode::Full).unwrap();

    assert_eq!(sizes.trace, Extent::new(1920, 1080));
    assert_eq!(sizes.resolve, sizes.trace);
    assert_eq!(sizes.color_buffer, Extent::new(960, 540));
}

#[test]
fn odd_dimensions_round_down() {
    let sizes = SsrResolutions::compute(1281, 721, ResolutionMode::Half).unwrap();

    assert_eq!(sizes.trace, Extent::new(640, 360));
    assert_eq!(sizes.color_buffer, Extent::new(640, 360));
    assert_eq!(sizes.temporal, Extent::new(1281, 721));
}

#[test]
fn frames_below_minimum_are_rejected() {
    assert_eq!(MIN_FRAME_DIMENSION, 4);
    assert!(SsrResolutions::compute(3, 1080, ResolutionMode::Half).is_none());
    assert!(SsrResolutions::compute(1920, 3, ResolutionMode::Half).is_none());
    assert!(SsrResolutions::compute(0, 0, ResolutionMode::Full).is_none());

    let smallest = SsrResolutions::compute(4, 4, ResolutionMode::Half).unwrap();
    assert_eq!(smallest.trace, Extent::new(2, 2));
    assert_eq!(smallest.color_buffer_mips, 2);
}

#[test]
fn mip_count_uses_largest_dimension() {
    assert_eq!(mip_levels_count(960, 540), 10);
    assert_eq!(mip_levels_count(1024, 1), 11);
    assert_eq!(mip_levels_count(1, 1024), 11);
    assert_eq!(mip_levels_count(1023, 1023), 10);
    assert_eq!(mip_levels_count(2, 2), 2);
}

#[test]
fn mip_extents_halve_down_to_one() {
    let color = Extent::new(960, 540);
    assert_eq!(color.mip(1), Extent::new(480, 270));
    assert_eq!(color.mip(4), Extent::new(60, 33));
    assert_eq!(color.mip(9), Extent::new(1, 1));
    assert_eq!(color.max_dimension(), 960);
}
