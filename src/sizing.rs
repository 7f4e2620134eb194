//! Resource Sizing
//!
//! Computes the resolution of every intermediate buffer from the frame size
//! and the resolution-mode settings.
//!
//! ```text
//!   frame (W × H)
//!     ├── trace   = W / d × H / d      d = ray_trace_pass_resolution divisor
//!     ├── resolve = W / d × H / d
//!     ├── color   = W / 2 × H / 2      fixed half resolution, full mip chain
//!     └── temporal = W × H
//! ```
//!
//! Frames narrower or shorter than [`MIN_FRAME_DIMENSION`] are rejected, in
//! which case the pass must not touch the pool at all.

use crate::settings::ResolutionMode;

/// Smallest frame width/height the pass will run on.
pub const MIN_FRAME_DIMENSION: u32 = 4;

/// Size of a 2D render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    #[inline]
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Divides both dimensions by `divisor` (integer division).
    #[inline]
    #[must_use]
    pub const fn divided(self, divisor: u32) -> Self {
        Self {
            width: self.width / divisor,
            height: self.height / divisor,
        }
    }

    /// Size of mip `level`, each dimension clamped to at least 1.
    #[inline]
    #[must_use]
    pub fn mip(self, level: u32) -> Self {
        Self {
            width: (self.width >> level).max(1),
            height: (self.height >> level).max(1),
        }
    }

    #[inline]
    #[must_use]
    pub fn max_dimension(self) -> u32 {
        self.width.max(self.height)
    }
}

/// Number of mip levels from `width × height` down to `1 × 1`.
///
/// `floor(log2(max(width, height))) + 1`, never less than 1.
#[inline]
#[must_use]
pub fn mip_levels_count(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    largest.ilog2() + 1
}

/// Resolutions of all SSR buffers for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SsrResolutions {
    pub frame: Extent,
    pub trace: Extent,
    pub resolve: Extent,
    pub color_buffer: Extent,
    pub temporal: Extent,
    /// Full mip count of the half-resolution color buffer.
    pub color_buffer_mips: u32,
}

impl SsrResolutions {
    /// Plans buffer sizes for a `width × height` frame.
    ///
    /// Returns `None` when either dimension is below [`MIN_FRAME_DIMENSION`].
    #[must_use]
    pub fn compute(width: u32, height: u32, trace_resolution: ResolutionMode) -> Option<Self> {
        if width < MIN_FRAME_DIMENSION || height < MIN_FRAME_DIMENSION {
            return None;
        }

        let frame = Extent::new(width, height);
        let trace = frame.divided(trace_resolution.divisor());
        let color_buffer = frame.divided(2);

        Some(Self {
            frame,
            trace,
            resolve: trace,
            color_buffer,
            temporal: frame,
            color_buffer_mips: mip_levels_count(color_buffer.width, color_buffer.height),
        })
    }
}
