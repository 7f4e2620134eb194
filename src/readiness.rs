//! Pass Readiness
//!
//! ```text
//!  Uninitialized ──init()──► ResourcesPending ──assets loaded + block valid──► Ready
//!                                   ▲                                          │
//!                                   └────────────── shader reload ─────────────┘
//! ```
//!
//! Any invocation outside `Ready` is a complete no-op.

/// Readiness of the SSR pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PassReadiness {
    /// Assets have not been requested yet.
    #[default]
    Uninitialized,
    /// Assets requested; waiting for them to load and validate.
    ResourcesPending,
    /// Programs built; the pass renders.
    Ready,
}

impl PassReadiness {
    #[inline]
    #[must_use]
    pub fn is_ready(self) -> bool {
        self == Self::Ready
    }

    /// `Uninitialized → ResourcesPending`. Other states are kept.
    #[must_use]
    pub fn requested(self) -> Self {
        match self {
            Self::Uninitialized => Self::ResourcesPending,
            other => other,
        }
    }

    /// `ResourcesPending → Ready`. Other states are kept.
    #[must_use]
    pub fn validated(self) -> Self {
        match self {
            Self::ResourcesPending => Self::Ready,
            other => other,
        }
    }

    /// `Ready → ResourcesPending` on shader reload. Other states are kept.
    #[must_use]
    pub fn invalidated(self) -> Self {
        match self {
            Self::Ready => Self::ResourcesPending,
            other => other,
        }
    }
}
