//! Error Types
//!
//! This module defines the error types used by the screen-space reflections pass.
//!
//! # Overview
//!
//! The main error type [`SsrError`] covers the failure modes of pass setup:
//! - Required assets that could not be requested
//! - Shader parameter-block layout mismatches
//! - Pipeline program creation failures
//!
//! None of these abort the host renderer. [`ScreenSpaceReflectionsPass::render`]
//! turns them into a diagnostic report and skips the frame; only
//! [`ScreenSpaceReflectionsPass::init`] surfaces a [`Result`] to the caller.
//!
//! [`ScreenSpaceReflectionsPass::render`]: crate::pass::ScreenSpaceReflectionsPass::render
//! [`ScreenSpaceReflectionsPass::init`]: crate::pass::ScreenSpaceReflectionsPass::init

use thiserror::Error;

/// The main error type for the SSR pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SsrError {
    // ========================================================================
    // Asset Errors
    // ========================================================================
    /// The asset loader could not provide the requested asset.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    // ========================================================================
    // Shader & Pipeline Errors
    // ========================================================================
    /// The shader's declared parameter block does not match [`SsrUniforms`].
    ///
    /// [`SsrUniforms`]: crate::uniforms::SsrUniforms
    #[error(
        "Shader '{shader}' has invalid parameter block size in slot {slot}: expected {expected} bytes, found {}",
        actual.map_or_else(|| "none".to_string(), |size| format!("{size} bytes"))
    )]
    InvalidParameterBlockSize {
        /// Name of the offending shader asset
        shader: String,
        /// Parameter block slot that was validated
        slot: u32,
        /// Size of the CPU-side structure
        expected: usize,
        /// Size declared by the shader, `None` if the slot is missing
        actual: Option<usize>,
    },

    /// A pipeline program variant could not be created.
    #[error("Failed to create pipeline program '{entry_point}': {reason}")]
    ProgramCreation {
        /// Pixel shader entry point of the program
        entry_point: String,
        /// Backend-provided failure description
        reason: String,
    },
}

/// Alias for `Result<T, SsrError>`.
pub type Result<T> = std::result::Result<T, SsrError>;
