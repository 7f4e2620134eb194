//! Pipeline Programs
//!
//! Multi-variant programs (ray trace: 2, resolve: 4) are small fixed arrays
//! of opaque [`ProgramId`]s indexed by variant. They are built lazily, once,
//! after the shader's parameter block has been validated, and released on
//! shader reload or teardown.

use crate::assets::ShaderAsset;
use crate::errors::Result;

/// Opaque handle to a compiled pipeline program.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ProgramId(pub u64);

/// Output blending of a program.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum BlendMode {
    /// Overwrite the target.
    #[default]
    Opaque,
    /// `src * a + dst * (1 - a)`.
    AlphaBlend,
}

/// Request for one fullscreen-triangle program.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ProgramDesc<'a> {
    /// Pixel shader entry point.
    pub entry_point: &'a str,
    /// Permutation index for multi-variant programs.
    pub permutation: Option<u32>,
    pub blend: BlendMode,
}

/// `N` compiled variants of one pixel shader entry point.
#[derive(Debug, Clone)]
pub struct ProgramVariants<const N: usize> {
    entry_point: &'static str,
    blend: BlendMode,
    programs: [Option<ProgramId>; N],
}

impl<const N: usize> ProgramVariants<N> {
    #[must_use]
    pub const fn new(entry_point: &'static str, blend: BlendMode) -> Self {
        Self {
            entry_point,
            blend,
            programs: [None; N],
        }
    }

    /// `true` when every variant has been created.
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.programs.iter().all(Option::is_some)
    }

    /// Creates the missing variants. Variants already built are kept.
    pub fn create(&mut self, shader: &mut dyn ShaderAsset) -> Result<()> {
        for (index, slot) in self.programs.iter_mut().enumerate() {
            if slot.is_some() {
                continue;
            }
            let desc = ProgramDesc {
                entry_point: self.entry_point,
                permutation: (N > 1).then_some(index as u32),
                blend: self.blend,
            };
            *slot = Some(shader.create_program(&desc)?);
        }
        Ok(())
    }

    /// Variant `index`, if built.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<ProgramId> {
        self.programs.get(index).copied().flatten()
    }

    /// Hands every built variant back to `shader`.
    pub fn release(&mut self, shader: &mut dyn ShaderAsset) {
        for id in self.programs.iter_mut().filter_map(Option::take) {
            shader.release_program(id);
        }
    }

    /// Forgets all variants without notifying the shader.
    pub fn clear(&mut self) {
        self.programs = [None; N];
    }
}
