//! Asset Collaborators
//!
//! The pass depends on two assets: the SSR shader and the pre-integrated
//! BRDF lookup texture. Both are requested by name through an
//! [`AssetLoader`] and may finish loading asynchronously; the pass polls
//! them every frame until they are ready.
//!
//! Shader hot-reload is delivered through a [`ReloadSubscription`]: the
//! shader asset pushes a [`ReloadEvent`] into a `flume` channel as soon as it
//! starts reloading. A pending event is visible to the pass immediately, and
//! the host applies it synchronously with
//! `ScreenSpaceReflectionsPass::apply_reloads` (or `invalidate`) before the
//! shader swaps its bytecode.

use crate::errors::Result;
use crate::pool::TextureId;
use crate::program::{ProgramDesc, ProgramId};

/// Identifies one reload subscription on a shader asset.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SubscriptionId(pub u64);

/// Sent by a shader asset when it starts reloading.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ReloadEvent;

/// Receiving half of a shader reload subscription.
///
/// Must be returned with [`ShaderAsset::unsubscribe_reload`] at teardown.
#[derive(Debug)]
pub struct ReloadSubscription {
    id: SubscriptionId,
    events: flume::Receiver<ReloadEvent>,
}

impl ReloadSubscription {
    #[must_use]
    pub fn new(id: SubscriptionId, events: flume::Receiver<ReloadEvent>) -> Self {
        Self { id, events }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// `true` if a reload was announced and not yet drained.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.events.is_empty()
    }

    /// Consumes all pending events, returning how many there were.
    pub fn drain(&self) -> usize {
        self.events.try_iter().count()
    }
}

/// A compiled-on-demand shader.
pub trait ShaderAsset {
    fn name(&self) -> &str;

    /// `true` once the shader bytecode is available.
    fn is_loaded(&self) -> bool;

    /// Size in bytes of the parameter block declared in `slot`.
    fn parameter_block_size(&self, slot: u32) -> Option<usize>;

    /// Creates a fullscreen pipeline program from this shader.
    fn create_program(&mut self, desc: &ProgramDesc<'_>) -> Result<ProgramId>;

    /// Releases a program created by [`create_program`](Self::create_program).
    fn release_program(&mut self, id: ProgramId);

    fn subscribe_reload(&mut self) -> ReloadSubscription;

    fn unsubscribe_reload(&mut self, id: SubscriptionId);
}

/// A texture asset.
pub trait TextureAsset {
    fn is_loaded(&self) -> bool;

    /// GPU texture, available once loaded.
    fn texture(&self) -> Option<TextureId>;
}

/// Loads assets by name.
pub trait AssetLoader {
    /// Starts loading a shader; `None` if the asset does not exist.
    fn load_shader(&mut self, name: &str) -> Option<Box<dyn ShaderAsset>>;

    /// Starts loading a texture; `None` if the asset does not exist.
    fn load_texture(&mut self, name: &str) -> Option<Box<dyn TextureAsset>>;
}
