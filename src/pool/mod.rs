//! Render Target Pool
//!
//! The pass never creates GPU textures directly. It describes what it needs
//! with a [`TextureDesc`] and asks a [`TexturePool`] for a [`TextureId`],
//! returning every ephemeral target before `render` returns.
//!
//! # Design
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              TextureRecycler<T>                     │
//! │                                                     │
//! │  slots: [Option<Slot<T>>]  ←── indexed by Id        │
//! │  free:  HashMap<Key, Vec<T>>                        │
//! │                                                     │
//! │  acquire(desc, create) → Id                         │
//! │  get(Id) → &T                                       │
//! │  release(Id)       (back to the free bucket)        │
//! │  trim(max_idle)    (drop long-unused textures)      │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! [`TextureRecycler`] carries the bookkeeping and is independent of any
//! GPU API; [`wgpu_pool::WgpuTexturePool`] plugs real `wgpu` textures into it.

pub mod wgpu_pool;

use rustc_hash::FxHashMap;

pub use wgpu_pool::WgpuTexturePool;

// ─── Public Types ─────────────────────────────────────────────────────────────

/// Handle to a texture owned by a [`TexturePool`].
///
/// Valid from `acquire` until the matching `release`. Ids of released
/// textures may be handed out again.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TextureId(u32);

impl TextureId {
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Descriptor for requesting a pooled texture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub mip_level_count: u32,
    pub format: wgpu::TextureFormat,
    pub usage: wgpu::TextureUsages,
    pub label: &'static str,
}

impl TextureDesc {
    /// Usage of every SSR render target: rendered to, sampled, and copied.
    pub const RENDER_TARGET_USAGE: wgpu::TextureUsages = wgpu::TextureUsages::RENDER_ATTACHMENT
        .union(wgpu::TextureUsages::TEXTURE_BINDING)
        .union(wgpu::TextureUsages::COPY_SRC)
        .union(wgpu::TextureUsages::COPY_DST);

    /// Single-mip 2D render target.
    #[must_use]
    pub fn new_2d(width: u32, height: u32, format: wgpu::TextureFormat, label: &'static str) -> Self {
        Self {
            width,
            height,
            mip_level_count: 1,
            format,
            usage: Self::RENDER_TARGET_USAGE,
            label,
        }
    }

    #[must_use]
    pub fn with_mips(mut self, mip_level_count: u32) -> Self {
        self.mip_level_count = mip_level_count.max(1);
        self
    }
}

/// Resource pool collaborator.
pub trait TexturePool {
    /// Returns a texture matching `desc`, reusing a released one when possible.
    fn acquire(&mut self, desc: &TextureDesc) -> TextureId;

    /// Returns a texture to the pool. The id must not be used afterwards.
    fn release(&mut self, id: TextureId);
}

// ─── Recycler ─────────────────────────────────────────────────────────────────

/// Key for texture recycling. Usage is part of the key because reusing a
/// texture with different usages would fail GPU validation.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
struct PoolKey {
    width: u32,
    height: u32,
    mip_level_count: u32,
    format: wgpu::TextureFormat,
    usage: wgpu::TextureUsages,
}

impl PoolKey {
    fn from_desc(desc: &TextureDesc) -> Self {
        Self {
            width: desc.width,
            height: desc.height,
            mip_level_count: desc.mip_level_count,
            format: desc.format,
            usage: desc.usage,
        }
    }
}

struct Slot<T> {
    key: PoolKey,
    texture: T,
}

struct Idle<T> {
    texture: T,
    /// Number of trims this texture has survived without being reused.
    idle_frames: u32,
}

/// Descriptor-keyed texture recycling shared by pool implementations.
pub struct TextureRecycler<T> {
    slots: Vec<Option<Slot<T>>>,
    vacant: Vec<u32>,
    free: FxHashMap<PoolKey, Vec<Idle<T>>>,
    created: usize,
}

impl<T> TextureRecycler<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
            free: FxHashMap::default(),
            created: 0,
        }
    }

    /// Hands out a texture for `desc`, calling `create` only on a pool miss.
    pub fn acquire(&mut self, desc: &TextureDesc, create: impl FnOnce(&TextureDesc) -> T) -> TextureId {
        let key = PoolKey::from_desc(desc);

        let texture = match self.free.get_mut(&key).and_then(Vec::pop) {
            Some(idle) => idle.texture,
            None => {
                self.created += 1;
                create(desc)
            }
        };

        let slot = Some(Slot { key, texture });
        if let Some(index) = self.vacant.pop() {
            self.slots[index as usize] = slot;
            TextureId(index)
        } else {
            self.slots.push(slot);
            TextureId(self.slots.len() as u32 - 1)
        }
    }

    /// Moves an active texture back into its free bucket.
    ///
    /// Releasing an unknown or already released id is ignored and logged.
    pub fn release(&mut self, id: TextureId) {
        let Some(slot) = self.slots.get_mut(id.0 as usize).and_then(Option::take) else {
            log::warn!("TextureRecycler: release of inactive texture {id:?}");
            return;
        };
        self.vacant.push(id.0);
        self.free.entry(slot.key).or_default().push(Idle {
            texture: slot.texture,
            idle_frames: 0,
        });
    }

    /// The active texture behind `id`.
    #[must_use]
    #[inline]
    pub fn get(&self, id: TextureId) -> Option<&T> {
        self.slots
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .map(|slot| &slot.texture)
    }

    /// Drops free textures that have been idle for more than `max_idle_frames`
    /// calls to `trim`.
    pub fn trim(&mut self, max_idle_frames: u32) {
        for bucket in self.free.values_mut() {
            for t in bucket.iter_mut() {
                t.idle_frames += 1;
            }
            bucket.retain(|t| t.idle_frames <= max_idle_frames);
        }
        self.free.retain(|_, bucket| !bucket.is_empty());
    }

    /// Number of textures currently handed out.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Number of released textures waiting for reuse.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free.values().map(Vec::len).sum()
    }

    /// Number of times `create` has been called.
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.created
    }
}

impl<T> Default for TextureRecycler<T> {
    fn default() -> Self {
        Self::new()
    }
}
