//! In-memory collaborators for the SSR integration tests.
//!
//! - `RecordingPool`: texture pool on top of `TextureRecycler`, keeps a log
//!   of every descriptor acquired and every id released
//! - `RecordingEncoder`: stores each submitted command
//! - `MockShader` / `MockLut` / `MockLoader`: assets with state shared with
//!   the test through `Rc<RefCell<_>>`
//! - `MockSdf` / `MockAtlas`: full-scene tracing providers
//! - `TestScene`: a view, its buffers and collaborators, ready to render

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Vec3, Vec4};
use myth_ssr::assets::{ReloadEvent, ReloadSubscription, SubscriptionId};
use myth_ssr::encoder::{BufferId, FullscreenDraw, MipFilter, SceneInputs};
use myth_ssr::gi::{GiProviders, GlobalSdfBinding, SurfaceAtlasBinding};
use myth_ssr::program::{BlendMode, ProgramDesc, ProgramId};
use myth_ssr::uniforms::{GlobalSdfConstants, SurfaceAtlasConstants};
use myth_ssr::{
    AssetLoader, Extent, FrameInfo, GlobalIlluminationMode, GlobalSdfProvider, Quality,
    RenderBuffers, RenderView, ScreenSpaceReflectionsPass, ShaderAsset, SsrCommandEncoder,
    SsrError, SsrOutcome, SsrRenderContext, SsrSettings, SsrUniforms, SurfaceAtlasProvider,
    TextureAsset, TextureDesc, TextureId, TexturePool, TextureRecycler,
};

pub const EPSILON: f32 = 1e-5;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// Scene textures live far above pool ids so the two never collide.
pub const REFLECTIONS_RT: TextureId = TextureId::from_raw(10_000);
pub const LIGHT_BUFFER: TextureId = TextureId::from_raw(10_001);
pub const GBUFFER: [TextureId; 3] = [
    TextureId::from_raw(10_002),
    TextureId::from_raw(10_003),
    TextureId::from_raw(10_004),
];
pub const DEPTH_BUFFER: TextureId = TextureId::from_raw(10_005);
pub const MOTION_VECTORS: TextureId = TextureId::from_raw(10_006);
pub const LUT_TEXTURE: TextureId = TextureId::from_raw(10_007);

// ============================================================================
// Recording pool
// ============================================================================

#[derive(Default)]
pub struct RecordingPool {
    textures: TextureRecycler<TextureDesc>,
    pub acquired: Vec<TextureDesc>,
    pub released: Vec<TextureId>,
}

impl RecordingPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptor of an active texture.
    pub fn desc(&self, id: TextureId) -> Option<&TextureDesc> {
        self.textures.get(id)
    }

    pub fn live_count(&self) -> usize {
        self.textures.active_count()
    }

    pub fn acquired_labels(&self) -> Vec<&'static str> {
        self.acquired.iter().map(|d| d.label).collect()
    }

    pub fn acquisitions_of(&self, label: &str) -> usize {
        self.acquired.iter().filter(|d| d.label == label).count()
    }

    pub fn find(&self, label: &str) -> Option<&TextureDesc> {
        self.acquired.iter().find(|d| d.label == label)
    }

    pub fn clear_log(&mut self) {
        self.acquired.clear();
        self.released.clear();
    }
}

impl TexturePool for RecordingPool {
    fn acquire(&mut self, desc: &TextureDesc) -> TextureId {
        self.acquired.push(desc.clone());
        self.textures.acquire(desc, TextureDesc::clone)
    }

    fn release(&mut self, id: TextureId) {
        self.released.push(id);
        self.textures.release(id);
    }
}

// ============================================================================
// Recording encoder
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetParameters(Box<SsrUniforms>),
    BindSceneInputs(SceneInputs),
    Draw(FullscreenDraw),
    Filter(MipFilter),
    DownscaleDepth {
        src: TextureId,
        dst: TextureId,
        extent: Extent,
    },
    Copy {
        src: TextureId,
        dst: TextureId,
    },
    PushGroup(String),
    PopGroup,
}

#[derive(Default)]
pub struct RecordingEncoder {
    pub commands: Vec<Command>,
}

impl RecordingEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draws(&self) -> Vec<&FullscreenDraw> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Draw(draw) => Some(draw),
                _ => None,
            })
            .collect()
    }

    pub fn draw_labels(&self) -> Vec<&'static str> {
        self.draws().iter().map(|d| d.label).collect()
    }

    pub fn draw(&self, label: &str) -> Option<&FullscreenDraw> {
        self.draws().into_iter().find(|d| d.label == label)
    }

    pub fn filters(&self) -> Vec<&MipFilter> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Filter(filter) => Some(filter),
                _ => None,
            })
            .collect()
    }

    pub fn parameters(&self) -> Vec<&SsrUniforms> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::SetParameters(p) => Some(p.as_ref()),
                _ => None,
            })
            .collect()
    }

    pub fn last_parameters(&self) -> Option<&SsrUniforms> {
        self.parameters().last().copied()
    }

    pub fn count(&self, pred: impl Fn(&Command) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }

    /// `true` if any command writes to `texture`.
    pub fn writes_to(&self, texture: TextureId) -> bool {
        self.commands.iter().any(|c| match c {
            Command::Draw(draw) => draw.target.texture == texture,
            Command::Filter(filter) => filter.dst.texture == texture || filter.tmp.texture == texture,
            Command::DownscaleDepth { dst, .. } | Command::Copy { dst, .. } => *dst == texture,
            _ => false,
        })
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl SsrCommandEncoder for RecordingEncoder {
    fn set_parameters(&mut self, parameters: &SsrUniforms) {
        self.commands.push(Command::SetParameters(Box::new(*parameters)));
    }

    fn bind_scene_inputs(&mut self, inputs: &SceneInputs) {
        self.commands.push(Command::BindSceneInputs(*inputs));
    }

    fn draw_fullscreen(&mut self, draw: &FullscreenDraw) {
        self.commands.push(Command::Draw(draw.clone()));
    }

    fn filter(&mut self, filter: &MipFilter) {
        self.commands.push(Command::Filter(*filter));
    }

    fn downscale_depth(&mut self, src: TextureId, dst: TextureId, extent: Extent) {
        self.commands.push(Command::DownscaleDepth { src, dst, extent });
    }

    fn copy_texture(&mut self, src: TextureId, dst: TextureId) {
        self.commands.push(Command::Copy { src, dst });
    }

    fn push_debug_group(&mut self, label: &str) {
        self.commands.push(Command::PushGroup(label.to_string()));
    }

    fn pop_debug_group(&mut self) {
        self.commands.push(Command::PopGroup);
    }
}

// ============================================================================
// Assets
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedProgram {
    pub entry_point: String,
    pub permutation: Option<u32>,
    pub blend: BlendMode,
    pub id: ProgramId,
}

pub struct ShaderState {
    pub loaded: bool,
    pub block_size: Option<usize>,
    /// Entry point whose program creation fails.
    pub failing_entry_point: Option<&'static str>,
    pub created: Vec<CreatedProgram>,
    pub live_programs: Vec<ProgramId>,
    pub released_programs: usize,
    next_program: u64,
    next_subscription: u64,
    pub subscribers: Vec<(SubscriptionId, flume::Sender<ReloadEvent>)>,
    pub unsubscribed: Vec<SubscriptionId>,
}

impl Default for ShaderState {
    fn default() -> Self {
        Self {
            loaded: true,
            block_size: Some(myth_ssr::uniforms::SSR_PARAMETER_BLOCK_SIZE),
            failing_entry_point: None,
            created: Vec::new(),
            live_programs: Vec::new(),
            released_programs: 0,
            next_program: 1,
            next_subscription: 1,
            subscribers: Vec::new(),
            unsubscribed: Vec::new(),
        }
    }
}

/// Test-side handle to the shader's shared state.
#[derive(Clone, Default)]
pub struct ShaderHandle(pub Rc<RefCell<ShaderState>>);

impl ShaderHandle {
    pub fn set_loaded(&self, loaded: bool) {
        self.0.borrow_mut().loaded = loaded;
    }

    pub fn set_block_size(&self, size: Option<usize>) {
        self.0.borrow_mut().block_size = size;
    }

    pub fn set_failing_entry_point(&self, entry_point: Option<&'static str>) {
        self.0.borrow_mut().failing_entry_point = entry_point;
    }

    /// Simulates a hot-reload notification.
    pub fn trigger_reload(&self) {
        for (_, sender) in &self.0.borrow().subscribers {
            let _ = sender.send(ReloadEvent);
        }
    }

    pub fn live_program_count(&self) -> usize {
        self.0.borrow().live_programs.len()
    }

    pub fn created_count(&self) -> usize {
        self.0.borrow().created.len()
    }

    /// Most recently created program for an entry point and permutation.
    pub fn program_for(&self, entry_point: &str, permutation: Option<u32>) -> Option<ProgramId> {
        self.0
            .borrow()
            .created
            .iter()
            .rev()
            .find(|p| p.entry_point == entry_point && p.permutation == permutation)
            .map(|p| p.id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.0.borrow().subscribers.len()
    }
}

pub struct MockShader {
    state: ShaderHandle,
}

impl ShaderAsset for MockShader {
    fn name(&self) -> &str {
        "Shaders/SSR"
    }

    fn is_loaded(&self) -> bool {
        self.state.0.borrow().loaded
    }

    fn parameter_block_size(&self, slot: u32) -> Option<usize> {
        if slot == 0 {
            self.state.0.borrow().block_size
        } else {
            None
        }
    }

    fn create_program(&mut self, desc: &ProgramDesc<'_>) -> myth_ssr::Result<ProgramId> {
        let mut state = self.state.0.borrow_mut();
        if state.failing_entry_point == Some(desc.entry_point) {
            return Err(SsrError::ProgramCreation {
                entry_point: desc.entry_point.to_string(),
                reason: "mock compile failure".to_string(),
            });
        }
        let id = ProgramId(state.next_program);
        state.next_program += 1;
        state.created.push(CreatedProgram {
            entry_point: desc.entry_point.to_string(),
            permutation: desc.permutation,
            blend: desc.blend,
            id,
        });
        state.live_programs.push(id);
        Ok(id)
    }

    fn release_program(&mut self, id: ProgramId) {
        let mut state = self.state.0.borrow_mut();
        state.live_programs.retain(|p| *p != id);
        state.released_programs += 1;
    }

    fn subscribe_reload(&mut self) -> ReloadSubscription {
        let mut state = self.state.0.borrow_mut();
        let id = SubscriptionId(state.next_subscription);
        state.next_subscription += 1;
        let (tx, rx) = flume::unbounded();
        state.subscribers.push((id, tx));
        ReloadSubscription::new(id, rx)
    }

    fn unsubscribe_reload(&mut self, id: SubscriptionId) {
        let mut state = self.state.0.borrow_mut();
        state.subscribers.retain(|(sub, _)| *sub != id);
        state.unsubscribed.push(id);
    }
}

#[derive(Clone)]
pub struct LutHandle(pub Rc<RefCell<bool>>);

impl Default for LutHandle {
    fn default() -> Self {
        Self(Rc::new(RefCell::new(true)))
    }
}

impl LutHandle {
    pub fn set_loaded(&self, loaded: bool) {
        *self.0.borrow_mut() = loaded;
    }
}

pub struct MockLut {
    loaded: LutHandle,
}

impl TextureAsset for MockLut {
    fn is_loaded(&self) -> bool {
        *self.loaded.0.borrow()
    }

    fn texture(&self) -> Option<TextureId> {
        self.is_loaded().then_some(LUT_TEXTURE)
    }
}

#[derive(Default)]
pub struct MockLoader {
    pub shader: ShaderHandle,
    pub lut: LutHandle,
    pub missing_shader: bool,
    pub missing_lut: bool,
}

impl AssetLoader for MockLoader {
    fn load_shader(&mut self, _name: &str) -> Option<Box<dyn ShaderAsset>> {
        if self.missing_shader {
            return None;
        }
        Some(Box::new(MockShader {
            state: self.shader.clone(),
        }))
    }

    fn load_texture(&mut self, _name: &str) -> Option<Box<dyn TextureAsset>> {
        if self.missing_lut {
            return None;
        }
        Some(Box::new(MockLut {
            loaded: self.lut.clone(),
        }))
    }
}

/// An initialized pass plus the handles controlling its assets.
pub fn ready_pass() -> (ScreenSpaceReflectionsPass, ShaderHandle, LutHandle) {
    let mut loader = MockLoader::default();
    let mut pass = ScreenSpaceReflectionsPass::new();
    pass.init(&mut loader).expect("init with all assets present");
    (pass, loader.shader, loader.lut)
}

// ============================================================================
// GI providers
// ============================================================================

pub fn sdf_binding() -> GlobalSdfBinding {
    let mut constants = GlobalSdfConstants::default();
    constants.cascade_pos_distance = [Vec4::new(0.0, 0.0, 0.0, 100.0); 4];
    constants.cascade_voxel_size = Vec4::splat(0.5);
    constants.cascades_count = 4;
    constants.resolution = 128.0;
    constants.near_surface_distance = 0.25;

    GlobalSdfBinding {
        texture: Some(TextureId::from_raw(20_000)),
        texture_mip: None,
        constants,
    }
}

pub fn atlas_binding() -> SurfaceAtlasBinding {
    SurfaceAtlasBinding {
        chunks: Some(BufferId(1)),
        culled_objects: Some(BufferId(2)),
        objects: Some(BufferId(3)),
        atlas_depth: TextureId::from_raw(20_001),
        atlas_lighting: TextureId::from_raw(20_002),
        constants: SurfaceAtlasConstants {
            view_pos: Vec3::new(1.0, 2.0, 3.0),
            light_shadows_strength: 0.8,
            view_far_plane: 1000.0,
            resolution: 4096.0,
            chunk_size: 32.0,
            objects_buffer_capacity: 1024,
        },
    }
}

#[derive(Default)]
pub struct MockSdf {
    pub result: Option<GlobalSdfBinding>,
    pub calls: usize,
}

impl GlobalSdfProvider for MockSdf {
    fn render(
        &mut self,
        _view: &RenderView,
        _encoder: &mut dyn SsrCommandEncoder,
    ) -> Option<GlobalSdfBinding> {
        self.calls += 1;
        self.result
    }
}

#[derive(Default)]
pub struct MockAtlas {
    pub result: Option<SurfaceAtlasBinding>,
    pub calls: usize,
}

impl SurfaceAtlasProvider for MockAtlas {
    fn render(
        &mut self,
        _view: &RenderView,
        _encoder: &mut dyn SsrCommandEncoder,
    ) -> Option<SurfaceAtlasBinding> {
        self.calls += 1;
        self.result
    }
}

// ============================================================================
// Scene
// ============================================================================

pub struct TestScene {
    pub view: RenderView,
    pub buffers: RenderBuffers,
    pub settings: SsrSettings,
    pub quality: Quality,
    pub gi_mode: GlobalIlluminationMode,
    pub pool: RecordingPool,
    pub encoder: RecordingEncoder,
}

impl TestScene {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            view: RenderView::perspective(
                Vec3::new(0.0, 2.0, 5.0),
                Vec3::ZERO,
                60f32.to_radians(),
                0.1,
                1000.0,
                width,
                height,
            ),
            buffers: RenderBuffers::new(width, height, GBUFFER, DEPTH_BUFFER)
                .with_motion_vectors(MOTION_VECTORS),
            settings: SsrSettings::default(),
            quality: Quality::Medium,
            gi_mode: GlobalIlluminationMode::None,
            pool: RecordingPool::new(),
            encoder: RecordingEncoder::new(),
        }
    }

    pub fn frame(index: u64) -> FrameInfo {
        FrameInfo {
            frame_index: index,
            is_camera_cut: false,
            time_seconds: index as f32 / 60.0,
        }
    }

    pub fn render(&mut self, pass: &mut ScreenSpaceReflectionsPass, frame: FrameInfo) -> SsrOutcome {
        let mut ctx = SsrRenderContext {
            view: &self.view,
            buffers: &mut self.buffers,
            settings: &self.settings,
            quality: self.quality,
            gi_mode: self.gi_mode,
            frame,
            pool: &mut self.pool,
            encoder: &mut self.encoder,
            gi: None,
        };
        pass.render(&mut ctx, REFLECTIONS_RT, LIGHT_BUFFER)
    }

    pub fn render_with_gi(
        &mut self,
        pass: &mut ScreenSpaceReflectionsPass,
        frame: FrameInfo,
        sdf: &mut MockSdf,
        atlas: &mut MockAtlas,
    ) -> SsrOutcome {
        let mut ctx = SsrRenderContext {
            view: &self.view,
            buffers: &mut self.buffers,
            settings: &self.settings,
            quality: self.quality,
            gi_mode: self.gi_mode,
            frame,
            pool: &mut self.pool,
            encoder: &mut self.encoder,
            gi: Some(GiProviders {
                sdf,
                surface_atlas: atlas,
            }),
        };
        pass.render(&mut ctx, REFLECTIONS_RT, LIGHT_BUFFER)
    }

    /// Clears the command and pool logs between frames.
    pub fn next_frame(&mut self) {
        self.encoder.clear();
        self.pool.clear_log();
    }
}
