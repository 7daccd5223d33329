use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio_util::sync::CancellationToken;

use crate::atlas::document::AtlasMetadata;
use crate::config::{EngineConfig, GlyphOpts, InteractionOpts, PartialConfig, ScoreWeights};
use crate::engine::assets::{AssetLoader, LoadedAssets, load_all};
use crate::engine::fps::{FpsMeter, QualitySignal};
use crate::engine::interaction::Interaction;
use crate::engine::raster::{AtlasTextures, render_scene};
use crate::engine::scene::{Scene, SpriteHandle, SpriteTransform};
use crate::engine::scroll::ScrollState;
use crate::engine::surface::Surface;
use crate::foundation::core::{Point, Viewport};
use crate::foundation::error::{PhotoglyphError, PhotoglyphResult};
use crate::glyph::mask::{GlyphMask, GlyphRasterizer};
use crate::mapper::assign::{TileAssignment, assign_tiles};

/// Longest frame step fed to animations; longer host stalls are clamped.
pub const MAX_ANIMATION_STEP_S: f64 = 0.25;

/// Lifecycle of one engine session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Initializing,
    Ready,
    Scrolling,
    Interacting,
    Destroyed,
    /// Initialization failed; terminal until the host builds a new session.
    Failed,
}

impl EngineState {
    pub fn is_live(self) -> bool {
        matches!(self, Self::Ready | Self::Scrolling | Self::Interacting)
    }
}

/// Tunables fixed for the lifetime of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EngineOptions {
    pub weights: ScoreWeights,
    pub glyph: GlyphOpts,
    pub interaction: InteractionOpts,
    /// Seed for the tile shuffle; `None` draws from the OS.
    pub seed: Option<u64>,
}

struct Resources {
    rasterizer: GlyphRasterizer,
    metadata: AtlasMetadata,
    textures: AtlasTextures,
}

struct MaskKey {
    text: String,
    scale_bits: u64,
}

type FpsCallback = Box<dyn FnMut(f64)>;
type DegradeCallback = Box<dyn FnMut(QualitySignal)>;
type ReadyCallback = Box<dyn FnOnce()>;

/// Frame-driven mosaic ticker bound to one host surface.
///
/// The host calls [`Engine::tick`] once per display refresh and forwards pointer events; all scene
/// mutation happens inside those calls.
pub struct Engine<S: Surface> {
    surface: S,
    attached: bool,
    config: EngineConfig,
    options: EngineOptions,
    state: EngineState,
    viewport: Option<Viewport>,
    cancel: CancellationToken,
    resources: Option<Resources>,
    mask: Option<(MaskKey, GlyphMask)>,
    assignment: Option<TileAssignment>,
    scene: Option<Scene>,
    scroll: ScrollState,
    interaction: Interaction,
    fps: FpsMeter,
    clock: f64,
    frames: u64,
    rng: StdRng,
    last_error: Option<String>,
    on_ready: Vec<ReadyCallback>,
    on_fps: Vec<FpsCallback>,
    on_degrade: Vec<DegradeCallback>,
}

impl<S: Surface> Engine<S> {
    pub fn new(surface: S, config: EngineConfig) -> Self {
        Self::with_options(surface, config, EngineOptions::default())
    }

    pub fn with_options(surface: S, config: EngineConfig, options: EngineOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            surface,
            attached: false,
            config,
            options,
            state: EngineState::Initializing,
            viewport: None,
            cancel: CancellationToken::new(),
            resources: None,
            mask: None,
            assignment: None,
            scene: None,
            scroll: ScrollState::new(0.0),
            interaction: Interaction::new(options.interaction),
            fps: FpsMeter::new(),
            clock: 0.0,
            frames: 0,
            rng,
            last_error: None,
            on_ready: Vec::new(),
            on_fps: Vec::new(),
            on_degrade: Vec::new(),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn assignment(&self) -> Option<&TileAssignment> {
        self.assignment.as_ref()
    }

    pub fn glyph_mask(&self) -> Option<&GlyphMask> {
        self.mask.as_ref().map(|(_, m)| m)
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll.offset()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn overlay_alpha(&self) -> f64 {
        self.interaction.overlay_alpha()
    }

    pub fn focused_sprite(&self) -> Option<SpriteHandle> {
        self.interaction.target()
    }

    pub fn rest_transform(&self, handle: SpriteHandle) -> Option<SpriteTransform> {
        self.interaction.rest_transform(handle)
    }

    /// Token that aborts a pending [`Engine::initialize`]; also cancelled by [`Engine::destroy`].
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Register a readiness callback. Fires immediately when the session is already live.
    pub fn on_ready(&mut self, cb: impl FnOnce() + 'static) {
        if self.state.is_live() {
            cb();
        } else {
            self.on_ready.push(Box::new(cb));
        }
    }

    pub fn on_fps_update(&mut self, cb: impl FnMut(f64) + 'static) {
        self.on_fps.push(Box::new(cb));
    }

    /// Register a listener for low-FPS signals (only raised with `auto_quality` enabled).
    pub fn on_degrade(&mut self, cb: impl FnMut(QualitySignal) + 'static) {
        self.on_degrade.push(Box::new(cb));
    }

    /// Current scroll translation (scene to screen) for the configured direction.
    pub fn translate_x(&self) -> f64 {
        self.scroll.translate_x(self.config.direction)
    }

    /// Scene-space horizontal range currently on screen.
    pub fn visible_span(&self) -> Option<(f64, f64)> {
        let vp = self.viewport?;
        self.scene.as_ref()?;
        let start = -self.translate_x();
        Some((start, start + f64::from(vp.width)))
    }

    /// Attach the surface, await the font, atlas image and atlas metadata, then build the first
    /// scene. Any failure leaves the session in [`EngineState::Failed`].
    #[tracing::instrument(skip_all)]
    pub async fn initialize<L: AssetLoader>(&mut self, loader: &L) -> PhotoglyphResult<()> {
        if self.state != EngineState::Initializing {
            return Err(PhotoglyphError::engine(format!(
                "initialize called in state {:?}",
                self.state
            )));
        }
        let res = self.try_initialize(loader).await;
        if let Err(e) = &res {
            tracing::warn!(error = %e, "engine initialization failed");
            self.last_error = Some(e.to_string());
            self.resources = None;
            self.scene = None;
            if self.state != EngineState::Destroyed {
                self.state = EngineState::Failed;
            }
            return res;
        }

        self.state = EngineState::Ready;
        tracing::debug!("engine ready");
        for cb in std::mem::take(&mut self.on_ready) {
            cb();
        }
        Ok(())
    }

    /// Synchronous entry for hosts without their own runtime.
    pub fn initialize_blocking<L: AssetLoader>(&mut self, loader: &L) -> PhotoglyphResult<()> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| PhotoglyphError::Other(e.into()))?;
        rt.block_on(self.initialize(loader))
    }

    async fn try_initialize<L: AssetLoader>(&mut self, loader: &L) -> PhotoglyphResult<()> {
        self.config.validate()?;
        let viewport = self.surface.attach()?;
        self.attached = true;
        self.viewport = Some(viewport);

        let LoadedAssets {
            font,
            atlas_image,
            metadata,
        } = load_all(loader, &self.cancel).await?;
        if atlas_image.dimensions() != (metadata.width, metadata.height) {
            return Err(PhotoglyphError::validation(format!(
                "atlas image is {}x{} but metadata says {}x{}",
                atlas_image.width(),
                atlas_image.height(),
                metadata.width,
                metadata.height
            )));
        }

        let textures = AtlasTextures::from_image(
            &atlas_image,
            self.options.interaction.background_desaturate,
            self.options.interaction.background_brightness,
        )?;
        self.resources = Some(Resources {
            rasterizer: GlyphRasterizer::new(font, self.options.glyph)?,
            metadata,
            textures,
        });
        self.rebuild()
    }

    /// Tear down and rebuild the scene from the current config and viewport.
    #[tracing::instrument(skip_all, fields(text = %self.config.text))]
    fn rebuild(&mut self) -> PhotoglyphResult<()> {
        let viewport = self
            .viewport
            .ok_or_else(|| PhotoglyphError::engine("no viewport attached"))?;
        let res = self
            .resources
            .as_mut()
            .ok_or_else(|| PhotoglyphError::engine("assets are not loaded"))?;

        let key = MaskKey {
            text: self.config.text.clone(),
            scale_bits: self.config.glyph_scale.to_bits(),
        };
        let cached = matches!(&self.mask, Some((k, _)) if k.text == key.text && k.scale_bits == key.scale_bits);
        if !cached {
            let mask = res
                .rasterizer
                .rasterize(&self.config.text, self.config.glyph_scale)?;
            self.mask = Some((key, mask));
        }
        let Some((_, mask)) = &self.mask else {
            return Err(PhotoglyphError::engine("glyph mask missing after rasterization"));
        };

        let tile_px = self.config.tile_px(viewport.width);
        let assignment = assign_tiles(
            mask,
            &res.metadata.tiles,
            tile_px,
            &self.options.weights,
            &mut self.rng,
        )?;
        let scene = Scene::build(
            &assignment,
            &res.metadata.tiles,
            viewport,
            tile_px,
            self.options.interaction.loop_gap_tiles,
        )?;

        tracing::debug!(
            sprites = scene.sprites().len(),
            copies = scene.copies(),
            loop_width = scene.loop_width(),
            "scene rebuilt"
        );
        self.scroll = ScrollState::new(scene.loop_width());
        self.interaction = Interaction::new(self.options.interaction);
        self.assignment = Some(assignment);
        self.scene = Some(scene);
        Ok(())
    }

    /// Advance the session by one display frame of `dt` seconds and present it.
    pub fn tick(&mut self, dt: f64) -> PhotoglyphResult<()> {
        match self.state {
            EngineState::Destroyed | EngineState::Failed => return Ok(()),
            EngineState::Initializing => {
                return Err(PhotoglyphError::engine("tick before initialization"));
            }
            EngineState::Ready => self.state = EngineState::Scrolling,
            EngineState::Scrolling | EngineState::Interacting => {}
        }

        if let Some(fps) = self.fps.record(dt) {
            self.report_fps(fps);
        }

        let step = if dt.is_finite() {
            dt.clamp(0.0, MAX_ANIMATION_STEP_S)
        } else {
            0.0
        };
        self.clock += step;

        let scene = self
            .scene
            .as_mut()
            .ok_or_else(|| PhotoglyphError::engine("no scene to animate"))?;
        self.interaction.advance(scene, step);

        if self.state == EngineState::Interacting && self.interaction.may_resume(self.clock) {
            self.state = EngineState::Scrolling;
            self.scroll.set_paused(false);
            tracing::debug!("scrolling resumed");
        }
        if self.state == EngineState::Scrolling {
            self.scroll
                .advance(self.config.scroll_speed, step, self.config.direction);
        }

        self.render()
    }

    fn report_fps(&mut self, fps: f64) {
        tracing::debug!(fps, "fps window");
        for cb in &mut self.on_fps {
            cb(fps);
        }
        if self.config.auto_quality && fps < self.config.fps_floor {
            let signal = QualitySignal {
                fps,
                floor: self.config.fps_floor,
            };
            tracing::warn!(fps, floor = signal.floor, "frame rate below floor");
            for cb in &mut self.on_degrade {
                cb(signal);
            }
        }
    }

    fn render(&mut self) -> PhotoglyphResult<()> {
        let (Some(scene), Some(res), Some(viewport)) =
            (self.scene.as_ref(), self.resources.as_ref(), self.viewport)
        else {
            return Err(PhotoglyphError::engine("render without a built scene"));
        };
        let frame = render_scene(
            scene,
            &res.textures,
            self.scroll.translate_x(self.config.direction),
            self.interaction.overlay_alpha(),
            viewport,
        )?;
        self.surface.present(&frame)?;
        self.frames += 1;
        Ok(())
    }

    fn scene_point(&self, x: f64, y: f64) -> Point {
        Point::new(x - self.translate_x(), y)
    }

    /// Pointer hover at screen coordinates.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if !self.state.is_live() {
            return;
        }
        if self.interaction.target().is_some() {
            return;
        }
        let p = self.scene_point(x, y);
        if let Some(handle) = self.scene.as_ref().and_then(|s| s.hit_test(p)) {
            self.focus(handle);
        }
    }

    /// Pointer press at screen coordinates: outside the focused sprite releases it, otherwise a
    /// press on a sprite focuses it.
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        if !self.state.is_live() {
            return;
        }
        let p = self.scene_point(x, y);
        let Some(scene) = self.scene.as_ref() else {
            return;
        };
        match self.interaction.target_bounds(scene) {
            Some(bounds) if bounds.contains(p) => {}
            Some(_) => self.release(),
            None => {
                if let Some(handle) = scene.hit_test(p) {
                    self.focus(handle);
                }
            }
        }
    }

    pub fn pointer_leave(&mut self) {
        if self.state == EngineState::Interacting {
            self.release();
        }
    }

    fn focus(&mut self, handle: SpriteHandle) {
        let tx = self.translate_x();
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        self.scroll.set_paused(true);
        self.interaction.focus(scene, handle, tx);
        self.state = EngineState::Interacting;
    }

    fn release(&mut self) {
        if let Some(scene) = self.scene.as_mut() {
            self.interaction.release(scene, self.clock);
        }
    }

    /// Apply a partial config. A live session tears down and rebuilds its scene; a session still
    /// initializing just adopts the config.
    pub fn update_config(&mut self, partial: &PartialConfig) -> PhotoglyphResult<()> {
        match self.state {
            EngineState::Destroyed | EngineState::Failed => {
                return Err(PhotoglyphError::engine(format!(
                    "update_config in state {:?}",
                    self.state
                )));
            }
            _ => {}
        }
        let next = self.config.merged(partial)?;
        let previous = std::mem::replace(&mut self.config, next);
        if !self.state.is_live() {
            return Ok(());
        }
        if let Err(e) = self.rebuild() {
            self.config = previous;
            return Err(e);
        }
        if self.state == EngineState::Interacting {
            self.state = EngineState::Scrolling;
        }
        Ok(())
    }

    /// Host surface resized.
    pub fn resize(&mut self, width: u32, height: u32) -> PhotoglyphResult<()> {
        let viewport = Viewport::new(width, height)?;
        if self.viewport == Some(viewport) {
            return Ok(());
        }
        let previous = self.viewport.replace(viewport);
        if !self.state.is_live() {
            return Ok(());
        }
        if let Err(e) = self.rebuild() {
            self.viewport = previous;
            return Err(e);
        }
        if self.state == EngineState::Interacting {
            self.state = EngineState::Scrolling;
        }
        Ok(())
    }

    /// Release every resource and detach from the surface. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        if self.state == EngineState::Destroyed {
            return;
        }
        self.cancel.cancel();
        self.scene = None;
        self.assignment = None;
        self.mask = None;
        self.resources = None;
        self.interaction = Interaction::new(self.options.interaction);
        self.on_ready.clear();
        self.on_fps.clear();
        self.on_degrade.clear();
        if self.attached {
            self.surface.detach();
            self.attached = false;
        }
        self.state = EngineState::Destroyed;
        tracing::debug!("engine destroyed");
    }
}

impl<S: Surface> Drop for Engine<S> {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/session.rs"]
mod tests;
