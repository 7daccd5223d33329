use crate::atlas::document::AtlasTile;
use crate::engine::tween::Lerp;
use crate::foundation::core::{PixelRect, Point, Rect, Viewport};
use crate::foundation::error::{PhotoglyphError, PhotoglyphResult};
use crate::mapper::assign::TileAssignment;

/// Z value of a sprite raised above everything else.
pub const TOP_Z: i32 = 1_000;

/// Stable identity of a sprite within one scene build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteHandle(pub u32);

/// Position (scene coordinates, top-left), uniform scale and draw order of a sprite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteTransform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub z: i32,
}

impl Lerp for SpriteTransform {
    /// Position and scale interpolate; z holds the higher of both ends until completion.
    fn lerp(self, to: Self, t: f64) -> Self {
        Self {
            x: self.x.lerp(to.x, t),
            y: self.y.lerp(to.y, t),
            scale: self.scale.lerp(to.scale, t),
            z: self.z.max(to.z),
        }
    }
}

/// One quad bound to an atlas region.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneSprite {
    pub handle: SpriteHandle,
    /// Index into the atlas tile list.
    pub tile: usize,
    /// Region of the packed atlas this sprite samples.
    pub source: PixelRect,
    pub foreground: bool,
    pub transform: SpriteTransform,
    /// Which duplicate of the content this sprite belongs to (0 = original).
    pub copy: u32,
}

/// Realized tile assignment, duplicated horizontally for seamless scrolling.
#[derive(Clone, Debug)]
pub struct Scene {
    sprites: Vec<SceneSprite>,
    tile_px: u32,
    cols: u32,
    rows: u32,
    content_width: f64,
    loop_width: f64,
    copies: u32,
    viewport: Viewport,
}

impl Scene {
    /// Lay out every assigned cell as a sprite, then repeat the layout every `loop_width`.
    ///
    /// `loop_width` is the content width plus `gap_tiles` render tiles. The number of copies is
    /// `max(2, 1 + ceil(viewport_width / loop_width))` so that any scroll offset in
    /// `[-loop_width, loop_width]` keeps the viewport covered.
    pub fn build(
        assignment: &TileAssignment,
        tiles: &[AtlasTile],
        viewport: Viewport,
        tile_px: u32,
        gap_tiles: u32,
    ) -> PhotoglyphResult<Self> {
        if tile_px == 0 {
            return Err(PhotoglyphError::validation("render tile size must be > 0"));
        }
        if assignment.cells.is_empty() {
            return Err(PhotoglyphError::validation("tile assignment has no cells"));
        }
        let tile = f64::from(tile_px);
        let content_width = f64::from(assignment.cols) * tile;
        let loop_width = content_width + f64::from(gap_tiles) * tile;
        let copies = (1 + (f64::from(viewport.width) / loop_width).ceil() as u32).max(2);
        let origin_y = ((f64::from(viewport.height) - f64::from(assignment.rows) * tile) / 2.0)
            .floor();

        let mut sprites = Vec::with_capacity(assignment.cells.len() * copies as usize);
        for copy in 0..copies {
            let dx = f64::from(copy) * loop_width;
            for (i, cell) in assignment.cells.iter().enumerate() {
                let src = tiles.get(cell.tile).ok_or_else(|| {
                    PhotoglyphError::validation(format!(
                        "assignment references tile {} of {}",
                        cell.tile,
                        tiles.len()
                    ))
                })?;
                let col = i as u32 % assignment.cols;
                let row = i as u32 / assignment.cols;
                sprites.push(SceneSprite {
                    handle: SpriteHandle(sprites.len() as u32),
                    tile: cell.tile,
                    source: src.rect(),
                    foreground: cell.foreground,
                    transform: SpriteTransform {
                        x: dx + f64::from(col) * tile,
                        y: origin_y + f64::from(row) * tile,
                        scale: 1.0,
                        z: 0,
                    },
                    copy,
                });
            }
        }

        Ok(Self {
            sprites,
            tile_px,
            cols: assignment.cols,
            rows: assignment.rows,
            content_width,
            loop_width,
            copies,
            viewport,
        })
    }

    pub fn sprites(&self) -> &[SceneSprite] {
        &self.sprites
    }

    pub fn sprite(&self, handle: SpriteHandle) -> Option<&SceneSprite> {
        self.sprites.get(handle.0 as usize)
    }

    pub fn sprite_mut(&mut self, handle: SpriteHandle) -> Option<&mut SceneSprite> {
        self.sprites.get_mut(handle.0 as usize)
    }

    pub fn tile_px(&self) -> u32 {
        self.tile_px
    }

    pub fn grid(&self) -> (u32, u32) {
        (self.cols, self.rows)
    }

    pub fn content_width(&self) -> f64 {
        self.content_width
    }

    pub fn loop_width(&self) -> f64 {
        self.loop_width
    }

    pub fn copies(&self) -> u32 {
        self.copies
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Horizontal span of the repeated pattern (content plus gap, `copies` times).
    pub fn extent(&self) -> (f64, f64) {
        (0.0, f64::from(self.copies) * self.loop_width)
    }

    /// Scene-space bounds of a sprite at its current transform.
    pub fn bounds(&self, handle: SpriteHandle) -> Option<Rect> {
        self.sprite(handle).map(|s| sprite_rect(s, self.tile_px))
    }

    /// Topmost sprite under a scene-space point. Later sprites win ties in z.
    pub fn hit_test(&self, p: Point) -> Option<SpriteHandle> {
        self.sprites
            .iter()
            .filter(|s| sprite_rect(s, self.tile_px).contains(p))
            .max_by_key(|s| (s.transform.z, s.handle.0))
            .map(|s| s.handle)
    }
}

pub(crate) fn sprite_rect(s: &SceneSprite, tile_px: u32) -> Rect {
    let size = f64::from(tile_px) * s.transform.scale;
    Rect::new(
        s.transform.x,
        s.transform.y,
        s.transform.x + size,
        s.transform.y + size,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/engine/scene.rs"]
mod tests;
