use rand::Rng;

use crate::atlas::document::AtlasTile;
use crate::config::ScoreWeights;
use crate::foundation::error::{PhotoglyphError, PhotoglyphResult};
use crate::glyph::mask::GlyphMask;
use crate::mapper::score::TilePools;

/// Tile chosen for one mask cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellAssignment {
    /// Index into the atlas tile list.
    pub tile: usize,
    /// Whether the cell's center pixel is ink.
    pub foreground: bool,
}

/// Row-major tile choice for every cell of a mask partitioned into `cell_size` squares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileAssignment {
    pub cols: u32,
    pub rows: u32,
    pub cell_size: u32,
    pub cells: Vec<CellAssignment>,
    pub foreground_pool: Vec<usize>,
    pub background_pool: Vec<usize>,
}

impl TileAssignment {
    pub fn cell(&self, col: u32, row: u32) -> Option<&CellAssignment> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells.get(row as usize * self.cols as usize + col as usize)
    }

    pub fn foreground_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.foreground).count()
    }
}

/// Assign an atlas tile to every cell of `mask`.
///
/// Each cell samples the mask at its center pixel (clamped to the mask). Foreground cells draw
/// round-robin from the foreground pool, background cells from the background pool; the two
/// cursors advance independently.
#[tracing::instrument(skip(mask, tiles, weights, rng), fields(tiles = tiles.len()))]
pub fn assign_tiles<R: Rng + ?Sized>(
    mask: &GlyphMask,
    tiles: &[AtlasTile],
    cell_size: u32,
    weights: &ScoreWeights,
    rng: &mut R,
) -> PhotoglyphResult<TileAssignment> {
    if tiles.is_empty() {
        return Err(PhotoglyphError::empty_atlas("no atlas tiles to assign"));
    }
    if cell_size == 0 {
        return Err(PhotoglyphError::validation("mapper cell size must be > 0"));
    }
    if mask.width() == 0 || mask.height() == 0 {
        return Err(PhotoglyphError::validation("glyph mask is empty"));
    }

    let pools = TilePools::build(tiles, weights, rng);
    let cols = mask.width().div_ceil(cell_size);
    let rows = mask.height().div_ceil(cell_size);
    let half = cell_size / 2;

    let mut cells = Vec::with_capacity(cols as usize * rows as usize);
    let (mut fg_next, mut bg_next) = (0usize, 0usize);
    for row in 0..rows {
        let y = (row * cell_size + half).min(mask.height() - 1);
        for col in 0..cols {
            let x = (col * cell_size + half).min(mask.width() - 1);
            let foreground = mask.get(x, y);
            let tile = if foreground {
                let t = pools.foreground[fg_next % pools.foreground.len()];
                fg_next += 1;
                t
            } else {
                let t = pools.background[bg_next % pools.background.len()];
                bg_next += 1;
                t
            };
            cells.push(CellAssignment { tile, foreground });
        }
    }

    tracing::debug!(cols, rows, foreground = fg_next, "tiles assigned");
    Ok(TileAssignment {
        cols,
        rows,
        cell_size,
        cells,
        foreground_pool: pools.foreground,
        background_pool: pools.background,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/mapper/assign.rs"]
mod tests;
