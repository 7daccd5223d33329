use std::cmp::Ordering;

use crate::config::AtlasOpts;
use crate::foundation::core::PixelRect;
use crate::foundation::error::{PhotoglyphError, PhotoglyphResult};
use crate::photo::record::PhotoRecord;

/// Packing order: luma descending, then saturation descending, then filename.
pub fn packing_cmp(a: &PhotoRecord, b: &PhotoRecord) -> Ordering {
    b.luma
        .total_cmp(&a.luma)
        .then_with(|| b.saturation.total_cmp(&a.saturation))
        .then_with(|| a.filename.cmp(&b.filename))
}

pub fn sort_for_packing(photos: &mut [PhotoRecord]) {
    photos.sort_by(packing_cmp);
}

/// `ceil(sqrt(n))`, capped at `row_cap`.
pub fn tiles_per_row(n: usize, row_cap: u32) -> u32 {
    if n == 0 {
        return 0;
    }
    let mut side = (n as f64).sqrt().ceil() as u64;
    // Float rounding guard for large perfect squares.
    while side > 1 && (side - 1) * (side - 1) >= n as u64 {
        side -= 1;
    }
    while side * side < n as u64 {
        side += 1;
    }
    side.min(u64::from(row_cap.max(1))) as u32
}

/// Square-cell grid for `count` tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLayout {
    pub count: usize,
    pub tiles_per_row: u32,
    pub rows: u32,
    pub cell_size: u32,
}

impl GridLayout {
    pub fn new(count: usize, opts: &AtlasOpts) -> PhotoglyphResult<Self> {
        opts.validate()?;
        if count == 0 {
            return Err(PhotoglyphError::empty_atlas("no tiles to lay out"));
        }
        let tpr = tiles_per_row(count, opts.row_cap());
        let rows = count.div_ceil(tpr as usize);
        let rows = u32::try_from(rows)
            .map_err(|_| PhotoglyphError::validation("atlas row count exceeds u32"))?;
        rows.checked_mul(opts.cell_size)
            .ok_or_else(|| PhotoglyphError::validation("atlas height exceeds u32"))?;
        Ok(Self {
            count,
            tiles_per_row: tpr,
            rows,
            cell_size: opts.cell_size,
        })
    }

    pub fn width(&self) -> u32 {
        self.tiles_per_row * self.cell_size
    }

    pub fn height(&self) -> u32 {
        self.rows * self.cell_size
    }

    /// Rectangle of placement slot `i`: column `i mod tpr`, row `i div tpr`.
    pub fn cell(&self, i: usize) -> PixelRect {
        let tpr = self.tiles_per_row as usize;
        let col = (i % tpr) as u32;
        let row = (i / tpr) as u32;
        PixelRect::new(
            col * self.cell_size,
            row * self.cell_size,
            self.cell_size,
            self.cell_size,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/atlas/layout.rs"]
mod tests;
