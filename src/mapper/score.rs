use rand::Rng;
use rand::seq::SliceRandom;

use crate::atlas::document::AtlasTile;
use crate::config::ScoreWeights;

/// Higher is a better foreground (bright, saturated) tile.
pub fn foreground_score(tile: &AtlasTile, w: &ScoreWeights) -> f64 {
    w.fg_luma * tile.luma + w.fg_saturation * 100.0 * tile.saturation
}

/// Lower is a better background (dark, desaturated) tile.
pub fn background_score(tile: &AtlasTile, w: &ScoreWeights) -> f64 {
    w.bg_luma * tile.luma + w.bg_desaturation * 100.0 * (1.0 - tile.saturation)
}

/// Tile indices by foreground score, best first. Ties keep atlas order.
pub fn rank_foreground(tiles: &[AtlasTile], w: &ScoreWeights) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..tiles.len()).collect();
    idx.sort_by(|&a, &b| {
        foreground_score(&tiles[b], w)
            .total_cmp(&foreground_score(&tiles[a], w))
            .then(a.cmp(&b))
    });
    idx
}

/// Tile indices by background score, best (lowest) first. Ties keep atlas order.
pub fn rank_background(tiles: &[AtlasTile], w: &ScoreWeights) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..tiles.len()).collect();
    idx.sort_by(|&a, &b| {
        background_score(&tiles[a], w)
            .total_cmp(&background_score(&tiles[b], w))
            .then(a.cmp(&b))
    });
    idx
}

/// Number of ranked tiles kept in a pool: `ceil(n * fraction)`, at least one.
pub fn pool_len(n: usize, fraction: f64) -> usize {
    if n == 0 {
        return 0;
    }
    let f = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        1.0
    };
    ((n as f64 * f).ceil() as usize).clamp(1, n)
}

/// The two shuffled draw orders used by the mapper.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TilePools {
    pub foreground: Vec<usize>,
    pub background: Vec<usize>,
}

impl TilePools {
    /// Take the best-ranked share of each ordering and shuffle it independently.
    pub fn build<R: Rng + ?Sized>(tiles: &[AtlasTile], w: &ScoreWeights, rng: &mut R) -> Self {
        let keep = pool_len(tiles.len(), w.pool_fraction);
        let mut foreground = rank_foreground(tiles, w);
        foreground.truncate(keep);
        foreground.shuffle(rng);
        let mut background = rank_background(tiles, w);
        background.truncate(keep);
        background.shuffle(rng);
        Self {
            foreground,
            background,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mapper/score.rs"]
mod tests;
