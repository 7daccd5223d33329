//! Tile-to-glyph mapping: desirability scoring and per-cell tile assignment.

pub mod assign;
pub mod score;

pub use assign::{CellAssignment, TileAssignment, assign_tiles};
pub use score::{TilePools, background_score, foreground_score, pool_len};
