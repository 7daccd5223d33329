//! Text to binary occupancy mask.

pub mod font;
pub mod mask;

pub use font::FontSource;
pub use mask::{GlyphMask, GlyphRasterizer, Ink};
