//! Packed sprite atlas: grid layout, compositing and the persisted metadata document.

pub mod builder;
pub mod document;
pub mod layout;

pub use builder::{AtlasBuild, PackedAtlas, build_atlas, pack_atlas};
pub use document::{AtlasDocument, AtlasMetadata, AtlasTile};
pub use layout::{GridLayout, sort_for_packing, tiles_per_row};
