//! Photoglyph turns a photo collection into a scrolling mosaic ticker.
//!
//! The pipeline has two halves:
//!
//! - Offline: analyze uploaded photos, encode delivery variants, and pack them into a single
//!   sprite atlas ([`photo`], [`store`], [`atlas`]).
//! - Live: rasterize ticker text into a glyph mask, map atlas tiles onto mask cells, and drive a
//!   frame-by-frame scrolling scene on a host [`Surface`] ([`glyph`], [`mapper`], [`engine`]).
#![forbid(unsafe_code)]

mod foundation;

pub mod atlas;
pub mod config;
pub mod engine;
pub mod glyph;
pub mod mapper;
pub mod photo;
pub mod store;

pub use crate::foundation::core::{PixelRect, Point, Rect, Rgb8, Viewport};
pub use crate::foundation::error::{PhotoglyphError, PhotoglyphResult};

pub use crate::atlas::{AtlasBuild, AtlasDocument, AtlasMetadata, AtlasTile, build_atlas};
pub use crate::config::{EngineConfig, PartialConfig, QualityPolicy, ScrollDirection, Settings};
pub use crate::engine::{
    AssetLoader, Engine, EngineOptions, EngineState, FrameRGBA, FsAssetLoader, InMemorySurface,
    PngSequenceSurface, Surface,
};
pub use crate::glyph::{FontSource, GlyphMask, GlyphRasterizer};
pub use crate::mapper::{TileAssignment, assign_tiles};
pub use crate::photo::{BatchReport, PhotoRecord, analyze_photo, ingest, reindex};
pub use crate::store::{AtlasStore, FsAtlasStore, FsPhotoStore, PhotoStore};
