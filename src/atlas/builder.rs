use std::io::Cursor;
use std::sync::Arc;

use image::imageops::FilterType;
use rayon::prelude::*;

use crate::atlas::document::{AtlasMetadata, AtlasTile};
use crate::atlas::layout::{GridLayout, sort_for_packing};
use crate::config::AtlasOpts;
use crate::foundation::error::{PhotoglyphError, PhotoglyphResult};
use crate::photo::batch::BatchFailure;
use crate::photo::record::{PhotoRecord, VariantEncoding, VariantSize};
use crate::store::{AtlasSnapshot, AtlasStore, PhotoStore};

/// Encodings tried, in order, when loading a photo's packing source.
const SOURCE_ENCODINGS: [VariantEncoding; 2] = [VariantEncoding::Jpeg, VariantEncoding::Webp];

/// Outcome of a successful atlas build.
#[derive(Clone, Debug)]
pub struct AtlasBuild {
    pub snapshot: Arc<AtlasSnapshot>,
    /// Photos left out because their mid-size variant was unavailable.
    pub skipped: Vec<BatchFailure>,
}

/// Packed image plus its metadata, before it is handed to an [`AtlasStore`].
#[derive(Clone, Debug)]
pub struct PackedAtlas {
    pub image: image::RgbaImage,
    pub metadata: AtlasMetadata,
    pub skipped: Vec<BatchFailure>,
}

impl PackedAtlas {
    pub fn encode_png(&self) -> PhotoglyphResult<Vec<u8>> {
        let mut out = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .map_err(|e| PhotoglyphError::encode(format!("atlas png encode failed: {e}")))?;
        Ok(out)
    }
}

fn load_cell(
    store: &dyn PhotoStore,
    photo: &PhotoRecord,
    cell: u32,
) -> Result<image::RgbaImage, String> {
    let mut last_err = String::from("no packing source");
    for encoding in SOURCE_ENCODINGS {
        let bytes = match store.read_variant(&photo.filename, VariantSize::Medium, encoding) {
            Ok(b) => b,
            Err(e) => {
                last_err = e.to_string();
                continue;
            }
        };
        match image::load_from_memory(&bytes) {
            Ok(img) => {
                return Ok(img
                    .resize_to_fill(cell, cell, FilterType::Triangle)
                    .to_rgba8());
            }
            Err(e) => last_err = format!("decode error: {e}"),
        }
    }
    Err(last_err)
}

/// Lay out and composite every photo that has a mid-size variant.
///
/// Photos whose variant is missing or unreadable are skipped and reported. The grid is sized for
/// the tiles actually placed, so the atlas has no holes in the middle.
pub fn pack_atlas(
    photo_store: &dyn PhotoStore,
    mut photos: Vec<PhotoRecord>,
    opts: &AtlasOpts,
) -> PhotoglyphResult<PackedAtlas> {
    opts.validate()?;
    if photos.is_empty() {
        return Err(PhotoglyphError::empty_atlas("no photos available"));
    }
    sort_for_packing(&mut photos);

    let loaded: Vec<(PhotoRecord, Result<image::RgbaImage, String>)> = photos
        .into_par_iter()
        .map(|p| {
            let cell = load_cell(photo_store, &p, opts.cell_size);
            (p, cell)
        })
        .collect();

    let mut placed = Vec::with_capacity(loaded.len());
    let mut skipped = Vec::new();
    for (photo, cell) in loaded {
        match cell {
            Ok(img) => placed.push((photo, img)),
            Err(message) => {
                tracing::warn!(filename = %photo.filename, %message, "skipping photo without packing source");
                skipped.push(BatchFailure {
                    filename: photo.filename,
                    message,
                });
            }
        }
    }
    if placed.is_empty() {
        return Err(PhotoglyphError::empty_atlas(format!(
            "none of {} photo(s) has a mid-size variant",
            skipped.len()
        )));
    }

    let grid = GridLayout::new(placed.len(), opts)?;
    let mut canvas = image::RgbaImage::new(grid.width(), grid.height());
    let mut tiles = Vec::with_capacity(placed.len());
    for (i, (photo, img)) in placed.into_iter().enumerate() {
        let rect = grid.cell(i);
        image::imageops::replace(&mut canvas, &img, i64::from(rect.x), i64::from(rect.y));
        tiles.push(AtlasTile {
            id: photo.id,
            filename: photo.filename,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            avg_color: photo.avg_color,
            luma: photo.luma,
            saturation: photo.saturation,
        });
    }

    Ok(PackedAtlas {
        image: canvas,
        metadata: AtlasMetadata {
            tiles,
            width: grid.width(),
            height: grid.height(),
            tile_size: grid.cell_size,
        },
        skipped,
    })
}

/// Build a new atlas from every catalogued photo and atomically make it the live one.
#[tracing::instrument(skip(photo_store, atlas_store, opts))]
pub fn build_atlas(
    photo_store: &dyn PhotoStore,
    atlas_store: &dyn AtlasStore,
    opts: &AtlasOpts,
) -> PhotoglyphResult<AtlasBuild> {
    let photos = photo_store.list_photos()?;
    let packed = pack_atlas(photo_store, photos, opts)?;
    let png = packed.encode_png()?;
    let snapshot = atlas_store.replace(&png, &packed.metadata)?;
    tracing::info!(
        build = %snapshot.document.build_id,
        tiles = snapshot.document.tile_count,
        skipped = packed.skipped.len(),
        "atlas built"
    );
    Ok(AtlasBuild {
        snapshot,
        skipped: packed.skipped,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/atlas/builder.rs"]
mod tests;
