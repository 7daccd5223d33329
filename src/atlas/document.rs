use crate::foundation::core::{PixelRect, Rgb8};
use crate::foundation::error::{PhotoglyphError, PhotoglyphResult};
use crate::foundation::math::Fnv1a64;

/// One packed tile: its rectangle in the atlas plus a copy of the photo's statistics.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlasTile {
    pub id: u64,
    pub filename: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub avg_color: Rgb8,
    pub luma: f64,
    pub saturation: f64,
}

impl AtlasTile {
    pub fn rect(&self) -> PixelRect {
        PixelRect::new(self.x, self.y, self.width, self.height)
    }
}

/// Persisted layout document describing every tile of one packed atlas image.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlasMetadata {
    pub tiles: Vec<AtlasTile>,
    pub width: u32,
    pub height: u32,
    pub tile_size: u32,
}

impl AtlasMetadata {
    pub fn from_json_slice(bytes: &[u8]) -> PhotoglyphResult<Self> {
        let meta: Self = serde_json::from_slice(bytes)?;
        meta.validate()?;
        Ok(meta)
    }

    pub fn to_json_vec(&self) -> PhotoglyphResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn validate(&self) -> PhotoglyphResult<()> {
        if self.tiles.is_empty() {
            return Err(PhotoglyphError::empty_atlas("atlas metadata lists no tiles"));
        }
        for t in &self.tiles {
            if t.width == 0 || t.height == 0 {
                return Err(PhotoglyphError::validation(format!(
                    "atlas tile '{}' has an empty rectangle",
                    t.filename
                )));
            }
            let r = t.rect();
            if r.right() > self.width || r.bottom() > self.height {
                return Err(PhotoglyphError::validation(format!(
                    "atlas tile '{}' lies outside the {}x{} atlas",
                    t.filename, self.width, self.height
                )));
            }
        }
        Ok(())
    }

    /// Content hash naming this build's files.
    pub fn build_id(&self) -> String {
        let mut h = Fnv1a64::new_default();
        h.write_u32(self.width);
        h.write_u32(self.height);
        h.write_u32(self.tile_size);
        for t in &self.tiles {
            h.write_bytes(t.filename.as_bytes());
            h.write_u8(0);
            h.write_u32(t.x);
            h.write_u32(t.y);
            h.write_u32(t.width);
            h.write_u32(t.height);
            h.write_bytes(&t.luma.to_bits().to_le_bytes());
            h.write_bytes(&t.saturation.to_bits().to_le_bytes());
        }
        format!("{:016x}", h.finish())
    }
}

/// Pointer to the live atlas: where its image and metadata live, and its headline numbers.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AtlasDocument {
    pub build_id: String,
    /// Store-relative path of the packed PNG.
    pub image_path: String,
    /// Store-relative path of the [`AtlasMetadata`] JSON.
    pub metadata_path: String,
    pub tile_count: usize,
    pub width: u32,
    pub height: u32,
    pub tile_size: u32,
}

#[cfg(test)]
#[path = "../../tests/unit/atlas/document.rs"]
mod tests;
