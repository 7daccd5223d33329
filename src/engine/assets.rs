use std::future::Future;
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use crate::atlas::document::{AtlasDocument, AtlasMetadata};
use crate::foundation::error::{PhotoglyphError, PhotoglyphResult};
use crate::glyph::font::FontSource;
use crate::store::{AtlasStore, FsAtlasStore};

/// Everything a session needs before it can build its first scene.
#[derive(Clone, Debug)]
pub struct LoadedAssets {
    pub font: FontSource,
    pub atlas_image: image::RgbaImage,
    pub metadata: AtlasMetadata,
}

/// Source of the three one-shot loads gating engine initialization.
pub trait AssetLoader {
    fn load_font(&self) -> impl Future<Output = PhotoglyphResult<FontSource>>;

    fn load_atlas_image(&self) -> impl Future<Output = PhotoglyphResult<image::RgbaImage>>;

    fn load_atlas_metadata(&self) -> impl Future<Output = PhotoglyphResult<AtlasMetadata>>;
}

/// Run all three loads concurrently. The first failure wins; cancelling `cancel` abandons the
/// whole set.
pub async fn load_all<L: AssetLoader>(
    loader: &L,
    cancel: &CancellationToken,
) -> PhotoglyphResult<LoadedAssets> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PhotoglyphError::engine("initialization cancelled")),
        res = async {
            tokio::try_join!(
                loader.load_font(),
                loader.load_atlas_image(),
                loader.load_atlas_metadata(),
            )
        } => {
            let (font, atlas_image, metadata) = res?;
            Ok(LoadedAssets { font, atlas_image, metadata })
        }
    }
}

pub(crate) fn decode_atlas_png(bytes: &[u8]) -> PhotoglyphResult<image::RgbaImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| PhotoglyphError::decode(format!("atlas image: {e}")))
}

/// Loads the font from a file and the live atlas from an atlas store directory.
#[derive(Clone, Debug)]
pub struct FsAssetLoader {
    font_path: PathBuf,
    atlas_root: PathBuf,
    document: AtlasDocument,
}

impl FsAssetLoader {
    /// Resolve the current atlas pointer up front so image and metadata come from the same build.
    pub fn new(font_path: impl Into<PathBuf>, store: &FsAtlasStore) -> PhotoglyphResult<Self> {
        let snapshot = store
            .current()?
            .ok_or_else(|| PhotoglyphError::empty_atlas("no atlas has been built yet"))?;
        Ok(Self {
            font_path: font_path.into(),
            atlas_root: store.root().to_path_buf(),
            document: snapshot.document.clone(),
        })
    }

    pub fn document(&self) -> &AtlasDocument {
        &self.document
    }

    async fn read(&self, rel: &str) -> PhotoglyphResult<Vec<u8>> {
        let path = self.atlas_root.join(rel);
        tokio::fs::read(&path)
            .await
            .map_err(|e| PhotoglyphError::Other(anyhow::anyhow!("read '{}': {e}", path.display())))
    }

    pub fn font_path(&self) -> &Path {
        &self.font_path
    }
}

impl AssetLoader for FsAssetLoader {
    async fn load_font(&self) -> PhotoglyphResult<FontSource> {
        FontSource::load(&self.font_path).await
    }

    async fn load_atlas_image(&self) -> PhotoglyphResult<image::RgbaImage> {
        decode_atlas_png(&self.read(&self.document.image_path).await?)
    }

    async fn load_atlas_metadata(&self) -> PhotoglyphResult<AtlasMetadata> {
        AtlasMetadata::from_json_slice(&self.read(&self.document.metadata_path).await?)
    }
}

/// Serves assets that are already in memory.
#[derive(Clone, Debug)]
pub struct MemoryAssetLoader {
    pub font: Vec<u8>,
    pub atlas_png: Vec<u8>,
    pub metadata_json: Vec<u8>,
}

impl AssetLoader for MemoryAssetLoader {
    async fn load_font(&self) -> PhotoglyphResult<FontSource> {
        FontSource::from_bytes(self.font.clone())
    }

    async fn load_atlas_image(&self) -> PhotoglyphResult<image::RgbaImage> {
        decode_atlas_png(&self.atlas_png)
    }

    async fn load_atlas_metadata(&self) -> PhotoglyphResult<AtlasMetadata> {
        AtlasMetadata::from_json_slice(&self.metadata_json)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/assets.rs"]
mod tests;
