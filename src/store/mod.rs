//! Storage collaborators: the photo catalog and the singleton atlas.
//!
//! The core only talks to the [`PhotoStore`] and [`AtlasStore`] traits. The filesystem
//! implementations keep every write atomic (temp file + rename) so a crashed build never leaves a
//! half-written catalog or atlas pointer behind.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::atlas::document::{AtlasDocument, AtlasMetadata};
use crate::foundation::error::{PhotoglyphError, PhotoglyphResult};
use crate::photo::record::{PhotoRecord, VariantEncoding, VariantEntry, VariantSize};

mod atlas;
mod photos;

pub use atlas::{AtlasSnapshot, FsAtlasStore};
pub use photos::FsPhotoStore;

/// Photo catalog: records, originals and variant files.
pub trait PhotoStore: Send + Sync {
    /// All records, in insertion order.
    fn list_photos(&self) -> PhotoglyphResult<Vec<PhotoRecord>>;

    /// Filenames of every stored original.
    fn list_originals(&self) -> PhotoglyphResult<Vec<String>>;

    fn read_original(&self, filename: &str) -> PhotoglyphResult<Vec<u8>>;

    fn read_variant(
        &self,
        filename: &str,
        size: VariantSize,
        encoding: VariantEncoding,
    ) -> PhotoglyphResult<Vec<u8>>;

    /// Write one variant file at its deterministic path.
    fn put_variant(
        &self,
        filename: &str,
        size: VariantSize,
        encoding: VariantEncoding,
        data: &[u8],
    ) -> PhotoglyphResult<VariantEntry>;

    /// Create or wholesale-replace a record keyed by filename; returns it with its id assigned.
    fn upsert_photo(&self, record: PhotoRecord) -> PhotoglyphResult<PhotoRecord>;
}

/// Singleton atlas holder with atomic replacement.
pub trait AtlasStore: Send + Sync {
    /// The live atlas, if one was ever built. Snapshots are immutable.
    fn current(&self) -> PhotoglyphResult<Option<Arc<AtlasSnapshot>>>;

    /// Persist a new atlas and repoint readers to it in one step.
    fn replace(
        &self,
        image_png: &[u8],
        metadata: &AtlasMetadata,
    ) -> PhotoglyphResult<Arc<AtlasSnapshot>>;

    fn read_image(&self, document: &AtlasDocument) -> PhotoglyphResult<Vec<u8>>;
}

/// Reject names that could escape the store directory.
pub fn validate_filename(name: &str) -> PhotoglyphResult<&str> {
    if name.is_empty() {
        return Err(PhotoglyphError::validation("filename must be non-empty"));
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(PhotoglyphError::validation(format!(
            "filename '{name}' must be a plain file name"
        )));
    }
    Ok(name)
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> PhotoglyphResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir '{}'", parent.display()))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(format!(".tmp-{}", std::process::id()));
    let tmp = std::path::PathBuf::from(tmp);
    std::fs::write(&tmp, bytes).with_context(|| format!("write '{}'", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("rename '{}' -> '{}'", tmp.display(), path.display()))?;
    Ok(())
}

pub(crate) fn read_file(path: &Path) -> PhotoglyphResult<Vec<u8>> {
    std::fs::read(path)
        .with_context(|| format!("read '{}'", path.display()))
        .map_err(PhotoglyphError::from)
}

#[cfg(test)]
#[path = "../../tests/unit/store/mod.rs"]
mod tests;
