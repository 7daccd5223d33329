use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::Context;

use crate::foundation::error::{PhotoglyphError, PhotoglyphResult};
use crate::photo::record::{
    PhotoRecord, VariantEncoding, VariantEntry, VariantSize, variant_rel_path,
};
use crate::store::{PhotoStore, read_file, validate_filename, write_atomic};

const CATALOG_FILE: &str = "catalog.json";
const ORIGINALS_DIR: &str = "originals";

/// Photo catalog rooted in a directory:
///
/// ```text
/// <root>/catalog.json
/// <root>/originals/<filename>
/// <root>/variants/<stem>/<size>.<ext>
/// ```
pub struct FsPhotoStore {
    root: PathBuf,
    catalog: Mutex<Vec<PhotoRecord>>,
}

impl FsPhotoStore {
    /// Open (or initialize) a store, loading an existing catalog.
    pub fn open(root: impl Into<PathBuf>) -> PhotoglyphResult<Self> {
        let root = root.into();
        let originals = root.join(ORIGINALS_DIR);
        std::fs::create_dir_all(&originals)
            .with_context(|| format!("create dir '{}'", originals.display()))?;

        let catalog_path = root.join(CATALOG_FILE);
        let catalog = if catalog_path.is_file() {
            serde_json::from_slice(&read_file(&catalog_path)?)?
        } else {
            Vec::new()
        };

        Ok(Self {
            root,
            catalog: Mutex::new(catalog),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store an uploaded original under its filename.
    pub fn put_original(&self, filename: &str, bytes: &[u8]) -> PhotoglyphResult<()> {
        let name = validate_filename(filename)?;
        write_atomic(&self.root.join(ORIGINALS_DIR).join(name), bytes)
    }

    fn lock(&self) -> PhotoglyphResult<MutexGuard<'_, Vec<PhotoRecord>>> {
        self.catalog
            .lock()
            .map_err(|_| PhotoglyphError::Other(anyhow::anyhow!("photo catalog lock poisoned")))
    }

    fn persist(&self, catalog: &[PhotoRecord]) -> PhotoglyphResult<()> {
        let bytes = serde_json::to_vec_pretty(catalog)?;
        write_atomic(&self.root.join(CATALOG_FILE), &bytes)
    }
}

impl PhotoStore for FsPhotoStore {
    fn list_photos(&self) -> PhotoglyphResult<Vec<PhotoRecord>> {
        Ok(self.lock()?.clone())
    }

    fn list_originals(&self) -> PhotoglyphResult<Vec<String>> {
        let dir = self.root.join(ORIGINALS_DIR);
        let rd = std::fs::read_dir(&dir).with_context(|| format!("list '{}'", dir.display()))?;
        let mut out = Vec::new();
        for entry in rd.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            if name.starts_with('.') || name.contains(".tmp-") {
                continue;
            }
            out.push(name.to_string());
        }
        out.sort();
        Ok(out)
    }

    fn read_original(&self, filename: &str) -> PhotoglyphResult<Vec<u8>> {
        let name = validate_filename(filename)?;
        read_file(&self.root.join(ORIGINALS_DIR).join(name))
    }

    fn read_variant(
        &self,
        filename: &str,
        size: VariantSize,
        encoding: VariantEncoding,
    ) -> PhotoglyphResult<Vec<u8>> {
        let name = validate_filename(filename)?;
        read_file(&self.root.join(variant_rel_path(name, size, encoding)))
    }

    fn put_variant(
        &self,
        filename: &str,
        size: VariantSize,
        encoding: VariantEncoding,
        data: &[u8],
    ) -> PhotoglyphResult<VariantEntry> {
        let name = validate_filename(filename)?;
        let rel = variant_rel_path(name, size, encoding);
        write_atomic(&self.root.join(&rel), data)?;
        Ok(VariantEntry {
            size,
            encoding,
            bytes: data.len() as u64,
            path: rel,
        })
    }

    fn upsert_photo(&self, mut record: PhotoRecord) -> PhotoglyphResult<PhotoRecord> {
        validate_filename(&record.filename)?;
        let mut catalog = self.lock()?;
        match catalog.iter_mut().find(|r| r.filename == record.filename) {
            Some(existing) => {
                record.id = existing.id;
                *existing = record.clone();
            }
            None => {
                record.id = catalog.iter().map(|r| r.id).max().map_or(1, |m| m + 1);
                catalog.push(record.clone());
            }
        }
        self.persist(&catalog)?;
        Ok(record)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/photos.rs"]
mod tests;
