use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use anyhow::Context;

use crate::atlas::document::{AtlasDocument, AtlasMetadata};
use crate::foundation::error::{PhotoglyphError, PhotoglyphResult};
use crate::store::{AtlasStore, read_file, write_atomic};

const ATLAS_DIR: &str = "atlas";
const POINTER_FILE: &str = "current.json";

/// One consistent atlas generation: the pointer document and the metadata it names.
#[derive(Clone, Debug, PartialEq)]
pub struct AtlasSnapshot {
    pub document: AtlasDocument,
    pub metadata: AtlasMetadata,
}

/// Atlas store rooted in a directory.
///
/// Each build writes `atlas/atlas-<build>.png` and `atlas/atlas-<build>.json`, then renames
/// `atlas/current.json` into place. Older builds stay on disk; only the pointer moves.
pub struct FsAtlasStore {
    root: PathBuf,
    current: RwLock<Option<Arc<AtlasSnapshot>>>,
    build_lock: Mutex<()>,
}

impl FsAtlasStore {
    pub fn open(root: impl Into<PathBuf>) -> PhotoglyphResult<Self> {
        let root = root.into();
        let dir = root.join(ATLAS_DIR);
        std::fs::create_dir_all(&dir).with_context(|| format!("create dir '{}'", dir.display()))?;
        let current = load_pointer(&root)?.map(Arc::new);
        Ok(Self {
            root,
            current: RwLock::new(current),
            build_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a store-relative document path.
    pub fn resolve(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Absolute path of the pointer document.
    pub fn pointer_path(root: &Path) -> PathBuf {
        root.join(ATLAS_DIR).join(POINTER_FILE)
    }
}

fn load_pointer(root: &Path) -> PhotoglyphResult<Option<AtlasSnapshot>> {
    let pointer = FsAtlasStore::pointer_path(root);
    if !pointer.is_file() {
        return Ok(None);
    }
    let document: AtlasDocument = serde_json::from_slice(&read_file(&pointer)?)?;
    let metadata = AtlasMetadata::from_json_slice(&read_file(&root.join(&document.metadata_path))?)?;
    Ok(Some(AtlasSnapshot { document, metadata }))
}

impl AtlasStore for FsAtlasStore {
    fn current(&self) -> PhotoglyphResult<Option<Arc<AtlasSnapshot>>> {
        let guard = self
            .current
            .read()
            .map_err(|_| PhotoglyphError::Other(anyhow::anyhow!("atlas lock poisoned")))?;
        Ok(guard.clone())
    }

    #[tracing::instrument(skip(self, image_png, metadata), fields(tiles = metadata.tiles.len()))]
    fn replace(
        &self,
        image_png: &[u8],
        metadata: &AtlasMetadata,
    ) -> PhotoglyphResult<Arc<AtlasSnapshot>> {
        metadata.validate()?;
        let _build = self
            .build_lock
            .lock()
            .map_err(|_| PhotoglyphError::Other(anyhow::anyhow!("atlas build lock poisoned")))?;

        let build_id = metadata.build_id();
        let image_path = format!("{ATLAS_DIR}/atlas-{build_id}.png");
        let metadata_path = format!("{ATLAS_DIR}/atlas-{build_id}.json");
        write_atomic(&self.root.join(&image_path), image_png)?;
        write_atomic(&self.root.join(&metadata_path), &metadata.to_json_vec()?)?;

        let document = AtlasDocument {
            build_id,
            image_path,
            metadata_path,
            tile_count: metadata.tiles.len(),
            width: metadata.width,
            height: metadata.height,
            tile_size: metadata.tile_size,
        };
        write_atomic(
            &Self::pointer_path(&self.root),
            &serde_json::to_vec_pretty(&document)?,
        )?;

        let snapshot = Arc::new(AtlasSnapshot {
            document,
            metadata: metadata.clone(),
        });
        let mut guard = self
            .current
            .write()
            .map_err(|_| PhotoglyphError::Other(anyhow::anyhow!("atlas lock poisoned")))?;
        *guard = Some(Arc::clone(&snapshot));
        tracing::debug!(build = %snapshot.document.build_id, "atlas pointer swapped");
        Ok(snapshot)
    }

    fn read_image(&self, document: &AtlasDocument) -> PhotoglyphResult<Vec<u8>> {
        read_file(&self.root.join(&document.image_path))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/atlas.rs"]
mod tests;
