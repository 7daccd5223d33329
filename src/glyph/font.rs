use std::path::Path;
use std::sync::Arc;

use crate::foundation::error::{PhotoglyphError, PhotoglyphResult};

/// Font bytes that parley accepted, plus the family name they registered under.
#[derive(Clone, Debug)]
pub struct FontSource {
    bytes: Arc<Vec<u8>>,
    family: String,
}

impl FontSource {
    /// Verify that `bytes` hold a usable font by registering them with a fresh font collection.
    pub fn from_bytes(bytes: Vec<u8>) -> PhotoglyphResult<Self> {
        if bytes.is_empty() {
            return Err(PhotoglyphError::font_unavailable("font data is empty"));
        }
        let mut ctx = parley::FontContext::default();
        let families = ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            PhotoglyphError::font_unavailable("no font families registered from font bytes")
        })?;
        let family = ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| PhotoglyphError::font_unavailable("registered font family has no name"))?
            .to_string();
        Ok(Self {
            bytes: Arc::new(bytes),
            family,
        })
    }

    /// Read and verify a font file. Resolves once the font is ready for rasterization.
    pub async fn load(path: impl AsRef<Path>) -> PhotoglyphResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            PhotoglyphError::font_unavailable(format!("read font '{}': {e}", path.display()))
        })?;
        Self::from_bytes(bytes)
    }

    /// Blocking variant of [`FontSource::load`] for synchronous callers.
    pub fn load_blocking(path: impl AsRef<Path>) -> PhotoglyphResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            PhotoglyphError::font_unavailable(format!("read font '{}': {e}", path.display()))
        })?;
        Self::from_bytes(bytes)
    }

    pub fn bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    pub fn family(&self) -> &str {
        &self.family
    }
}

#[cfg(test)]
#[path = "../../tests/unit/glyph/font.rs"]
mod tests;
