use crate::foundation::core::Rgb8;
use crate::foundation::math::Fnv1a64;

/// Target edge length class for a delivery variant.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VariantSize {
    Small,
    Medium,
    Large,
}

impl VariantSize {
    pub const ALL: [Self; 3] = [Self::Small, Self::Medium, Self::Large];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

/// Delivery encoding of a variant.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VariantEncoding {
    /// Modern lossy (AVIF).
    Avif,
    /// Widely supported (WebP).
    Webp,
    /// Universal lossy (JPEG).
    Jpeg,
}

impl VariantEncoding {
    pub const ALL: [Self; 3] = [Self::Avif, Self::Webp, Self::Jpeg];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Avif => "avif",
            Self::Webp => "webp",
            Self::Jpeg => "jpg",
        }
    }

    pub fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Avif => image::ImageFormat::Avif,
            Self::Webp => image::ImageFormat::WebP,
            Self::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

/// Every `(size, encoding)` pair a complete variant set holds.
pub fn variant_matrix() -> impl Iterator<Item = (VariantSize, VariantEncoding)> {
    VariantSize::ALL
        .into_iter()
        .flat_map(|s| VariantEncoding::ALL.into_iter().map(move |e| (s, e)))
}

/// Store-relative path of a variant file, derived only from its identity.
///
/// The directory is a readable stem slug plus an FNV-1a hash of the exact filename, so names that
/// slug alike (`beach.jpg`, `Beach.png`) never share variant files.
pub fn variant_rel_path(filename: &str, size: VariantSize, encoding: VariantEncoding) -> String {
    format!(
        "variants/{}-{}/{}.{}",
        file_stem_slug(filename),
        filename_hash(filename),
        size.as_str(),
        encoding.extension()
    )
}

fn filename_hash(filename: &str) -> String {
    let mut h = Fnv1a64::new_default();
    h.write_bytes(filename.as_bytes());
    format!("{:016x}", h.finish())
}

fn file_stem_slug(filename: &str) -> String {
    let stem = match filename.rsplit_once('.') {
        Some((s, _)) if !s.is_empty() => s,
        _ => filename,
    };
    stem.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// One encoded variant file.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VariantEntry {
    pub size: VariantSize,
    pub encoding: VariantEncoding,
    pub bytes: u64,
    /// Store-relative path.
    pub path: String,
}

/// All variants of one photo; at most one entry per `(size, encoding)`.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct VariantSet {
    entries: Vec<VariantEntry>,
}

impl VariantSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing an existing one with the same `(size, encoding)`.
    pub fn insert(&mut self, entry: VariantEntry) {
        if let Some(slot) = self
            .entries
            .iter_mut()
            .find(|e| e.size == entry.size && e.encoding == entry.encoding)
        {
            *slot = entry;
        } else {
            self.entries.push(entry);
            self.entries.sort_by_key(|e| (e.size, e.encoding));
        }
    }

    pub fn get(&self, size: VariantSize, encoding: VariantEncoding) -> Option<&VariantEntry> {
        self.entries
            .iter()
            .find(|e| e.size == size && e.encoding == encoding)
    }

    pub fn entries(&self) -> &[VariantEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pairs of the full matrix with no entry.
    pub fn missing(&self) -> Vec<(VariantSize, VariantEncoding)> {
        variant_matrix()
            .filter(|&(s, e)| self.get(s, e).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

/// Per-photo catalog record with its visual statistics.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhotoRecord {
    /// Store-assigned id, stable across re-analysis.
    pub id: u64,
    /// Stable identity of the photo.
    pub filename: String,
    pub width: u32,
    pub height: u32,
    /// Size of the original file.
    pub bytes: u64,
    /// Detected source encoding (e.g. `"jpeg"`), if recognized.
    pub encoding: Option<String>,
    pub avg_color: Rgb8,
    /// Perceived brightness in `[0, 255]`.
    pub luma: f64,
    /// Saturation in `[0, 1]`.
    pub saturation: f64,
    #[serde(default)]
    pub variants: VariantSet,
}

#[cfg(test)]
#[path = "../../tests/unit/photo/record.rs"]
mod tests;
