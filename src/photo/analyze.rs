use crate::foundation::core::Rgb8;
use crate::foundation::error::{PhotoglyphError, PhotoglyphResult};

/// Visual statistics of one decoded photo.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PhotoStats {
    pub width: u32,
    pub height: u32,
    pub avg_color: Rgb8,
    /// Rec. 601 luma of the mean channel values, `[0, 255]`.
    pub luma: f64,
    /// `(max - min) / max` of the mean channel values, `[0, 1]`.
    pub saturation: f64,
    /// Detected container format, lowercase.
    pub format: Option<String>,
}

/// Decode encoded image bytes and compute brightness, saturation and mean color.
///
/// Luma and saturation are derived from the per-channel means rather than averaged per pixel.
/// Alpha is ignored.
pub fn analyze_photo(bytes: &[u8]) -> PhotoglyphResult<PhotoStats> {
    let img = decode_dynamic(bytes)?;
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let px_count = u64::from(width) * u64::from(height);
    if px_count == 0 {
        return Err(PhotoglyphError::decode("image has no pixels"));
    }

    let mut sums = [0u64; 3];
    for px in rgb.pixels() {
        sums[0] += u64::from(px[0]);
        sums[1] += u64::from(px[1]);
        sums[2] += u64::from(px[2]);
    }
    let mean = |s: u64| -> u8 { ((s + px_count / 2) / px_count).min(255) as u8 };
    let avg_color = Rgb8::new(mean(sums[0]), mean(sums[1]), mean(sums[2]));

    Ok(PhotoStats {
        width,
        height,
        avg_color,
        luma: avg_color.luma().clamp(0.0, 255.0),
        saturation: avg_color.saturation().clamp(0.0, 1.0),
        format: image::guess_format(bytes)
            .ok()
            .and_then(|f| f.extensions_str().first().copied())
            .map(str::to_string),
    })
}

pub(crate) fn decode_dynamic(bytes: &[u8]) -> PhotoglyphResult<image::DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| PhotoglyphError::decode(e.to_string()))
}

#[cfg(test)]
#[path = "../../tests/unit/photo/analyze.rs"]
mod tests;
