use image::ImageEncoder;
use image::imageops::FilterType;
use rayon::prelude::*;

use crate::config::VariantOpts;
use crate::foundation::error::{PhotoglyphError, PhotoglyphResult};
use crate::photo::analyze::decode_dynamic;
use crate::photo::record::{VariantEncoding, VariantSet, VariantSize, variant_matrix};
use crate::store::PhotoStore;

/// One `(size, encoding)` pair that could not be produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantFailure {
    pub size: VariantSize,
    pub encoding: VariantEncoding,
    pub message: String,
}

/// Result of regenerating one photo's variants.
///
/// A non-empty `failures` list is the degraded state: `set` is incomplete until the photo is
/// reprocessed.
#[derive(Clone, Debug)]
pub struct VariantOutcome {
    pub filename: String,
    pub set: VariantSet,
    pub failures: Vec<VariantFailure>,
}

impl VariantOutcome {
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Collapse into the full set, or an [`PhotoglyphError::Encode`] naming every failed pair.
    pub fn into_result(self) -> PhotoglyphResult<VariantSet> {
        if self.failures.is_empty() {
            return Ok(self.set);
        }
        let detail = self
            .failures
            .iter()
            .map(|f| format!("{}/{}: {}", f.size.as_str(), f.encoding.extension(), f.message))
            .collect::<Vec<_>>()
            .join("; ");
        Err(PhotoglyphError::encode(format!(
            "'{}' has {} missing variant(s): {detail}",
            self.filename,
            self.failures.len()
        )))
    }
}

/// Cover-fit `img` to an `edge`x`edge` square (centered crop) and encode it.
pub fn encode_variant(
    img: &image::DynamicImage,
    edge: u32,
    encoding: VariantEncoding,
    opts: &VariantOpts,
) -> PhotoglyphResult<Vec<u8>> {
    let square = img.resize_to_fill(edge, edge, FilterType::Lanczos3).to_rgb8();
    encode_rgb(&square, encoding, opts)
}

fn encode_rgb(
    rgb: &image::RgbImage,
    encoding: VariantEncoding,
    opts: &VariantOpts,
) -> PhotoglyphResult<Vec<u8>> {
    let (w, h) = rgb.dimensions();
    let mut out = Vec::new();
    let res = match encoding {
        VariantEncoding::Avif => image::codecs::avif::AvifEncoder::new_with_speed_quality(
            &mut out,
            opts.avif_speed,
            opts.avif_quality,
        )
        .write_image(rgb.as_raw(), w, h, image::ExtendedColorType::Rgb8),
        VariantEncoding::Webp => image::codecs::webp::WebPEncoder::new_lossless(&mut out).write_image(
            rgb.as_raw(),
            w,
            h,
            image::ExtendedColorType::Rgb8,
        ),
        VariantEncoding::Jpeg => {
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, opts.jpeg_quality)
                .write_image(rgb.as_raw(), w, h, image::ExtendedColorType::Rgb8)
        }
    };
    res.map_err(|e| {
        PhotoglyphError::encode(format!("{} encode failed: {e}", encoding.extension()))
    })?;
    Ok(out)
}

/// Produce the full size x encoding matrix for one source photo and write it to `store`.
///
/// A source that cannot be decoded fails the whole photo. Individual encode or write failures are
/// collected in the returned outcome instead; every successful pair is still stored.
#[tracing::instrument(skip(source, store, opts), fields(bytes = source.len()))]
pub fn generate_variants(
    filename: &str,
    source: &[u8],
    store: &dyn PhotoStore,
    opts: &VariantOpts,
) -> PhotoglyphResult<VariantOutcome> {
    opts.validate()?;
    let img = decode_dynamic(source)?;

    let fitted: Vec<(VariantSize, image::RgbImage)> = VariantSize::ALL
        .into_par_iter()
        .map(|size| {
            let edge = opts.edge_px(size);
            (size, img.resize_to_fill(edge, edge, FilterType::Lanczos3).to_rgb8())
        })
        .collect();

    let encoded: Vec<(VariantSize, VariantEncoding, PhotoglyphResult<Vec<u8>>)> =
        variant_matrix()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|(size, encoding)| {
                let res = fitted
                    .iter()
                    .find(|(s, _)| *s == size)
                    .ok_or_else(|| PhotoglyphError::encode("missing fitted source"))
                    .and_then(|(_, rgb)| encode_rgb(rgb, encoding, opts));
                (size, encoding, res)
            })
            .collect();

    let mut set = VariantSet::new();
    let mut failures = Vec::new();
    for (size, encoding, res) in encoded {
        match res.and_then(|bytes| store.put_variant(filename, size, encoding, &bytes)) {
            Ok(entry) => set.insert(entry),
            Err(e) => failures.push(VariantFailure {
                size,
                encoding,
                message: e.to_string(),
            }),
        }
    }

    if !failures.is_empty() {
        tracing::warn!(
            filename,
            missing = failures.len(),
            "variant set is incomplete"
        );
    }

    Ok(VariantOutcome {
        filename: filename.to_string(),
        set,
        failures,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/photo/variants.rs"]
mod tests;
