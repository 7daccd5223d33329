use crate::config::VariantOpts;
use crate::foundation::error::PhotoglyphResult;
use crate::photo::analyze::analyze_photo;
use crate::photo::record::PhotoRecord;
use crate::photo::variants::generate_variants;
use crate::store::PhotoStore;

/// One photo that did not make it through a batch operation.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct BatchFailure {
    pub filename: String,
    pub message: String,
}

/// Per-item outcome of a batch operation.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub succeeded: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, filename: &str, message: String) {
        tracing::warn!(filename, %message, "batch item failed");
        self.failures.push(BatchFailure {
            filename: filename.to_string(),
            message,
        });
    }
}

/// Analyze one original, regenerate its variants and upsert its record.
///
/// The record is stored even when some variants failed, so the photo's degraded state stays
/// visible through [`VariantSet::missing`](crate::photo::record::VariantSet::missing); the encode
/// failure is still returned.
pub fn ingest(
    store: &dyn PhotoStore,
    filename: &str,
    bytes: &[u8],
    opts: &VariantOpts,
) -> PhotoglyphResult<PhotoRecord> {
    let stats = analyze_photo(bytes)?;
    let outcome = generate_variants(filename, bytes, store, opts)?;
    let record = store.upsert_photo(PhotoRecord {
        id: 0,
        filename: filename.to_string(),
        width: stats.width,
        height: stats.height,
        bytes: bytes.len() as u64,
        encoding: stats.format,
        avg_color: stats.avg_color,
        luma: stats.luma,
        saturation: stats.saturation,
        variants: outcome.set.clone(),
    })?;
    outcome.into_result()?;
    Ok(record)
}

/// Re-analyze every stored original and regenerate its variants.
///
/// Per-photo failures are collected into the report; the batch only aborts when the store cannot
/// even list its originals.
#[tracing::instrument(skip(store, opts))]
pub fn reindex(store: &dyn PhotoStore, opts: &VariantOpts) -> PhotoglyphResult<BatchReport> {
    opts.validate()?;
    let originals = store.list_originals()?;
    let mut report = BatchReport::default();

    for filename in &originals {
        report.processed += 1;
        let res = store
            .read_original(filename)
            .and_then(|bytes| ingest(store, filename, &bytes, opts));
        match res {
            Ok(_) => report.succeeded += 1,
            Err(e) => report.fail(filename, e.to_string()),
        }
    }

    tracing::info!(
        processed = report.processed,
        succeeded = report.succeeded,
        failed = report.failures.len(),
        "reindex finished"
    );
    Ok(report)
}

#[cfg(test)]
#[path = "../../tests/unit/photo/batch.rs"]
mod tests;
