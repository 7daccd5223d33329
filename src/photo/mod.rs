//! Photo analysis, delivery variants and the batch operations over a [`PhotoStore`].
//!
//! [`PhotoStore`]: crate::store::PhotoStore

pub mod analyze;
pub mod batch;
pub mod record;
pub mod variants;

pub use analyze::{PhotoStats, analyze_photo};
pub use batch::{BatchFailure, BatchReport, ingest, reindex};
pub use record::{
    PhotoRecord, VariantEncoding, VariantEntry, VariantSet, VariantSize, variant_matrix,
    variant_rel_path,
};
pub use variants::{VariantFailure, VariantOutcome, encode_variant, generate_variants};
