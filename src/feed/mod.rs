//! Supplier feed decoding and the catalog preview transformation.

pub mod pricing;
pub mod record;
pub mod sample;
pub mod template;
pub mod transform;
pub mod xlsx;

pub use record::Field;
pub use transform::{transform, ProductPreview};

use crate::domain::SupplierConfiguration;
use crate::Result;

/// Decodes `sample` in the supplier's format and transforms it.
///
/// A sample that does not decode yields `FeedError::Parse` and no preview.
pub fn preview(config: &SupplierConfiguration, sample: &str) -> Result<ProductPreview> {
    let raw = sample::parse_sample(config.source_type, sample)?;
    Ok(transform(&raw, &config.field_mapping, config))
}

/// Previews the first `limit` rows of an XLSX workbook.
pub fn preview_workbook(config: &SupplierConfiguration, workbook: &[u8], limit: usize) -> Result<Vec<ProductPreview>> {
    let rows = xlsx::read_rows(workbook, limit)?;
    Ok(rows.iter().map(|raw| transform(raw, &config.field_mapping, config)).collect())
}
