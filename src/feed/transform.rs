//! Raw supplier product → catalog product preview.

use crate::domain::{FieldMapping, SupplierConfiguration};
use crate::feed::record::Field;
use crate::feed::{pricing, template};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalised catalog-product candidate. Never persisted by the transformer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPreview {
    pub title: String,
    /// HTML
    pub description: String,
    pub sku: String,
    /// Catalog currency, VAT markup included.
    pub price: i64,
    pub brand: String,
}

/// Pure and deterministic. Structural gaps in `raw` degrade to empty strings
/// and a zero price instead of failing.
///
/// The title always comes from `language.lang.name`; `mapping.title` is not
/// applied.
pub fn transform(raw: &Value, mapping: &FieldMapping, config: &SupplierConfiguration) -> ProductPreview {
    let record = Field::root(raw);

    let supplier_price = pricing::supplier_price(record.get("price").get("price"));
    let price = pricing::catalog_price(supplier_price, config.exchange_rate, &config.pricing_tiers);

    let brand = match mapping.brand_field() {
        Some(field) => record.get(field).text_or_empty(),
        None => mapping.brand.clone(),
    };

    ProductPreview {
        title: record.get("language").get("lang").get("name").text_or_empty(),
        description: template::render(&mapping.description, record),
        sku: record.get(&mapping.sku).text_or_empty(),
        price,
        brand,
    }
}
