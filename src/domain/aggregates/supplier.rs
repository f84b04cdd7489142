//! Supplier Aggregate

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};
use crate::domain::value_objects::{CategoryKeywords, FieldMapping, PricingTier, SourceType};
use crate::domain::events::{DomainEvent, SupplierEvent};

pub const DOCUMENT_TYPE: &str = "supplier";

fn default_exchange_rate() -> f64 { 1.0 }

/// One upstream feed: where it comes from, how it is priced and mapped.
///
/// Missing fields deserialize to defaults so an incomplete configuration can
/// still drive a preview; [`SupplierConfiguration::prepared`] is the gate
/// before anything is saved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SupplierConfiguration {
    #[serde(default)]
    #[validate(custom = "not_blank")]
    pub name: String,
    #[serde(default)]
    pub source_type: SourceType,
    #[serde(default)]
    pub source_url: String,
    #[serde(default = "default_exchange_rate")]
    #[validate(custom = "positive_rate")]
    pub exchange_rate: f64,
    #[serde(default)]
    #[validate(length(min = 1, message = "at least one pricing tier is required"), custom = "valid_tiers")]
    pub pricing_tiers: Vec<PricingTier>,
    #[serde(default)]
    pub field_mapping: FieldMapping,
    #[serde(default)]
    pub category_keywords: CategoryKeywords,
}

impl Default for SupplierConfiguration {
    fn default() -> Self {
        Self {
            name: String::new(), source_type: SourceType::default(), source_url: String::new(),
            exchange_rate: default_exchange_rate(), pricing_tiers: vec![],
            field_mapping: FieldMapping::default(), category_keywords: CategoryKeywords::default(),
        }
    }
}

impl SupplierConfiguration {
    /// Blank configuration as offered by the create form.
    pub fn draft() -> Self {
        Self { pricing_tiers: vec![PricingTier::seed()], ..Self::default() }
    }

    /// Trimmed and validated copy ready for persistence.
    pub fn prepared(mut self) -> Result<Self, validator::ValidationErrors> {
        self.name = self.name.trim().to_string();
        self.validate()?;
        Ok(self)
    }

    /// Persisted document body, `_type` included.
    pub fn to_document(&self) -> serde_json::Result<Map<String, Value>> {
        let mut body = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        body.insert("_type".into(), Value::String(DOCUMENT_TYPE.into()));
        Ok(body)
    }

    pub fn from_document(body: Map<String, Value>) -> serde_json::Result<Self> {
        serde_json::from_value(Value::Object(body))
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() { return Err(ValidationError::new("blank")); }
    Ok(())
}

fn positive_rate(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 { return Err(ValidationError::new("exchange_rate_not_positive")); }
    Ok(())
}

fn valid_tiers(tiers: &[PricingTier]) -> Result<(), ValidationError> {
    if tiers.iter().any(|t| !t.has_valid_bounds()) { return Err(ValidationError::new("price_from_exceeds_price_to")); }
    if tiers.iter().any(|t| t.margin < 0.0) { return Err(ValidationError::new("negative_margin")); }
    Ok(())
}

#[derive(Clone, Debug, Serialize)]
pub struct Supplier {
    #[serde(rename = "_id")]
    id: String,
    #[serde(flatten)]
    config: SupplierConfiguration,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl Supplier {
    /// Newly stored supplier.
    pub fn register(id: impl Into<String>, config: SupplierConfiguration) -> Self {
        let mut supplier = Self::restore(id, config);
        supplier.raise_event(DomainEvent::Supplier(SupplierEvent::Created {
            supplier_id: supplier.id.clone(), name: supplier.config.name.clone(),
        }));
        supplier
    }

    /// Supplier read back from the store.
    pub fn restore(id: impl Into<String>, config: SupplierConfiguration) -> Self {
        Self { id: id.into(), config, events: vec![] }
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn name(&self) -> &str { &self.config.name }
    pub fn configuration(&self) -> &SupplierConfiguration { &self.config }

    /// Replaces the whole configuration; last write wins.
    pub fn revise(&mut self, config: SupplierConfiguration) {
        self.config = config;
        self.raise_event(DomainEvent::Supplier(SupplierEvent::Updated {
            supplier_id: self.id.clone(), tier_count: self.config.pricing_tiers.len(),
        }));
    }

    pub fn retire(&mut self) {
        self.raise_event(DomainEvent::Supplier(SupplierEvent::Deleted { supplier_id: self.id.clone() }));
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}
