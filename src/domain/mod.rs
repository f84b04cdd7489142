//! Supplier domain: configuration aggregate, value objects, events
pub mod aggregates;
pub mod events;
pub mod value_objects;

pub use aggregates::{Supplier, SupplierConfiguration};
pub use events::{DomainEvent, EventPublisher, SupplierEvent};
pub use value_objects::{CategoryKeywords, FieldMapping, PricingTier, SourceType, TierKey};
