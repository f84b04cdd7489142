//! Aggregates module
pub mod supplier;

pub use supplier::{Supplier, SupplierConfiguration, DOCUMENT_TYPE};
