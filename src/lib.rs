//! OpenSASE Supplier Feeds
//!
//! Supplier feed configuration and catalog preview for the OpenSASE storefront.
//!
//! ## Features
//! - Supplier configuration management (pricing tiers, field mapping, keywords)
//! - XML fragment, spreadsheet-row and XLSX workbook decoding
//! - Tiered margin pricing with exchange-rate conversion
//! - Templated HTML product descriptions
//! - Postgres and in-memory document stores

use thiserror::Error;

pub mod api;
pub mod config;
pub mod domain;
pub mod feed;
pub mod service;
pub mod store;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum FeedError {
    /// Sample data is not valid XML / JSON / XLSX.
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid supplier configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Supplier not found")]
    SupplierNotFound,

    /// Document store failure; the action was not applied.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

pub type Result<T> = std::result::Result<T, FeedError>;
