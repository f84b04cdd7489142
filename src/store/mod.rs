//! Document store port.
//!
//! The storefront keeps its content in a headless document database. The
//! service only needs typed fetch, create, shallow patch and delete; no
//! multi-document atomicity is assumed.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::Result;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub id: String,
    pub doc_type: String,
    pub body: Map<String, Value>,
}

/// Documents of one `_type`, optionally narrowed to a single id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    pub doc_type: String,
    pub id: Option<String>,
}

impl Query {
    pub fn of_type(doc_type: impl Into<String>) -> Self { Self { doc_type: doc_type.into(), id: None } }
    pub fn with_id(mut self, id: impl Into<String>) -> Self { self.id = Some(id.into()); self }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Matching documents in creation order.
    async fn fetch(&self, query: &Query) -> Result<Vec<Document>>;

    /// Stores a new document and returns its generated id.
    async fn create(&self, doc_type: &str, body: Map<String, Value>) -> Result<String>;

    /// Sets top-level fields. `false` when no document has that id.
    async fn patch(&self, id: &str, set: Map<String, Value>) -> Result<bool>;

    /// `false` when no document has that id.
    async fn delete(&self, id: &str) -> Result<bool>;
}
