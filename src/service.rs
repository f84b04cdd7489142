//! Supplier configuration management and previews.

use std::sync::Arc;

use crate::domain::{EventPublisher, Supplier, SupplierConfiguration};
use crate::domain::aggregates::DOCUMENT_TYPE;
use crate::feed::{self, ProductPreview};
use crate::store::{Document, DocumentStore, Query};
use crate::{FeedError, Result};

/// Upper bound on workbook rows rendered in one preview.
pub const MAX_PREVIEW_ROWS: usize = 50;

#[derive(Clone)]
pub struct SupplierService {
    store: Arc<dyn DocumentStore>,
    events: Option<EventPublisher>,
}

impl SupplierService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self { Self { store, events: None } }

    pub fn with_events(mut self, publisher: EventPublisher) -> Self { self.events = Some(publisher); self }

    pub fn draft(&self) -> SupplierConfiguration { SupplierConfiguration::draft() }

    pub async fn list(&self) -> Result<Vec<Supplier>> {
        let docs = self.store.fetch(&Query::of_type(DOCUMENT_TYPE)).await?;
        docs.into_iter().map(restore).collect()
    }

    pub async fn get(&self, id: &str) -> Result<Supplier> {
        let doc = self.store.fetch(&Query::of_type(DOCUMENT_TYPE).with_id(id)).await?
            .into_iter().next().ok_or(FeedError::SupplierNotFound)?;
        restore(doc)
    }

    pub async fn create(&self, config: SupplierConfiguration) -> Result<Supplier> {
        let config = config.prepared()?;
        let id = self.store.create(DOCUMENT_TYPE, encode(&config)?).await?;
        tracing::info!(supplier_id = %id, name = %config.name, "supplier created");
        let mut supplier = Supplier::register(id, config);
        self.publish(&mut supplier).await;
        Ok(supplier)
    }

    /// Replaces the stored configuration. Concurrent edits: last write wins.
    pub async fn update(&self, id: &str, config: SupplierConfiguration) -> Result<Supplier> {
        let config = config.prepared()?;
        let mut supplier = self.get(id).await?;
        if !self.store.patch(id, encode(&config)?).await? {
            return Err(FeedError::SupplierNotFound);
        }
        supplier.revise(config);
        tracing::info!(supplier_id = %id, "supplier updated");
        self.publish(&mut supplier).await;
        Ok(supplier)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut supplier = self.get(id).await?;
        if !self.store.delete(id).await? {
            return Err(FeedError::SupplierNotFound);
        }
        supplier.retire();
        tracing::info!(supplier_id = %id, "supplier deleted");
        self.publish(&mut supplier).await;
        Ok(())
    }

    pub async fn preview(&self, id: &str, sample: &str) -> Result<ProductPreview> {
        let supplier = self.get(id).await?;
        preview_unsaved(supplier.configuration(), sample)
    }

    pub async fn preview_workbook(&self, id: &str, workbook: &[u8], limit: usize) -> Result<Vec<ProductPreview>> {
        let supplier = self.get(id).await?;
        let limit = limit.clamp(1, MAX_PREVIEW_ROWS);
        let previews = feed::preview_workbook(supplier.configuration(), workbook, limit)?;
        tracing::debug!(supplier_id = %id, rows = previews.len(), "workbook preview rendered");
        Ok(previews)
    }

    async fn publish(&self, supplier: &mut Supplier) {
        let events = supplier.take_events();
        if let Some(publisher) = &self.events {
            publisher.publish(events).await;
        }
    }
}

/// Preview against a configuration that has not been saved. Missing
/// configuration fields fall back to defaults instead of failing.
pub fn preview_unsaved(config: &SupplierConfiguration, sample: &str) -> Result<ProductPreview> {
    feed::preview(config, sample).map_err(|e| {
        tracing::debug!(error = %e, "sample rejected");
        e
    })
}

fn encode(config: &SupplierConfiguration) -> Result<serde_json::Map<String, serde_json::Value>> {
    config.to_document().map_err(|e| FeedError::Persistence(e.to_string()))
}

fn restore(doc: Document) -> Result<Supplier> {
    let config = SupplierConfiguration::from_document(doc.body)
        .map_err(|e| FeedError::Persistence(format!("corrupt supplier document {}: {e}", doc.id)))?;
    Ok(Supplier::restore(doc.id, config))
}
