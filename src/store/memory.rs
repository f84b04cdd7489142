//! In-process store for local runs and tests.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Document, DocumentStore, Query};
use crate::Result;

#[derive(Clone, Debug)]
struct Entry {
    doc_type: String,
    body: Map<String, Value>,
    seq: u64,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, Entry>>,
    next_seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn fetch(&self, query: &Query) -> Result<Vec<Document>> {
        let documents = self.documents.read().await;
        let mut found: Vec<(&String, &Entry)> = documents
            .iter()
            .filter(|(id, e)| e.doc_type == query.doc_type && query.id.as_ref().map_or(true, |q| q == *id))
            .collect();
        found.sort_by_key(|(_, e)| e.seq);
        Ok(found
            .into_iter()
            .map(|(id, e)| Document { id: id.clone(), doc_type: e.doc_type.clone(), body: e.body.clone() })
            .collect())
    }

    async fn create(&self, doc_type: &str, body: Map<String, Value>) -> Result<String> {
        let id = Uuid::now_v7().to_string();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let entry = Entry { doc_type: doc_type.to_string(), body, seq };
        self.documents.write().await.insert(id.clone(), entry);
        Ok(id)
    }

    async fn patch(&self, id: &str, set: Map<String, Value>) -> Result<bool> {
        let mut documents = self.documents.write().await;
        let Some(entry) = documents.get_mut(id) else { return Ok(false) };
        entry.body.extend(set);
        Ok(true)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.documents.write().await.remove(id).is_some())
    }
}
