//! Postgres-backed documents (`documents` table, `jsonb` bodies).

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use super::{Document, DocumentStore, Query};
use crate::{FeedError, Result};

#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    doc_type: String,
    body: Value,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        let body = match row.body { Value::Object(map) => map, _ => Map::new() };
        Self { id: row.id.to_string(), doc_type: row.doc_type, body }
    }
}

#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

fn persistence(e: sqlx::Error) -> FeedError { FeedError::Persistence(e.to_string()) }

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn fetch(&self, query: &Query) -> Result<Vec<Document>> {
        let id = match query.id.as_deref() {
            Some(raw) => match Uuid::parse_str(raw) {
                Ok(id) => Some(id),
                Err(_) => return Ok(vec![]),
            },
            None => None,
        };
        let rows = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, doc_type, body FROM documents WHERE doc_type = $1 AND ($2::uuid IS NULL OR id = $2) ORDER BY created_at, id",
        )
        .bind(query.doc_type.as_str()).bind(id)
        .fetch_all(&self.pool).await.map_err(persistence)?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn create(&self, doc_type: &str, body: Map<String, Value>) -> Result<String> {
        let id: (Uuid,) = sqlx::query_as("INSERT INTO documents (id, doc_type, body, created_at, updated_at) VALUES ($1, $2, $3, NOW(), NOW()) RETURNING id")
            .bind(Uuid::now_v7()).bind(doc_type).bind(Value::Object(body))
            .fetch_one(&self.pool).await.map_err(persistence)?;
        Ok(id.0.to_string())
    }

    async fn patch(&self, id: &str, set: Map<String, Value>) -> Result<bool> {
        let Ok(id) = Uuid::parse_str(id) else { return Ok(false) };
        let done = sqlx::query("UPDATE documents SET body = body || $2, updated_at = NOW() WHERE id = $1")
            .bind(id).bind(Value::Object(set))
            .execute(&self.pool).await.map_err(persistence)?;
        Ok(done.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let Ok(id) = Uuid::parse_str(id) else { return Ok(false) };
        let done = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool).await.map_err(persistence)?;
        Ok(done.rows_affected() > 0)
    }
}
