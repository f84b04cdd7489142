//! HTTP surface of the supplier back office.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::domain::{Supplier, SupplierConfiguration};
use crate::feed::ProductPreview;
use crate::service::{self, SupplierService};
use crate::FeedError;

const WORKBOOK_BODY_LIMIT: usize = 20 * 1024 * 1024;
const DEFAULT_WORKBOOK_ROWS: usize = 5;

#[derive(Clone)]
pub struct AppState { pub suppliers: SupplierService }

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(json!({"status": "healthy", "service": "opensase-supplier-feeds"})) }))
        .route("/api/v1/suppliers", get(list_suppliers).post(create_supplier))
        .route("/api/v1/suppliers/draft", get(supplier_draft))
        .route("/api/v1/suppliers/:id", get(get_supplier).put(update_supplier).delete(delete_supplier))
        .route("/api/v1/suppliers/:id/preview", post(preview_supplier))
        .route("/api/v1/suppliers/:id/preview/xlsx", post(preview_workbook).layer(DefaultBodyLimit::max(WORKBOOK_BODY_LIMIT)))
        .route("/api/v1/preview", post(preview_draft))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state)
}

type ApiError = (StatusCode, Json<Value>);

fn reject(e: FeedError) -> ApiError {
    let status = match &e {
        FeedError::Parse(_) => StatusCode::BAD_REQUEST,
        FeedError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        FeedError::SupplierNotFound => StatusCode::NOT_FOUND,
        FeedError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() { tracing::error!(error = %e, "request failed"); }
    (status, Json(json!({"error": e.to_string()})))
}

async fn list_suppliers(State(s): State<AppState>) -> Result<Json<Vec<Supplier>>, ApiError> {
    s.suppliers.list().await.map(Json).map_err(reject)
}

async fn get_supplier(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<Supplier>, ApiError> {
    s.suppliers.get(&id).await.map(Json).map_err(reject)
}

async fn supplier_draft(State(s): State<AppState>) -> Json<SupplierConfiguration> {
    Json(s.suppliers.draft())
}

async fn create_supplier(State(s): State<AppState>, Json(r): Json<SupplierConfiguration>) -> Result<(StatusCode, Json<Supplier>), ApiError> {
    let supplier = s.suppliers.create(r).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

async fn update_supplier(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<SupplierConfiguration>) -> Result<Json<Supplier>, ApiError> {
    s.suppliers.update(&id, r).await.map(Json).map_err(reject)
}

async fn delete_supplier(State(s): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    s.suppliers.delete(&id).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)] pub struct PreviewRequest { pub sample: String }

async fn preview_supplier(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<PreviewRequest>) -> Result<Json<ProductPreview>, ApiError> {
    s.suppliers.preview(&id, &r.sample).await.map(Json).map_err(reject)
}

#[derive(Debug, Deserialize)] pub struct DraftPreviewRequest { #[serde(default)] pub supplier: SupplierConfiguration, pub sample: String }

async fn preview_draft(Json(r): Json<DraftPreviewRequest>) -> Result<Json<ProductPreview>, ApiError> {
    service::preview_unsaved(&r.supplier, &r.sample).map(Json).map_err(reject)
}

#[derive(Debug, Deserialize)] pub struct WorkbookParams { pub limit: Option<usize> }

async fn preview_workbook(State(s): State<AppState>, Path(id): Path<String>, Query(p): Query<WorkbookParams>, body: Bytes) -> Result<Json<Vec<ProductPreview>>, ApiError> {
    let limit = p.limit.unwrap_or(DEFAULT_WORKBOOK_ROWS);
    s.suppliers.preview_workbook(&id, &body, limit).await.map(Json).map_err(reject)
}
