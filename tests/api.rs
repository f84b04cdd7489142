//! HTTP round trips against the in-memory store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use opensase_supplier_feeds::api::{router, AppState};
use opensase_supplier_feeds::service::SupplierService;
use opensase_supplier_feeds::store::MemoryStore;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    router(AppState { suppliers: SupplierService::new(Arc::new(MemoryStore::new())) })
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri).header("content-type", "application/json");
    let request = match body {
        Some(b) => request.body(Body::from(b.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
}

fn supplier_body() -> Value {
    json!({
        "name": "RM Parts",
        "sourceType": "xml",
        "sourceUrl": "https://feeds.example.com/rm.xml",
        "exchangeRate": 1,
        "pricingTiers": [
            {"priceFrom": 0, "priceTo": 1000, "margin": 1.5},
            {"priceFrom": 0, "priceTo": 500, "margin": 2.0}
        ],
        "fieldMapping": {
            "sku": "reference",
            "title": "{name}",
            "description": "{description_short} / {description_short}",
            "price": "{price}",
            "brand": "RM Motors"
        },
        "categoryKeywords": "yamaha, honda , ,ktm"
    })
}

#[tokio::test]
async fn test_health() {
    let (status, body) = call(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_supplier_lifecycle() {
    let app = app();
    let (status, created) = call(&app, Method::POST, "/api/v1/suppliers", Some(supplier_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["_id"].as_str().unwrap().to_string();
    assert_eq!(created["categoryKeywords"], json!(["yamaha", "honda", "ktm"]));
    assert!(created["pricingTiers"][0]["_key"].is_string());
    assert!(created.get("_type").is_none());

    let (status, list) = call(&app, Method::GET, "/api/v1/suppliers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(1));

    let mut changed = supplier_body();
    changed["exchangeRate"] = json!(4.3);
    let (status, updated) = call(&app, Method::PUT, &format!("/api/v1/suppliers/{id}"), Some(changed)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["exchangeRate"], 4.3);

    let (status, _) = call(&app, Method::DELETE, &format!("/api/v1/suppliers/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = call(&app, Method::GET, &format!("/api/v1/suppliers/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Supplier not found");
}

#[tokio::test]
async fn test_rejects_supplier_without_tiers() {
    let mut body = supplier_body();
    body["pricingTiers"] = json!([]);
    let (status, _) = call(&app(), Method::POST, "/api/v1/suppliers", Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_preview_saved_supplier() {
    let app = app();
    let (_, created) = call(&app, Method::POST, "/api/v1/suppliers", Some(supplier_body())).await;
    let id = created["_id"].as_str().unwrap().to_string();

    let sample = "<product><reference>P-1</reference><price><price>200</price></price><language><lang><name>Chain</name></lang></language></product>";
    let (status, preview) = call(&app, Method::POST, &format!("/api/v1/suppliers/{id}/preview"), Some(json!({"sample": sample}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(preview, json!({"title": "Chain", "description": " / ", "sku": "P-1", "price": 360, "brand": "RM Motors"}));

    let (status, body) = call(&app, Method::POST, &format!("/api/v1/suppliers/{id}/preview"), Some(json!({"sample": "<product><reference>"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Parse error"));
}

#[tokio::test]
async fn test_preview_unsaved_configuration() {
    let body = json!({
        "supplier": {"sourceType": "xlsx", "exchangeRate": 1, "pricingTiers": [{"priceFrom": 0, "priceTo": 1000, "margin": 1.5}],
                     "fieldMapping": {"sku": "code", "brand": "{brand}"}},
        "sample": "{\"code\": \"X9\", \"brand\": \"Akrapovic\", \"price\": {\"price\": \"500\"}}"
    });
    let (status, preview) = call(&app(), Method::POST, "/api/v1/preview", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(preview["price"], 900);
    assert_eq!(preview["brand"], "Akrapovic");
    assert_eq!(preview["sku"], "X9");
}

#[tokio::test]
async fn test_draft_is_seeded() {
    let (status, draft) = call(&app(), Method::GET, "/api/v1/suppliers/draft", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(draft["pricingTiers"][0]["priceTo"], 1000.0);
    assert_eq!(draft["pricingTiers"][0]["margin"], 1.5);
}

#[tokio::test]
async fn test_preview_workbook_upload() {
    let app = app();
    let mut body = supplier_body();
    body["sourceType"] = json!("xlsx");
    body["fieldMapping"] = json!({"sku": "sku", "brand": "{brand}"});
    let (_, created) = call(&app, Method::POST, "/api/v1/suppliers", Some(body)).await;
    let id = created["_id"].as_str().unwrap().to_string();

    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/v1/suppliers/{id}/preview/xlsx?limit=2"))
        .header("content-type", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
        .body(Body::from(&include_bytes!("fixtures/products.xlsx")[..]))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let previews: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(previews.as_array().map(Vec::len), Some(2));
    assert_eq!(previews[0]["sku"], "A-1");
    assert_eq!(previews[0]["price"], 900);
    assert_eq!(previews[1]["sku"], "A-2");

    let (status, _) = call(&app, Method::GET, "/api/v1/suppliers/draft", None).await;
    assert_eq!(status, StatusCode::OK);
}
