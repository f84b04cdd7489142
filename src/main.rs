//! OpenSASE Supplier Feeds - supplier configuration and feed preview service

use std::sync::Arc;

use anyhow::Result;
use opensase_supplier_feeds::api::{self, AppState};
use opensase_supplier_feeds::config::Config;
use opensase_supplier_feeds::domain::EventPublisher;
use opensase_supplier_feeds::service::SupplierService;
use opensase_supplier_feeds::store::{DocumentStore, MemoryStore, PgDocumentStore};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = Config::from_env()?;

    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(url) => {
            let db = PgPoolOptions::new().max_connections(config.max_connections).connect(url).await?;
            sqlx::migrate!("./migrations").run(&db).await?;
            Arc::new(PgDocumentStore::new(db))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, suppliers are kept in memory");
            Arc::new(MemoryStore::new())
        }
    };

    let mut suppliers = SupplierService::new(store);
    if let Some(url) = &config.nats_url {
        match async_nats::connect(url.as_str()).await {
            Ok(client) => suppliers = suppliers.with_events(EventPublisher::new(client)),
            Err(e) => tracing::warn!(error = %e, "NATS unavailable, domain events disabled"),
        }
    }

    let app = api::router(AppState { suppliers });
    tracing::info!("🚀 OpenSASE Supplier Feeds listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?, app).await?;
    Ok(())
}
