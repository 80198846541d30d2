//! Stockroom API server entry point.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use stockroom_api::config::AppConfig;
use stockroom_api::error::AppError;
use stockroom_api::notifications::LogNotificationSink;
use stockroom_api::state::{AppState, StorageBackend};
use stockroom_core::clock::{Clock, SystemClock};
use stockroom_inventory::application::command_handlers::AddStockHandler;
use stockroom_inventory::application::ports::UnitOfWork;
use stockroom_store::memory::InMemoryUnitOfWork;
use stockroom_store::pg::PgUnitOfWork;
use stockroom_store::schema::ensure_schema;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Stockroom API server");

    let config = AppConfig::from_env()?;

    let storage = if config.database_url.is_some() {
        StorageBackend::Postgres
    } else {
        StorageBackend::Memory
    };
    let unit_of_work: Arc<dyn UnitOfWork> = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await?;
            ensure_schema(&pool).await?;
            Arc::new(PgUnitOfWork::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store");
            Arc::new(InMemoryUnitOfWork::new())
        }
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let notifications = Arc::new(LogNotificationSink::new(
        config.slack_webhook_url.clone(),
        config.email_service_url.clone(),
    ));
    let handler = AddStockHandler::new(unit_of_work, notifications, Arc::clone(&clock))
        .with_policy(config.policy);

    let app_state = AppState::new(Arc::new(handler), clock, config.request_timeout)
        .with_storage(storage);

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = stockroom_api::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
