//! Liveness check reporting build version and storage backend.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::state::{AppState, StorageBackend};

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
    storage: StorageBackend,
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage,
    })
}

/// Returns the router serving `GET /health`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
