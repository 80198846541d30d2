//! Stockroom HTTP API: configuration, shared state, error mapping and routes.

pub mod config;
pub mod error;
pub mod notifications;
pub mod routes;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Builds the application router without transport layers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/stock", routes::stock::router())
        .with_state(state)
}
