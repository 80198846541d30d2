//! Routes for stock additions.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::{Json, Router, routing::post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stockroom_core::clock::Clock;
use stockroom_inventory::application::command_handlers::AddStockOutcome;
use stockroom_inventory::domain::commands::AddStock;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the acting user's id.
pub const ACTOR_HEADER: &str = "x-user-id";

/// Actor recorded when the request carries no user id.
pub const ANONYMOUS_ACTOR: &str = "anonymous";

/// Request body for POST /add.
#[derive(Debug, Deserialize)]
pub struct AddStockRequest {
    /// Product receiving stock.
    pub product_id: String,
    /// Tenant that owns the product.
    pub tenant_id: String,
    /// Units to add. Must be positive.
    pub quantity: i64,
    /// Free-text note stored with the audit record.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Response body returned after stock was added.
#[derive(Debug, Serialize)]
pub struct AddStockResponse {
    pub success: bool,
    pub product_id: String,
    pub product_name: String,
    pub previous_stock: u64,
    pub new_stock: u64,
    pub added: u64,
    pub max_allowed: u64,
    pub utilization_percentage: f64,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl AddStockResponse {
    fn from_outcome(outcome: AddStockOutcome, timestamp: DateTime<Utc>) -> Self {
        Self {
            success: true,
            product_id: outcome.product_id,
            product_name: outcome.product_name,
            previous_stock: outcome.previous_stock,
            new_stock: outcome.new_stock,
            added: outcome.added,
            max_allowed: outcome.max_allowed,
            utilization_percentage: outcome.utilization,
            message: "Stock updated successfully",
            timestamp,
        }
    }
}

fn actor(headers: &HeaderMap) -> String {
    headers
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(ANONYMOUS_ACTOR)
        .to_owned()
}

/// POST /add
#[instrument(
    skip(state, headers, request),
    fields(product_id = %request.product_id, tenant_id = %request.tenant_id)
)]
async fn add_stock(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<AddStockRequest>,
) -> Result<Json<AddStockResponse>, ApiError> {
    let command = AddStock {
        correlation_id: Uuid::new_v4(),
        product_id: request.product_id,
        tenant_id: request.tenant_id,
        quantity: request.quantity,
        added_by: actor(&headers),
        note: request.notes,
    };

    info!(correlation_id = %command.correlation_id, "handling add_stock command");

    let outcome = tokio::time::timeout(state.request_timeout, state.add_stock.execute(&command))
        .await
        .map_err(|_| ApiError::Timeout)??;

    Ok(Json(AddStockResponse::from_outcome(
        outcome,
        state.clock.now(),
    )))
}

/// Returns the router for stock operations.
pub fn router() -> Router<AppState> {
    Router::new().route("/add", post(add_stock))
}
