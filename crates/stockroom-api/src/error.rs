//! Stockroom API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use stockroom_core::error::DomainError;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema setup failed.
    #[error("storage error: {0}")]
    Storage(#[from] DomainError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer error that implements `IntoResponse`.
#[derive(Debug)]
pub enum ApiError {
    /// The orchestrator rejected or failed the request.
    Domain(DomainError),
    /// The request did not finish within the configured timeout.
    Timeout,
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            Self::Timeout => {
                warn!("request timed out");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "timeout",
                    "request timed out".to_string(),
                )
            }
            Self::Domain(err) => {
                let (status, code) = classify(err);
                let message = if err.is_caller_fault() {
                    debug!(error = %err, "request rejected");
                    caller_message(err)
                } else if let DomainError::Infrastructure(detail) = err {
                    error!(error = %detail, "request failed");
                    "an internal error occurred".to_string()
                } else {
                    warn!(error = %err, "request lost an update race");
                    err.to_string()
                };
                (status, code, message)
            }
        };

        let body = ErrorBody {
            error: error_code,
            message,
        };

        (status, Json(body)).into_response()
    }
}

fn caller_message(err: &DomainError) -> String {
    match err {
        DomainError::InvalidQuantity => "quantity must be positive".to_string(),
        _ => err.to_string(),
    }
}

fn classify(err: &DomainError) -> (StatusCode, &'static str) {
    match err {
        DomainError::StockExceedsLimit(_) => (StatusCode::BAD_REQUEST, "stock_limit_exceeded"),
        DomainError::ProductNotFound => (StatusCode::NOT_FOUND, "product_not_found"),
        DomainError::TenantNotFound => (StatusCode::NOT_FOUND, "tenant_not_found"),
        DomainError::TenantInactive => (StatusCode::BAD_REQUEST, "tenant_inactive"),
        DomainError::InvalidQuantity => (StatusCode::BAD_REQUEST, "invalid_quantity"),
        DomainError::InvalidProductId => (StatusCode::BAD_REQUEST, "invalid_product_id"),
        DomainError::ConcurrencyConflict { .. } => (StatusCode::CONFLICT, "concurrency_conflict"),
        DomainError::Infrastructure(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    }
}
