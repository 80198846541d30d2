//! Domain error types.

use thiserror::Error;

/// Numbers describing a rejected stock addition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockLimitExceeded {
    /// Stock held before the attempted addition.
    pub current: u64,
    /// Quantity the caller tried to add.
    pub adding: u64,
    /// Stock the product would have held.
    pub would_be: u64,
    /// The tenant's ceiling.
    pub max_allowed: u64,
}

/// Top-level domain error type.
///
/// Sentinel failures are unit variants; the capacity violation carries the
/// full numeric context.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The product identifier is missing or malformed.
    #[error("invalid product id")]
    InvalidProductId,

    /// A quantity was zero or negative where a positive one is required.
    #[error("invalid quantity")]
    InvalidQuantity,

    /// No product exists with the requested identifier.
    #[error("product not found")]
    ProductNotFound,

    /// No tenant exists with the requested identifier (also returned for an
    /// empty tenant identifier).
    #[error("tenant not found")]
    TenantNotFound,

    /// The tenant is inactive and may not receive stock.
    #[error("tenant is inactive")]
    TenantInactive,

    /// Adding the quantity would push the product over the tenant ceiling.
    #[error(
        "cannot exceed max stock of {}. Current: {}, Adding: {}, Would be: {}",
        .0.max_allowed, .0.current, .0.adding, .0.would_be
    )]
    StockExceedsLimit(StockLimitExceeded),

    /// Another transaction saved the product after it was loaded.
    #[error("concurrency conflict on product {product_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The product that had the conflict.
        product_id: String,
        /// The version this transaction loaded.
        expected: i64,
        /// The version found in storage.
        actual: i64,
    },

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Returns `true` for failures caused by the request itself rather than
    /// by storage or the runtime.
    #[must_use]
    pub fn is_caller_fault(&self) -> bool {
        !matches!(
            self,
            Self::Infrastructure(_) | Self::ConcurrencyConflict { .. }
        )
    }
}
