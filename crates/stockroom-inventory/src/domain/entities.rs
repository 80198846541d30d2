//! Entities for the stock context.

use chrono::{DateTime, TimeDelta, Utc};
use stockroom_core::clock::Clock;
use stockroom_core::error::{DomainError, StockLimitExceeded};

use super::value_objects::StockQuantity;

/// A product whose stock is bounded by its tenant's ceiling.
///
/// Stock is only changed through [`Product::add_stock`].
#[derive(Debug, Clone)]
pub struct Product {
    /// Product identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Owning tenant identifier.
    pub tenant_id: String,
    current_stock: StockQuantity,
    last_updated: DateTime<Utc>,
    /// Storage version this copy was loaded at.
    version: i64,
}

impl Product {
    /// Creates a product as it is loaded from storage.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        tenant_id: impl Into<String>,
        current_stock: StockQuantity,
        last_updated: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tenant_id: tenant_id.into(),
            current_stock,
            last_updated,
            version: 0,
        }
    }

    /// Sets the storage version, used by repositories when rehydrating.
    #[must_use]
    pub fn with_version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    /// Units currently held.
    #[must_use]
    pub fn current_stock(&self) -> StockQuantity {
        self.current_stock
    }

    /// When stock last changed.
    #[must_use]
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Storage version this copy was loaded at.
    #[must_use]
    pub fn version(&self) -> i64 {
        self.version
    }

    /// Adds `quantity` units, refusing to go above `max_limit`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StockExceedsLimit` if the resulting stock would
    /// exceed `max_limit`; the product is left unchanged.
    pub fn add_stock(
        &mut self,
        quantity: StockQuantity,
        max_limit: StockQuantity,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let new_stock = self.current_stock + quantity;
        if new_stock.exceeds(max_limit) {
            return Err(DomainError::StockExceedsLimit(StockLimitExceeded {
                current: self.current_stock.value(),
                adding: quantity.value(),
                would_be: new_stock.value(),
                max_allowed: max_limit.value(),
            }));
        }

        self.current_stock = new_stock;
        self.last_updated = clock.now();
        Ok(())
    }

    /// Current stock as a percentage of `max_limit`; `0.0` when the limit is
    /// zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn utilization_percentage(&self, max_limit: StockQuantity) -> f64 {
        if max_limit == StockQuantity::ZERO {
            return 0.0;
        }
        self.current_stock.value() as f64 / max_limit.value() as f64 * 100.0
    }

    /// Returns `true` if stock is strictly below `threshold`.
    #[must_use]
    pub fn is_low_stock(&self, threshold: u64) -> bool {
        self.current_stock.value() < threshold
    }

    /// Returns `true` if stock changed less than `window` ago.
    #[must_use]
    pub fn is_recently_updated(&self, window: TimeDelta, clock: &dyn Clock) -> bool {
        clock.elapsed_since(self.last_updated) < window
    }
}

/// A tenant owning a stock ceiling.
#[derive(Debug, Clone)]
pub struct Tenant {
    /// Tenant identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Maximum units any of the tenant's products may hold.
    pub max_stock: StockQuantity,
    /// Inactive tenants never receive stock.
    pub is_active: bool,
}

impl Tenant {
    /// Checks the tenant may receive stock.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::TenantInactive` if the tenant is inactive.
    pub fn can_receive_stock(&self) -> Result<(), DomainError> {
        if !self.is_active {
            return Err(DomainError::TenantInactive);
        }
        Ok(())
    }
}
