//! Ports the stock context consumes: a transactional unit of work with its
//! repositories, and the notification channel.
//!
//! A [`TransactionScope`] is owned by exactly one command invocation.
//! Dropping a scope without calling [`TransactionScope::commit`] must discard
//! every write made through it.

use async_trait::async_trait;
use stockroom_core::error::DomainError;

use crate::domain::entities::{Product, Tenant};
use crate::domain::events::{StockAdded, StockLimitAlert};

/// Product access within a transaction.
#[async_trait]
pub trait ProductRepository: Send {
    /// Loads a product.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProductNotFound` if no such product exists.
    async fn find_by_id(&mut self, product_id: &str) -> Result<Product, DomainError>;

    /// Persists a product's stock and timestamp. Fails with
    /// `DomainError::ConcurrencyConflict` if the stored version no longer
    /// matches the version the product was loaded at.
    async fn save(&mut self, product: &Product) -> Result<(), DomainError>;
}

/// Tenant access within a transaction.
#[async_trait]
pub trait TenantRepository: Send {
    /// Loads a tenant.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::TenantNotFound` if no such tenant exists.
    async fn find_by_id(&mut self, tenant_id: &str) -> Result<Tenant, DomainError>;
}

/// Append-only audit log of stock additions.
#[async_trait]
pub trait StockHistoryRepository: Send {
    /// Appends an audit record.
    async fn create(&mut self, event: &StockAdded) -> Result<(), DomainError>;
}

/// A single open transaction.
#[async_trait]
pub trait TransactionScope: Send {
    /// Products visible to this transaction.
    fn products(&mut self) -> &mut dyn ProductRepository;

    /// Tenants visible to this transaction.
    fn tenants(&mut self) -> &mut dyn TenantRepository;

    /// Stock history within this transaction.
    fn stock_history(&mut self) -> &mut dyn StockHistoryRepository;

    /// Makes every write durable, atomically. On failure nothing is applied.
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;

    /// Discards every write. Succeeds when nothing was written.
    async fn rollback(self: Box<Self>) -> Result<(), DomainError>;
}

/// Factory for transaction scopes.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Opens a new transaction scope.
    async fn begin(&self) -> Result<Box<dyn TransactionScope>, DomainError>;
}

/// Outbound alert channel (chat, e-mail, ...). Delivery is best-effort.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Reports a product nearing its tenant ceiling.
    async fn send_stock_alert(&self, alert: &StockLimitAlert) -> Result<(), DomainError>;

    /// Reports a product whose stock sits below `threshold`.
    async fn send_low_stock_alert(
        &self,
        product: &Product,
        threshold: u64,
    ) -> Result<(), DomainError>;
}
