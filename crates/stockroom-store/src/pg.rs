//! `PostgreSQL` implementation of the `UnitOfWork` port.
//!
//! Each scope owns one `sqlx` transaction. Dropping a scope that was never
//! committed rolls the transaction back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use stockroom_core::error::DomainError;
use stockroom_inventory::application::ports::{
    ProductRepository, StockHistoryRepository, TenantRepository, TransactionScope, UnitOfWork,
};
use stockroom_inventory::domain::entities::{Product, Tenant};
use stockroom_inventory::domain::events::StockAdded;
use stockroom_inventory::domain::value_objects::StockQuantity;
use tracing::debug;

fn infrastructure(err: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(err.to_string())
}

fn to_column(quantity: StockQuantity) -> Result<i64, DomainError> {
    i64::try_from(quantity.value())
        .map_err(|_| DomainError::Infrastructure(format!("stock {quantity} does not fit BIGINT")))
}

fn from_column(column: &str, value: i64) -> Result<StockQuantity, DomainError> {
    StockQuantity::new(value)
        .map_err(|_| DomainError::Infrastructure(format!("negative {column} in storage: {value}")))
}

/// PostgreSQL-backed unit of work.
#[derive(Debug, Clone)]
pub struct PgUnitOfWork {
    pool: PgPool,
}

impl PgUnitOfWork {
    /// Creates a new `PgUnitOfWork`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn begin(&self) -> Result<Box<dyn TransactionScope>, DomainError> {
        let tx = self.pool.begin().await.map_err(infrastructure)?;
        Ok(Box::new(PgScope { tx }))
    }
}

/// An open PostgreSQL transaction.
pub struct PgScope {
    tx: Transaction<'static, Postgres>,
}

impl std::fmt::Debug for PgScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgScope").finish_non_exhaustive()
    }
}

type ProductRow = (String, String, String, i64, DateTime<Utc>, i64);
type TenantRow = (String, String, i64, bool);

#[async_trait]
impl ProductRepository for PgScope {
    async fn find_by_id(&mut self, product_id: &str) -> Result<Product, DomainError> {
        let row: Option<ProductRow> = sqlx::query_as(
            "SELECT id, name, tenant_id, current_stock, last_updated, version \
             FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(infrastructure)?;

        let (id, name, tenant_id, current_stock, last_updated, version) =
            row.ok_or(DomainError::ProductNotFound)?;
        let current_stock = from_column("current_stock", current_stock)?;

        Ok(Product::new(id, name, tenant_id, current_stock, last_updated).with_version(version))
    }

    async fn save(&mut self, product: &Product) -> Result<(), DomainError> {
        let updated = sqlx::query(
            "UPDATE products \
             SET current_stock = $1, last_updated = $2, version = version + 1 \
             WHERE id = $3 AND version = $4",
        )
        .bind(to_column(product.current_stock())?)
        .bind(product.last_updated())
        .bind(&product.id)
        .bind(product.version())
        .execute(&mut *self.tx)
        .await
        .map_err(infrastructure)?;

        if updated.rows_affected() == 1 {
            return Ok(());
        }

        let actual: Option<i64> = sqlx::query_scalar("SELECT version FROM products WHERE id = $1")
            .bind(&product.id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(infrastructure)?;

        debug!(product_id = %product.id, expected = product.version(), ?actual, "version check failed");
        match actual {
            Some(actual) => Err(DomainError::ConcurrencyConflict {
                product_id: product.id.clone(),
                expected: product.version(),
                actual,
            }),
            None => Err(DomainError::ProductNotFound),
        }
    }
}

#[async_trait]
impl TenantRepository for PgScope {
    async fn find_by_id(&mut self, tenant_id: &str) -> Result<Tenant, DomainError> {
        let row: Option<TenantRow> =
            sqlx::query_as("SELECT id, name, max_stock, is_active FROM tenants WHERE id = $1")
                .bind(tenant_id)
                .fetch_optional(&mut *self.tx)
                .await
                .map_err(infrastructure)?;

        let (id, name, max_stock, is_active) = row.ok_or(DomainError::TenantNotFound)?;

        Ok(Tenant {
            id,
            name,
            max_stock: from_column("max_stock", max_stock)?,
            is_active,
        })
    }
}

#[async_trait]
impl StockHistoryRepository for PgScope {
    async fn create(&mut self, event: &StockAdded) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO stock_history \
             (event_id, product_id, tenant_id, quantity, previous_stock, new_stock, \
              added_by, occurred_at, note) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(event.event_id)
        .bind(&event.product_id)
        .bind(&event.tenant_id)
        .bind(to_column(event.quantity)?)
        .bind(to_column(event.previous)?)
        .bind(to_column(event.current)?)
        .bind(&event.added_by)
        .bind(event.occurred_at)
        .bind(event.note.as_deref())
        .execute(&mut *self.tx)
        .await
        .map_err(infrastructure)?;
        Ok(())
    }
}

#[async_trait]
impl TransactionScope for PgScope {
    fn products(&mut self) -> &mut dyn ProductRepository {
        self
    }

    fn tenants(&mut self) -> &mut dyn TenantRepository {
        self
    }

    fn stock_history(&mut self) -> &mut dyn StockHistoryRepository {
        self
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let Self { tx } = *self;
        tx.commit().await.map_err(infrastructure)
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        let Self { tx } = *self;
        tx.rollback().await.map_err(infrastructure)
    }
}
