//! Stock database schema.

use sqlx::PgPool;
use stockroom_core::error::DomainError;

/// SQL to create the tenant, product and stock history tables.
pub const CREATE_STOCK_TABLES: &str = r"
CREATE TABLE IF NOT EXISTS tenants (
    id          VARCHAR(64) PRIMARY KEY,
    name        VARCHAR(255) NOT NULL,
    max_stock   BIGINT NOT NULL CHECK (max_stock >= 0),
    is_active   BOOLEAN NOT NULL DEFAULT TRUE
);

CREATE TABLE IF NOT EXISTS products (
    id              VARCHAR(64) PRIMARY KEY,
    name            VARCHAR(255) NOT NULL,
    tenant_id       VARCHAR(64) NOT NULL REFERENCES tenants (id),
    current_stock   BIGINT NOT NULL CHECK (current_stock >= 0),
    last_updated    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    version         BIGINT NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS stock_history (
    event_id        UUID PRIMARY KEY,
    product_id      VARCHAR(64) NOT NULL REFERENCES products (id),
    tenant_id       VARCHAR(64) NOT NULL,
    quantity        BIGINT NOT NULL,
    previous_stock  BIGINT NOT NULL,
    new_stock       BIGINT NOT NULL,
    added_by        VARCHAR(255) NOT NULL,
    occurred_at     TIMESTAMPTZ NOT NULL,
    note            TEXT
);

CREATE INDEX IF NOT EXISTS idx_stock_history_product_id
    ON stock_history (product_id, occurred_at);
";

/// Creates the stock tables if they do not exist.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the statements fail.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), DomainError> {
    sqlx::raw_sql(CREATE_STOCK_TABLES)
        .execute(pool)
        .await
        .map_err(|e| DomainError::Infrastructure(format!("schema setup failed: {e}")))?;
    tracing::info!("stock schema ready");
    Ok(())
}
