//! Commands for the stock context.

use uuid::Uuid;

/// Command to add stock to a tenant's product.
#[derive(Debug, Clone)]
pub struct AddStock {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The product identifier.
    pub product_id: String,
    /// The tenant identifier.
    pub tenant_id: String,
    /// Raw requested quantity; validated by the handler.
    pub quantity: i64,
    /// Actor performing the addition.
    pub added_by: String,
    /// Optional free-text note for the audit trail.
    pub note: Option<String>,
}
