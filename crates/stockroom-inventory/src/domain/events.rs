//! Domain events for the stock context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stockroom_core::event::DomainEvent;
use uuid::Uuid;

use super::value_objects::StockQuantity;

/// Event type for [`StockAdded`].
pub const STOCK_ADDED_EVENT_TYPE: &str = "inventory.stock_added";

/// Audit record written once per successful stock addition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAdded {
    /// Unique identifier of the audit record.
    pub event_id: Uuid,
    /// The product that received stock.
    pub product_id: String,
    /// The owning tenant.
    pub tenant_id: String,
    /// Units added.
    pub quantity: StockQuantity,
    /// Stock before the addition.
    pub previous: StockQuantity,
    /// Stock after the addition.
    pub current: StockQuantity,
    /// Actor who requested the addition.
    pub added_by: String,
    /// When the addition happened.
    pub occurred_at: DateTime<Utc>,
    /// Free-text note supplied by the actor.
    pub note: Option<String>,
}

/// Raised when a product's stock crosses the tenant utilization threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLimitAlert {
    pub product_id: String,
    pub product_name: String,
    pub current: StockQuantity,
    pub max_limit: StockQuantity,
    /// Current stock as a percentage of `max_limit`.
    pub utilization: f64,
    pub tenant_id: String,
    pub occurred_at: DateTime<Utc>,
}

impl DomainEvent for StockAdded {
    fn event_type(&self) -> &'static str {
        STOCK_ADDED_EVENT_TYPE
    }

    fn to_payload(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
