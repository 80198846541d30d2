//! Domain event abstractions.

use chrono::{DateTime, Utc};

/// Trait that all domain events implement.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Returns the event type name (used for routing by publishers).
    fn event_type(&self) -> &'static str;

    /// Serializes the event payload to JSON.
    fn to_payload(&self) -> serde_json::Value;

    /// When the fact described by the event happened.
    fn occurred_at(&self) -> DateTime<Utc>;
}
