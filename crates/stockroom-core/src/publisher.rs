//! Outbound event publication port.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::event::DomainEvent;

/// Sink that forwards domain events to the outside world (message bus,
/// webhook, ...). Callers treat publication as best-effort.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    async fn publish(&self, event: &dyn DomainEvent) -> Result<(), DomainError>;
}
