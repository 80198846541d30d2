//! Test event publishers.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use stockroom_core::error::DomainError;
use stockroom_core::event::DomainEvent;
use stockroom_core::publisher::EventPublisher;

/// A publisher that records `(event_type, payload)` for every event.
#[derive(Debug, Default)]
pub struct RecordingEventPublisher {
    published: Mutex<Vec<(String, serde_json::Value)>>,
}

impl RecordingEventPublisher {
    /// Creates an empty publisher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn published(&self) -> Vec<(String, serde_json::Value)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish(&self, event: &dyn DomainEvent) -> Result<(), DomainError> {
        self.published
            .lock()
            .unwrap()
            .push((event.event_type().to_owned(), event.to_payload()));
        Ok(())
    }
}

/// A publisher whose broker is always down. Counts publish attempts.
#[derive(Debug, Default)]
pub struct FailingEventPublisher {
    attempts: AtomicUsize,
}

impl FailingEventPublisher {
    /// Number of publish attempts.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventPublisher for FailingEventPublisher {
    async fn publish(&self, _event: &dyn DomainEvent) -> Result<(), DomainError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(DomainError::Infrastructure("broker unavailable".into()))
    }
}
