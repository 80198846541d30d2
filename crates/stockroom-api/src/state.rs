//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use stockroom_core::clock::Clock;
use stockroom_inventory::application::command_handlers::AddStockHandler;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The add-stock orchestrator.
    pub add_stock: Arc<AddStockHandler>,
    /// Clock used for response timestamps.
    pub clock: Arc<dyn Clock>,
    /// Upper bound on a single add-stock request.
    pub request_timeout: Duration,
    /// Which storage backend serves requests.
    pub storage: StorageBackend,
}

/// Storage backend behind the unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        add_stock: Arc<AddStockHandler>,
        clock: Arc<dyn Clock>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            add_stock,
            clock,
            request_timeout,
            storage: StorageBackend::Memory,
        }
    }

    /// Records the storage backend reported by the health check.
    #[must_use]
    pub fn with_storage(mut self, storage: StorageBackend) -> Self {
        self.storage = storage;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("add_stock", &self.add_stock)
            .field("request_timeout", &self.request_timeout)
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}
