//! Test notification sinks.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use stockroom_core::error::DomainError;
use stockroom_inventory::application::ports::NotificationSink;
use stockroom_inventory::domain::entities::Product;
use stockroom_inventory::domain::events::StockLimitAlert;

/// What a low-stock alert was sent about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LowStockNotice {
    pub product_id: String,
    pub product_name: String,
    pub current_stock: u64,
    pub threshold: u64,
}

/// A sink that records every alert it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingNotificationSink {
    stock_alerts: Mutex<Vec<StockLimitAlert>>,
    low_stock_alerts: Mutex<Vec<LowStockNotice>>,
}

impl RecordingNotificationSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the stock-limit alerts received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn stock_alerts(&self) -> Vec<StockLimitAlert> {
        self.stock_alerts.lock().unwrap().clone()
    }

    /// Snapshot of the low-stock alerts received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn low_stock_alerts(&self) -> Vec<LowStockNotice> {
        self.low_stock_alerts.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotificationSink {
    async fn send_stock_alert(&self, alert: &StockLimitAlert) -> Result<(), DomainError> {
        self.stock_alerts.lock().unwrap().push(alert.clone());
        Ok(())
    }

    async fn send_low_stock_alert(
        &self,
        product: &Product,
        threshold: u64,
    ) -> Result<(), DomainError> {
        self.low_stock_alerts.lock().unwrap().push(LowStockNotice {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            current_stock: product.current_stock().value(),
            threshold,
        });
        Ok(())
    }
}

/// A sink whose channel is always down. Counts delivery attempts.
#[derive(Debug, Default)]
pub struct FailingNotificationSink {
    attempts: AtomicUsize,
}

impl FailingNotificationSink {
    /// Number of alerts the sink was asked to send.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationSink for FailingNotificationSink {
    async fn send_stock_alert(&self, _alert: &StockLimitAlert) -> Result<(), DomainError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(DomainError::Infrastructure("webhook unreachable".into()))
    }

    async fn send_low_stock_alert(
        &self,
        _product: &Product,
        _threshold: u64,
    ) -> Result<(), DomainError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(DomainError::Infrastructure("webhook unreachable".into()))
    }
}
