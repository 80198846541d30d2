//! Notification sink that renders alert messages and writes them to the log.
//!
//! Messages are addressed to the configured chat webhook and e-mail service;
//! delivery to those endpoints is not performed here.

use async_trait::async_trait;
use stockroom_core::error::DomainError;
use stockroom_inventory::application::ports::NotificationSink;
use stockroom_inventory::domain::entities::Product;
use stockroom_inventory::domain::events::StockLimitAlert;
use tracing::{info, warn};

/// Utilization above which a stock-limit alert also goes out by e-mail.
pub const CRITICAL_UTILIZATION_PERCENT: f64 = 90.0;

/// Chat message for a stock-limit alert.
#[must_use]
pub fn stock_alert_message(alert: &StockLimitAlert) -> String {
    format!(
        "Stock alert for {}: {}/{} ({:.0}% full)",
        alert.product_name, alert.current, alert.max_limit, alert.utilization
    )
}

/// E-mail body for a stock-limit alert, if the alert is critical.
#[must_use]
pub fn critical_alert_message(alert: &StockLimitAlert) -> Option<String> {
    (alert.utilization > CRITICAL_UTILIZATION_PERCENT).then(|| {
        format!(
            "CRITICAL: Product {} is at {:.0}% capacity ({}/{})",
            alert.product_name, alert.utilization, alert.current, alert.max_limit
        )
    })
}

/// Chat message for a low-stock alert.
#[must_use]
pub fn low_stock_message(product: &Product, threshold: u64) -> String {
    format!(
        "Low stock alert: {} has only {} units left (threshold: {threshold})",
        product.name,
        product.current_stock()
    )
}

/// Sends alerts to the log, tagged with their intended destinations.
#[derive(Debug, Clone, Default)]
pub struct LogNotificationSink {
    slack_webhook_url: Option<String>,
    email_service_url: Option<String>,
}

impl LogNotificationSink {
    /// Creates a sink addressed to the given endpoints.
    #[must_use]
    pub fn new(slack_webhook_url: Option<String>, email_service_url: Option<String>) -> Self {
        Self {
            slack_webhook_url,
            email_service_url,
        }
    }

    fn chat(&self, message: &str) {
        match &self.slack_webhook_url {
            Some(url) => info!(target: "stockroom::notify", webhook = %url, text = %message, "chat alert"),
            None => warn!(target: "stockroom::notify", text = %message, "chat alert with no webhook configured"),
        }
    }
}

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn send_stock_alert(&self, alert: &StockLimitAlert) -> Result<(), DomainError> {
        self.chat(&stock_alert_message(alert));

        if let Some(body) = critical_alert_message(alert) {
            match &self.email_service_url {
                Some(url) => {
                    info!(target: "stockroom::notify", service = %url, text = %body, "e-mail alert");
                }
                None => {
                    warn!(target: "stockroom::notify", text = %body, "e-mail alert with no service configured");
                }
            }
        }
        Ok(())
    }

    async fn send_low_stock_alert(
        &self,
        product: &Product,
        threshold: u64,
    ) -> Result<(), DomainError> {
        self.chat(&low_stock_message(product, threshold));
        Ok(())
    }
}
