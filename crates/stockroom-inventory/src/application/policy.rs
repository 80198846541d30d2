//! Thresholds that drive alerting around a stock addition.

use chrono::TimeDelta;

/// Alerting policy injected into the add-stock handler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StockPolicy {
    /// Resulting stock strictly below this raises a low-stock alert.
    pub low_stock_threshold: u64,
    /// Utilization strictly above this percentage raises a stock-limit alert.
    pub alert_threshold_percent: f64,
    /// Products updated within this window are logged as recently updated.
    pub recent_update_window: TimeDelta,
}

impl Default for StockPolicy {
    fn default() -> Self {
        Self {
            low_stock_threshold: 10,
            alert_threshold_percent: 80.0,
            recent_update_window: TimeDelta::minutes(5),
        }
    }
}
