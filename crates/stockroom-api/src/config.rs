//! Server configuration read from the environment.

use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use stockroom_inventory::application::policy::StockPolicy;

use crate::error::AppError;

/// Everything the binary needs to start serving.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// PostgreSQL connection string. `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Upper bound on a single add-stock request.
    pub request_timeout: Duration,
    /// Alerting thresholds for the orchestrator.
    pub policy: StockPolicy,
    /// Chat webhook that receives stock-limit alerts.
    pub slack_webhook_url: Option<String>,
    /// E-mail service that receives critical alerts.
    pub email_service_url: Option<String>,
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns the raw value
    /// of a variable if it is set.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = StockPolicy::default();

        let request_timeout_secs: u64 = parse(&lookup, "REQUEST_TIMEOUT_SECS", 10)?;
        if request_timeout_secs == 0 {
            return Err(AppError::Config(
                "REQUEST_TIMEOUT_SECS must be greater than zero".into(),
            ));
        }

        let alert_threshold_percent: f64 = parse(
            &lookup,
            "ALERT_THRESHOLD_PERCENT",
            defaults.alert_threshold_percent,
        )?;
        if !alert_threshold_percent.is_finite() || alert_threshold_percent < 0.0 {
            return Err(AppError::Config(format!(
                "ALERT_THRESHOLD_PERCENT must be a non-negative number, got {alert_threshold_percent}"
            )));
        }

        let window_secs: u32 = parse(&lookup, "RECENT_UPDATE_WINDOW_SECS", 300)?;

        Ok(Self {
            database_url: non_empty(&lookup, "DATABASE_URL"),
            host: non_empty(&lookup, "HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse(&lookup, "PORT", 3000)?,
            request_timeout: Duration::from_secs(request_timeout_secs),
            policy: StockPolicy {
                low_stock_threshold: parse(
                    &lookup,
                    "LOW_STOCK_THRESHOLD",
                    defaults.low_stock_threshold,
                )?,
                alert_threshold_percent,
                recent_update_window: TimeDelta::seconds(i64::from(window_secs)),
            },
            slack_webhook_url: non_empty(&lookup, "SLACK_WEBHOOK_URL"),
            email_service_url: non_empty(&lookup, "EMAIL_SERVICE_URL"),
        })
    }

    /// The address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `host:port` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|value| !value.trim().is_empty())
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match non_empty(lookup, key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} must be valid: {e}"))),
        None => Ok(default),
    }
}
