//! Command handlers for the stock context.
//!
//! `AddStockHandler` orchestrates a stock addition: validate the command,
//! open a transaction, load and check the tenant, apply the quantity to the
//! product, persist product and audit record, commit, then hand alerts and
//! publication to detached background tasks.

use std::sync::Arc;

use serde::Serialize;
use stockroom_core::clock::Clock;
use stockroom_core::error::DomainError;
use stockroom_core::event::DomainEvent;
use stockroom_core::publisher::EventPublisher;
use tracing::{Instrument, debug, error, info, info_span, instrument, warn};
use uuid::Uuid;

use crate::application::policy::StockPolicy;
use crate::application::ports::{NotificationSink, TransactionScope, UnitOfWork};
use crate::domain::commands::AddStock;
use crate::domain::entities::Product;
use crate::domain::events::{StockAdded, StockLimitAlert};
use crate::domain::value_objects::StockQuantity;

/// Summary returned after a successful stock addition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddStockOutcome {
    pub product_id: String,
    pub product_name: String,
    pub previous_stock: u64,
    pub new_stock: u64,
    pub added: u64,
    pub max_allowed: u64,
    /// New stock as a percentage of `max_allowed`.
    pub utilization: f64,
}

/// Work decided inside the transaction, started only once it has committed.
#[derive(Debug)]
struct PendingSideEffects {
    stock_alert: Option<StockLimitAlert>,
    low_stock: Option<Product>,
    record: StockAdded,
}

/// Handles the `AddStock` command.
pub struct AddStockHandler {
    unit_of_work: Arc<dyn UnitOfWork>,
    notifications: Arc<dyn NotificationSink>,
    publisher: Option<Arc<dyn EventPublisher>>,
    clock: Arc<dyn Clock>,
    policy: StockPolicy,
}

impl std::fmt::Debug for AddStockHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddStockHandler")
            .field("publisher", &self.publisher.is_some())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl AddStockHandler {
    /// Creates a handler with the default policy and no event publisher.
    #[must_use]
    pub fn new(
        unit_of_work: Arc<dyn UnitOfWork>,
        notifications: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            unit_of_work,
            notifications,
            publisher: None,
            clock,
            policy: StockPolicy::default(),
        }
    }

    /// Publishes every audit record through `publisher` after commit.
    #[must_use]
    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Replaces the alerting policy.
    #[must_use]
    pub fn with_policy(mut self, policy: StockPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Adds stock to a product within its tenant's ceiling.
    ///
    /// Every failure after the transaction opens rolls it back before the
    /// error is returned. Alerts and publication run in the background after
    /// commit and never affect the result.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidProductId`, `DomainError::TenantNotFound`
    /// or `DomainError::InvalidQuantity` for a malformed command, the
    /// repository's not-found error, `DomainError::TenantInactive`,
    /// `DomainError::StockExceedsLimit`, or any storage error including a
    /// failed commit.
    #[instrument(
        skip(self, command),
        fields(
            correlation_id = %command.correlation_id,
            product_id = %command.product_id,
            tenant_id = %command.tenant_id,
            quantity = command.quantity,
        )
    )]
    pub async fn execute(&self, command: &AddStock) -> Result<AddStockOutcome, DomainError> {
        validate(command)?;

        let mut scope = self.unit_of_work.begin().await?;

        let applied = self.apply(scope.as_mut(), command).await;
        let (outcome, side_effects) = match applied {
            Ok(applied) => applied,
            Err(err) => {
                debug!(error = %err, "rolling back stock addition");
                if let Err(rollback_err) = scope.rollback().await {
                    error!(error = %rollback_err, "rollback failed");
                }
                return Err(err);
            }
        };

        scope.commit().await?;

        info!(
            previous_stock = outcome.previous_stock,
            new_stock = outcome.new_stock,
            utilization = outcome.utilization,
            "stock added"
        );

        self.dispatch(side_effects);

        Ok(outcome)
    }

    async fn apply(
        &self,
        scope: &mut dyn TransactionScope,
        command: &AddStock,
    ) -> Result<(AddStockOutcome, PendingSideEffects), DomainError> {
        let tenant = scope.tenants().find_by_id(&command.tenant_id).await?;
        tenant.can_receive_stock()?;

        let mut product = scope.products().find_by_id(&command.product_id).await?;
        if product.tenant_id != tenant.id {
            debug!(owner = %product.tenant_id, "product belongs to another tenant");
            return Err(DomainError::ProductNotFound);
        }

        let quantity = StockQuantity::positive(command.quantity)?;

        if product.is_recently_updated(self.policy.recent_update_window, self.clock.as_ref()) {
            debug!(last_updated = %product.last_updated(), "product was recently updated");
        }

        let previous = product.current_stock();
        product.add_stock(quantity, tenant.max_stock, self.clock.as_ref())?;

        scope.products().save(&product).await?;

        let now = self.clock.now();
        let record = StockAdded {
            event_id: Uuid::now_v7(),
            product_id: product.id.clone(),
            tenant_id: command.tenant_id.clone(),
            quantity,
            previous,
            current: product.current_stock(),
            added_by: command.added_by.clone(),
            occurred_at: now,
            note: command.note.clone(),
        };
        scope.stock_history().create(&record).await?;

        let utilization = product.utilization_percentage(tenant.max_stock);

        let stock_alert = (utilization > self.policy.alert_threshold_percent).then(|| {
            StockLimitAlert {
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                current: product.current_stock(),
                max_limit: tenant.max_stock,
                utilization,
                tenant_id: command.tenant_id.clone(),
                occurred_at: now,
            }
        });
        let low_stock = product
            .is_low_stock(self.policy.low_stock_threshold)
            .then(|| product.clone());

        let outcome = AddStockOutcome {
            product_id: product.id,
            product_name: product.name,
            previous_stock: previous.value(),
            new_stock: record.current.value(),
            added: quantity.value(),
            max_allowed: tenant.max_stock.value(),
            utilization,
        };

        Ok((
            outcome,
            PendingSideEffects {
                stock_alert,
                low_stock,
                record,
            },
        ))
    }

    /// Spawns alert and publish tasks. They outlive the caller's request and
    /// their failures are logged and dropped.
    fn dispatch(&self, side_effects: PendingSideEffects) {
        let PendingSideEffects {
            stock_alert,
            low_stock,
            record,
        } = side_effects;

        if let Some(alert) = stock_alert {
            let notifications = Arc::clone(&self.notifications);
            let span = info_span!("stock_limit_alert", product_id = %alert.product_id);
            tokio::spawn(
                async move {
                    if let Err(e) = notifications.send_stock_alert(&alert).await {
                        warn!(error = %e, "failed to send stock limit alert");
                    }
                }
                .instrument(span),
            );
        }

        if let Some(product) = low_stock {
            let notifications = Arc::clone(&self.notifications);
            let threshold = self.policy.low_stock_threshold;
            let span = info_span!("low_stock_alert", product_id = %product.id);
            tokio::spawn(
                async move {
                    if let Err(e) = notifications.send_low_stock_alert(&product, threshold).await {
                        warn!(error = %e, "failed to send low stock alert");
                    }
                }
                .instrument(span),
            );
        }

        if let Some(publisher) = &self.publisher {
            let publisher = Arc::clone(publisher);
            let span = info_span!(
                "publish_event",
                event_type = record.event_type(),
                event_id = %record.event_id,
                occurred_at = %record.occurred_at()
            );
            tokio::spawn(
                async move {
                    if let Err(e) = publisher.publish(&record).await {
                        warn!(error = %e, "failed to publish stock added event");
                    }
                }
                .instrument(span),
            );
        }
    }
}

/// Structural checks that need no storage access.
fn validate(command: &AddStock) -> Result<(), DomainError> {
    if command.product_id.is_empty() {
        return Err(DomainError::InvalidProductId);
    }
    if command.tenant_id.is_empty() {
        return Err(DomainError::TenantNotFound);
    }
    if command.quantity <= 0 {
        return Err(DomainError::InvalidQuantity);
    }
    Ok(())
}
