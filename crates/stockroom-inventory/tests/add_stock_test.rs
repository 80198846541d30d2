//! Integration tests for the add-stock workflow against the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, TimeZone, Utc};
use stockroom_core::error::{DomainError, StockLimitExceeded};
use stockroom_inventory::application::command_handlers::{AddStockHandler, AddStockOutcome};
use stockroom_inventory::application::policy::StockPolicy;
use stockroom_inventory::domain::commands::AddStock;
use stockroom_inventory::domain::entities::{Product, Tenant};
use stockroom_inventory::domain::events::STOCK_ADDED_EVENT_TYPE;
use stockroom_inventory::domain::value_objects::StockQuantity;
use stockroom_store::memory::InMemoryUnitOfWork;
use stockroom_test_support::{
    FailingEventPublisher, FailingNotificationSink, FailurePoint, FixedClock, LowStockNotice,
    RecordingEventPublisher, RecordingNotificationSink, ScriptedUnitOfWork, eventually, settle,
};
use uuid::Uuid;

const WAIT: Duration = Duration::from_secs(2);

struct Fixture {
    store: InMemoryUnitOfWork,
    uow: ScriptedUnitOfWork,
    sink: Arc<RecordingNotificationSink>,
    clock: FixedClock,
}

impl Fixture {
    fn new(max_stock: u64, active: bool, stock: u64) -> Self {
        Self::failing(max_stock, active, stock, None)
    }

    fn failing(max_stock: u64, active: bool, stock: u64, point: Option<FailurePoint>) -> Self {
        let clock = FixedClock::standard();
        let store = InMemoryUnitOfWork::new();
        store.insert_tenant(Tenant {
            id: "t-1".into(),
            name: "Acme".into(),
            max_stock: StockQuantity::from_units(max_stock),
            is_active: active,
        });
        store.insert_product(Product::new(
            "p-1",
            "Widget",
            "t-1",
            StockQuantity::from_units(stock),
            clock.0 - TimeDelta::hours(1),
        ));
        let uow = match point {
            Some(point) => ScriptedUnitOfWork::failing_at(store.clone(), point),
            None => ScriptedUnitOfWork::new(store.clone()),
        };
        Self {
            store,
            uow,
            sink: Arc::new(RecordingNotificationSink::new()),
            clock,
        }
    }

    fn handler(&self) -> AddStockHandler {
        AddStockHandler::new(
            Arc::new(self.uow.clone()),
            self.sink.clone(),
            Arc::new(self.clock),
        )
    }

    fn stock(&self) -> u64 {
        self.store.product("p-1").unwrap().current_stock().value()
    }
}

fn add(quantity: i64) -> AddStock {
    AddStock {
        correlation_id: Uuid::new_v4(),
        product_id: "p-1".into(),
        tenant_id: "t-1".into(),
        quantity,
        added_by: "u1".into(),
        note: Some("restock".into()),
    }
}

#[tokio::test]
async fn test_add_within_capacity_returns_summary_and_records_audit() {
    // Arrange
    let fixture = Fixture::new(100, true, 10);

    // Act
    let outcome = fixture.handler().execute(&add(15)).await.unwrap();

    // Assert
    assert_eq!(
        outcome,
        AddStockOutcome {
            product_id: "p-1".into(),
            product_name: "Widget".into(),
            previous_stock: 10,
            new_stock: 25,
            added: 15,
            max_allowed: 100,
            utilization: 25.0,
        }
    );
    assert_eq!(fixture.stock(), 25);

    let history = fixture.store.stock_history();
    assert_eq!(history.len(), 1);
    let record = &history[0];
    assert_eq!(record.previous.value(), 10);
    assert_eq!(record.current.value(), 25);
    assert_eq!(record.quantity.value(), 15);
    assert_eq!(record.added_by, "u1");
    assert_eq!(record.note.as_deref(), Some("restock"));
    assert_eq!(record.tenant_id, "t-1");
    assert_eq!(record.occurred_at, fixture.clock.0);

    settle().await;
    assert!(fixture.sink.stock_alerts().is_empty());
    assert!(fixture.sink.low_stock_alerts().is_empty());
}

#[tokio::test]
async fn test_success_persists_new_stock_and_timestamp() {
    let fixture = Fixture::new(100, true, 40);

    let outcome = fixture.handler().execute(&add(7)).await.unwrap();

    let persisted = fixture.store.product("p-1").unwrap();
    assert_eq!(outcome.new_stock, outcome.previous_stock + outcome.added);
    assert_eq!(outcome.new_stock, persisted.current_stock().value());
    assert_eq!(persisted.last_updated(), fixture.clock.0);
    assert_eq!(persisted.version(), 1);
    assert_eq!(fixture.uow.commits(), 1);
    assert_eq!(fixture.uow.rollbacks(), 0);
}

#[tokio::test]
async fn test_add_over_capacity_fails_with_limit_details_and_keeps_stock() {
    // Arrange
    let fixture = Fixture::new(10, true, 8);

    // Act
    let result = fixture.handler().execute(&add(5)).await;

    // Assert
    match result.unwrap_err() {
        DomainError::StockExceedsLimit(details) => assert_eq!(
            details,
            StockLimitExceeded {
                current: 8,
                adding: 5,
                would_be: 13,
                max_allowed: 10,
            }
        ),
        other => panic!("expected StockExceedsLimit, got {other:?}"),
    }
    assert_eq!(fixture.stock(), 8);
    assert!(fixture.store.stock_history().is_empty());
    assert_eq!(fixture.uow.rollbacks(), 1);
    assert_eq!(fixture.uow.commits(), 0);
}

#[tokio::test]
async fn test_high_utilization_dispatches_one_stock_limit_alert() {
    // Arrange
    let fixture = Fixture::new(100, true, 75);

    // Act
    let outcome = fixture.handler().execute(&add(10)).await.unwrap();

    // Assert
    assert_eq!(outcome.new_stock, 85);
    assert!((outcome.utilization - 85.0).abs() < 1e-9);

    let sink = Arc::clone(&fixture.sink);
    assert!(eventually(WAIT, || sink.stock_alerts().len() == 1).await);
    settle().await;

    let alerts = fixture.sink.stock_alerts();
    assert_eq!(alerts.len(), 1);
    let alert = &alerts[0];
    assert_eq!(alert.product_id, "p-1");
    assert_eq!(alert.product_name, "Widget");
    assert_eq!(alert.tenant_id, "t-1");
    assert_eq!(alert.current.value(), 85);
    assert_eq!(alert.max_limit.value(), 100);
    assert!((alert.utilization - 85.0).abs() < 1e-9);
    assert!(fixture.sink.low_stock_alerts().is_empty());
}

#[tokio::test]
async fn test_low_resulting_stock_dispatches_low_stock_alert() {
    let fixture = Fixture::new(100, true, 2);

    fixture.handler().execute(&add(3)).await.unwrap();

    let sink = Arc::clone(&fixture.sink);
    assert!(eventually(WAIT, || !sink.low_stock_alerts().is_empty()).await);
    settle().await;
    assert_eq!(
        fixture.sink.low_stock_alerts(),
        vec![LowStockNotice {
            product_id: "p-1".into(),
            product_name: "Widget".into(),
            current_stock: 5,
            threshold: 10,
        }]
    );
    assert!(fixture.sink.stock_alerts().is_empty());
}

#[tokio::test]
async fn test_both_alerts_fire_independently() {
    // 9 of 10 units: 90% utilization and below the low-stock threshold.
    let fixture = Fixture::new(10, true, 0);

    fixture.handler().execute(&add(9)).await.unwrap();

    let sink = Arc::clone(&fixture.sink);
    assert!(
        eventually(WAIT, || {
            sink.stock_alerts().len() == 1 && sink.low_stock_alerts().len() == 1
        })
        .await
    );
}

#[tokio::test]
async fn test_non_positive_quantity_never_opens_transaction() {
    let fixture = Fixture::new(100, true, 10);
    let handler = fixture.handler();

    for quantity in [0, -5] {
        let result = handler.execute(&add(quantity)).await;
        assert!(matches!(result, Err(DomainError::InvalidQuantity)));
    }

    assert_eq!(fixture.uow.begins(), 0);
    assert_eq!(fixture.stock(), 10);
}

#[tokio::test]
async fn test_inactive_tenant_is_rejected_without_side_effects() {
    let fixture = Fixture::new(100, false, 10);

    let result = fixture.handler().execute(&add(5)).await;

    assert!(matches!(result, Err(DomainError::TenantInactive)));
    assert_eq!(fixture.stock(), 10);
    assert!(fixture.store.stock_history().is_empty());
    assert_eq!(fixture.uow.rollbacks(), 1);
}

#[tokio::test]
async fn test_unknown_tenant_and_product_surface_repository_errors() {
    let fixture = Fixture::new(100, true, 10);
    let handler = fixture.handler();

    let mut unknown_tenant = add(5);
    unknown_tenant.tenant_id = "t-404".into();
    let mut unknown_product = add(5);
    unknown_product.product_id = "p-404".into();

    assert!(matches!(
        handler.execute(&unknown_tenant).await,
        Err(DomainError::TenantNotFound)
    ));
    assert!(matches!(
        handler.execute(&unknown_product).await,
        Err(DomainError::ProductNotFound)
    ));
    assert_eq!(fixture.uow.rollbacks(), 2);
    assert!(fixture.store.stock_history().is_empty());
}

#[tokio::test]
async fn test_storage_failures_roll_back_and_leave_no_trace() {
    for point in [
        FailurePoint::LoadTenant,
        FailurePoint::LoadProduct,
        FailurePoint::SaveProduct,
        FailurePoint::CreateHistory,
    ] {
        // Arrange
        let fixture = Fixture::failing(100, true, 10, Some(point));

        // Act
        let result = fixture.handler().execute(&add(5)).await;

        // Assert
        assert!(
            matches!(result, Err(DomainError::Infrastructure(_))),
            "expected failure at {point:?}"
        );
        assert_eq!(fixture.stock(), 10, "stock changed after failure at {point:?}");
        assert!(fixture.store.stock_history().is_empty());
        assert_eq!(fixture.uow.rollbacks(), 1, "no rollback after failure at {point:?}");
        assert_eq!(fixture.uow.commits(), 0);
    }
}

#[tokio::test]
async fn test_begin_failure_is_fatal() {
    let fixture = Fixture::failing(100, true, 10, Some(FailurePoint::Begin));

    let result = fixture.handler().execute(&add(5)).await;

    assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    assert_eq!(fixture.uow.begins(), 1);
    assert_eq!(fixture.stock(), 10);
}

#[tokio::test]
async fn test_commit_failure_discards_writes_and_sends_nothing() {
    // Arrange: utilization would be 90%, so an alert is pending.
    let fixture = Fixture::failing(100, true, 80, Some(FailurePoint::Commit));
    let publisher = Arc::new(RecordingEventPublisher::new());
    let handler = fixture.handler().with_publisher(publisher.clone());

    // Act
    let result = handler.execute(&add(10)).await;

    // Assert
    assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    assert_eq!(fixture.stock(), 80);
    assert!(fixture.store.stock_history().is_empty());
    settle().await;
    assert!(fixture.sink.stock_alerts().is_empty());
    assert!(publisher.published().is_empty());
}

#[tokio::test]
async fn test_publisher_receives_audit_event() {
    let fixture = Fixture::new(100, true, 10);
    let publisher = Arc::new(RecordingEventPublisher::new());
    let handler = fixture.handler().with_publisher(publisher.clone());

    handler.execute(&add(15)).await.unwrap();

    let observed = Arc::clone(&publisher);
    assert!(eventually(WAIT, || observed.published().len() == 1).await);
    let (event_type, payload) = &publisher.published()[0];
    assert_eq!(event_type, STOCK_ADDED_EVENT_TYPE);
    assert_eq!(payload["product_id"], "p-1");
    assert_eq!(payload["previous"], 10);
    assert_eq!(payload["current"], 25);
}

#[tokio::test]
async fn test_side_effect_failures_do_not_affect_outcome() {
    // Arrange
    let fixture = Fixture::new(10, true, 0);
    let sink = Arc::new(FailingNotificationSink::default());
    let publisher = Arc::new(FailingEventPublisher::default());
    let handler = AddStockHandler::new(
        Arc::new(fixture.uow.clone()),
        sink.clone(),
        Arc::new(fixture.clock),
    )
    .with_publisher(publisher.clone());

    // Act
    let outcome = handler.execute(&add(9)).await.unwrap();

    // Assert
    assert_eq!(outcome.new_stock, 9);
    assert_eq!(fixture.stock(), 9);
    assert!(eventually(WAIT, || sink.attempts() == 2 && publisher.attempts() == 1).await);
    assert_eq!(fixture.store.stock_history().len(), 1);
}

#[tokio::test]
async fn test_custom_policy_thresholds_are_honoured() {
    let fixture = Fixture::new(100, true, 10);
    let handler = fixture.handler().with_policy(StockPolicy {
        low_stock_threshold: 30,
        alert_threshold_percent: 20.0,
        ..StockPolicy::default()
    });

    handler.execute(&add(15)).await.unwrap();

    let sink = Arc::clone(&fixture.sink);
    assert!(
        eventually(WAIT, || {
            sink.stock_alerts().len() == 1 && sink.low_stock_alerts().len() == 1
        })
        .await
    );
    assert_eq!(fixture.sink.low_stock_alerts()[0].threshold, 30);
}

#[tokio::test]
async fn test_recently_updated_product_is_still_accepted() {
    // Arrange: product touched one minute before the request.
    let fixture = Fixture::new(100, true, 10);
    let recent = Product::new(
        "p-1",
        "Widget",
        "t-1",
        StockQuantity::from_units(10),
        Utc.with_ymd_and_hms(2026, 1, 15, 9, 59, 0).unwrap(),
    );
    fixture.store.insert_product(recent);

    // Act
    let outcome = fixture.handler().execute(&add(1)).await.unwrap();

    // Assert
    assert_eq!(outcome.new_stock, 11);
}

#[tokio::test]
async fn test_sequential_additions_accumulate() {
    let fixture = Fixture::new(100, true, 10);
    let handler = fixture.handler();

    handler.execute(&add(15)).await.unwrap();
    let second = handler.execute(&add(5)).await.unwrap();

    assert_eq!(second.previous_stock, 25);
    assert_eq!(second.new_stock, 30);
    assert_eq!(fixture.store.stock_history().len(), 2);
    assert_eq!(fixture.store.product("p-1").unwrap().version(), 2);
}

#[tokio::test]
async fn test_product_of_another_tenant_is_not_found() {
    // Arrange: p-1 belongs to t-1 (ceiling 10); t-big has a far larger ceiling.
    let fixture = Fixture::new(10, true, 5);
    fixture.store.insert_tenant(Tenant {
        id: "t-big".into(),
        name: "Bigco".into(),
        max_stock: StockQuantity::from_units(1000),
        is_active: true,
    });
    let mut command = add(495);
    command.tenant_id = "t-big".into();

    // Act
    let result = fixture.handler().execute(&command).await;

    // Assert
    assert!(matches!(result, Err(DomainError::ProductNotFound)));
    assert_eq!(fixture.stock(), 5);
    assert!(fixture.store.stock_history().is_empty());
    assert_eq!(fixture.uow.rollbacks(), 1);
    assert_eq!(fixture.uow.commits(), 0);
}

#[tokio::test]
async fn test_abandoned_request_leaves_no_trace() {
    // Arrange: the product save is staged, then the history write hangs.
    let fixture = Fixture::new(100, true, 10);
    let stalled = ScriptedUnitOfWork::stalling_at(fixture.store.clone(), FailurePoint::CreateHistory);
    let handler = AddStockHandler::new(
        Arc::new(stalled.clone()),
        fixture.sink.clone(),
        Arc::new(fixture.clock),
    );

    // Act
    let result = tokio::time::timeout(Duration::from_millis(50), handler.execute(&add(5))).await;

    // Assert
    assert!(result.is_err(), "stalled request should not complete");
    assert_eq!(stalled.begins(), 1);
    assert_eq!(stalled.commits(), 0);
    assert_eq!(fixture.stock(), 10);
    assert!(fixture.store.stock_history().is_empty());

    let retried = fixture.handler().execute(&add(5)).await.unwrap();
    assert_eq!(retried.previous_stock, 10);
    assert_eq!(retried.new_stock, 15);
    assert_eq!(fixture.store.product("p-1").unwrap().version(), 1);
}
