//! Shared test mocks and utilities for the Stockroom stock service.

mod clock;
mod notifications;
mod poll;
mod publisher;
mod unit_of_work;

pub use clock::FixedClock;
pub use notifications::{FailingNotificationSink, LowStockNotice, RecordingNotificationSink};
pub use poll::{eventually, settle};
pub use publisher::{FailingEventPublisher, RecordingEventPublisher};
pub use unit_of_work::{FailurePoint, ScriptedUnitOfWork};
