//! A unit of work that fails on demand and counts transaction outcomes.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use stockroom_core::error::DomainError;
use stockroom_inventory::application::ports::{
    ProductRepository, StockHistoryRepository, TenantRepository, TransactionScope, UnitOfWork,
};
use stockroom_inventory::domain::entities::{Product, Tenant};
use stockroom_inventory::domain::events::StockAdded;
use stockroom_store::memory::InMemoryUnitOfWork;

/// Where a [`ScriptedUnitOfWork`] injects an error or stalls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    Begin,
    LoadTenant,
    LoadProduct,
    SaveProduct,
    CreateHistory,
    Commit,
}

#[derive(Debug, Default)]
struct TransactionLog {
    begins: AtomicUsize,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
}

/// What happens when a scripted scope reaches its [`FailurePoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
    Fail(FailurePoint),
    Stall(FailurePoint),
}

/// Wraps an [`InMemoryUnitOfWork`], optionally failing or hanging at one
/// point, and counts begins, commits and explicit rollbacks.
#[derive(Debug, Clone)]
pub struct ScriptedUnitOfWork {
    inner: InMemoryUnitOfWork,
    fault: Option<Fault>,
    log: Arc<TransactionLog>,
}

impl ScriptedUnitOfWork {
    /// Wraps `inner` without injecting failures.
    #[must_use]
    pub fn new(inner: InMemoryUnitOfWork) -> Self {
        Self {
            inner,
            fault: None,
            log: Arc::default(),
        }
    }

    /// Wraps `inner`, failing every transaction at `point`.
    #[must_use]
    pub fn failing_at(inner: InMemoryUnitOfWork, point: FailurePoint) -> Self {
        Self {
            fault: Some(Fault::Fail(point)),
            ..Self::new(inner)
        }
    }

    /// Wraps `inner`, never completing once a transaction reaches `point`.
    #[must_use]
    pub fn stalling_at(inner: InMemoryUnitOfWork, point: FailurePoint) -> Self {
        Self {
            fault: Some(Fault::Stall(point)),
            ..Self::new(inner)
        }
    }

    /// Number of `begin` calls.
    pub fn begins(&self) -> usize {
        self.log.begins.load(Ordering::SeqCst)
    }

    /// Number of successful commits.
    pub fn commits(&self) -> usize {
        self.log.commits.load(Ordering::SeqCst)
    }

    /// Number of explicit rollbacks.
    pub fn rollbacks(&self) -> usize {
        self.log.rollbacks.load(Ordering::SeqCst)
    }
}

fn injected(point: FailurePoint) -> DomainError {
    DomainError::Infrastructure(format!("injected failure at {point:?}"))
}

#[async_trait]
impl UnitOfWork for ScriptedUnitOfWork {
    async fn begin(&self) -> Result<Box<dyn TransactionScope>, DomainError> {
        self.log.begins.fetch_add(1, Ordering::SeqCst);
        reach(self.fault, FailurePoint::Begin).await?;
        let inner = self.inner.begin().await?;
        Ok(Box::new(ScriptedScope {
            inner,
            fault: self.fault,
            log: Arc::clone(&self.log),
        }))
    }
}

async fn reach(fault: Option<Fault>, point: FailurePoint) -> Result<(), DomainError> {
    match fault {
        Some(Fault::Fail(at)) if at == point => Err(injected(point)),
        Some(Fault::Stall(at)) if at == point => std::future::pending().await,
        _ => Ok(()),
    }
}

struct ScriptedScope {
    inner: Box<dyn TransactionScope>,
    fault: Option<Fault>,
    log: Arc<TransactionLog>,
}

#[async_trait]
impl ProductRepository for ScriptedScope {
    async fn find_by_id(&mut self, product_id: &str) -> Result<Product, DomainError> {
        reach(self.fault, FailurePoint::LoadProduct).await?;
        self.inner.products().find_by_id(product_id).await
    }

    async fn save(&mut self, product: &Product) -> Result<(), DomainError> {
        reach(self.fault, FailurePoint::SaveProduct).await?;
        self.inner.products().save(product).await
    }
}

#[async_trait]
impl TenantRepository for ScriptedScope {
    async fn find_by_id(&mut self, tenant_id: &str) -> Result<Tenant, DomainError> {
        reach(self.fault, FailurePoint::LoadTenant).await?;
        self.inner.tenants().find_by_id(tenant_id).await
    }
}

#[async_trait]
impl StockHistoryRepository for ScriptedScope {
    async fn create(&mut self, event: &StockAdded) -> Result<(), DomainError> {
        reach(self.fault, FailurePoint::CreateHistory).await?;
        self.inner.stock_history().create(event).await
    }
}

#[async_trait]
impl TransactionScope for ScriptedScope {
    fn products(&mut self) -> &mut dyn ProductRepository {
        self
    }

    fn tenants(&mut self) -> &mut dyn TenantRepository {
        self
    }

    fn stock_history(&mut self) -> &mut dyn StockHistoryRepository {
        self
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let Self { inner, fault, log } = *self;
        if let Err(err) = reach(fault, FailurePoint::Commit).await {
            // The failed commit applies nothing; the stage is discarded.
            drop(inner);
            return Err(err);
        }
        inner.commit().await?;
        log.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        let Self { inner, log, .. } = *self;
        log.rollbacks.fetch_add(1, Ordering::SeqCst);
        inner.rollback().await
    }
}
