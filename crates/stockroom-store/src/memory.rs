//! In-memory implementation of the `UnitOfWork` port.
//!
//! Committed state lives behind a mutex shared by all scopes. A scope stages
//! its product saves and history records, sees its own staged writes, and
//! applies them in one step at commit. Rolling back or dropping a scope
//! discards the stage.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use stockroom_core::error::DomainError;
use stockroom_inventory::application::ports::{
    ProductRepository, StockHistoryRepository, TenantRepository, TransactionScope, UnitOfWork,
};
use stockroom_inventory::domain::entities::{Product, Tenant};
use stockroom_inventory::domain::events::StockAdded;
use tracing::debug;

#[derive(Debug, Default)]
struct StoreState {
    tenants: HashMap<String, Tenant>,
    products: HashMap<String, Product>,
    stock_history: Vec<StockAdded>,
}

fn lock(state: &Mutex<StoreState>) -> MutexGuard<'_, StoreState> {
    // Every mutation is a single insert or push, so a poisoned guard still
    // holds consistent data.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process-local unit of work, used for development and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUnitOfWork {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryUnitOfWork {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a tenant.
    pub fn insert_tenant(&self, tenant: Tenant) {
        lock(&self.state).tenants.insert(tenant.id.clone(), tenant);
    }

    /// Inserts or replaces a product, keeping its version.
    pub fn insert_product(&self, product: Product) {
        lock(&self.state).products.insert(product.id.clone(), product);
    }

    /// Returns the committed copy of a product.
    #[must_use]
    pub fn product(&self, product_id: &str) -> Option<Product> {
        lock(&self.state).products.get(product_id).cloned()
    }

    /// Returns every committed audit record, oldest first.
    #[must_use]
    pub fn stock_history(&self) -> Vec<StockAdded> {
        lock(&self.state).stock_history.clone()
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn begin(&self) -> Result<Box<dyn TransactionScope>, DomainError> {
        Ok(Box::new(InMemoryScope {
            state: Arc::clone(&self.state),
            staged_products: HashMap::new(),
            staged_history: Vec::new(),
        }))
    }
}

/// An open in-memory transaction.
#[derive(Debug)]
pub struct InMemoryScope {
    state: Arc<Mutex<StoreState>>,
    /// Staged product keyed by id, with the committed version it was based on.
    staged_products: HashMap<String, (i64, Product)>,
    staged_history: Vec<StockAdded>,
}

#[async_trait]
impl ProductRepository for InMemoryScope {
    async fn find_by_id(&mut self, product_id: &str) -> Result<Product, DomainError> {
        if let Some((_, staged)) = self.staged_products.get(product_id) {
            return Ok(staged.clone());
        }
        lock(&self.state)
            .products
            .get(product_id)
            .cloned()
            .ok_or(DomainError::ProductNotFound)
    }

    async fn save(&mut self, product: &Product) -> Result<(), DomainError> {
        let (base, actual) = match self.staged_products.get(&product.id) {
            Some((base, staged)) => (*base, staged.version()),
            None => {
                let committed = lock(&self.state)
                    .products
                    .get(&product.id)
                    .map(Product::version)
                    .ok_or(DomainError::ProductNotFound)?;
                (committed, committed)
            }
        };
        if actual != product.version() {
            return Err(DomainError::ConcurrencyConflict {
                product_id: product.id.clone(),
                expected: product.version(),
                actual,
            });
        }

        let next = product.clone().with_version(product.version() + 1);
        self.staged_products.insert(product.id.clone(), (base, next));
        Ok(())
    }
}

#[async_trait]
impl TenantRepository for InMemoryScope {
    async fn find_by_id(&mut self, tenant_id: &str) -> Result<Tenant, DomainError> {
        lock(&self.state)
            .tenants
            .get(tenant_id)
            .cloned()
            .ok_or(DomainError::TenantNotFound)
    }
}

#[async_trait]
impl StockHistoryRepository for InMemoryScope {
    async fn create(&mut self, event: &StockAdded) -> Result<(), DomainError> {
        self.staged_history.push(event.clone());
        Ok(())
    }
}

#[async_trait]
impl TransactionScope for InMemoryScope {
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
        let Self {
            state,
            staged_products,
            staged_history,
        } = *self;
        let mut committed = lock(&state);

        // Validate every staged product before touching committed state.
        for (loaded_at, staged) in staged_products.values() {
            let loaded_at = *loaded_at;
            let actual = committed
                .products
                .get(&staged.id)
                .map_or(-1, Product::version);
            if actual != loaded_at {
                debug!(product_id = %staged.id, expected = loaded_at, actual, "commit lost an update race");
                return Err(DomainError::ConcurrencyConflict {
                    product_id: staged.id.clone(),
                    expected: loaded_at,
                    actual,
                });
            }
        }

        committed.products.extend(
            staged_products
                .into_iter()
                .map(|(id, (_, product))| (id, product)),
        );
        committed.stock_history.extend(staged_history);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        Ok(())
    }
}
