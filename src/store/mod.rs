//! Persistence for orders, returns and the warehouse directory.
//!
//! Every write is a whole-document upsert of the aggregate as loaded and
//! modified by the caller. Nothing here locks a record between the load and the
//! save, so two concurrent writers of the same order race and the later save wins.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::domain::aggregates::{Order, ReturnRequest, Warehouse};
use crate::domain::value_objects::{OrderId, ProductId, ReturnId, VariantId, WarehouseId};
use crate::query::{OrderFilter, ReturnFilter};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("document encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn save(&self, order: &Order) -> StoreResult<()>;
    async fn get(&self, id: &OrderId) -> StoreResult<Option<Order>>;
    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: &OrderId) -> StoreResult<bool>;
    /// Matching orders, newest first.
    async fn find(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>>;
}

#[async_trait]
pub trait ReturnStore: Send + Sync {
    async fn save(&self, request: &ReturnRequest) -> StoreResult<()>;
    async fn get(&self, id: &ReturnId) -> StoreResult<Option<ReturnRequest>>;
    /// One page of matching returns, newest first, plus the total match count.
    async fn find(&self, filter: &ReturnFilter) -> StoreResult<(Vec<ReturnRequest>, u64)>;
    async fn count_for_order(&self, order_id: &OrderId) -> StoreResult<u64>;
    /// Units already under return for one order line, rejected returns excluded.
    async fn returned_quantity(&self, order_id: &OrderId, product_id: &ProductId, variant_id: Option<&VariantId>) -> StoreResult<u64>;
}

#[async_trait]
pub trait WarehouseStore: Send + Sync {
    async fn get(&self, id: &WarehouseId) -> StoreResult<Option<Warehouse>>;
    async fn list(&self) -> StoreResult<Vec<Warehouse>>;
}

/// Store handles shared by the services.
#[derive(Clone)]
pub struct Repositories {
    pub orders: Arc<dyn OrderStore>,
    pub returns: Arc<dyn ReturnStore>,
    pub warehouses: Arc<dyn WarehouseStore>,
}

impl Repositories {
    pub fn in_memory(warehouses: Vec<Warehouse>) -> Self {
        let store = Arc::new(MemoryStore::with_warehouses(warehouses));
        Self { orders: store.clone(), returns: store.clone(), warehouses: store }
    }

    /// Postgres when `DATABASE_URL` is set (migrated, then seeded), in-memory otherwise.
    pub async fn connect(config: &Config) -> StoreResult<Self> {
        let Some(url) = &config.database_url else {
            warn!(warehouses = config.warehouses.len(), "DATABASE_URL not set, using in-memory stores");
            return Ok(Self::in_memory(config.warehouses.clone()));
        };
        let pool = PgPoolOptions::new().max_connections(config.database_max_connections).connect(url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        let store = PgStore::new(pool);
        store.seed_warehouses(&config.warehouses).await?;
        if !config.warehouses.is_empty() {
            info!(warehouses = config.warehouses.len(), "warehouse directory seeded");
        }
        let store = Arc::new(store);
        Ok(Self { orders: store.clone(), returns: store.clone(), warehouses: store })
    }
}
