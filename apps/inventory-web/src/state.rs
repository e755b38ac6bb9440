//! Shared application state.

use domain_inventory::{MongoProductStore, MongoSupplierStore};
use mongodb::{Client, Database};
use std::sync::Arc;

/// Connection handles and configuration, cloned into each route group.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// Shares the driver's connection pool
    pub mongo_client: Client,
    pub db: Database,
}

impl AppState {
    pub fn supplier_store(&self) -> Arc<MongoSupplierStore> {
        Arc::new(MongoSupplierStore::new(&self.db))
    }

    pub fn product_store(&self) -> Arc<MongoProductStore> {
        Arc::new(MongoProductStore::new(&self.db))
    }
}
