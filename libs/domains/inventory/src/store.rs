//! Data store seams for the two collections.
//!
//! Stores only persist and query; validation and the supplier/product
//! integrity rules live in the repositories.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::InventoryResult;
use crate::models::{Product, Supplier};

/// Ordering for supplier listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SupplierOrder {
    /// Creation time, newest first
    #[default]
    Newest,
    /// Name, ascending
    Name,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SupplierStore: Send + Sync {
    async fn insert(&self, supplier: &Supplier) -> InventoryResult<()>;

    async fn find_by_id(&self, id: Uuid) -> InventoryResult<Option<Supplier>>;

    /// Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> InventoryResult<Vec<Supplier>>;

    async fn list(&self, order: SupplierOrder) -> InventoryResult<Vec<Supplier>>;

    /// Returns `false` when no document has the supplier's id.
    async fn replace(&self, supplier: &Supplier) -> InventoryResult<bool>;

    /// Returns the removed document.
    async fn delete(&self, id: Uuid) -> InventoryResult<Option<Supplier>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert(&self, product: &Product) -> InventoryResult<()>;

    async fn find_by_id(&self, id: Uuid) -> InventoryResult<Option<Product>>;

    /// Newest first.
    async fn list(&self) -> InventoryResult<Vec<Product>>;

    /// Newest first.
    async fn find_by_supplier(&self, supplier_id: Uuid) -> InventoryResult<Vec<Product>>;

    async fn count_by_supplier(&self, supplier_id: Uuid) -> InventoryResult<u64>;

    /// Returns `false` when no document has the product's id.
    async fn replace(&self, product: &Product) -> InventoryResult<bool>;

    /// Returns the removed document.
    async fn delete(&self, id: Uuid) -> InventoryResult<Option<Product>>;
}

/// In-memory supplier store for development and testing
#[derive(Clone, Default)]
pub struct InMemorySupplierStore {
    suppliers: Arc<RwLock<HashMap<Uuid, Supplier>>>,
}

impl InMemorySupplierStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// UUIDv7 ids order by creation, which breaks ties between equal timestamps.
fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (chrono::DateTime<chrono::Utc>, Uuid)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl SupplierStore for InMemorySupplierStore {
    async fn insert(&self, supplier: &Supplier) -> InventoryResult<()> {
        self.suppliers
            .write()
            .await
            .insert(supplier.id, supplier.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> InventoryResult<Option<Supplier>> {
        Ok(self.suppliers.read().await.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> InventoryResult<Vec<Supplier>> {
        let suppliers = self.suppliers.read().await;
        Ok(ids.iter().filter_map(|id| suppliers.get(id).cloned()).collect())
    }

    async fn list(&self, order: SupplierOrder) -> InventoryResult<Vec<Supplier>> {
        let mut suppliers: Vec<Supplier> = self.suppliers.read().await.values().cloned().collect();
        match order {
            SupplierOrder::Newest => newest_first(&mut suppliers, |s| (s.created_at, s.id)),
            SupplierOrder::Name => suppliers.sort_by(|a, b| a.name.cmp(&b.name)),
        }
        Ok(suppliers)
    }

    async fn replace(&self, supplier: &Supplier) -> InventoryResult<bool> {
        let mut suppliers = self.suppliers.write().await;
        match suppliers.get_mut(&supplier.id) {
            Some(existing) => {
                *existing = supplier.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> InventoryResult<Option<Supplier>> {
        Ok(self.suppliers.write().await.remove(&id))
    }
}

/// In-memory product store for development and testing
#[derive(Clone, Default)]
pub struct InMemoryProductStore {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn insert(&self, product: &Product) -> InventoryResult<()> {
        self.products
            .write()
            .await
            .insert(product.id, product.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> InventoryResult<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn list(&self) -> InventoryResult<Vec<Product>> {
        let mut products: Vec<Product> = self.products.read().await.values().cloned().collect();
        newest_first(&mut products, |p| (p.created_at, p.id));
        Ok(products)
    }

    async fn find_by_supplier(&self, supplier_id: Uuid) -> InventoryResult<Vec<Product>> {
        let mut products: Vec<Product> = self
            .products
            .read()
            .await
            .values()
            .filter(|p| p.supplier_id == supplier_id)
            .cloned()
            .collect();
        newest_first(&mut products, |p| (p.created_at, p.id));
        Ok(products)
    }

    async fn count_by_supplier(&self, supplier_id: Uuid) -> InventoryResult<u64> {
        let products = self.products.read().await;
        Ok(products.values().filter(|p| p.supplier_id == supplier_id).count() as u64)
    }

    async fn replace(&self, product: &Product) -> InventoryResult<bool> {
        let mut products = self.products.write().await;
        match products.get_mut(&product.id) {
            Some(existing) => {
                *existing = product.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> InventoryResult<Option<Product>> {
        Ok(self.products.write().await.remove(&id))
    }
}
