use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::{InventoryError, InventoryResult};
use crate::models::{parse_id, Product, Supplier, SupplierInput};
use crate::store::{ProductStore, SupplierOrder, SupplierStore};

/// Supplier persistence rules, including the delete guard against
/// referencing products.
pub struct SupplierRepository<S, P> {
    suppliers: Arc<S>,
    products: Arc<P>,
}

impl<S, P> Clone for SupplierRepository<S, P> {
    fn clone(&self) -> Self {
        Self {
            suppliers: Arc::clone(&self.suppliers),
            products: Arc::clone(&self.products),
        }
    }
}

impl<S: SupplierStore, P: ProductStore> SupplierRepository<S, P> {
    pub fn new(suppliers: Arc<S>, products: Arc<P>) -> Self {
        Self {
            suppliers,
            products,
        }
    }

    /// All suppliers, newest first.
    pub async fn list(&self) -> InventoryResult<Vec<Supplier>> {
        self.suppliers.list(SupplierOrder::Newest).await
    }

    /// All suppliers ordered by name, for selection lists.
    pub async fn list_by_name(&self) -> InventoryResult<Vec<Supplier>> {
        self.suppliers.list(SupplierOrder::Name).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: SupplierInput) -> InventoryResult<Supplier> {
        input.validate()?;

        let supplier = Supplier::new(input);
        self.suppliers.insert(&supplier).await?;

        info!(supplier_id = %supplier.id, "Supplier created");
        Ok(supplier)
    }

    /// Malformed and unknown ids both yield `NotFound`.
    pub async fn get_by_id(&self, id: &str) -> InventoryResult<Supplier> {
        let uuid = parse_id(id).ok_or_else(|| InventoryError::supplier_not_found(id))?;
        self.suppliers
            .find_by_id(uuid)
            .await?
            .ok_or_else(|| InventoryError::supplier_not_found(id))
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: &str, input: SupplierInput) -> InventoryResult<Supplier> {
        let mut supplier = self.get_by_id(id).await?;
        input.validate()?;

        supplier.apply_update(input);
        if !self.suppliers.replace(&supplier).await? {
            return Err(InventoryError::supplier_not_found(id));
        }

        info!(supplier_id = %supplier.id, "Supplier updated");
        Ok(supplier)
    }

    /// Deletes a supplier that no product references.
    ///
    /// Products are counted before the supplier is looked up, so references
    /// left behind by an already removed supplier still block with a
    /// conflict. Counting and deleting are separate store calls: a product
    /// inserted in between is left pointing at a removed supplier, and reads
    /// tolerate such dangling references.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> InventoryResult<Supplier> {
        let uuid = parse_id(id).ok_or_else(|| InventoryError::supplier_not_found(id))?;

        let count = self.products.count_by_supplier(uuid).await?;
        if count > 0 {
            warn!(supplier_id = %uuid, count, "Refusing to delete supplier with products");
            return Err(InventoryError::SupplierHasProducts { count });
        }

        let removed = self
            .suppliers
            .delete(uuid)
            .await?
            .ok_or_else(|| InventoryError::supplier_not_found(id))?;

        info!(supplier_id = %removed.id, "Supplier deleted");
        Ok(removed)
    }

    /// Products referencing `id`, newest first.
    pub async fn products_for(&self, id: Uuid) -> InventoryResult<Vec<Product>> {
        self.products.find_by_supplier(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductInput;
    use crate::store::{InMemoryProductStore, InMemorySupplierStore};

    type Repo = SupplierRepository<InMemorySupplierStore, InMemoryProductStore>;

    fn repo() -> (Repo, Arc<InMemoryProductStore>) {
        let products = Arc::new(InMemoryProductStore::new());
        let repo = SupplierRepository::new(Arc::new(InMemorySupplierStore::new()), products.clone());
        (repo, products)
    }

    fn acme() -> SupplierInput {
        SupplierInput::new("Acme", "1 Main St", "+1-555-0100")
    }

    async fn add_product(products: &InMemoryProductStore, supplier_id: Uuid) {
        let product = Product::new(ProductInput {
            name: "Widget".to_string(),
            price: 9.99,
            quantity: 10,
            supplier_id,
        });
        products.insert(&product).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_then_get_returns_same_fields() {
        let (repo, _) = repo();

        let created = repo.create(acme()).await.unwrap();
        let fetched = repo.get_by_id(&created.id.to_string()).await.unwrap();

        assert_eq!(fetched.name, "Acme");
        assert_eq!(fetched.address, "1 Main St");
        assert_eq!(fetched.phone, "+1-555-0100");
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.created_at, created.created_at);
        assert_eq!(fetched.updated_at, created.updated_at);
    }

    #[tokio::test]
    async fn test_create_with_invalid_phone_persists_nothing() {
        let (repo, _) = repo();

        let err = repo
            .create(SupplierInput::new("Acme", "1 Main St", "call me"))
            .await
            .unwrap_err();

        assert!(matches!(err, InventoryError::Validation(ref e) if e.field_errors().len() == 1));
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_by_id_collapses_malformed_and_missing() {
        let (repo, _) = repo();

        for id in ["not-a-uuid".to_string(), Uuid::now_v7().to_string()] {
            let err = repo.get_by_id(&id).await.unwrap_err();
            assert!(matches!(err, InventoryError::NotFound { entity: "Supplier", .. }));
        }
    }

    #[tokio::test]
    async fn test_update_replaces_fields_and_validates() {
        let (repo, _) = repo();
        let created = repo.create(acme()).await.unwrap();
        let id = created.id.to_string();

        let updated = repo
            .update(&id, SupplierInput::new("Acme Ltd", "2 Side St", "555"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Acme Ltd");
        assert_eq!(updated.created_at, created.created_at);

        let input = SupplierInput::new(&"x".repeat(101), "2 Side St", "555");
        assert!(matches!(
            repo.update(&id, input).await,
            Err(InventoryError::Validation(_))
        ));
        assert_eq!(repo.get_by_id(&id).await.unwrap().name, "Acme Ltd");

        assert!(matches!(
            repo.update(&Uuid::now_v7().to_string(), acme()).await,
            Err(InventoryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_is_blocked_by_products() {
        let (repo, products) = repo();
        let supplier = repo.create(acme()).await.unwrap();
        add_product(&products, supplier.id).await;
        add_product(&products, supplier.id).await;

        let err = repo.delete(&supplier.id.to_string()).await.unwrap_err();

        assert!(matches!(err, InventoryError::SupplierHasProducts { count: 2 }));
        assert!(repo.get_by_id(&supplier.id.to_string()).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_counts_dangling_products_of_missing_supplier() {
        let (repo, products) = repo();
        let gone = Uuid::now_v7();
        add_product(&products, gone).await;

        let err = repo.delete(&gone.to_string()).await.unwrap_err();
        assert!(matches!(err, InventoryError::SupplierHasProducts { count: 1 }));

        assert!(matches!(
            repo.delete("not-a-uuid").await,
            Err(InventoryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let (repo, _) = repo();
        let supplier = repo.create(acme()).await.unwrap();
        let id = supplier.id.to_string();

        assert_eq!(repo.delete(&id).await.unwrap().id, supplier.id);
        assert!(matches!(
            repo.get_by_id(&id).await,
            Err(InventoryError::NotFound { .. })
        ));
        assert!(matches!(
            repo.delete(&id).await,
            Err(InventoryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_products_for_returns_only_referencing_products() {
        let (repo, products) = repo();
        let acme = repo.create(acme()).await.unwrap();
        let other = repo
            .create(SupplierInput::new("Other", "2 Side St", "555"))
            .await
            .unwrap();
        add_product(&products, acme.id).await;
        add_product(&products, other.id).await;

        let found = repo.products_for(acme.id).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].supplier_id, acme.id);
    }
}
