use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::error::{InventoryError, InventoryResult};
use crate::models::{
    parse_id, supplier_missing, Product, ProductDetails, ProductInput, Supplier, SupplierSummary,
};
use crate::store::{ProductStore, SupplierStore};

/// Product persistence rules: field validation, supplier reference checks on
/// write and the supplier join on read.
pub struct ProductRepository<P, S> {
    products: Arc<P>,
    suppliers: Arc<S>,
}

impl<P, S> Clone for ProductRepository<P, S> {
    fn clone(&self) -> Self {
        Self {
            products: Arc::clone(&self.products),
            suppliers: Arc::clone(&self.suppliers),
        }
    }
}

impl<P: ProductStore, S: SupplierStore> ProductRepository<P, S> {
    pub fn new(products: Arc<P>, suppliers: Arc<S>) -> Self {
        Self {
            products,
            suppliers,
        }
    }

    /// All products, newest first, each with its supplier attached.
    ///
    /// Suppliers are fetched with one lookup over the distinct referenced ids.
    pub async fn list(&self) -> InventoryResult<Vec<ProductDetails>> {
        let products = self.products.list().await?;

        let mut supplier_ids: Vec<Uuid> = products.iter().map(|p| p.supplier_id).collect();
        supplier_ids.sort_unstable();
        supplier_ids.dedup();

        let suppliers: HashMap<Uuid, SupplierSummary> = self
            .suppliers
            .find_by_ids(&supplier_ids)
            .await?
            .iter()
            .map(|s| (s.id, SupplierSummary::from(s)))
            .collect();

        Ok(products
            .into_iter()
            .map(|product| {
                let supplier = suppliers.get(&product.supplier_id).cloned();
                ProductDetails { product, supplier }
            })
            .collect())
    }

    #[instrument(skip(self, input), fields(name = %input.name, supplier_id = %input.supplier_id))]
    pub async fn create(&self, input: ProductInput) -> InventoryResult<Product> {
        input.validate()?;
        self.resolve_supplier(input.supplier_id).await?;

        let product = Product::new(input);
        self.products.insert(&product).await?;

        info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Malformed and unknown ids both yield `NotFound`.
    pub async fn get_by_id(&self, id: &str) -> InventoryResult<ProductDetails> {
        let product = self.find(id).await?;
        let supplier = self
            .suppliers
            .find_by_id(product.supplier_id)
            .await?
            .as_ref()
            .map(SupplierSummary::from);

        Ok(ProductDetails { product, supplier })
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: &str, input: ProductInput) -> InventoryResult<ProductDetails> {
        let mut product = self.find(id).await?;
        input.validate()?;
        let supplier = self.resolve_supplier(input.supplier_id).await?;

        product.apply_update(input);
        if !self.products.replace(&product).await? {
            return Err(InventoryError::product_not_found(id));
        }

        info!(product_id = %product.id, "Product updated");
        Ok(ProductDetails {
            product,
            supplier: Some(SupplierSummary::from(&supplier)),
        })
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> InventoryResult<Product> {
        let uuid = parse_id(id).ok_or_else(|| InventoryError::product_not_found(id))?;
        let removed = self
            .products
            .delete(uuid)
            .await?
            .ok_or_else(|| InventoryError::product_not_found(id))?;

        info!(product_id = %removed.id, "Product deleted");
        Ok(removed)
    }

    async fn find(&self, id: &str) -> InventoryResult<Product> {
        let uuid = parse_id(id).ok_or_else(|| InventoryError::product_not_found(id))?;
        self.products
            .find_by_id(uuid)
            .await?
            .ok_or_else(|| InventoryError::product_not_found(id))
    }

    /// A dangling `supplier_id` is a field error on `supplierId`.
    async fn resolve_supplier(&self, supplier_id: Uuid) -> InventoryResult<Supplier> {
        match self.suppliers.find_by_id(supplier_id).await? {
            Some(supplier) => Ok(supplier),
            None => {
                let mut errors = ValidationErrors::new();
                errors.add("supplierId", supplier_missing());
                Err(errors.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SupplierInput;
    use crate::store::{InMemoryProductStore, InMemorySupplierStore};

    type Repo = ProductRepository<InMemoryProductStore, InMemorySupplierStore>;

    async fn setup() -> (Repo, Arc<InMemorySupplierStore>, Supplier) {
        let suppliers = Arc::new(InMemorySupplierStore::new());
        let repo = ProductRepository::new(Arc::new(InMemoryProductStore::new()), suppliers.clone());
        let acme = Supplier::new(SupplierInput::new("Acme", "1 Main St", "+1-555-0100"));
        suppliers.insert(&acme).await.unwrap();
        (repo, suppliers, acme)
    }

    fn widget(supplier_id: Uuid) -> ProductInput {
        ProductInput {
            name: "Widget".to_string(),
            price: 9.99,
            quantity: 10,
            supplier_id,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_attaches_supplier() {
        let (repo, _, acme) = setup().await;

        let product = repo.create(widget(acme.id)).await.unwrap();
        let details = repo.get_by_id(&product.id.to_string()).await.unwrap();

        assert_eq!(details.product, product);
        assert_eq!(details.supplier, Some(SupplierSummary::from(&acme)));
    }

    #[tokio::test]
    async fn test_create_with_unknown_supplier_persists_nothing() {
        let (repo, _, _) = setup().await;

        let err = repo.create(widget(Uuid::now_v7())).await.unwrap_err();

        match err {
            InventoryError::Validation(errors) => {
                assert!(errors.field_errors().keys().any(|k| k.to_string() == "supplierId"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_negative_quantity() {
        let (repo, _, acme) = setup().await;

        let mut input = widget(acme.id);
        input.quantity = -1;

        assert!(matches!(
            repo.create(input).await,
            Err(InventoryError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_list_is_newest_first_with_current_supplier_fields() {
        let (repo, suppliers, mut acme) = setup().await;
        let other = Supplier::new(SupplierInput::new("Other", "2 Side St", "555"));
        suppliers.insert(&other).await.unwrap();

        let first = repo.create(widget(acme.id)).await.unwrap();
        let second = repo.create(widget(other.id)).await.unwrap();
        let third = repo.create(widget(acme.id)).await.unwrap();

        acme.name = "Acme Renamed".to_string();
        suppliers.replace(&acme).await.unwrap();

        let listed = repo.list().await.unwrap();
        let ids: Vec<_> = listed.iter().map(|d| d.product.id).collect();
        assert_eq!(ids, [third.id, second.id, first.id]);

        for details in &listed {
            let expected = if details.product.supplier_id == acme.id {
                SupplierSummary::from(&acme)
            } else {
                SupplierSummary::from(&other)
            };
            assert_eq!(details.supplier.as_ref(), Some(&expected));
        }
        assert_eq!(listed[0].supplier.as_ref().unwrap().name, "Acme Renamed");
    }

    #[tokio::test]
    async fn test_list_tolerates_dangling_supplier() {
        let (repo, suppliers, acme) = setup().await;
        repo.create(widget(acme.id)).await.unwrap();
        suppliers.delete(acme.id).await.unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].supplier.is_none());
    }

    #[tokio::test]
    async fn test_update_rechecks_supplier_reference() {
        let (repo, suppliers, acme) = setup().await;
        let product = repo.create(widget(acme.id)).await.unwrap();
        let id = product.id.to_string();

        let other = Supplier::new(SupplierInput::new("Other", "2 Side St", "555"));
        suppliers.insert(&other).await.unwrap();

        let mut input = widget(other.id);
        input.price = 12.5;
        let updated = repo.update(&id, input).await.unwrap();
        assert_eq!(updated.product.price, 12.5);
        assert_eq!(updated.supplier.unwrap().name, "Other");

        assert!(matches!(
            repo.update(&id, widget(Uuid::now_v7())).await,
            Err(InventoryError::Validation(_))
        ));
        assert!(matches!(
            repo.update("bogus", widget(acme.id)).await,
            Err(InventoryError::NotFound { entity: "Product", .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let (repo, _, acme) = setup().await;
        let product = repo.create(widget(acme.id)).await.unwrap();
        let id = product.id.to_string();

        assert_eq!(repo.delete(&id).await.unwrap(), product);
        assert!(matches!(
            repo.delete(&id).await,
            Err(InventoryError::NotFound { .. })
        ));
        assert!(matches!(
            repo.get_by_id(&id).await,
            Err(InventoryError::NotFound { .. })
        ));
    }
}
