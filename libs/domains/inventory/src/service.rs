use std::sync::Arc;
use tracing::instrument;

use crate::error::{InventoryError, UseCaseError, UseCaseResult};
use crate::models::{
    Product, ProductDetails, ProductForm, Supplier, SupplierDetails, SupplierForm, SupplierSummary,
};
use crate::products::ProductRepository;
use crate::store::{ProductStore, SupplierStore};
use crate::suppliers::SupplierRepository;

/// Use-case layer over both repositories.
///
/// Every method classifies failures into a [`crate::error::UseCaseError`]:
/// store and other unexpected failures surface as `InternalError`, including
/// failures of secondary lookups such as the supplier options list.
pub struct InventoryService<S, P> {
    suppliers: SupplierRepository<S, P>,
    products: ProductRepository<P, S>,
}

impl<S, P> Clone for InventoryService<S, P> {
    fn clone(&self) -> Self {
        Self {
            suppliers: self.suppliers.clone(),
            products: self.products.clone(),
        }
    }
}

impl<S: SupplierStore, P: ProductStore> InventoryService<S, P> {
    pub fn new(suppliers: Arc<S>, products: Arc<P>) -> Self {
        Self {
            suppliers: SupplierRepository::new(Arc::clone(&suppliers), Arc::clone(&products)),
            products: ProductRepository::new(products, suppliers),
        }
    }

    pub async fn list_suppliers(&self) -> UseCaseResult<Vec<Supplier>> {
        Ok(self.suppliers.list().await?)
    }

    #[instrument(skip(self, form))]
    pub async fn create_supplier(&self, form: &SupplierForm) -> UseCaseResult<Supplier> {
        let input = form.parse().map_err(InventoryError::from)?;
        Ok(self.suppliers.create(input).await?)
    }

    /// A supplier together with the products that reference it.
    pub async fn show_supplier(&self, id: &str) -> UseCaseResult<SupplierDetails> {
        let supplier = self.suppliers.get_by_id(id).await?;
        let products = self.suppliers.products_for(supplier.id).await?;
        Ok(SupplierDetails { supplier, products })
    }

    pub async fn edit_supplier(&self, id: &str) -> UseCaseResult<Supplier> {
        Ok(self.suppliers.get_by_id(id).await?)
    }

    #[instrument(skip(self, form))]
    pub async fn update_supplier(&self, id: &str, form: &SupplierForm) -> UseCaseResult<Supplier> {
        // Unknown ids win over invalid input.
        self.suppliers.get_by_id(id).await?;
        let input = form.parse().map_err(InventoryError::from)?;
        Ok(self.suppliers.update(id, input).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_supplier(&self, id: &str) -> UseCaseResult<Supplier> {
        Ok(self.suppliers.delete(id).await?)
    }

    pub async fn list_products(&self) -> UseCaseResult<Vec<ProductDetails>> {
        Ok(self.products.list().await?)
    }

    /// Suppliers ordered by name, for the product form's selection list.
    pub async fn supplier_options(&self) -> UseCaseResult<Vec<SupplierSummary>> {
        let suppliers = self.suppliers.list_by_name().await?;
        Ok(suppliers.iter().map(SupplierSummary::from).collect())
    }

    pub async fn new_product_form(&self) -> UseCaseResult<Vec<SupplierSummary>> {
        self.supplier_options().await
    }

    #[instrument(skip(self, form))]
    pub async fn create_product(&self, form: &ProductForm) -> UseCaseResult<Product> {
        let input = form.parse().map_err(InventoryError::from)?;
        Ok(self.products.create(input).await?)
    }

    pub async fn show_product(&self, id: &str) -> UseCaseResult<ProductDetails> {
        Ok(self.products.get_by_id(id).await?)
    }

    /// The product and the supplier options, fetched concurrently. Either
    /// failing fails the whole use case.
    pub async fn edit_product(
        &self,
        id: &str,
    ) -> UseCaseResult<(ProductDetails, Vec<SupplierSummary>)> {
        let (details, suppliers) = tokio::try_join!(
            async { self.products.get_by_id(id).await.map_err(UseCaseError::from) },
            self.supplier_options(),
        )?;
        Ok((details, suppliers))
    }

    #[instrument(skip(self, form))]
    pub async fn update_product(
        &self,
        id: &str,
        form: &ProductForm,
    ) -> UseCaseResult<ProductDetails> {
        self.products.get_by_id(id).await?;
        let input = form.parse().map_err(InventoryError::from)?;
        Ok(self.products.update(id, input).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &str) -> UseCaseResult<Product> {
        Ok(self.products.delete(id).await?)
    }
}
