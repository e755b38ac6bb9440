//! MongoDB implementations of the supplier and product stores

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::{
    bson::{self, doc, Document},
    options::{FindOptions, IndexOptions},
    Collection, Database, IndexModel,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{InventoryError, InventoryResult};
use crate::models::{Product, Supplier};
use crate::store::{ProductStore, SupplierOrder, SupplierStore};

pub const SUPPLIERS_COLLECTION: &str = "suppliers";
pub const PRODUCTS_COLLECTION: &str = "products";

fn to_bson_uuid(id: Uuid) -> bson::Uuid {
    bson::Uuid::from_bytes(id.into_bytes())
}

fn from_bson_uuid(id: bson::Uuid) -> Uuid {
    Uuid::from_bytes(id.bytes())
}

fn to_bson_datetime(at: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(at.timestamp_millis())
}

fn from_bson_datetime(at: bson::DateTime) -> InventoryResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(at.timestamp_millis())
        .ok_or_else(|| InventoryError::Database(format!("timestamp out of range: {at}")))
}

fn by_id(id: Uuid) -> Document {
    doc! { "_id": to_bson_uuid(id) }
}

fn newest_first() -> FindOptions {
    FindOptions::builder()
        .sort(doc! { "created_at": -1, "_id": -1 })
        .build()
}

fn index(keys: Document, name: &str) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().name(name.to_string()).build())
        .build()
}

/// Stored shape of a supplier. Ids are BSON UUIDs and timestamps BSON dates
/// so that server-side sorting is chronological.
#[derive(Debug, Serialize, Deserialize)]
struct SupplierDocument {
    #[serde(rename = "_id")]
    id: bson::Uuid,
    name: String,
    address: String,
    phone: String,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl From<&Supplier> for SupplierDocument {
    fn from(supplier: &Supplier) -> Self {
        Self {
            id: to_bson_uuid(supplier.id),
            name: supplier.name.clone(),
            address: supplier.address.clone(),
            phone: supplier.phone.clone(),
            created_at: to_bson_datetime(supplier.created_at),
            updated_at: to_bson_datetime(supplier.updated_at),
        }
    }
}

impl SupplierDocument {
    fn into_supplier(self) -> InventoryResult<Supplier> {
        Ok(Supplier {
            id: from_bson_uuid(self.id),
            name: self.name,
            address: self.address,
            phone: self.phone,
            created_at: from_bson_datetime(self.created_at)?,
            updated_at: from_bson_datetime(self.updated_at)?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ProductDocument {
    #[serde(rename = "_id")]
    id: bson::Uuid,
    name: String,
    price: f64,
    quantity: i64,
    supplier_id: bson::Uuid,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl From<&Product> for ProductDocument {
    fn from(product: &Product) -> Self {
        Self {
            id: to_bson_uuid(product.id),
            name: product.name.clone(),
            price: product.price,
            quantity: product.quantity,
            supplier_id: to_bson_uuid(product.supplier_id),
            created_at: to_bson_datetime(product.created_at),
            updated_at: to_bson_datetime(product.updated_at),
        }
    }
}

impl ProductDocument {
    fn into_product(self) -> InventoryResult<Product> {
        Ok(Product {
            id: from_bson_uuid(self.id),
            name: self.name,
            price: self.price,
            quantity: self.quantity,
            supplier_id: from_bson_uuid(self.supplier_id),
            created_at: from_bson_datetime(self.created_at)?,
            updated_at: from_bson_datetime(self.updated_at)?,
        })
    }
}

/// MongoDB-backed [`SupplierStore`]
#[derive(Clone)]
pub struct MongoSupplierStore {
    collection: Collection<SupplierDocument>,
}

impl MongoSupplierStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(SUPPLIERS_COLLECTION),
        }
    }

    /// Create the indexes backing the list orderings.
    pub async fn init_indexes(&self) -> InventoryResult<()> {
        self.collection
            .create_indexes([
                index(doc! { "created_at": -1 }, "idx_created_at"),
                index(doc! { "name": 1 }, "idx_name"),
            ])
            .await?;
        tracing::info!("Supplier indexes created successfully");
        Ok(())
    }
}

#[async_trait]
impl SupplierStore for MongoSupplierStore {
    #[instrument(skip(self, supplier), fields(supplier_id = %supplier.id))]
    async fn insert(&self, supplier: &Supplier) -> InventoryResult<()> {
        self.collection
            .insert_one(SupplierDocument::from(supplier))
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> InventoryResult<Option<Supplier>> {
        self.collection
            .find_one(by_id(id))
            .await?
            .map(SupplierDocument::into_supplier)
            .transpose()
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn find_by_ids(&self, ids: &[Uuid]) -> InventoryResult<Vec<Supplier>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<bson::Uuid> = ids.iter().copied().map(to_bson_uuid).collect();
        let docs: Vec<SupplierDocument> = self
            .collection
            .find(doc! { "_id": { "$in": ids } })
            .await?
            .try_collect()
            .await?;
        docs.into_iter().map(SupplierDocument::into_supplier).collect()
    }

    #[instrument(skip(self))]
    async fn list(&self, order: SupplierOrder) -> InventoryResult<Vec<Supplier>> {
        let options = match order {
            SupplierOrder::Newest => newest_first(),
            SupplierOrder::Name => FindOptions::builder().sort(doc! { "name": 1 }).build(),
        };
        let docs: Vec<SupplierDocument> = self
            .collection
            .find(doc! {})
            .with_options(options)
            .await?
            .try_collect()
            .await?;
        docs.into_iter().map(SupplierDocument::into_supplier).collect()
    }

    #[instrument(skip(self, supplier), fields(supplier_id = %supplier.id))]
    async fn replace(&self, supplier: &Supplier) -> InventoryResult<bool> {
        let result = self
            .collection
            .replace_one(by_id(supplier.id), SupplierDocument::from(supplier))
            .await?;
        Ok(result.matched_count > 0)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> InventoryResult<Option<Supplier>> {
        self.collection
            .find_one_and_delete(by_id(id))
            .await?
            .map(SupplierDocument::into_supplier)
            .transpose()
    }
}

/// MongoDB-backed [`ProductStore`]
#[derive(Clone)]
pub struct MongoProductStore {
    collection: Collection<ProductDocument>,
}

impl MongoProductStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(PRODUCTS_COLLECTION),
        }
    }

    /// Create the supplier reference, name and listing indexes.
    pub async fn init_indexes(&self) -> InventoryResult<()> {
        self.collection
            .create_indexes([
                index(doc! { "supplier_id": 1 }, "idx_supplier_id"),
                index(doc! { "name": 1 }, "idx_name"),
                index(doc! { "created_at": -1 }, "idx_created_at"),
            ])
            .await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    async fn find_many(&self, filter: Document) -> InventoryResult<Vec<Product>> {
        let docs: Vec<ProductDocument> = self
            .collection
            .find(filter)
            .with_options(newest_first())
            .await?
            .try_collect()
            .await?;
        docs.into_iter().map(ProductDocument::into_product).collect()
    }
}

#[async_trait]
impl ProductStore for MongoProductStore {
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn insert(&self, product: &Product) -> InventoryResult<()> {
        self.collection
            .insert_one(ProductDocument::from(product))
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> InventoryResult<Option<Product>> {
        self.collection
            .find_one(by_id(id))
            .await?
            .map(ProductDocument::into_product)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn list(&self) -> InventoryResult<Vec<Product>> {
        self.find_many(doc! {}).await
    }

    #[instrument(skip(self))]
    async fn find_by_supplier(&self, supplier_id: Uuid) -> InventoryResult<Vec<Product>> {
        self.find_many(doc! { "supplier_id": to_bson_uuid(supplier_id) })
            .await
    }

    #[instrument(skip(self))]
    async fn count_by_supplier(&self, supplier_id: Uuid) -> InventoryResult<u64> {
        let count = self
            .collection
            .count_documents(doc! { "supplier_id": to_bson_uuid(supplier_id) })
            .await?;
        Ok(count)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn replace(&self, product: &Product) -> InventoryResult<bool> {
        let result = self
            .collection
            .replace_one(by_id(product.id), ProductDocument::from(product))
            .await?;
        Ok(result.matched_count > 0)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> InventoryResult<Option<Product>> {
        self.collection
            .find_one_and_delete(by_id(id))
            .await?
            .map(ProductDocument::into_product)
            .transpose()
    }
}
