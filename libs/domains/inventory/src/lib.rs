//! Inventory Domain
//!
//! Suppliers and the products they provide, stored in MongoDB and managed
//! through server-rendered HTML pages.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTML pages, form posts, redirects
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Form parsing, error classification
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │Repositories │  ← Validation, referential rules, joins
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Stores    │  ← Persistence (trait + MongoDB / in-memory)
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_inventory::{
//!     handlers::{self, InventoryState},
//!     InventoryService, MongoProductStore, MongoSupplierStore, Views,
//! };
//! use mongodb::Client;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("product_supplier_db");
//!
//! let service = InventoryService::new(
//!     Arc::new(MongoSupplierStore::new(&db)),
//!     Arc::new(MongoProductStore::new(&db)),
//! );
//! let router = handlers::router(InventoryState::new(service, Views::new()?));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod products;
pub mod service;
pub mod store;
pub mod suppliers;
pub mod views;

pub use error::{InventoryError, InventoryResult, UseCaseError, UseCaseResult};
pub use handlers::InventoryState;
pub use models::{
    Product, ProductDetails, ProductForm, ProductInput, Supplier, SupplierDetails, SupplierForm,
    SupplierInput, SupplierSummary,
};
pub use mongodb::{MongoProductStore, MongoSupplierStore};
pub use products::ProductRepository;
pub use service::InventoryService;
pub use store::{InMemoryProductStore, InMemorySupplierStore, ProductStore, SupplierStore};
pub use suppliers::SupplierRepository;
pub use views::Views;
