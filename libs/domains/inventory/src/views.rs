//! Server-rendered pages.
//!
//! Templates are compiled into the binary and rendered with Handlebars, which
//! HTML-escapes every `{{value}}` interpolation.

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use handlebars::Handlebars;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};
use tracing::debug;
use validator::ValidationErrors;

use crate::error::{InventoryError, InventoryResult};
use crate::models::{
    Product, ProductDetails, ProductForm, Supplier, SupplierDetails, SupplierForm, SupplierSummary,
};

const PARTIALS: [(&str, &str); 4] = [
    ("header", include_str!("../templates/partials/header.hbs")),
    ("footer", include_str!("../templates/partials/footer.hbs")),
    (
        "supplier_fields",
        include_str!("../templates/partials/supplier_fields.hbs"),
    ),
    (
        "product_fields",
        include_str!("../templates/partials/product_fields.hbs"),
    ),
];

/// Every renderable page, named by its template path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
pub enum Page {
    #[strum(serialize = "home")]
    Home,
    #[strum(serialize = "suppliers/index")]
    SupplierIndex,
    #[strum(serialize = "suppliers/new")]
    SupplierNew,
    #[strum(serialize = "suppliers/edit")]
    SupplierEdit,
    #[strum(serialize = "suppliers/show")]
    SupplierShow,
    #[strum(serialize = "products/index")]
    ProductIndex,
    #[strum(serialize = "products/new")]
    ProductNew,
    #[strum(serialize = "products/edit")]
    ProductEdit,
    #[strum(serialize = "products/show")]
    ProductShow,
    #[strum(serialize = "error")]
    Error,
}

impl Page {
    fn source(self) -> &'static str {
        match self {
            Page::Home => include_str!("../templates/home.hbs"),
            Page::SupplierIndex => include_str!("../templates/suppliers/index.hbs"),
            Page::SupplierNew => include_str!("../templates/suppliers/new.hbs"),
            Page::SupplierEdit => include_str!("../templates/suppliers/edit.hbs"),
            Page::SupplierShow => include_str!("../templates/suppliers/show.hbs"),
            Page::ProductIndex => include_str!("../templates/products/index.hbs"),
            Page::ProductNew => include_str!("../templates/products/new.hbs"),
            Page::ProductEdit => include_str!("../templates/products/edit.hbs"),
            Page::ProductShow => include_str!("../templates/products/show.hbs"),
            Page::Error => include_str!("../templates/error.hbs"),
        }
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Field name to first error message.
pub type FieldErrors = BTreeMap<String, String>;

pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                (field.to_string(), message)
            })
        })
        .collect()
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

#[derive(Debug, Serialize)]
struct SupplierView {
    id: String,
    name: String,
    address: String,
    phone: String,
    created_at: String,
    updated_at: String,
}

impl From<&Supplier> for SupplierView {
    fn from(supplier: &Supplier) -> Self {
        Self {
            id: supplier.id.to_string(),
            name: supplier.name.clone(),
            address: supplier.address.clone(),
            phone: supplier.phone.clone(),
            created_at: timestamp(&supplier.created_at),
            updated_at: timestamp(&supplier.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
struct ProductView<'a> {
    id: String,
    name: &'a str,
    price: String,
    quantity: i64,
    supplier: Option<&'a SupplierSummary>,
    created_at: String,
    updated_at: String,
}

impl<'a> ProductView<'a> {
    fn new(product: &'a Product, supplier: Option<&'a SupplierSummary>) -> Self {
        Self {
            id: product.id.to_string(),
            name: &product.name,
            price: format!("{:.2}", product.price),
            quantity: product.quantity,
            supplier,
            created_at: timestamp(&product.created_at),
            updated_at: timestamp(&product.updated_at),
        }
    }
}

impl<'a> From<&'a ProductDetails> for ProductView<'a> {
    fn from(details: &'a ProductDetails) -> Self {
        Self::new(&details.product, details.supplier.as_ref())
    }
}

#[derive(Debug, Serialize)]
struct SupplierOption<'a> {
    id: String,
    name: &'a str,
    selected: bool,
}

fn supplier_options<'a>(suppliers: &'a [SupplierSummary], selected: &str) -> Vec<SupplierOption<'a>> {
    suppliers
        .iter()
        .map(|s| {
            let id = s.id.to_string();
            let selected = id == selected.trim();
            SupplierOption {
                id,
                name: &s.name,
                selected,
            }
        })
        .collect()
}

#[derive(Serialize)]
struct TitleOnly<'a> {
    title: &'a str,
}

#[derive(Serialize)]
struct SupplierListPage<'a> {
    title: &'a str,
    suppliers: Vec<SupplierView>,
}

#[derive(Serialize)]
struct SupplierShowPage<'a> {
    title: &'a str,
    supplier: SupplierView,
    product_count: usize,
    products: Vec<ProductView<'a>>,
}

#[derive(Serialize)]
struct SupplierFormPage<'a> {
    title: &'a str,
    id: Option<&'a str>,
    form: &'a SupplierForm,
    errors: FieldErrors,
}

#[derive(Serialize)]
struct ProductListPage<'a> {
    title: &'a str,
    products: Vec<ProductView<'a>>,
}

#[derive(Serialize)]
struct ProductShowPage<'a> {
    title: &'a str,
    product: ProductView<'a>,
}

#[derive(Serialize)]
struct ProductFormPage<'a> {
    title: &'a str,
    id: Option<&'a str>,
    form: &'a ProductForm,
    suppliers: Vec<SupplierOption<'a>>,
    errors: FieldErrors,
}

#[derive(Serialize)]
struct ErrorPage<'a> {
    title: &'a str,
    message: &'a str,
    detail: Option<&'a str>,
    status: u16,
}

/// Page renderer with every template and partial registered up front.
#[derive(Clone)]
pub struct Views {
    handlebars: Arc<Handlebars<'static>>,
}

impl Views {
    pub fn new() -> InventoryResult<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);

        for (name, source) in PARTIALS {
            handlebars.register_partial(name, source).map_err(|e| {
                InventoryError::Internal(format!("Failed to register partial {}: {}", name, e))
            })?;
        }

        for page in Page::iter() {
            handlebars
                .register_template_string(page.name(), page.source())
                .map_err(|e| {
                    InventoryError::Internal(format!(
                        "Failed to register template {}: {}",
                        page.name(),
                        e
                    ))
                })?;
        }

        Ok(Self {
            handlebars: Arc::new(handlebars),
        })
    }

    fn render<T: Serialize>(&self, page: Page, data: &T) -> InventoryResult<String> {
        debug!(page = page.name(), "Rendering page");
        Ok(self.handlebars.render(page.name(), data)?)
    }

    pub fn home(&self) -> InventoryResult<String> {
        self.render(Page::Home, &TitleOnly { title: "Home" })
    }

    pub fn supplier_index(&self, suppliers: &[Supplier]) -> InventoryResult<String> {
        self.render(
            Page::SupplierIndex,
            &SupplierListPage {
                title: "Suppliers",
                suppliers: suppliers.iter().map(SupplierView::from).collect(),
            },
        )
    }

    pub fn supplier_show(&self, details: &SupplierDetails) -> InventoryResult<String> {
        self.render(
            Page::SupplierShow,
            &SupplierShowPage {
                title: &details.supplier.name,
                supplier: SupplierView::from(&details.supplier),
                product_count: details.products.len(),
                products: details
                    .products
                    .iter()
                    .map(|p| ProductView::new(p, None))
                    .collect(),
            },
        )
    }

    pub fn supplier_new(
        &self,
        form: &SupplierForm,
        errors: Option<&ValidationErrors>,
    ) -> InventoryResult<String> {
        self.render(
            Page::SupplierNew,
            &SupplierFormPage {
                title: "New supplier",
                id: None,
                form,
                errors: errors.map(field_errors).unwrap_or_default(),
            },
        )
    }

    pub fn supplier_edit(
        &self,
        id: &str,
        form: &SupplierForm,
        errors: Option<&ValidationErrors>,
    ) -> InventoryResult<String> {
        self.render(
            Page::SupplierEdit,
            &SupplierFormPage {
                title: "Edit supplier",
                id: Some(id),
                form,
                errors: errors.map(field_errors).unwrap_or_default(),
            },
        )
    }

    pub fn product_index(&self, products: &[ProductDetails]) -> InventoryResult<String> {
        self.render(
            Page::ProductIndex,
            &ProductListPage {
                title: "Products",
                products: products.iter().map(ProductView::from).collect(),
            },
        )
    }

    pub fn product_show(&self, details: &ProductDetails) -> InventoryResult<String> {
        self.render(
            Page::ProductShow,
            &ProductShowPage {
                title: &details.product.name,
                product: ProductView::from(details),
            },
        )
    }

    pub fn product_new(
        &self,
        form: &ProductForm,
        suppliers: &[SupplierSummary],
        errors: Option<&ValidationErrors>,
    ) -> InventoryResult<String> {
        self.render(
            Page::ProductNew,
            &ProductFormPage {
                title: "New product",
                id: None,
                form,
                suppliers: supplier_options(suppliers, &form.supplier_id),
                errors: errors.map(field_errors).unwrap_or_default(),
            },
        )
    }

    pub fn product_edit(
        &self,
        id: &str,
        form: &ProductForm,
        suppliers: &[SupplierSummary],
        errors: Option<&ValidationErrors>,
    ) -> InventoryResult<String> {
        self.render(
            Page::ProductEdit,
            &ProductFormPage {
                title: "Edit product",
                id: Some(id),
                form,
                suppliers: supplier_options(suppliers, &form.supplier_id),
                errors: errors.map(field_errors).unwrap_or_default(),
            },
        )
    }

    pub fn error(
        &self,
        status: StatusCode,
        title: &str,
        message: &str,
        detail: Option<&str>,
    ) -> InventoryResult<String> {
        self.render(
            Page::Error,
            &ErrorPage {
                title,
                message,
                detail,
                status: status.as_u16(),
            },
        )
    }
}
