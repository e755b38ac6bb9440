//! HTML pages and form endpoints for suppliers and products.
//!
//! Browsers submit updates and deletes as `POST` forms carrying a `_method`
//! field; wrap the router with `axum_helpers::with_method_override` so those
//! reach the `PUT` and `DELETE` routes below.

use axum::{
    extract::{rejection::FormRejection, Form, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tracing::{debug, error};

use crate::error::{InventoryResult, UseCaseError};
use crate::models::{ProductForm, SupplierForm};
use crate::service::InventoryService;
use crate::store::{ProductStore, SupplierStore};
use crate::views::Views;

/// Everything a page handler needs.
pub struct InventoryState<S, P> {
    pub service: InventoryService<S, P>,
    pub views: Views,
    /// Show internal error details on the 500 page. Keep off in production.
    pub expose_errors: bool,
}

type Shared<S, P> = State<Arc<InventoryState<S, P>>>;

impl<S, P> InventoryState<S, P> {
    pub fn new(service: InventoryService<S, P>, views: Views) -> Self {
        Self {
            service,
            views,
            expose_errors: false,
        }
    }

    pub fn with_exposed_errors(mut self, expose: bool) -> Self {
        self.expose_errors = expose;
        self
    }

    fn page(&self, rendered: InventoryResult<String>) -> Response {
        self.page_with_status(StatusCode::OK, rendered)
    }

    fn page_with_status(&self, status: StatusCode, rendered: InventoryResult<String>) -> Response {
        match rendered {
            Ok(body) => (status, Html(body)).into_response(),
            Err(err) => self.failure(err.into()),
        }
    }

    fn failure(&self, err: UseCaseError) -> Response {
        match &err {
            UseCaseError::NotFound => self.not_found(),
            UseCaseError::Conflict(message) => self.error_page(
                StatusCode::BAD_REQUEST,
                "Cannot delete supplier",
                message,
                None,
            ),
            UseCaseError::ValidationFailed(_) => self.error_page(
                StatusCode::BAD_REQUEST,
                "Invalid input",
                "The submitted data is invalid.",
                None,
            ),
            UseCaseError::InternalError(detail) => self.error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong",
                "An unexpected error occurred. Please try again later.",
                self.expose_errors.then_some(detail.as_str()),
            ),
        }
    }

    /// Unreadable submissions (wrong content type, duplicate or malformed
    /// fields) get the 400 error page rather than axum's plain-text reply.
    fn rejected(&self, rejection: FormRejection) -> Response {
        debug!(error = %rejection, "Form submission rejected");
        let detail = rejection.body_text();
        self.error_page(
            StatusCode::BAD_REQUEST,
            "Invalid form submission",
            "The submitted form could not be read. Please try again.",
            self.expose_errors.then_some(detail.as_str()),
        )
    }

    fn not_found(&self) -> Response {
        self.error_page(
            StatusCode::NOT_FOUND,
            "Not found",
            "The page you are looking for does not exist.",
            None,
        )
    }

    fn error_page(
        &self,
        status: StatusCode,
        title: &str,
        message: &str,
        detail: Option<&str>,
    ) -> Response {
        match self.views.error(status, title, message, detail) {
            Ok(body) => (status, Html(body)).into_response(),
            Err(err) => {
                error!(error = %err, "Failed to render error page");
                (status, message.to_string()).into_response()
            }
        }
    }
}

/// Build the page router. Paths are absolute; merge it at the root.
pub fn router<S, P>(state: InventoryState<S, P>) -> Router
where
    S: SupplierStore + 'static,
    P: ProductStore + 'static,
{
    Router::new()
        .route("/", get(home::<S, P>))
        .route(
            "/suppliers",
            get(list_suppliers::<S, P>).post(create_supplier::<S, P>),
        )
        .route("/suppliers/new", get(new_supplier::<S, P>))
        .route(
            "/suppliers/{id}",
            get(show_supplier::<S, P>)
                .put(update_supplier::<S, P>)
                .delete(delete_supplier::<S, P>),
        )
        .route("/suppliers/{id}/edit", get(edit_supplier::<S, P>))
        .route(
            "/products",
            get(list_products::<S, P>).post(create_product::<S, P>),
        )
        .route("/products/new", get(new_product::<S, P>))
        .route(
            "/products/{id}",
            get(show_product::<S, P>)
                .put(update_product::<S, P>)
                .delete(delete_product::<S, P>),
        )
        .route("/products/{id}/edit", get(edit_product::<S, P>))
        .fallback(not_found::<S, P>)
        .with_state(Arc::new(state))
}

async fn home<S: SupplierStore, P: ProductStore>(State(state): Shared<S, P>) -> Response {
    state.page(state.views.home())
}

async fn not_found<S: SupplierStore, P: ProductStore>(State(state): Shared<S, P>) -> Response {
    state.not_found()
}

async fn list_suppliers<S: SupplierStore, P: ProductStore>(
    State(state): Shared<S, P>,
) -> Response {
    match state.service.list_suppliers().await {
        Ok(suppliers) => state.page(state.views.supplier_index(&suppliers)),
        Err(err) => state.failure(err),
    }
}

async fn new_supplier<S: SupplierStore, P: ProductStore>(State(state): Shared<S, P>) -> Response {
    state.page(state.views.supplier_new(&SupplierForm::default(), None))
}

async fn create_supplier<S: SupplierStore, P: ProductStore>(
    State(state): Shared<S, P>,
    form: Result<Form<SupplierForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => return state.rejected(rejection),
    };
    match state.service.create_supplier(&form).await {
        Ok(_) => Redirect::to("/suppliers").into_response(),
        Err(UseCaseError::ValidationFailed(errors)) => {
            debug!(%errors, "Supplier form rejected");
            state.page_with_status(
                StatusCode::BAD_REQUEST,
                state.views.supplier_new(&form, Some(&errors)),
            )
        }
        Err(err) => state.failure(err),
    }
}

async fn show_supplier<S: SupplierStore, P: ProductStore>(
    State(state): Shared<S, P>,
    Path(id): Path<String>,
) -> Response {
    match state.service.show_supplier(&id).await {
        Ok(details) => state.page(state.views.supplier_show(&details)),
        Err(err) => state.failure(err),
    }
}

async fn edit_supplier<S: SupplierStore, P: ProductStore>(
    State(state): Shared<S, P>,
    Path(id): Path<String>,
) -> Response {
    match state.service.edit_supplier(&id).await {
        Ok(supplier) => state.page(state.views.supplier_edit(
            &supplier.id.to_string(),
            &SupplierForm::from(&supplier),
            None,
        )),
        Err(err) => state.failure(err),
    }
}

async fn update_supplier<S: SupplierStore, P: ProductStore>(
    State(state): Shared<S, P>,
    Path(id): Path<String>,
    form: Result<Form<SupplierForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => return state.rejected(rejection),
    };
    match state.service.update_supplier(&id, &form).await {
        Ok(supplier) => Redirect::to(&format!("/suppliers/{}", supplier.id)).into_response(),
        Err(UseCaseError::ValidationFailed(errors)) => {
            debug!(%errors, "Supplier form rejected");
            state.page_with_status(
                StatusCode::BAD_REQUEST,
                state.views.supplier_edit(&id, &form, Some(&errors)),
            )
        }
        Err(err) => state.failure(err),
    }
}

async fn delete_supplier<S: SupplierStore, P: ProductStore>(
    State(state): Shared<S, P>,
    Path(id): Path<String>,
) -> Response {
    match state.service.delete_supplier(&id).await {
        Ok(_) => Redirect::to("/suppliers").into_response(),
        Err(err) => state.failure(err),
    }
}

async fn list_products<S: SupplierStore, P: ProductStore>(
    State(state): Shared<S, P>,
) -> Response {
    match state.service.list_products().await {
        Ok(products) => state.page(state.views.product_index(&products)),
        Err(err) => state.failure(err),
    }
}

async fn new_product<S: SupplierStore, P: ProductStore>(State(state): Shared<S, P>) -> Response {
    match state.service.new_product_form().await {
        Ok(suppliers) => {
            state.page(state.views.product_new(&ProductForm::default(), &suppliers, None))
        }
        Err(err) => state.failure(err),
    }
}

async fn create_product<S: SupplierStore, P: ProductStore>(
    State(state): Shared<S, P>,
    form: Result<Form<ProductForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => return state.rejected(rejection),
    };
    match state.service.create_product(&form).await {
        Ok(_) => Redirect::to("/products").into_response(),
        Err(UseCaseError::ValidationFailed(errors)) => {
            debug!(%errors, "Product form rejected");
            match state.service.supplier_options().await {
                Ok(suppliers) => state.page_with_status(
                    StatusCode::BAD_REQUEST,
                    state.views.product_new(&form, &suppliers, Some(&errors)),
                ),
                Err(err) => state.failure(err),
            }
        }
        Err(err) => state.failure(err),
    }
}

async fn show_product<S: SupplierStore, P: ProductStore>(
    State(state): Shared<S, P>,
    Path(id): Path<String>,
) -> Response {
    match state.service.show_product(&id).await {
        Ok(details) => state.page(state.views.product_show(&details)),
        Err(err) => state.failure(err),
    }
}

async fn edit_product<S: SupplierStore, P: ProductStore>(
    State(state): Shared<S, P>,
    Path(id): Path<String>,
) -> Response {
    match state.service.edit_product(&id).await {
        Ok((details, suppliers)) => state.page(state.views.product_edit(
            &details.product.id.to_string(),
            &ProductForm::from(&details.product),
            &suppliers,
            None,
        )),
        Err(err) => state.failure(err),
    }
}

async fn update_product<S: SupplierStore, P: ProductStore>(
    State(state): Shared<S, P>,
    Path(id): Path<String>,
    form: Result<Form<ProductForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => return state.rejected(rejection),
    };
    match state.service.update_product(&id, &form).await {
        Ok(details) => {
            Redirect::to(&format!("/products/{}", details.product.id)).into_response()
        }
        Err(UseCaseError::ValidationFailed(errors)) => {
            debug!(%errors, "Product form rejected");
            match state.service.supplier_options().await {
                Ok(suppliers) => state.page_with_status(
                    StatusCode::BAD_REQUEST,
                    state.views.product_edit(&id, &form, &suppliers, Some(&errors)),
                ),
                Err(err) => state.failure(err),
            }
        }
        Err(err) => state.failure(err),
    }
}

async fn delete_product<S: SupplierStore, P: ProductStore>(
    State(state): Shared<S, P>,
    Path(id): Path<String>,
) -> Response {
    match state.service.delete_product(&id).await {
        Ok(_) => Redirect::to("/products").into_response(),
        Err(err) => state.failure(err),
    }
}
