//! HTTP routes: the inventory pages plus readiness.

pub mod health;

use axum::Router;
use domain_inventory::{InventoryService, InventoryState, Views, handlers};

use crate::state::AppState;

/// All application routes. Liveness (`/health`) is merged separately.
pub fn routes(state: &AppState) -> eyre::Result<Router> {
    let service = InventoryService::new(state.supplier_store(), state.product_store());
    let views = Views::new()?;
    let pages = InventoryState::new(service, views).with_exposed_errors(state.config.expose_errors);

    Ok(handlers::router(pages).merge(health::router(state.clone())))
}
