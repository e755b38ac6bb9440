use axum_helpers::{create_production_app, create_router, health_router, with_method_override};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_inventory::{MongoProductStore, MongoSupplierStore};
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    info!(
        name = config.app.name,
        version = config.app.version,
        "Connecting to MongoDB at {}",
        config.mongodb.redacted_url()
    );

    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;
    let db = mongo_client.database(config.mongodb.database());

    info!(
        "Successfully connected to MongoDB database: {}",
        config.mongodb.database()
    );

    MongoSupplierStore::new(&db).init_indexes().await?;
    MongoProductStore::new(&db).init_indexes().await?;

    let state = AppState {
        config,
        mongo_client,
        db,
    };

    let routes = api::routes(&state)?.merge(health_router(state.config.app));
    let app = with_method_override(create_router(routes));

    let server = state.config.server.clone();
    let mongo_client = state.mongo_client.clone();

    create_production_app(app, &server, Duration::from_secs(30), async move {
        info!("Shutting down: closing MongoDB connections");
        mongo_client.shutdown().await;
        info!("MongoDB connection closed successfully");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Inventory web shutdown complete");
    Ok(())
}
