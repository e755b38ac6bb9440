//! # Axum Helpers
//!
//! Shared building blocks for the workspace's Axum applications.
//!
//! ## Modules
//!
//! - **[`server`]**: Router assembly, health checks, graceful shutdown
//! - **[`http`]**: HTTP middleware (security headers, HTML form method override)
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum_helpers::{create_production_app, create_router, health_router, with_method_override};
//! use core_config::{app_info, server::ServerConfig};
//! use std::time::Duration;
//!
//! let router = create_router(page_routes).merge(health_router(app_info!()));
//! create_production_app(
//!     with_method_override(router),
//!     &ServerConfig::default(),
//!     Duration::from_secs(30),
//!     async {},
//! )
//! .await?;
//! ```

pub mod http;
pub mod server;

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};

pub use http::{method_override, security_headers, with_method_override};
