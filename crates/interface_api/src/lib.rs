//! HTTP API Layer
//!
//! This crate exposes the point ledger over REST using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for balance, history, charge and use
//! - **Middleware**: Tracing, CORS, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Ledger errors mapped to consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::in_memory(config);
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, patch},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::HealthCheckable;
use domain_point::LedgerEngine;
use infra_store::create_stores;

use crate::config::ApiConfig;
use crate::handlers::{health, point};
use crate::middleware::audit_middleware;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<LedgerEngine>,
    /// Adapters polled by the readiness endpoint
    pub probes: Vec<Arc<dyn HealthCheckable>>,
}

impl AppState {
    /// Wires an engine over fresh in-memory tables
    pub fn in_memory(config: ApiConfig) -> Self {
        let stores = create_stores(config.to_store_config());
        let engine = LedgerEngine::new(
            stores.balances.clone(),
            stores.history.clone(),
            config.to_engine_config(),
        );

        let probes: Vec<Arc<dyn HealthCheckable>> = vec![
            stores.balances as Arc<dyn HealthCheckable>,
            stores.history as Arc<dyn HealthCheckable>,
        ];

        Self {
            engine: Arc::new(engine),
            probes,
        }
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `state` - Engine and health probes
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let point_routes = Router::new()
        .route("/:id", get(point::get_point))
        .route("/:id/histories", get(point::get_histories))
        .route("/:id/charge", patch(point::charge))
        .route("/:id/use", patch(point::use_points));

    let api_routes = Router::new()
        .nest("/points", point_routes)
        .layer(axum_middleware::from_fn(audit_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}
