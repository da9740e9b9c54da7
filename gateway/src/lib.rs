//! Warehouse Inventory Management gateway
//!
//! Backend-for-frontend in front of the ERP REST API. It forwards inventory
//! and sales operations, keeps a normalized cache of what it has read, and
//! computes the derived views (dual valuation, periodic report, dashboard,
//! count sheets) that the ERP does not serve itself.

use std::{sync::Arc, time::Duration};

use axum::{routing::get, Router};
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

pub use config::Config;

use error::AppResult;
use external::ErpApiClient;
use services::Stores;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub api: ErpApiClient,
    pub stores: Arc<Stores>,
    /// Cancelled when the server shuts down; in-flight loads derive from it
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: Config, shutdown: CancellationToken) -> AppResult<Self> {
        let api = ErpApiClient::new(
            config.upstream.base_url.clone(),
            Duration::from_secs(config.upstream.timeout_secs),
        )?;
        let stores = Stores::new(Duration::from_secs(config.cache.ttl_secs));
        Ok(Self {
            config: Arc::new(config),
            api,
            stores: Arc::new(stores),
            shutdown,
        })
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Warehouse Inventory Management Gateway v1"
}
