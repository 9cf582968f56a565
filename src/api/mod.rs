//! REST API over the configuration store and the planning engine.
//!
//! Endpoints:
//! - `GET /api/list-configs`: sorted configuration names
//! - `GET /api/load-config?name=`: stored configuration blob
//! - `POST /api/save-config`: store `{name, data}`
//! - `DELETE /api/delete-config?name=`: remove a configuration
//! - `POST /api/plan`: distribute a configuration and report findings

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::routing::{delete, get, post};
use tracing::info;

use crate::store::ConfigStore;

pub use types::{PlanRequest, PlanResponse, SaveRequest};

/// Shared application state.
///
/// Handlers run every store call on the blocking pool, so a file-backed
/// store never blocks an async worker.
pub struct AppState {
    /// Backing configuration store.
    pub store: Mutex<Box<dyn ConfigStore + Send>>,
}

impl AppState {
    /// Wraps a store for sharing across handlers.
    pub fn new(store: impl ConfigStore + Send + 'static) -> Arc<Self> {
        Arc::new(Self {
            store: Mutex::new(Box::new(store)),
        })
    }
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state holding the configuration store
///
/// # Returns
///
/// A `Router` serving the configuration CRUD endpoints and `/api/plan`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/list-configs", get(handlers::list_configs))
        .route("/api/load-config", get(handlers::load_config))
        .route("/api/save-config", post(handlers::save_config))
        .route("/api/delete-config", delete(handlers::delete_config))
        .route("/api/plan", post(handlers::plan))
        .with_state(state)
}

/// Binds to the given address and serves the API until the server stops.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
