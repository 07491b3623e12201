//! REST interface to the backtest engine
//!
//! The engine is stateless, so every request carries its own CSV snapshot
//! and parameters.

pub mod handlers;
pub mod service;

pub use service::BacktestService;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Upper bound on an uploaded CSV body.
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

pub fn create_router(service: Arc<BacktestService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/defaults", get(handlers::get_defaults))
        .route("/api/v1/backtest", post(handlers::run_backtest))
        .with_state(service)
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
