// src/routes/mod.rs

use axum::{http::StatusCode, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{db::StoreError, AppState};

pub mod health;
pub mod stats;
pub mod tables;

// Common error mappers
pub fn internal_error<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    tracing::error!(error = %e, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, format!("internal error: {e}"))
}

pub fn store_error(e: StoreError) -> (StatusCode, String) {
    match e {
        StoreError::Unavailable(_) => {
            tracing::error!(error = %e, "database unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, format!("connection error: {e}"))
        }
        StoreError::Query(_) => internal_error(e),
    }
}

pub fn router(state: AppState) -> Router {
    // Dashboard is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/api/tables/:table", get(tables::browse_table))
        .route("/api/:req", get(stats::get_stats))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
