// src/routes/health.rs

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResp { pub status: &'static str, pub service: &'static str, pub version: &'static str }

/// Liveness only; never touches the database.
pub async fn health() -> Json<HealthResp> {
    Json(HealthResp {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}
