//! Health check endpoint

use axum::Json;
use onair_common::api::HealthResponse;

/// GET /health
///
/// Health check endpoint for monitoring. No authentication.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "onair-es".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
