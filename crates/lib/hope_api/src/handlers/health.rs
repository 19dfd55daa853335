//! Health check endpoint.

use axum::Json;

use crate::models::HealthResponse;

/// `GET /api/health`: liveness check.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        message: "HOPE API is running".into(),
        version: hope_core::version().into(),
    })
}
