use axum::{Json, extract::State};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub history_backend: String,
    pub design_service: String,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let design_service = if state.upstream.is_healthy().await {
        "healthy"
    } else {
        "unreachable"
    };
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        history_backend: state.history.backend_name().to_string(),
        design_service: design_service.to_string(),
    })
}
