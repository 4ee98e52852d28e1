//! HTTP routes.

pub mod design;
pub mod health;
pub mod history;
pub mod owners;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Room photos travel as data URIs inside JSON, roughly 4/3 of the file size.
pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub(crate) fn json_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/design", post(design::create_design))
        .route("/api/generate/variations", post(design::create_variations))
        .route(
            "/api/images",
            get(history::list_images).post(history::save_image),
        )
        .route("/api/owners", post(owners::issue_owner))
        .route("/health", get(health::health_check))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
