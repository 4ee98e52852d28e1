use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::error;

use crate::AppState;
use crate::error::AppError;
use crate::generation::{
    self, DesignRequest, DesignResponse, VariationsRequest, VariationsResponse,
};

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::Validation(format!("invalid request body: {rejection}")))
}

/// POST /api/design
pub async fn create_design(
    State(state): State<AppState>,
    payload: Result<Json<DesignRequest>, JsonRejection>,
) -> Result<Json<DesignResponse>, AppError> {
    let request = body(payload)?;
    generation::run_design(&state, request)
        .await
        .map(Json)
        .inspect_err(|err| error!("Transform error: {err}"))
}

/// POST /api/generate/variations
pub async fn create_variations(
    State(state): State<AppState>,
    payload: Result<Json<VariationsRequest>, JsonRejection>,
) -> Result<Json<VariationsResponse>, AppError> {
    let request = body(payload)?;
    generation::run_variations(&state, request)
        .await
        .map(Json)
        .inspect_err(|err| error!("Variations generation error: {err}"))
}
