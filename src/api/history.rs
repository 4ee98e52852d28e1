use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::AppState;
use crate::api::json_error;
use crate::error::AppError;
use crate::generation;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveImageRequest {
    pub user_id: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub user_id: Option<String>,
}

#[derive(Serialize)]
struct DataResponse<T: Serialize> {
    success: bool,
    data: T,
}

fn history_failure(err: AppError, store_message: &str) -> Response {
    match &err {
        AppError::Validation(message) | AppError::Unauthorized(message) => {
            json_error(err.status(), message)
        }
        other => {
            error!("{store_message}: {other}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, store_message)
        }
    }
}

/// POST /api/images
pub async fn save_image(
    State(state): State<AppState>,
    payload: Result<Json<SaveImageRequest>, JsonRejection>,
) -> Response {
    let request = payload.map(|Json(body)| body).unwrap_or_default();
    match generation::record_image(&state, request.user_id, request.image_url).await {
        Ok(record) => Json(DataResponse {
            success: true,
            data: record,
        })
        .into_response(),
        Err(err) => history_failure(err, "Failed to save image to history"),
    }
}

/// GET /api/images?userId=...
pub async fn list_images(
    State(state): State<AppState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Response {
    let user_id = query.ok().and_then(|Query(query)| query.user_id);
    match generation::list_history(&state, user_id).await {
        Ok(records) => Json(DataResponse {
            success: true,
            data: records,
        })
        .into_response(),
        Err(err) => history_failure(err, "Failed to fetch image history"),
    }
}
