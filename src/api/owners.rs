use axum::{Json, extract::State};
use serde::Serialize;
use tracing::info;

use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerResponse {
    pub success: bool,
    pub user_id: String,
    pub signed: bool,
}

/// POST /api/owners
pub async fn issue_owner(State(state): State<AppState>) -> Json<OwnerResponse> {
    let user_id = state.owners.issue();
    info!(signed = state.owners.is_signed(), "Issued owner id");
    Json(OwnerResponse {
        success: true,
        user_id,
        signed: state.owners.is_signed(),
    })
}
