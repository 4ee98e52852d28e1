//! Errors surfaced by the generation routes and tools.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::history::HistoryError;
use crate::upstream::UpstreamError;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed request field.
    #[error("{0}")]
    Validation(String),
    /// Owner id failed signature verification.
    #[error("{0}")]
    Unauthorized(String),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    /// The design service answered but did not produce an image.
    #[error("{0}")]
    GenerationFailed(String),
    #[error(transparent)]
    Persistence(#[from] HistoryError),
}

#[derive(Serialize)]
pub struct FailureBody {
    pub error: String,
    pub success: bool,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Upstream(_) | Self::GenerationFailed(_) | Self::Persistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to hand to callers. Store failures never leak detail.
    pub fn public_message(&self) -> String {
        match self {
            Self::Persistence(_) => "Failed to access image history".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Self::Persistence(err) = &self {
            error!("History store failure: {err}");
        }
        let body = FailureBody {
            error: self.public_message(),
            success: false,
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_class() {
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::GenerationFailed("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn persistence_detail_is_not_exposed() {
        let err = AppError::Persistence(HistoryError::Corrupt {
            id: "secret-id".into(),
            reason: "disk on fire".into(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().contains("disk on fire"));
    }
}
