//! HTTP mapping of domain errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tabletop_core::SyncError;
use tracing::error;

/// Error returned by mutation handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Sync(SyncError::InvalidArgument(_)) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Sync(SyncError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Sync(SyncError::PermissionDenied(_)) => StatusCode::FORBIDDEN,
            ApiError::Sync(SyncError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Sync(e) => e.code(),
            ApiError::BadRequest(_) => "invalid_argument",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Storage details stay in the log
        let message = match &self {
            ApiError::Sync(SyncError::Storage(e)) => {
                error!("[Gateway] Storage failure: {:#}", e);
                "internal error".to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(json!({
                "error": self.code(),
                "message": message,
            })),
        )
            .into_response()
    }
}
