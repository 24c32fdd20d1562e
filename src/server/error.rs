use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, info, warn};
use thiserror::Error;

use crate::common::messages::{
    UploadResult, INTERNAL_ERROR_MESSAGE, NO_FILE_MESSAGE, UPSTREAM_FAILURE_MESSAGE,
    UPSTREAM_TIMEOUT_MESSAGE,
};
use crate::media_host::UploadError;
use crate::processing::ValidationError;

/// Everything that can end an upload request early.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No `image` file was present after parsing the body
    #[error("no image file in request")]
    MissingFile,

    /// The `image` field was not an image
    #[error("unsupported upload: {0}")]
    Unsupported(ValidationError),

    #[error("upload of at least {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },

    #[error("unexpected multipart field {0:?}")]
    UnexpectedField(String),

    #[error("malformed multipart request: {0}")]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Upstream(#[from] UploadError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::TooLarge { size, limit } => ApiError::TooLarge { size, limit },
            other => ApiError::Unsupported(other),
        }
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingFile | ApiError::Unsupported(_) | ApiError::UnexpectedField(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Multipart(e) => e.status(),
            ApiError::Upstream(UploadError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Upstream(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to the caller. Upstream and internal details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::MissingFile | ApiError::Unsupported(_) => NO_FILE_MESSAGE.to_string(),
            ApiError::TooLarge { limit, .. } => format!("File exceeds the {} limit", human_size(*limit)),
            ApiError::UnexpectedField(_) => "Unexpected field".to_string(),
            ApiError::Multipart(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                "Request body too large".to_string()
            }
            ApiError::Multipart(_) => "Malformed multipart request".to_string(),
            ApiError::Upstream(UploadError::Timeout(_)) => UPSTREAM_TIMEOUT_MESSAGE.to_string(),
            ApiError::Upstream(_) => UPSTREAM_FAILURE_MESSAGE.to_string(),
            ApiError::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

fn human_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MiB", bytes / MIB)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{} KiB", bytes / KIB)
    } else {
        format!("{} byte", bytes)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal(e) => error!("❌ Controller error: {:#}", e),
            // already logged with its kind by upload_and_discard
            ApiError::Upstream(_) => {}
            ApiError::TooLarge { .. } | ApiError::Multipart(_) => warn!("⚠️  Rejected upload: {}", self),
            _ => info!("Rejected upload: {}", self),
        }

        (self.status_code(), Json(UploadResult::failure(self.user_message()))).into_response()
    }
}
