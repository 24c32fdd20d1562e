use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use log::info;
use std::sync::Arc;

use super::error::ApiError;
use super::server::AppState;
use super::staging::stage_image;
use crate::common::messages::UploadResult;
use crate::media_host::{upload_and_discard, UploadOptions};

pub async fn liveness() -> &'static str {
    "I am live"
}

/// `POST /upload`: stage the `image` field, forward it to the media host and
/// report where it ended up.
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResult>, ApiError> {
    // A body that is not multipart at all carries no file either.
    let multipart = multipart.map_err(|_| ApiError::MissingFile)?;

    let staged = stage_image(multipart, &state.upload_dir, state.max_file_bytes)
        .await?
        .ok_or(ApiError::MissingFile)?;

    info!(
        "📤 Received image: {} ({} bytes, {})",
        staged.original_name(),
        staged.size(),
        staged.content_type()
    );

    let options = UploadOptions::preserving_filename(staged.original_name(), staged.content_type());
    let asset = upload_and_discard(state.host.as_ref(), staged, &options, state.upload_timeout).await?;

    Ok(Json(UploadResult::uploaded(asset.secure_url, asset.public_id)))
}
