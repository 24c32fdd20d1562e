//! # Upload Result Protocol
//!
//! Every response from the upload endpoint (except the liveness probe) carries
//! an [`UploadResult`] JSON body:
//!
//! ```json
//! { "success": true, "message": "File uploaded successfully!", "url": "...", "public_id": "..." }
//! ```
//!
//! `url` and `public_id` are omitted on failure.

use serde::{Deserialize, Serialize};

/// Multipart field name carrying the image.
pub const IMAGE_FIELD: &str = "image";

/// Largest accepted image, in bytes (5 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded successfully!";
pub const NO_FILE_MESSAGE: &str = "No file uploaded or file type not supported";
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to upload file to Cloudinary";
pub const UPSTREAM_TIMEOUT_MESSAGE: &str = "Upload to Cloudinary timed out";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Outcome of a single upload, as returned by the endpoint and rendered by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
}

impl UploadResult {
    /// Successful upload pointing at the stored asset.
    pub fn uploaded(url: impl Into<String>, public_id: impl Into<String>) -> Self {
        Self {
            success: true,
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            url: Some(url.into()),
            public_id: Some(public_id.into()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            url: None,
            public_id: None,
        }
    }
}
