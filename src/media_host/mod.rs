//! # Media Host
//!
//! The external service that durably stores images and serves them from a
//! public URL. The endpoint talks to it only through the [`MediaHost`] trait, so
//! the concrete client ([`CloudinaryClient`]) is constructed once at startup and
//! injected into the router state.
//!
//! ## Upload Lifecycle
//!
//! ```text
//! StagedFile (temp path) -> upload_and_discard -> MediaHost::upload (bounded by deadline)
//!                                              -> StagedFile::discard (always, after settle)
//!                                              -> Result<StoredAsset, UploadError>
//! ```

pub mod cloudinary;
pub mod staged;

pub use cloudinary::{CloudinaryClient, CloudinaryConfig, SignatureAlgorithm};
pub use staged::StagedFile;

use async_trait::async_trait;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Asset record returned by the media host after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAsset {
    /// HTTPS address the asset is served from
    pub secure_url: String,
    /// Host-assigned identifier of the asset
    pub public_id: String,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub bytes: Option<u64>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub original_filename: Option<String>,
}

/// Per-upload options sent along with the file.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Name the host should derive the public id from when `use_filename` is set
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub use_filename: bool,
    pub folder: Option<String>,
}

impl UploadOptions {
    /// `resource_type=auto` is implied by the upload route; this only fills in
    /// the naming hints.
    pub fn preserving_filename(filename: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            content_type: Some(content_type.into()),
            use_filename: true,
            folder: None,
        }
    }
}

/// Why an upload to the media host failed.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("media host rejected the credentials: {detail}")]
    Authentication { detail: String },

    #[error("media host rejected the upload ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("request to media host failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response from media host: {0}")]
    InvalidResponse(String),

    #[error("failed to read staged file: {0}")]
    Io(#[from] std::io::Error),

    #[error("upload did not finish within {0:?}")]
    Timeout(Duration),
}

impl UploadError {
    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            UploadError::Authentication { .. } => "authentication",
            UploadError::Rejected { .. } => "rejected",
            UploadError::Transport(_) => "transport",
            UploadError::InvalidResponse(_) => "invalid_response",
            UploadError::Io(_) => "io",
            UploadError::Timeout(_) => "timeout",
        }
    }
}

#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Upload the file at `path` and return the stored asset.
    async fn upload(&self, path: &Path, options: &UploadOptions) -> Result<StoredAsset, UploadError>;
}

/// Upload a staged file and delete it once the attempt has settled.
///
/// The host call is cut off after `deadline`. Cleanup runs on success, on
/// failure and on timeout, and never while the call is still in flight.
pub async fn upload_and_discard(
    host: &dyn MediaHost,
    staged: StagedFile,
    options: &UploadOptions,
    deadline: Duration,
) -> Result<StoredAsset, UploadError> {
    let outcome = match tokio::time::timeout(deadline, host.upload(staged.path(), options)).await {
        Ok(result) => result,
        Err(_) => Err(UploadError::Timeout(deadline)),
    };

    let path = staged.path().to_path_buf();
    if let Err(e) = staged.discard() {
        warn!("⚠️  Failed to remove temp file {}: {}", path.display(), e);
    }

    match &outcome {
        Ok(asset) => info!("✅ File uploaded on Cloudinary: {}", asset.secure_url),
        Err(e) => error!("❌ Cloudinary upload error [{}]: {}", e.kind(), e),
    }

    outcome
}
