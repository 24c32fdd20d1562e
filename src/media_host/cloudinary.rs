//! # Cloudinary Client
//!
//! Signed uploads against Cloudinary's REST upload API:
//!
//! ```text
//! POST {api_base_url}/{cloud_name}/auto/upload
//! multipart: file, api_key, timestamp, use_filename, [folder], signature
//! ```
//!
//! The signature is the hex digest of the signed parameters sorted by name,
//! joined as `k=v&k=v`, with the API secret appended. `file`, `api_key`,
//! `cloud_name` and `resource_type` are never signed. Which digest is
//! expected (SHA-1 or SHA-256) is an account setting on the Cloudinary side.

use async_trait::async_trait;
use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use super::{MediaHost, StoredAsset, UploadError, UploadOptions};
use crate::common::config::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

/// Everything needed to talk to one Cloudinary cloud.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub signature_algorithm: SignatureAlgorithm,
    /// Folder every upload lands in unless the upload overrides it
    pub folder: Option<String>,
}

pub struct CloudinaryClient {
    http: reqwest::Client,
    config: CloudinaryConfig,
}

/// Error body Cloudinary sends with non-2xx responses.
#[derive(Debug, Deserialize)]
struct HostErrorBody {
    error: HostErrorDetail,
}

#[derive(Debug, Deserialize)]
struct HostErrorDetail {
    message: String,
}

impl CloudinaryClient {
    /// Validate `config` and build the HTTP client.
    pub fn new(config: CloudinaryConfig) -> Result<Self, ConfigError> {
        if config.cloud_name.trim().is_empty() || config.cloud_name.contains('/') {
            return Err(ConfigError::Invalid {
                field: "cloudinary.cloud_name",
                reason: format!("{:?} is not a cloud name", config.cloud_name),
            });
        }
        if config.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential("API_KEY"));
        }
        if config.api_secret.trim().is_empty() {
            return Err(ConfigError::MissingCredential("API_SECRET_KEY"));
        }
        if !config.api_base_url.starts_with("http://") && !config.api_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                field: "cloudinary.api_base_url",
                reason: format!("{:?} is not an http(s) URL", config.api_base_url),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ConfigError::Invalid {
                field: "cloudinary",
                reason: format!("could not build HTTP client: {}", e),
            })?;

        Ok(Self { http, config })
    }

    pub fn upload_url(&self) -> String {
        format!(
            "{}/{}/auto/upload",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.cloud_name
        )
    }

    fn signed_params(&self, options: &UploadOptions, timestamp: i64) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        params.insert("timestamp", timestamp.to_string());
        if options.use_filename {
            params.insert("use_filename", "true".to_string());
        }
        if let Some(folder) = options.folder.as_ref().or(self.config.folder.as_ref()) {
            params.insert("folder", folder.clone());
        }
        params
    }
}

/// Compute the request signature for `params`.
pub fn sign_params(
    params: &BTreeMap<&'static str, String>,
    api_secret: &str,
    algorithm: SignatureAlgorithm,
) -> String {
    let to_sign = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");
    let payload = format!("{}{}", to_sign, api_secret);

    match algorithm {
        SignatureAlgorithm::Sha1 => hex::encode(Sha1::digest(payload.as_bytes())),
        SignatureAlgorithm::Sha256 => hex::encode(Sha256::digest(payload.as_bytes())),
    }
}

#[async_trait]
impl MediaHost for CloudinaryClient {
    async fn upload(&self, path: &Path, options: &UploadOptions) -> Result<StoredAsset, UploadError> {
        let bytes = tokio::fs::read(path).await?;

        let file_name = options
            .filename
            .clone()
            .or_else(|| path.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "upload".to_string());

        let mut part = Part::bytes(bytes).file_name(file_name);
        if let Some(content_type) = &options.content_type {
            part = part.mime_str(content_type)?;
        }

        let params = self.signed_params(options, chrono::Utc::now().timestamp());
        let signature = sign_params(&params, &self.config.api_secret, self.config.signature_algorithm);

        let mut form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature);
        for (key, value) in params {
            form = form.text(key, value);
        }

        debug!("Uploading {} to {}", path.display(), self.upload_url());
        let response = self.http.post(self.upload_url()).multipart(form).send().await?;
        let status = response.status();

        if status.is_success() {
            return response
                .json::<StoredAsset>()
                .await
                .map_err(|e| UploadError::InvalidResponse(e.to_string()));
        }

        let detail = response
            .json::<HostErrorBody>()
            .await
            .map(|body| body.error.message)
            .unwrap_or_else(|_| status.to_string());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(UploadError::Authentication { detail }),
            _ => Err(UploadError::Rejected {
                status: status.as_u16(),
                detail,
            }),
        }
    }
}
