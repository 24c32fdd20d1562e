//! # Server Configuration
//!
//! Loaded from TOML; Cloudinary credentials come from the environment
//! (`API_KEY`, `API_SECRET_KEY`) so they never live in the config file.
//!
//! ```toml
//! [server]
//! address = "127.0.0.1:3000"
//! upload_dir = "public/temp"
//!
//! [uploads]
//! max_file_bytes = 5242880
//! upload_timeout_secs = 60
//!
//! [cloudinary]
//! cloud_name = "yogesh"
//! request_timeout_secs = 60
//! signature_algorithm = "sha1"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::common::config::{load_config, require_env, ConfigError};
use crate::common::messages::MAX_UPLOAD_BYTES;
use crate::media_host::cloudinary::DEFAULT_API_BASE_URL;
use crate::media_host::{CloudinaryConfig, SignatureAlgorithm};

pub const API_KEY_VAR: &str = "API_KEY";
pub const API_SECRET_VAR: &str = "API_SECRET_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub server: ServerInfo,
    #[serde(default)]
    pub uploads: UploadLimits,
    pub cloudinary: CloudinarySection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    pub address: String,
    /// Where multipart uploads are staged before being forwarded
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadLimits {
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    /// Deadline for the whole media-host call
    #[serde(default = "default_timeout_secs")]
    pub upload_timeout_secs: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            upload_timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudinarySection {
    pub cloud_name: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub signature_algorithm: SignatureAlgorithm,
    #[serde(default)]
    pub folder: Option<String>,
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("public/temp")
}

fn default_max_file_bytes() -> u64 {
    MAX_UPLOAD_BYTES
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl ServerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: ServerConfig = load_config(path)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.uploads.max_file_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "uploads.max_file_bytes",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.uploads.upload_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "uploads.upload_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.uploads.upload_timeout_secs)
    }

    /// Combine the `[cloudinary]` section with credentials from the environment.
    pub fn cloudinary_config(&self) -> Result<CloudinaryConfig, ConfigError> {
        self.cloudinary_config_with(require_env(API_KEY_VAR)?, require_env(API_SECRET_VAR)?)
    }

    pub fn cloudinary_config_with(
        &self,
        api_key: String,
        api_secret: String,
    ) -> Result<CloudinaryConfig, ConfigError> {
        Ok(CloudinaryConfig {
            cloud_name: self.cloudinary.cloud_name.clone(),
            api_key,
            api_secret,
            api_base_url: self.cloudinary.api_base_url.clone(),
            request_timeout: Duration::from_secs(self.cloudinary.request_timeout_secs),
            signature_algorithm: self.cloudinary.signature_algorithm,
            folder: self.cloudinary.folder.clone(),
        })
    }
}
