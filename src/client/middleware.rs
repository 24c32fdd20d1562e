//! # Client Transport
//!
//! The network half of the client: packages a [`SelectedFile`] into a
//! multipart body under the `image` field, POSTs it to the upload endpoint and
//! parses the JSON [`UploadResult`]. The endpoint answers with an
//! `UploadResult` on every status code, so the body is parsed regardless of
//! status.
//!
//! # Example TOML
//!
//! ```toml
//! [client]
//! endpoint = "http://localhost:3000/upload"
//! # request_timeout_secs = 120
//! ```

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::client::SelectedFile;
use crate::common::config::{load_config, ConfigError};
use crate::common::messages::{UploadResult, IMAGE_FIELD};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/upload";

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub client: ClientInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    /// Full URL of the upload route
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// No timeout unless set
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: ClientInfo {
                endpoint: endpoint.into(),
                request_timeout_secs: None,
            },
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        load_config(path)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

/// Network or parse failure while talking to the endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("response was not an upload result: {0}")]
    Parse(#[from] serde_json::Error),
}

#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// Send one file and return the endpoint's verdict.
    async fn send(&self, file: &SelectedFile) -> Result<UploadResult, TransportError>;
}

pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.client.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            endpoint: config.client.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl UploadTransport for HttpTransport {
    async fn send(&self, file: &SelectedFile) -> Result<UploadResult, TransportError> {
        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.mime())?;
        let form = Form::new().part(IMAGE_FIELD, part);

        let response = self.http.post(&self.endpoint).multipart(form).send().await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
