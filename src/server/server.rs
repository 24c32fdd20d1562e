//! # Upload Server
//!
//! Wires the routes, shared state and middleware layers together:
//!
//! ```text
//! GET  /        -> liveness string
//! POST /upload  -> stage `image` -> media host -> UploadResult JSON
//! ```
//!
//! A panic anywhere below the router is turned into the same 500 JSON body an
//! internal error produces.

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info};
use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;

use super::config::ServerConfig;
use super::routes::{liveness, upload_image};
use crate::common::messages::{UploadResult, INTERNAL_ERROR_MESSAGE};
use crate::media_host::MediaHost;

/// Room left in the request body limit for multipart boundaries and headers.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// State shared by every request. Nothing in here is mutated after startup.
pub struct AppState {
    pub host: Arc<dyn MediaHost>,
    pub upload_dir: PathBuf,
    pub max_file_bytes: u64,
    pub upload_timeout: Duration,
}

impl AppState {
    pub fn from_config(config: &ServerConfig, host: Arc<dyn MediaHost>) -> Self {
        Self {
            host,
            upload_dir: config.server.upload_dir.clone(),
            max_file_bytes: config.uploads.max_file_bytes,
            upload_timeout: config.upload_timeout(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = (state.max_file_bytes + MULTIPART_OVERHEAD) as usize;

    Router::new()
        .route("/", get(liveness))
        .route("/upload", post(upload_image))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(Arc::new(state))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("❌ Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(UploadResult::failure(INTERNAL_ERROR_MESSAGE)),
    )
        .into_response()
}

pub struct Server {
    config: ServerConfig,
    host: Arc<dyn MediaHost>,
}

impl Server {
    pub fn new(config: ServerConfig, host: Arc<dyn MediaHost>) -> Self {
        Self { config, host }
    }

    /// Bind the configured address and serve until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        let upload_dir = &self.config.server.upload_dir;
        tokio::fs::create_dir_all(upload_dir)
            .await
            .with_context(|| format!("creating upload dir {}", upload_dir.display()))?;

        let app = build_router(AppState::from_config(&self.config, self.host.clone()));

        let addr = self.config.server.address.as_str();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding {}", addr))?;
        info!("🌐 Server started at http://{}", addr);
        info!("📡 Upload endpoint: POST http://{}/upload", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
