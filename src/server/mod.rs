//! # Upload Endpoint
//!
//! - [`config`]: TOML configuration plus environment credentials
//! - [`staging`]: multipart body to temp file
//! - [`routes`]: the liveness and upload handlers
//! - [`error`]: request failures mapped to status codes and `UploadResult` bodies
//! - [`server`]: router assembly and the serve loop

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod staging;

pub use config::ServerConfig;
pub use error::ApiError;
pub use server::{build_router, AppState, Server};
