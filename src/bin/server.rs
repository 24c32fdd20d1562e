//! # Upload Server Binary
//!
//! ```bash
//! API_KEY=... API_SECRET_KEY=... cargo run --bin upload-server -- --config config/server.toml
//! ```
//!
//! Credentials may also be placed in a `.env` file in the working directory.
//! Missing credentials stop the server before it binds.

use anyhow::Context;
use clap::Parser;
use log::info;
use std::sync::Arc;

use cloud_upload::common::logging::init_logger;
use cloud_upload::media_host::{CloudinaryClient, MediaHost};
use cloud_upload::server::{Server, ServerConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the server configuration file (TOML format)
    #[arg(short, long, default_value = "config/server.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();
    dotenv::dotenv().ok();

    let args = Args::parse();

    let config = ServerConfig::from_file(&args.config)
        .with_context(|| format!("loading {}", args.config))?;
    let cloudinary = config
        .cloudinary_config()
        .context("Missing Cloudinary credentials")?;

    info!(
        "🚀 Initializing upload server (cloud: {})...",
        cloudinary.cloud_name
    );
    let host: Arc<dyn MediaHost> = Arc::new(CloudinaryClient::new(cloudinary)?);

    Server::new(config, host).run().await
}
