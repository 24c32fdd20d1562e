//! # Upload Client Binary
//!
//! Picks one image from disk, validates and previews it, uploads it and prints
//! the result.
//!
//! ```bash
//! cargo run --bin upload-client -- ./cat.png
//! cargo run --bin upload-client -- --config config/client.toml ./cat.png
//! ```

use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use cloud_upload::client::{ClientConfig, HttpTransport, SelectedFile, SubmitOutcome, Uploader};
use cloud_upload::common::logging::init_logger;
use cloud_upload::common::messages::MAX_UPLOAD_BYTES;
use cloud_upload::UploadResult;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Image file to upload
    file: PathBuf,

    /// Path to the client configuration file (TOML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Upload endpoint, overriding the config file
    #[arg(long)]
    endpoint: Option<String>,
}

fn render(result: &UploadResult) {
    if result.success {
        println!("✅ {}", result.message);
        if let Some(url) = &result.url {
            println!("   url:       {}", url);
        }
        if let Some(public_id) = &result.public_id {
            println!("   public_id: {}", public_id);
        }
    } else {
        println!("❌ {}", result.message);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_logger();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };
    if let Some(endpoint) = args.endpoint {
        config.client.endpoint = endpoint;
    }

    let transport = HttpTransport::new(&config)?;
    info!("📡 Uploading to {}", transport.endpoint());
    let mut uploader = Uploader::new(Arc::new(transport));

    let file = SelectedFile::from_path(&args.file, MAX_UPLOAD_BYTES).await?;
    if !uploader.select_file(file) {
        if let Some(result) = uploader.result() {
            render(result);
        }
        return Ok(ExitCode::FAILURE);
    }

    if let Some(preview) = uploader.wait_for_preview().await {
        match preview.dimensions {
            Some((width, height)) => println!(
                "🖼  Preview ready: {}x{} ({} byte data URI)",
                width,
                height,
                preview.data_uri.len()
            ),
            None => println!("🖼  Preview ready ({} byte data URI)", preview.data_uri.len()),
        }
    }

    match uploader.submit().await {
        SubmitOutcome::Completed(result) => {
            render(&result);
            Ok(if result.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        SubmitOutcome::NothingSelected => Ok(ExitCode::FAILURE),
    }
}
