#![allow(dead_code)]

use async_trait::async_trait;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cloud_upload::common::messages::MAX_UPLOAD_BYTES;
use cloud_upload::media_host::{MediaHost, StoredAsset, UploadError, UploadOptions};
use cloud_upload::server::AppState;

pub enum Behavior {
    /// Always return this url and id
    Fixed { secure_url: String, public_id: String },
    /// Return a fresh public id per call, like the real host
    Unique,
    Fail,
    Hang,
    Panic,
}

/// Fake media host that records what it was asked to upload.
pub struct RecordingHost {
    behavior: Behavior,
    calls: AtomicUsize,
    /// (path, existed during the call, filename hint)
    seen: Mutex<Vec<(PathBuf, bool, Option<String>)>>,
}

impl RecordingHost {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn fixed(secure_url: &str, public_id: &str) -> Arc<Self> {
        Self::new(Behavior::Fixed {
            secure_url: secure_url.to_string(),
            public_id: public_id.to_string(),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<(PathBuf, bool, Option<String>)> {
        self.seen.lock().unwrap().clone()
    }
}

fn asset(secure_url: String, public_id: String) -> StoredAsset {
    StoredAsset {
        secure_url,
        public_id,
        resource_type: Some("image".to_string()),
        format: Some("png".to_string()),
        bytes: None,
        width: None,
        height: None,
        original_filename: None,
    }
}

#[async_trait]
impl MediaHost for RecordingHost {
    async fn upload(&self, path: &Path, options: &UploadOptions) -> Result<StoredAsset, UploadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((path.to_path_buf(), path.exists(), options.filename.clone()));

        match &self.behavior {
            Behavior::Fixed { secure_url, public_id } => Ok(asset(secure_url.clone(), public_id.clone())),
            Behavior::Unique => {
                let id = uuid::Uuid::new_v4().simple().to_string();
                Ok(asset(format!("https://res.example.com/{}.png", id), id))
            }
            Behavior::Fail => Err(UploadError::Rejected {
                status: 400,
                detail: "Invalid image file".to_string(),
            }),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                unreachable!("upload deadline should have fired")
            }
            Behavior::Panic => panic!("media host exploded"),
        }
    }
}

pub fn app_state(host: Arc<dyn MediaHost>, upload_dir: &Path) -> AppState {
    AppState {
        host,
        upload_dir: upload_dir.to_path_buf(),
        max_file_bytes: MAX_UPLOAD_BYTES,
        upload_timeout: Duration::from_secs(5),
    }
}

/// A small, valid PNG.
pub fn png_bytes() -> Vec<u8> {
    let mut out = Vec::new();
    image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(4, 4, image::Rgb([200, 30, 30])))
        .write_to(&mut Cursor::new(&mut out), image::ImageOutputFormat::Png)
        .unwrap();
    out
}

pub fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}
