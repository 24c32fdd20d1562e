//! # Uploader State
//!
//! [`Uploader`] holds everything a front end renders: the selected file, its
//! preview, the last [`UploadResult`] and whether an upload is in flight.
//!
//! ## Lifecycle
//!
//! ```text
//! select_file ──reject──> result = failure (file untouched)
//!      │
//!    accept ──> file stored, result cleared, preview computed in the background
//!      │
//!   submit ──> is_uploading ──> transport ──> result (success | server failure | network failure)
//!      │
//!   clear ──> file, preview, result and picker value reset
//! ```
//!
//! Inside a Tokio runtime the preview is computed on the blocking pool;
//! without one it is computed before `select_file` returns. Each accepted
//! selection bumps a generation counter; a preview that finishes after a newer
//! selection is dropped, so the displayed preview always matches the latest
//! accepted file.
//!
//! `is_uploading` is cleared when `submit` returns or its future is dropped.

use log::{error, info, warn};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::middleware::UploadTransport;
use crate::common::messages::{UploadResult, MAX_UPLOAD_BYTES};
use crate::processing::{validate_declared, Preview};

/// Shown when the request fails or the reply is not an upload result.
pub const NETWORK_FAILURE_MESSAGE: &str = "Upload failed. Please try again.";

/// A file picked by the user, held in memory until it is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    mime: String,
    size: u64,
    bytes: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            size: bytes.len() as u64,
            bytes: bytes.into(),
        }
    }

    /// Open a file from disk, guessing its MIME type from the extension the
    /// way a browser file picker does.
    ///
    /// The size comes from the file's metadata. Contents are only read when
    /// the declared type and size pass [`validate_declared`] against
    /// `max_bytes`; otherwise the file carries its name, type and size only,
    /// which is all `select_file` needs to reject it.
    pub async fn from_path(path: impl AsRef<Path>, max_bytes: u64) -> std::io::Result<Self> {
        let path = path.as_ref();
        let size = tokio::fs::metadata(path).await?.len();
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        if validate_declared(mime.essence_str(), size, max_bytes).is_err() {
            return Ok(Self {
                name,
                mime: mime.essence_str().to_string(),
                size,
                bytes: Arc::from(Vec::<u8>::new()),
            });
        }

        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(name, mime.essence_str(), bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No file selected; nothing was sent
    NothingSelected,
    Completed(UploadResult),
}

#[derive(Debug, Default)]
struct PreviewSlot {
    generation: u64,
    preview: Option<Preview>,
}

impl PreviewSlot {
    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Keep `preview` only if no newer selection happened since `generation`.
    fn store(&mut self, generation: u64, preview: Preview) -> bool {
        if generation != self.generation {
            return false;
        }
        self.preview = Some(preview);
        true
    }
}

/// Clears the in-flight flag on drop, so a cancelled `submit` cannot leave it set.
struct InFlight<'a>(&'a mut bool);

impl<'a> InFlight<'a> {
    fn start(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

pub struct Uploader {
    transport: Arc<dyn UploadTransport>,
    max_file_bytes: u64,
    file: Option<SelectedFile>,
    picker_value: Option<String>,
    preview: Arc<Mutex<PreviewSlot>>,
    pending_previews: Vec<JoinHandle<()>>,
    result: Option<UploadResult>,
    is_uploading: bool,
}

impl Uploader {
    pub fn new(transport: Arc<dyn UploadTransport>) -> Self {
        Self {
            transport,
            max_file_bytes: MAX_UPLOAD_BYTES,
            file: None,
            picker_value: None,
            preview: Arc::new(Mutex::new(PreviewSlot::default())),
            pending_previews: Vec::new(),
            result: None,
            is_uploading: false,
        }
    }

    /// Validate and store a candidate file. Returns whether it was accepted.
    ///
    /// A rejected candidate sets a failure result and leaves any previously
    /// accepted file in place.
    pub fn select_file(&mut self, candidate: SelectedFile) -> bool {
        self.picker_value = Some(candidate.name.clone());

        if let Err(e) = validate_declared(&candidate.mime, candidate.size(), self.max_file_bytes) {
            warn!("⚠️  Rejected {}: {}", candidate.name, e);
            self.result = Some(UploadResult::failure(e.user_message()));
            return false;
        }

        info!(
            "Selected {} ({} bytes, {})",
            candidate.name,
            candidate.size(),
            candidate.mime
        );

        let generation = self.lock_preview().next_generation();
        let slot = Arc::clone(&self.preview);
        let mime = candidate.mime.clone();
        let bytes = Arc::clone(&candidate.bytes);
        let compute = move || {
            let preview = Preview::from_bytes(&mime, &bytes);
            slot.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .store(generation, preview);
        };

        match Handle::try_current() {
            Ok(runtime) => {
                self.pending_previews.retain(|handle| !handle.is_finished());
                self.pending_previews.push(runtime.spawn_blocking(compute));
            }
            Err(_) => compute(),
        }

        self.file = Some(candidate);
        self.result = None;
        true
    }

    /// Upload the selected file and record the result.
    ///
    /// Overlapping submits are ruled out by `&mut self`.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let Some(file) = self.file.clone() else {
            warn!("⚠️  Please select a file first!");
            return SubmitOutcome::NothingSelected;
        };

        let transport = Arc::clone(&self.transport);
        let in_flight = InFlight::start(&mut self.is_uploading);
        let result = match transport.send(&file).await {
            Ok(result) => result,
            Err(e) => {
                error!("❌ Error uploading {}: {}", file.name, e);
                UploadResult::failure(NETWORK_FAILURE_MESSAGE)
            }
        };
        drop(in_flight);

        if result.success {
            info!("✅ Uploaded {}: {}", file.name, result.url.as_deref().unwrap_or(""));
        } else {
            warn!("Upload of {} failed: {}", file.name, result.message);
        }

        self.result = Some(result.clone());
        SubmitOutcome::Completed(result)
    }

    /// Reset to the initial empty state so the same file can be picked again.
    pub fn clear(&mut self) {
        let mut slot = self.lock_preview();
        slot.next_generation();
        slot.preview = None;
        drop(slot);

        self.pending_previews.clear();
        self.file = None;
        self.picker_value = None;
        self.result = None;
        self.is_uploading = false;
    }

    /// Wait for every in-flight preview computation, then return the current preview.
    pub async fn wait_for_preview(&mut self) -> Option<Preview> {
        for handle in self.pending_previews.drain(..) {
            if let Err(e) = handle.await {
                error!("Preview task failed: {}", e);
            }
        }
        self.preview()
    }

    pub fn preview(&self) -> Option<Preview> {
        self.lock_preview().preview.clone()
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn picker_value(&self) -> Option<&str> {
        self.picker_value.as_deref()
    }

    pub fn result(&self) -> Option<&UploadResult> {
        self.result.as_ref()
    }

    pub fn is_uploading(&self) -> bool {
        self.is_uploading
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        self.file.is_some() && !self.is_uploading
    }

    fn lock_preview(&self) -> std::sync::MutexGuard<'_, PreviewSlot> {
        self.preview.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
