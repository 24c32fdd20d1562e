use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A temp file holding an uploaded payload until it has been forwarded.
///
/// The file is removed by [`StagedFile::discard`], or on drop if the owner
/// never got that far (e.g. the request future was cancelled).
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    original_name: String,
    content_type: String,
    size: u64,
    discarded: bool,
}

impl StagedFile {
    pub fn new(
        path: impl Into<PathBuf>,
        original_name: impl Into<String>,
        content_type: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            path: path.into(),
            original_name: original_name.into(),
            content_type: content_type.into(),
            size,
            discarded: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub(crate) fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Delete the temp file. A file that is already gone is not an error.
    pub fn discard(mut self) -> io::Result<()> {
        self.discarded = true;
        remove_if_exists(&self.path)
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.discarded {
            let _ = remove_if_exists(&self.path);
        }
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
