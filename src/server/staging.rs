//! # Multipart Staging
//!
//! Streams the single `image` file field of a multipart body into a uniquely
//! named temp file under the upload directory. The result is a
//! [`StagedFile`] guard, so a request that fails part way through never leaves
//! a partial file behind.
//!
//! Field rules:
//! - text fields are ignored
//! - an `image` file must declare an `image/*` content type and start with
//!   recognisable image bytes
//! - any other file field, or a second `image` file, is rejected

use anyhow::Context;
use axum::extract::Multipart;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::error::ApiError;
use crate::common::messages::IMAGE_FIELD;
use crate::media_host::StagedFile;
use crate::processing::{sniff_image, validate_declared};

/// Bytes kept from the start of the payload for format sniffing.
const SNIFF_LEN: usize = 64;

/// Returns `Ok(None)` when the body carried no `image` file.
pub async fn stage_image(
    mut multipart: Multipart,
    upload_dir: &Path,
    max_file_bytes: u64,
) -> Result<Option<StagedFile>, ApiError> {
    let mut staged: Option<StagedFile> = None;

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        let Some(original_name) = field.file_name().map(base_name) else {
            continue;
        };

        if name != IMAGE_FIELD || staged.is_some() {
            return Err(ApiError::UnexpectedField(name));
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        // size is checked while streaming
        validate_declared(&content_type, 0, max_file_bytes)?;

        let path = upload_dir.join(format!("{}-{}", Uuid::new_v4(), sanitize(&original_name)));
        let mut file = tokio::fs::File::create(&path)
            .await
            .with_context(|| format!("creating temp file {}", path.display()))?;
        let guard = StagedFile::new(&path, original_name, content_type, 0);

        let mut size: u64 = 0;
        let mut head: Vec<u8> = Vec::with_capacity(SNIFF_LEN);
        while let Some(chunk) = field.chunk().await? {
            size += chunk.len() as u64;
            if size > max_file_bytes {
                return Err(ApiError::TooLarge {
                    size,
                    limit: max_file_bytes,
                });
            }
            if head.len() < SNIFF_LEN {
                let take = (SNIFF_LEN - head.len()).min(chunk.len());
                head.extend_from_slice(&chunk[..take]);
            }
            file.write_all(&chunk)
                .await
                .with_context(|| format!("writing temp file {}", path.display()))?;
        }
        file.flush()
            .await
            .with_context(|| format!("flushing temp file {}", path.display()))?;

        sniff_image(&head)?;
        staged = Some(guard.with_size(size));
    }

    Ok(staged)
}

/// Strip any directory components a client put in the filename.
fn base_name(raw: &str) -> String {
    raw.rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("upload")
        .to_string()
}

/// Filesystem-safe version of a client filename, used only for the temp path.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(100)
        .collect();
    cleaned.trim_start_matches('.').to_string()
}
