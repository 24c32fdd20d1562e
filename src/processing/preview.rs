//! # Local Previews
//!
//! A preview is the selected file encoded as a `data:` URI, which a browser can
//! display directly, plus the pixel dimensions when the header can be read.

use base64::{engine::general_purpose, Engine as _};
use std::io::Cursor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub data_uri: String,
    /// `(width, height)`, or `None` when the header could not be decoded.
    pub dimensions: Option<(u32, u32)>,
}

impl Preview {
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        Self {
            data_uri: preview_data_uri(mime, bytes),
            dimensions: read_dimensions(bytes),
        }
    }
}

/// Encode `bytes` as `data:<mime>;base64,<payload>`.
pub fn preview_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, general_purpose::STANDARD.encode(bytes))
}

fn read_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    image::io::Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}
