//! # Image Checks and Previews
//!
//! Validation shared by the client uploader and the upload endpoint, plus the
//! `data:` URI preview the client shows for a selected file.

pub mod preview;
pub mod validation;

pub use preview::{preview_data_uri, Preview};
pub use validation::{sniff_image, validate_declared, ValidationError};
