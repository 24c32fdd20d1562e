//! # Upload Validation
//!
//! Two layers of checks:
//! 1. [`validate_declared`]: the declared MIME type must be `image/*` and the
//!    size must fit the limit. The MIME check runs first.
//! 2. [`sniff_image`]: the leading bytes must be a format the `image` crate
//!    recognises. Only the server runs this one, since a non-browser caller can
//!    declare any content type it likes.

use image::ImageFormat;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("expected an image type, got {mime:?}")]
    NotAnImage { mime: String },

    #[error("file is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    #[error("file contents are not a recognised image format")]
    UnrecognisedImage,
}

impl ValidationError {
    /// Message shown to the person who picked the file.
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::NotAnImage { .. } | ValidationError::UnrecognisedImage => {
                "Please select an image file"
            }
            ValidationError::TooLarge { .. } => "File size must be less than 5MB",
        }
    }
}

/// Check the declared media type and size of a candidate upload.
pub fn validate_declared(mime: &str, size: u64, limit: u64) -> Result<(), ValidationError> {
    if !mime.starts_with("image/") {
        return Err(ValidationError::NotAnImage {
            mime: mime.to_string(),
        });
    }
    if size > limit {
        return Err(ValidationError::TooLarge { size, limit });
    }
    Ok(())
}

/// Identify the image format from the leading bytes of a payload.
pub fn sniff_image(bytes: &[u8]) -> Result<ImageFormat, ValidationError> {
    image::guess_format(bytes).map_err(|_| ValidationError::UnrecognisedImage)
}
