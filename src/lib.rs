//! Image upload service: a multipart upload endpoint that forwards images to
//! Cloudinary, and a client that validates, previews and submits them.

pub mod client;
pub mod common;
pub mod media_host;
pub mod processing;
pub mod server;

pub use common::messages::UploadResult;
pub use server::Server;
