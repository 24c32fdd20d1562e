//! # Client Components
//!
//! The client is split into two parts:
//!
//! ## Uploader ([`client`])
//! The state a front end renders: selected file, local validation, preview,
//! in-flight flag and the last upload result.
//!
//! ## Transport ([`middleware`])
//! Everything that touches the network: the multipart POST to the upload
//! endpoint and parsing of the JSON reply, plus the client configuration.

pub mod client;
pub mod middleware;

pub use client::{SelectedFile, SubmitOutcome, Uploader};
pub use middleware::{ClientConfig, HttpTransport, TransportError, UploadTransport};
