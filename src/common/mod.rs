//! # Common Components
//!
//! Shared utilities and data structures used by both client and server components.
//!
//! ## Modules
//!
//! - [`messages`]: The JSON upload result exchanged between endpoint and client
//! - [`config`]: Configuration parsing utilities
//! - [`logging`]: Logger setup shared by the binaries

pub mod config;
pub mod logging;
pub mod messages;
