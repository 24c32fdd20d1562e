//! # Configuration Utilities
//!
//! Shared configuration loading used by both client and server components.

use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
///
/// All of these are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// A required credential was not present in the environment.
    #[error("missing credential: environment variable {0} is not set")]
    MissingCredential(&'static str),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Example
/// ```ignore
/// let config: ServerConfig = load_config("config/server.toml")?;
/// ```
pub fn load_config<T>(path: impl AsRef<Path>) -> Result<T, ConfigError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Read a required, non-blank environment variable.
pub fn require_env(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::MissingCredential(name))
}
