//! Signing server configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// Errors during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    Missing(String),
}

/// Signing server runtime configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Key table TOML file.
    pub key_table: PathBuf,
    /// TCP address to bind (e.g. `127.0.0.1:8443`).
    pub bind_addr: String,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if `SBCERT_KEY_TABLE` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            key_table: env::var_os("SBCERT_KEY_TABLE")
                .map(PathBuf::from)
                .ok_or_else(|| ConfigError::Missing("SBCERT_KEY_TABLE".to_owned()))?,
            bind_addr: env::var("SBCERT_BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8443".to_owned()),
        })
    }
}
