//! Error types for signing backends and their configuration.

use std::path::PathBuf;

use sbcert_crypto::CryptoError;
use thiserror::Error;

/// Failures of a signing backend.
#[derive(Debug, Error)]
pub enum SignerError {
    /// The key index has no entry in the key table.
    #[error("unknown key index '{0}'")]
    UnknownKeyIndex(String),
    /// A key or passphrase file named by the key table does not exist.
    #[error("key material '{}' not found", .0.display())]
    MissingKeyFile(PathBuf),
    /// The working directory could not be switched to the key table directory.
    #[error("cannot enter key table directory: {0}")]
    WorkingDir(#[source] std::io::Error),
    /// The crypto capability failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    /// The HTTP request failed or timed out.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The signing service answered with a non-success status.
    #[error("signing service returned {status}: {body}")]
    Status {
        /// HTTP status code received.
        status: u16,
        /// Response body.
        body: String,
    },
    /// The signing service response could not be decoded.
    #[error("malformed signing service response: {0}")]
    Decode(String),
    /// The blocking signing task panicked or was cancelled.
    #[error("signing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Errors loading signer configuration or a key table.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file could not be read.
    #[error("cannot read '{}': {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A configuration file is not valid TOML for its schema.
    #[error("cannot parse '{}': {reason}", path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },
    /// A required section is absent.
    #[error("section [{0}] is missing")]
    MissingSection(&'static str),
    /// A required section holds no entries.
    #[error("section [{0}] is empty")]
    EmptySection(&'static str),
    /// A required parameter is absent.
    #[error("required parameter '{0}' is missing")]
    MissingParam(&'static str),
    /// A parameter has an unusable value.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParam {
        /// Parameter name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
    /// The implementation identifier does not name a known signer.
    #[error("unknown signer implementation '{0}'")]
    UnknownImplementation(String),
    /// A key index is empty or not a valid path segment.
    #[error("invalid key index '{0}'")]
    InvalidKeyIndex(String),
}
