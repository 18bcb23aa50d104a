//! Error types for cryptographic operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a [`crate::CryptoProvider`] or the SoC-ID loader.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// A key, passphrase or SoC-ID file could not be read.
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A PEM key could not be decoded.
    #[error("cannot parse key '{}': {reason}", path.display())]
    KeyParse {
        /// Key file that failed.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },
    /// The RSA modulus does not have the expected size.
    #[error("RSA modulus is {got} bits, expected {expected}")]
    ModulusSize {
        /// Required modulus size in bits.
        expected: usize,
        /// Actual modulus size in bits.
        got: usize,
    },
    /// The RSA primitive rejected the signing request.
    #[error("RSA signing failed: {0}")]
    Sign(String),
    /// A SoC-ID file has the wrong length.
    #[error("SoC ID '{}' is {got} bytes, expected {expected}", path.display())]
    SocIdLength {
        /// SoC-ID file.
        path: PathBuf,
        /// Required length in bytes.
        expected: usize,
        /// Actual length in bytes.
        got: usize,
    },
}

impl CryptoError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
