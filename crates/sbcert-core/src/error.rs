//! Error taxonomy for certificate generation.

use std::fmt;

use sbcert_signer::{ConfigError, SignerError};
use thiserror::Error;

/// What went wrong while producing a certificate or chain.
#[derive(Debug, Error)]
pub enum CertError {
    /// Bad or missing configuration, or an unresolvable signer backend.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Malformed or wrong-sized key, SoC-ID or certificate material.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The signing backend failed.
    #[error("signing backend error: {0}")]
    SigningBackend(#[from] SignerError),
    /// The signing backend returned a signature of the wrong size.
    #[error("signing backend returned {got} signature bytes, expected {expected}")]
    SignatureLength {
        /// Required signature size.
        expected: usize,
        /// Actual size returned.
        got: usize,
    },
    /// Writing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CertError {
    fn from(e: ConfigError) -> Self {
        Self::Configuration(e.to_string())
    }
}

/// Generation step at which a [`BuildError`] occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Loading and validating configuration.
    Config,
    /// Building the header.
    Header,
    /// Building the body from key and SoC-ID material.
    Body,
    /// Producing the signature.
    Signing,
    /// Concatenating the chain.
    Assembly,
    /// Writing output files.
    Output,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Config => "config",
            Self::Header => "header",
            Self::Body => "body",
            Self::Signing => "signing",
            Self::Assembly => "assembly",
            Self::Output => "output",
        })
    }
}

/// A [`CertError`] tagged with the stage that produced it.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {kind}")]
pub struct BuildError {
    /// Where generation stopped.
    pub stage: Stage,
    /// What went wrong.
    #[source]
    pub kind: CertError,
}

impl BuildError {
    /// Tag `kind` with `stage`.
    #[must_use]
    pub fn new(stage: Stage, kind: impl Into<CertError>) -> Self {
        Self {
            stage,
            kind: kind.into(),
        }
    }

    /// Returns a closure tagging errors with `stage`, for use with `map_err`.
    pub fn at<E: Into<CertError>>(stage: Stage) -> impl FnOnce(E) -> Self {
        move |e| Self::new(stage, e)
    }
}
