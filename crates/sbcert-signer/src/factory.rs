//! Configuration-driven construction of signers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::info;
use sbcert_crypto::{CryptoProvider, RustCryptoProvider};

use crate::error::ConfigError;
use crate::key_table::KeyTable;
use crate::local::LocalSigner;
use crate::remote::{RemoteSigner, DEFAULT_TIMEOUT};
use crate::signer::Signer;

const PLUGIN_SECTION: &str = "plugin";
const PARAMS_SECTION: &str = "params";

/// The closed set of signer implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerKind {
    /// [`LocalSigner`].
    Local,
    /// [`RemoteSigner`].
    Remote,
}

impl SignerKind {
    /// Resolve an implementation identifier, either a short tag or the
    /// type's module path.
    #[must_use]
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier.trim() {
            "local" | "sbcert_signer::local::LocalSigner" | "LocalSigner" => Some(Self::Local),
            "remote" | "sbcert_signer::remote::RemoteSigner" | "RemoteSigner" => {
                Some(Self::Remote)
            }
            _ => None,
        }
    }
}

/// Builds a [`Signer`] from a TOML signer configuration file.
///
/// ```toml
/// [plugin]
/// implementation = "local"
///
/// [params]
/// key_table = "keys.toml"
/// ```
///
/// Every entry of `[params]` is harvested as a construction parameter.
/// Local signers require `key_table`; remote signers require `url` and
/// accept `timeout_secs`.
#[derive(Clone)]
pub struct SignerFactory {
    crypto: Arc<dyn CryptoProvider>,
}

impl Default for SignerFactory {
    fn default() -> Self {
        Self::new(Arc::new(RustCryptoProvider::new()))
    }
}

impl SignerFactory {
    /// Create a factory whose local signers use `crypto`.
    #[must_use]
    pub fn new(crypto: Arc<dyn CryptoProvider>) -> Self {
        Self { crypto }
    }

    /// Build the signer named by `implementation` from the `[params]`
    /// section of `config_path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is absent or malformed, the
    /// section is missing or empty, a parameter is missing or invalid, or
    /// the identifier is unknown.
    pub fn load(
        &self,
        config_path: &Path,
        implementation: &str,
    ) -> Result<Box<dyn Signer>, ConfigError> {
        let kind = SignerKind::from_identifier(implementation)
            .ok_or_else(|| ConfigError::UnknownImplementation(implementation.to_owned()))?;
        let table = read_table(config_path)?;
        let params = harvest_params(&table)?;
        let base_dir = config_path.parent().unwrap_or_else(|| Path::new(""));
        info!("loading {kind:?} signer from {}", config_path.display());
        self.build(kind, &params, base_dir)
    }

    /// Like [`SignerFactory::load`], taking the identifier from
    /// `[plugin] implementation`.
    ///
    /// # Errors
    ///
    /// As [`SignerFactory::load`], plus [`ConfigError::MissingParam`] when no
    /// implementation is named.
    pub fn from_config(&self, config_path: &Path) -> Result<Box<dyn Signer>, ConfigError> {
        let table = read_table(config_path)?;
        let implementation = table
            .get(PLUGIN_SECTION)
            .and_then(toml::Value::as_table)
            .ok_or(ConfigError::MissingSection(PLUGIN_SECTION))?
            .get("implementation")
            .and_then(toml::Value::as_str)
            .ok_or(ConfigError::MissingParam("implementation"))?
            .to_owned();
        self.load(config_path, &implementation)
    }

    fn build(
        &self,
        kind: SignerKind,
        params: &BTreeMap<String, String>,
        base_dir: &Path,
    ) -> Result<Box<dyn Signer>, ConfigError> {
        match kind {
            SignerKind::Local => {
                let key_table = params
                    .get("key_table")
                    .ok_or(ConfigError::MissingParam("key_table"))?;
                let table = KeyTable::load(&resolve(base_dir, key_table))?;
                Ok(Box::new(LocalSigner::new(
                    Arc::new(table),
                    Arc::clone(&self.crypto),
                )))
            }
            SignerKind::Remote => {
                let url = params.get("url").ok_or(ConfigError::MissingParam("url"))?;
                let timeout = match params.get("timeout_secs") {
                    Some(secs) => Duration::from_secs(secs.parse().map_err(|_| {
                        ConfigError::InvalidParam {
                            name: "timeout_secs".to_owned(),
                            reason: format!("'{secs}' is not a whole number of seconds"),
                        }
                    })?),
                    None => DEFAULT_TIMEOUT,
                };
                let signer =
                    RemoteSigner::new(url.clone(), timeout).map_err(|e| ConfigError::InvalidParam {
                        name: "url".to_owned(),
                        reason: e.to_string(),
                    })?;
                Ok(Box::new(signer))
            }
        }
    }
}

fn read_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    raw.parse::<toml::Table>().map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn harvest_params(table: &toml::Table) -> Result<BTreeMap<String, String>, ConfigError> {
    let section = table
        .get(PARAMS_SECTION)
        .and_then(toml::Value::as_table)
        .ok_or(ConfigError::MissingSection(PARAMS_SECTION))?;
    if section.is_empty() {
        return Err(ConfigError::EmptySection(PARAMS_SECTION));
    }
    section
        .iter()
        .map(|(name, value)| {
            let value = match value {
                toml::Value::String(s) => s.clone(),
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                other => {
                    return Err(ConfigError::InvalidParam {
                        name: name.clone(),
                        reason: format!("unsupported {} value", other.type_str()),
                    })
                }
            };
            Ok((name.clone(), value))
        })
        .collect()
}

fn resolve(base_dir: &Path, value: &str) -> PathBuf {
    let path = Path::new(value);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
