//! Key table: maps key indexes to private key and passphrase files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::error::{ConfigError, SignerError};
use crate::key_index::KeyIndex;

/// Key material for one key index.
///
/// Relative paths are relative to the directory holding the key table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeyEntry {
    /// PEM private key file.
    pub filename: PathBuf,
    /// File holding the key's passphrase, for encrypted keys.
    #[serde(default)]
    pub pass_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct KeyTableFile {
    #[serde(default)]
    keys: BTreeMap<KeyIndex, KeyEntry>,
}

/// Immutable key index → key material mapping, loaded once per session.
#[derive(Debug, Clone)]
pub struct KeyTable {
    base_dir: PathBuf,
    entries: BTreeMap<KeyIndex, KeyEntry>,
}

impl KeyTable {
    /// Load a key table from a TOML file of `[keys.<index>]` tables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or holds
    /// no keys.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let canonical = path.canonicalize().map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = canonical
            .parent()
            .map_or_else(|| PathBuf::from("/"), Path::to_path_buf);
        let table = Self::parse(&raw, base_dir).map_err(|e| match e {
            ConfigError::Parse { reason, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?;
        debug!("loaded {} keys from {}", table.entries.len(), path.display());
        Ok(table)
    }

    /// Parse key table TOML whose relative paths resolve against `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML and
    /// [`ConfigError::EmptySection`] if no keys are defined.
    pub fn parse(raw: &str, base_dir: PathBuf) -> Result<Self, ConfigError> {
        let file: KeyTableFile = toml::from_str(raw).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<key table>"),
            reason: e.to_string(),
        })?;
        if file.keys.is_empty() {
            return Err(ConfigError::EmptySection("keys"));
        }
        Ok(Self {
            base_dir,
            entries: file.keys,
        })
    }

    /// Look up the key material for `key_index`.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::UnknownKeyIndex`] if there is no entry.
    pub fn resolve(&self, key_index: &KeyIndex) -> Result<&KeyEntry, SignerError> {
        self.entries
            .get(key_index)
            .ok_or_else(|| SignerError::UnknownKeyIndex(key_index.to_string()))
    }

    /// Directory relative key paths are resolved against.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}
