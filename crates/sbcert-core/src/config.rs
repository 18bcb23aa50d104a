//! Typed per-certificate configuration files.

use std::path::{Path, PathBuf};

use log::debug;
use sbcert_signer::KeyIndex;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::CertError;
use crate::types::{DebugMask, HbkId, Lcs};

/// A TOML certificate configuration, validated eagerly on load.
pub trait CertConfig: DeserializeOwned {
    /// Make every relative path relative to `base_dir`.
    fn resolve_paths(&mut self, base_dir: &Path);

    /// Check values that the schema alone cannot.
    ///
    /// # Errors
    ///
    /// Returns [`CertError::Configuration`] naming the offending field.
    fn validate(&self) -> Result<(), CertError>;

    /// Signer configuration file.
    fn signer_config(&self) -> &Path;

    /// Signer implementation overriding the signer config's `[plugin]` entry.
    fn signer_impl(&self) -> Option<&str>;

    /// Read, parse, resolve and validate the configuration at `path`.
    ///
    /// Relative paths in the file are relative to the file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`CertError::Configuration`] if the file cannot be read or
    /// parsed, or fails validation.
    fn load(path: &Path) -> Result<Self, CertError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CertError::Configuration(format!("cannot read '{}': {e}", path.display()))
        })?;
        let mut config: Self = toml::from_str(&raw).map_err(|e| {
            CertError::Configuration(format!("cannot parse '{}': {e}", path.display()))
        })?;
        config.resolve_paths(path.parent().unwrap_or_else(|| Path::new("")));
        config.validate()?;
        debug!("loaded certificate configuration {}", path.display());
        Ok(config)
    }
}

fn resolve(base_dir: &Path, path: &mut PathBuf) {
    if path.is_relative() && !path.as_os_str().is_empty() {
        *path = base_dir.join(&*path);
    }
}

fn require_path(name: &str, path: &Path) -> Result<(), CertError> {
    if path.as_os_str().is_empty() {
        return Err(CertError::Configuration(format!("'{name}' must not be empty")));
    }
    Ok(())
}

fn require_optional_path(name: &str, path: Option<&PathBuf>) -> Result<(), CertError> {
    path.map_or(Ok(()), |p| require_path(name, p))
}

/// Configuration of a key certificate.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyCertConfig {
    /// Public key of the signing key (`auth_key_index`).
    pub auth_pubkey: PathBuf,
    /// Key index the certificate is signed with.
    pub auth_key_index: KeyIndex,
    /// Signer configuration file.
    pub signer_config: PathBuf,
    /// Signer implementation; defaults to the config's `[plugin]` entry.
    #[serde(default)]
    pub signer_impl: Option<String>,
    /// Key bank verifying `auth_pubkey`.
    pub hbk_id: HbkId,
    /// Anti-rollback software version.
    pub sw_version: u32,
    /// Public key of the next certificate in the chain.
    pub next_cert_pubkey: PathBuf,
    /// Binary output file.
    pub output: PathBuf,
    /// Optional C array text dump.
    #[serde(default)]
    pub hex_output: Option<PathBuf>,
}

impl CertConfig for KeyCertConfig {
    fn signer_config(&self) -> &Path {
        &self.signer_config
    }

    fn signer_impl(&self) -> Option<&str> {
        self.signer_impl.as_deref()
    }

    fn resolve_paths(&mut self, base_dir: &Path) {
        resolve(base_dir, &mut self.auth_pubkey);
        resolve(base_dir, &mut self.signer_config);
        resolve(base_dir, &mut self.next_cert_pubkey);
        resolve(base_dir, &mut self.output);
        if let Some(hex) = &mut self.hex_output {
            resolve(base_dir, hex);
        }
    }

    fn validate(&self) -> Result<(), CertError> {
        require_path("auth_pubkey", &self.auth_pubkey)?;
        require_path("signer_config", &self.signer_config)?;
        require_path("next_cert_pubkey", &self.next_cert_pubkey)?;
        require_path("output", &self.output)?;
        require_optional_path("hex_output", self.hex_output.as_ref())
    }
}

/// Configuration of an enabler debug certificate.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnablerCertConfig {
    /// Public key of the signing key (`auth_key_index`).
    pub auth_pubkey: PathBuf,
    /// Key index the certificate is signed with.
    pub auth_key_index: KeyIndex,
    /// Signer configuration file.
    pub signer_config: PathBuf,
    /// Signer implementation; defaults to the config's `[plugin]` entry.
    #[serde(default)]
    pub signer_impl: Option<String>,
    /// Key bank verifying `auth_pubkey`.
    pub hbk_id: HbkId,
    /// Life-cycle state the certificate applies to.
    pub lcs: Lcs,
    /// Whether the certificate authorizes RMA entry.
    #[serde(default)]
    pub rma_mode: bool,
    /// Debug permission mask, four words.
    pub debug_mask: DebugMask,
    /// Debug lock mask, four words.
    pub debug_lock: DebugMask,
    /// Public key of the developer certificate signer.
    pub next_cert_pubkey: PathBuf,
    /// Key certificate package to place before this certificate.
    #[serde(default)]
    pub key_cert_pkg: Option<PathBuf>,
    /// Binary output file.
    pub output: PathBuf,
    /// Optional C array text dump.
    #[serde(default)]
    pub hex_output: Option<PathBuf>,
}

impl CertConfig for EnablerCertConfig {
    fn signer_config(&self) -> &Path {
        &self.signer_config
    }

    fn signer_impl(&self) -> Option<&str> {
        self.signer_impl.as_deref()
    }

    fn resolve_paths(&mut self, base_dir: &Path) {
        resolve(base_dir, &mut self.auth_pubkey);
        resolve(base_dir, &mut self.signer_config);
        resolve(base_dir, &mut self.next_cert_pubkey);
        resolve(base_dir, &mut self.output);
        for path in [&mut self.key_cert_pkg, &mut self.hex_output]
            .into_iter()
            .flatten()
        {
            resolve(base_dir, path);
        }
    }

    fn validate(&self) -> Result<(), CertError> {
        require_path("auth_pubkey", &self.auth_pubkey)?;
        require_path("signer_config", &self.signer_config)?;
        require_path("next_cert_pubkey", &self.next_cert_pubkey)?;
        require_path("output", &self.output)?;
        require_optional_path("key_cert_pkg", self.key_cert_pkg.as_ref())?;
        require_optional_path("hex_output", self.hex_output.as_ref())
    }
}

/// Configuration of a developer debug certificate.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeveloperCertConfig {
    /// Public key of the signing key (`auth_key_index`).
    pub auth_pubkey: PathBuf,
    /// Key index the certificate is signed with.
    pub auth_key_index: KeyIndex,
    /// Signer configuration file.
    pub signer_config: PathBuf,
    /// Signer implementation; defaults to the config's `[plugin]` entry.
    #[serde(default)]
    pub signer_impl: Option<String>,
    /// Debug permission mask, four words.
    pub debug_mask: DebugMask,
    /// Raw SoC-ID file.
    pub soc_id: PathBuf,
    /// Enabler certificate package to place before this certificate.
    #[serde(default)]
    pub enabler_cert_pkg: Option<PathBuf>,
    /// Binary output file.
    pub output: PathBuf,
    /// Optional C array text dump.
    #[serde(default)]
    pub hex_output: Option<PathBuf>,
}

impl CertConfig for DeveloperCertConfig {
    fn signer_config(&self) -> &Path {
        &self.signer_config
    }

    fn signer_impl(&self) -> Option<&str> {
        self.signer_impl.as_deref()
    }

    fn resolve_paths(&mut self, base_dir: &Path) {
        resolve(base_dir, &mut self.auth_pubkey);
        resolve(base_dir, &mut self.signer_config);
        resolve(base_dir, &mut self.soc_id);
        resolve(base_dir, &mut self.output);
        for path in [&mut self.enabler_cert_pkg, &mut self.hex_output]
            .into_iter()
            .flatten()
        {
            resolve(base_dir, path);
        }
    }

    fn validate(&self) -> Result<(), CertError> {
        require_path("auth_pubkey", &self.auth_pubkey)?;
        require_path("signer_config", &self.signer_config)?;
        require_path("soc_id", &self.soc_id)?;
        require_path("output", &self.output)?;
        require_optional_path("enabler_cert_pkg", self.enabler_cert_pkg.as_ref())?;
        require_optional_path("hex_output", self.hex_output.as_ref())
    }
}
