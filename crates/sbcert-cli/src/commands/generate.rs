//! `sbcert key-cert | enabler-cert | developer-cert`: build one certificate
//! package from its configuration file.

use std::path::Path;

use anyhow::{Context, Result};
use sbcert_core::{
    generate_developer_certificate, generate_enabler_certificate, generate_key_certificate,
    load_config, load_signer, DeveloperCertConfig, EnablerCertConfig, KeyCertConfig,
};
use sbcert_crypto::RustCryptoProvider;
use sbcert_signer::SignerFactory;

/// Build the key certificate described by `config_path`.
///
/// # Errors
///
/// Returns an error naming the failing stage if any step fails.
pub async fn run_key_cert(config_path: &Path) -> Result<()> {
    let config: KeyCertConfig = load_config(config_path)?;
    let signer = load_signer(&SignerFactory::default(), &config)?;
    let data = generate_key_certificate(&config, &RustCryptoProvider::new(), signer.as_ref())
        .await
        .with_context(|| format!("key certificate from {}", config_path.display()))?;
    println!("wrote {} ({} bytes)", config.output.display(), data.len());
    Ok(())
}

/// Build the enabler debug certificate package described by `config_path`.
///
/// # Errors
///
/// Returns an error naming the failing stage if any step fails.
pub async fn run_enabler_cert(config_path: &Path) -> Result<()> {
    let config: EnablerCertConfig = load_config(config_path)?;
    let signer = load_signer(&SignerFactory::default(), &config)?;
    let data = generate_enabler_certificate(&config, &RustCryptoProvider::new(), signer.as_ref())
        .await
        .with_context(|| format!("enabler certificate from {}", config_path.display()))?;
    println!("wrote {} ({} bytes)", config.output.display(), data.len());
    Ok(())
}

/// Build the developer debug certificate package described by `config_path`.
///
/// # Errors
///
/// Returns an error naming the failing stage if any step fails.
pub async fn run_developer_cert(config_path: &Path) -> Result<()> {
    let config: DeveloperCertConfig = load_config(config_path)?;
    let signer = load_signer(&SignerFactory::default(), &config)?;
    let data =
        generate_developer_certificate(&config, &RustCryptoProvider::new(), signer.as_ref())
            .await
            .with_context(|| format!("developer certificate from {}", config_path.display()))?;
    println!("wrote {} ({} bytes)", config.output.display(), data.len());
    Ok(())
}
