//! End-to-end generation of certificate chains from configuration files.
//!
//! Each generator builds its certificate, assembles the chain and only then
//! writes output, so a failing stage leaves no file behind.

use std::path::Path;

use log::info;
use sbcert_crypto::CryptoProvider;
use sbcert_signer::{Signer, SignerFactory};

use crate::certificate::{DeveloperDebugCertificate, EnablerDebugCertificate, KeyCertificate};
use crate::chain::{ChainAssembler, Envelope};
use crate::config::{CertConfig, DeveloperCertConfig, EnablerCertConfig, KeyCertConfig};
use crate::error::{BuildError, CertError, Stage};
use crate::output::write_output;

/// Load the signer named by a certificate configuration.
///
/// # Errors
///
/// Returns a [`Stage::Config`] error if the signer cannot be constructed.
pub fn load_signer<C: CertConfig>(
    factory: &SignerFactory,
    config: &C,
) -> Result<Box<dyn Signer>, BuildError> {
    match config.signer_impl() {
        Some(id) => factory.load(config.signer_config(), id),
        None => factory.from_config(config.signer_config()),
    }
    .map_err(BuildError::at(Stage::Config))
}

/// Load the certificate configuration at `path`.
///
/// # Errors
///
/// Returns a [`Stage::Config`] error if the file is unreadable or invalid.
pub fn load_config<C: CertConfig>(path: &Path) -> Result<C, BuildError> {
    C::load(path).map_err(BuildError::at(Stage::Config))
}

/// Read a previously generated package that precedes this certificate.
fn read_package(path: &Path) -> Result<Vec<u8>, BuildError> {
    let bytes = std::fs::read(path).map_err(|e| {
        BuildError::new(
            Stage::Assembly,
            CertError::InvalidInput(format!("cannot read package '{}': {e}", path.display())),
        )
    })?;
    if bytes.is_empty() {
        return Err(BuildError::new(
            Stage::Assembly,
            CertError::InvalidInput(format!("package '{}' is empty", path.display())),
        ));
    }
    Ok(bytes)
}

fn finish(
    chain: ChainAssembler,
    output: &Path,
    hex_output: Option<&Path>,
) -> Result<Vec<u8>, BuildError> {
    let data = chain.assemble().map_err(BuildError::at(Stage::Assembly))?;
    write_output(&data, output, hex_output).map_err(BuildError::at(Stage::Output))?;
    Ok(data)
}

/// Generate a key certificate and write it to `config.output`.
///
/// # Errors
///
/// Returns a [`BuildError`] tagged with the failing stage.
pub async fn generate_key_certificate(
    config: &KeyCertConfig,
    crypto: &dyn CryptoProvider,
    signer: &dyn Signer,
) -> Result<Vec<u8>, BuildError> {
    let cert = KeyCertificate::build(config, crypto, signer).await?;
    let chain = ChainAssembler::new().push(cert.certificate_data());
    let data = finish(chain, &config.output, config.hex_output.as_deref())?;
    info!("key certificate package: {} bytes", data.len());
    Ok(data)
}

/// Generate an enabler debug certificate, preceded by the key certificate
/// package if one is configured, and write it to `config.output`.
///
/// # Errors
///
/// Returns a [`BuildError`] tagged with the failing stage.
pub async fn generate_enabler_certificate(
    config: &EnablerCertConfig,
    crypto: &dyn CryptoProvider,
    signer: &dyn Signer,
) -> Result<Vec<u8>, BuildError> {
    let key_pkg = config.key_cert_pkg.as_deref().map(read_package).transpose()?;
    let cert = EnablerDebugCertificate::build(config, crypto, signer).await?;

    let mut chain = ChainAssembler::new();
    if let Some(pkg) = key_pkg {
        chain = chain.push(pkg);
    }
    let data = finish(
        chain.push(cert.certificate_data()),
        &config.output,
        config.hex_output.as_deref(),
    )?;
    info!("enabler certificate package: {} bytes", data.len());
    Ok(data)
}

/// Generate a developer debug certificate and write it to `config.output`.
///
/// With an enabler package configured the output is the enveloped chain
/// `envelope‖enabler package‖developer certificate`.
///
/// # Errors
///
/// Returns a [`BuildError`] tagged with the failing stage.
pub async fn generate_developer_certificate(
    config: &DeveloperCertConfig,
    crypto: &dyn CryptoProvider,
    signer: &dyn Signer,
) -> Result<Vec<u8>, BuildError> {
    let enabler_pkg = config
        .enabler_cert_pkg
        .as_deref()
        .map(read_package)
        .transpose()?;
    let cert = DeveloperDebugCertificate::build(config, crypto, signer).await?;

    let chain = match enabler_pkg {
        Some(pkg) => ChainAssembler::new()
            .push(pkg)
            .push(cert.certificate_data())
            .envelope(Envelope::debug()),
        None => ChainAssembler::new().push(cert.certificate_data()),
    };
    let data = finish(chain, &config.output, config.hex_output.as_deref())?;
    info!("developer certificate package: {} bytes", data.len());
    Ok(data)
}
