//! `sbcert verify-key`: check that a signer can resolve a key index.

use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use sbcert_signer::{KeyIndex, SignerFactory};

/// Resolve `key_index` through the signer configured in `signer_config`.
///
/// # Errors
///
/// Returns an error if the signer cannot be built or the key is unavailable.
pub async fn run_verify_key(
    signer_config: &Path,
    key_index: &str,
    implementation: Option<&str>,
) -> Result<()> {
    let key_index = KeyIndex::new(key_index)?;
    let factory = SignerFactory::default();
    let signer = match implementation {
        Some(id) => factory.load(signer_config, id),
        None => factory.from_config(signer_config),
    }
    .with_context(|| format!("loading signer from {}", signer_config.display()))?;

    signer
        .verify_key(&key_index)
        .await
        .with_context(|| format!("key {key_index}"))?;
    info!("key {key_index} verified");
    println!("key {key_index}: ok");
    Ok(())
}
