//! Signing with private keys stored on the local filesystem.

use std::path::Path;
use std::sync::Arc;

use log::debug;
use sbcert_crypto::CryptoProvider;

use crate::error::SignerError;
use crate::key_index::KeyIndex;
use crate::key_table::{KeyEntry, KeyTable};
use crate::signer::{BoxFuture, Signer};
use crate::workdir::ScopedWorkingDir;

/// [`Signer`] that resolves key indexes through a [`KeyTable`] and signs
/// with the [`CryptoProvider`].
///
/// Key table paths are resolved with the working directory switched to the
/// key table's directory; it is restored before `sign` returns, on success
/// and failure alike. The [`Signer`] methods run on Tokio's blocking pool.
#[derive(Clone)]
pub struct LocalSigner {
    key_table: Arc<KeyTable>,
    crypto: Arc<dyn CryptoProvider>,
}

impl LocalSigner {
    /// Create a signer over `key_table` using `crypto` for RSA operations.
    #[must_use]
    pub fn new(key_table: Arc<KeyTable>, crypto: Arc<dyn CryptoProvider>) -> Self {
        Self { key_table, crypto }
    }

    /// Sign `data` with the key behind `key_index`, returning the
    /// primitive's output in its native byte order.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError`] if the index is unknown, its key files are
    /// missing, or signing fails.
    pub fn sign_raw(&self, key_index: &KeyIndex, data: &[u8]) -> Result<Vec<u8>, SignerError> {
        let entry = self.key_table.resolve(key_index)?;
        let _cwd = ScopedWorkingDir::enter(self.key_table.base_dir())
            .map_err(SignerError::WorkingDir)?;
        check_key_files(entry)?;
        debug!("signing {} bytes with local key {key_index}", data.len());
        Ok(self
            .crypto
            .rsa_sign(data, &entry.filename, entry.pass_file.as_deref())?)
    }

    /// Check that `key_index` resolves to existing key files.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::UnknownKeyIndex`] or
    /// [`SignerError::MissingKeyFile`].
    pub fn check_key(&self, key_index: &KeyIndex) -> Result<(), SignerError> {
        let entry = self.key_table.resolve(key_index)?;
        let _cwd = ScopedWorkingDir::enter(self.key_table.base_dir())
            .map_err(SignerError::WorkingDir)?;
        check_key_files(entry)
    }
}

fn check_key_files(entry: &KeyEntry) -> Result<(), SignerError> {
    let files = std::iter::once(entry.filename.as_path()).chain(entry.pass_file.as_deref());
    for file in files {
        if !Path::is_file(file) {
            return Err(SignerError::MissingKeyFile(file.to_path_buf()));
        }
    }
    Ok(())
}

impl Signer for LocalSigner {
    fn sign<'a>(
        &'a self,
        key_index: &'a KeyIndex,
        data: &'a [u8],
    ) -> BoxFuture<'a, Result<Vec<u8>, SignerError>> {
        let signer = self.clone();
        let key_index = key_index.clone();
        let data = data.to_vec();
        Box::pin(async move {
            let mut signature =
                tokio::task::spawn_blocking(move || signer.sign_raw(&key_index, &data)).await??;
            signature.reverse();
            Ok(signature)
        })
    }

    fn verify_key<'a>(&'a self, key_index: &'a KeyIndex) -> BoxFuture<'a, Result<(), SignerError>> {
        let signer = self.clone();
        let key_index = key_index.clone();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || signer.check_key(&key_index)).await?
        })
    }
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("key_table", &self.key_table)
            .finish_non_exhaustive()
    }
}
