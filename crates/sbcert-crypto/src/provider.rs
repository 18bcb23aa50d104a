//! The crypto capability consumed by signers and certificate builders.

use std::path::Path;

use log::debug;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::pss::BlindedSigningKey;
use rsa::signature::{RandomizedSigner, SignatureEncoding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use crate::error::CryptoError;
use crate::params::PublicKeyParams;
use crate::{HASH_LEN, RSA_KEY_BITS};

/// RSA and SHA-256 operations over key material stored in PEM files.
pub trait CryptoProvider: Send + Sync {
    /// Sign `data` with the private key in `key_file`.
    ///
    /// `pass_file`, when present, holds the passphrase of an encrypted
    /// PKCS#8 key. The signature is returned exactly as the primitive
    /// produced it (big-endian).
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError`] if a file cannot be read, the key cannot be
    /// decoded, or signing fails.
    fn rsa_sign(
        &self,
        data: &[u8],
        key_file: &Path,
        pass_file: Option<&Path>,
    ) -> Result<Vec<u8>, CryptoError>;

    /// Derive `(N, Np)` from the public key in `pubkey_file`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError`] if the file cannot be read or decoded.
    fn public_params(&self, pubkey_file: &Path) -> Result<PublicKeyParams, CryptoError>;

    /// SHA-256 over `N‖Np` of the public key in `pubkey_file`.
    ///
    /// # Errors
    ///
    /// Same as [`CryptoProvider::public_params`].
    fn hashed_public_params(&self, pubkey_file: &Path) -> Result<[u8; HASH_LEN], CryptoError> {
        Ok(self.public_params(pubkey_file)?.hash())
    }
}

/// [`CryptoProvider`] backed by the RustCrypto `rsa` crate.
///
/// Signatures are RSASSA-PSS with SHA-256 and a 32-byte salt.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCryptoProvider;

impl RustCryptoProvider {
    /// Create a provider.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn load_private_key(
        key_file: &Path,
        pass_file: Option<&Path>,
    ) -> Result<RsaPrivateKey, CryptoError> {
        let pem = read_text(key_file)?;
        let parsed = match pass_file {
            Some(pass_file) => {
                let passphrase = read_text(pass_file)?;
                RsaPrivateKey::from_pkcs8_encrypted_pem(&pem, passphrase.trim_end().as_bytes())
                    .map_err(|e| e.to_string())
            }
            None => RsaPrivateKey::from_pkcs8_pem(&pem)
                .or_else(|_| RsaPrivateKey::from_pkcs1_pem(&pem))
                .map_err(|e| e.to_string()),
        };
        parsed.map_err(|reason| CryptoError::KeyParse {
            path: key_file.to_path_buf(),
            reason,
        })
    }

    fn load_public_key(pubkey_file: &Path) -> Result<RsaPublicKey, CryptoError> {
        let pem = read_text(pubkey_file)?;
        RsaPublicKey::from_public_key_pem(&pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(&pem))
            .map_err(|e| CryptoError::KeyParse {
                path: pubkey_file.to_path_buf(),
                reason: e.to_string(),
            })
    }
}

impl CryptoProvider for RustCryptoProvider {
    fn rsa_sign(
        &self,
        data: &[u8],
        key_file: &Path,
        pass_file: Option<&Path>,
    ) -> Result<Vec<u8>, CryptoError> {
        let key = Self::load_private_key(key_file, pass_file)?;
        let bits = key.n().bits();
        if bits != RSA_KEY_BITS {
            return Err(CryptoError::ModulusSize {
                expected: RSA_KEY_BITS,
                got: bits,
            });
        }
        debug!("signing {} bytes with {}", data.len(), key_file.display());
        let signing_key = BlindedSigningKey::<Sha256>::new(key);
        let mut rng = rand::thread_rng();
        let signature = signing_key
            .try_sign_with_rng(&mut rng, data)
            .map_err(|e| CryptoError::Sign(e.to_string()))?;
        Ok(signature.to_vec())
    }

    fn public_params(&self, pubkey_file: &Path) -> Result<PublicKeyParams, CryptoError> {
        let key = Self::load_public_key(pubkey_file)?;
        PublicKeyParams::from_public_key(&key)
    }
}

fn read_text(path: &Path) -> Result<String, CryptoError> {
    std::fs::read_to_string(path).map_err(|e| CryptoError::io(path, e))
}
