//! The signing capability shared by every backend.

use std::future::Future;
use std::pin::Pin;

use crate::error::SignerError;
use crate::key_index::KeyIndex;

/// Boxed future returned by dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Produces RSA signatures for a key identified by a [`KeyIndex`].
///
/// Every implementation returns signatures byte-reversed relative to the
/// RSA primitive's big-endian output. This is the order the boot ROM
/// verifier consumes, so callers never reverse signatures themselves.
pub trait Signer: Send + Sync {
    /// Sign `data` with the key behind `key_index`.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError`] if the key cannot be resolved or loaded, or
    /// the backend fails.
    fn sign<'a>(
        &'a self,
        key_index: &'a KeyIndex,
        data: &'a [u8],
    ) -> BoxFuture<'a, Result<Vec<u8>, SignerError>>;

    /// Check that `key_index` is resolvable by this backend without signing.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError`] if the key is unknown or unusable.
    fn verify_key<'a>(&'a self, key_index: &'a KeyIndex) -> BoxFuture<'a, Result<(), SignerError>>;
}
