//! RSA public key parameters as embedded in certificate bodies.

use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::error::CryptoError;
use crate::{HASH_LEN, NP_LEN, N_LEN, RSA_KEY_BITS};

/// Extra bits folded into the Barrett tag beyond the modulus size.
const NP_EXTRA_BITS: usize = 132;

/// The `(N, Np)` pair identifying an RSA public key on the device.
///
/// Both values are big-endian and left-padded to their fixed widths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyParams {
    n: Box<[u8; N_LEN]>,
    np: [u8; NP_LEN],
}

impl PublicKeyParams {
    /// Build parameters from already encoded `N` and `Np`.
    #[must_use]
    pub fn from_parts(n: [u8; N_LEN], np: [u8; NP_LEN]) -> Self {
        Self { n: Box::new(n), np }
    }

    /// Derive `N` and the Barrett tag `Np` from an RSA public key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::ModulusSize`] unless the modulus is exactly
    /// [`RSA_KEY_BITS`] wide.
    pub fn from_public_key(key: &RsaPublicKey) -> Result<Self, CryptoError> {
        let modulus = key.n();
        let bits = modulus.bits();
        if bits != RSA_KEY_BITS {
            return Err(CryptoError::ModulusSize {
                expected: RSA_KEY_BITS,
                got: bits,
            });
        }
        let n = left_pad::<N_LEN>(&modulus.to_bytes_be());
        let np = left_pad::<NP_LEN>(&barrett_tag(modulus).to_bytes_be());
        Ok(Self::from_parts(n, np))
    }

    /// The modulus bytes.
    #[must_use]
    pub fn n(&self) -> &[u8; N_LEN] {
        &self.n
    }

    /// The Barrett tag bytes.
    #[must_use]
    pub fn np(&self) -> &[u8; NP_LEN] {
        &self.np
    }

    /// `N‖Np` as stored in a certificate body.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(N_LEN + NP_LEN);
        out.extend_from_slice(self.n.as_slice());
        out.extend_from_slice(&self.np);
        out
    }

    /// SHA-256 over `N‖Np`.
    #[must_use]
    pub fn hash(&self) -> [u8; HASH_LEN] {
        Sha256::digest(self.to_bytes()).into()
    }
}

/// `floor(2^(RSA_KEY_BITS + 132) / N)`.
fn barrett_tag(modulus: &BigUint) -> BigUint {
    (BigUint::from(1u32) << (RSA_KEY_BITS + NP_EXTRA_BITS)) / modulus
}

/// Right-align `bytes` in a zeroed array of width `W`, keeping the low bytes
/// if the value is wider.
fn left_pad<const W: usize>(bytes: &[u8]) -> [u8; W] {
    let mut out = [0u8; W];
    let take = bytes.len().min(W);
    out[W - take..].copy_from_slice(&bytes[bytes.len() - take..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_pad_right_aligns() {
        assert_eq!(left_pad::<4>(&[1, 2]), [0, 0, 1, 2]);
        assert_eq!(left_pad::<2>(&[1, 2, 3]), [2, 3]);
    }

    #[test]
    fn barrett_tag_of_power_of_two_modulus() {
        // N = 2^3071 gives exactly 2^133.
        let n = BigUint::from(1u32) << (RSA_KEY_BITS - 1);
        let tag = barrett_tag(&n);
        assert_eq!(tag, BigUint::from(1u32) << 133);
        let encoded = left_pad::<NP_LEN>(&tag.to_bytes_be());
        assert_eq!(encoded[NP_LEN - 17], 0x20);
        assert!(encoded[..NP_LEN - 17].iter().all(|b| *b == 0));
    }

    #[test]
    fn hash_covers_n_and_np() {
        let a = PublicKeyParams::from_parts([1; N_LEN], [2; NP_LEN]);
        let b = PublicKeyParams::from_parts([1; N_LEN], [3; NP_LEN]);
        assert_eq!(a.to_bytes().len(), N_LEN + NP_LEN);
        assert_ne!(a.hash(), b.hash());
        assert_eq!(a.hash(), <[u8; HASH_LEN]>::from(Sha256::digest(a.to_bytes())));
    }
}
