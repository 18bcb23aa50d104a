//! Cryptographic capability for sbcert: RSA signing, public key parameters, SoC IDs.
#![deny(warnings, clippy::all, clippy::pedantic)]
#![warn(missing_docs)]

pub mod error;
pub mod params;
pub mod provider;
pub mod soc_id;

pub use error::CryptoError;
pub use params::PublicKeyParams;
pub use provider::{CryptoProvider, RustCryptoProvider};

/// RSA modulus size in bits.
pub const RSA_KEY_BITS: usize = 3072;
/// Size of the RSA modulus `N` in bytes.
pub const N_LEN: usize = RSA_KEY_BITS / 8;
/// Size of the Barrett reduction tag `Np` in bytes.
pub const NP_LEN: usize = 20;
/// Size of an RSA signature in bytes.
pub const SIGNATURE_LEN: usize = N_LEN;
/// Size of a SHA-256 digest in bytes.
pub const HASH_LEN: usize = 32;
/// Size of a SoC ID in bytes.
pub const SOC_ID_LEN: usize = 32;
