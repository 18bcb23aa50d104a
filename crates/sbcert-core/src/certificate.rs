//! Signed certificates and the per-kind construction algorithms.

use log::{debug, info};
use sbcert_crypto::soc_id::load_soc_id;
use sbcert_crypto::{CryptoProvider, SIGNATURE_LEN};
use sbcert_signer::{KeyIndex, Signer};

use crate::body::{DeveloperDebugBody, EnablerDebugBody, KeyCertBody};
use crate::config::{DeveloperCertConfig, EnablerCertConfig, KeyCertConfig};
use crate::error::{BuildError, CertError, Stage};
use crate::header::{CertHeader, CertKind, HEADER_LEN};
use crate::record::Record;

/// A certificate body together with the header fields it determines.
pub trait CertBody: Record {
    /// Kind of certificate this body belongs to.
    const KIND: CertKind;

    /// Kind-specific header flags.
    fn header_flags(&self) -> u32;
}

impl CertBody for KeyCertBody {
    const KIND: CertKind = CertKind::Key;

    fn header_flags(&self) -> u32 {
        u32::from(self.hbk_id)
    }
}

/// RMA bit of the enabler certificate flags.
const RMA_FLAG: u32 = 1 << 8;

impl CertBody for EnablerDebugBody {
    const KIND: CertKind = CertKind::EnablerDebug;

    /// HBK id in bits 0-3, LCS in bits 4-7, RMA in bit 8.
    fn header_flags(&self) -> u32 {
        let rma = if self.rma_mode { RMA_FLAG } else { 0 };
        u32::from(self.hbk_id) | (u32::from(self.lcs) << 4) | rma
    }
}

impl CertBody for DeveloperDebugBody {
    const KIND: CertKind = CertKind::DeveloperDebug;

    fn header_flags(&self) -> u32 {
        0
    }
}

/// RSA signature over `Header‖Body` in device byte order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(Box<[u8; SIGNATURE_LEN]>);

impl Signature {
    /// The signature bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }
}

impl TryFrom<Vec<u8>> for Signature {
    type Error = CertError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        let got = bytes.len();
        let array: Box<[u8; SIGNATURE_LEN]> = bytes
            .into_boxed_slice()
            .try_into()
            .map_err(|_| CertError::SignatureLength {
                expected: SIGNATURE_LEN,
                got,
            })?;
        Ok(Self(array))
    }
}

impl Record for Signature {
    const LEN: usize = SIGNATURE_LEN;

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.0.as_slice());
    }
}

/// A signed certificate: `Header‖Body‖Signature`.
///
/// Values only exist fully signed; the signed byte range cannot change
/// after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate<B> {
    header: CertHeader,
    body: B,
    signature: Signature,
}

/// Key certificate.
pub type KeyCertificate = Certificate<KeyCertBody>;
/// Enabler debug certificate.
pub type EnablerDebugCertificate = Certificate<EnablerDebugBody>;
/// Developer debug certificate.
pub type DeveloperDebugCertificate = Certificate<DeveloperDebugBody>;

impl<B: CertBody> Certificate<B> {
    /// Size of `Header‖Body` in bytes.
    pub const SIGNED_LEN: usize = HEADER_LEN + B::LEN;
    /// Size of the whole certificate in bytes.
    pub const LEN: usize = Self::SIGNED_LEN + SIGNATURE_LEN;

    /// Build the header for `body`, sign `Header‖Body` with `key_index`, and
    /// seal the result.
    ///
    /// # Errors
    ///
    /// Returns a [`Stage::Header`] error if the header cannot describe the
    /// body, and a [`Stage::Signing`] error if the signer fails or returns a
    /// signature of the wrong size.
    pub async fn sign(
        body: B,
        key_index: &KeyIndex,
        signer: &dyn Signer,
    ) -> Result<Self, BuildError> {
        let header = CertHeader::new(B::KIND, B::LEN, body.header_flags())
            .map_err(BuildError::at(Stage::Header))?;
        let mut signed = header.serialize();
        body.write_to(&mut signed);
        debug_assert_eq!(signed.len(), header.signed_content_len());

        debug!(
            "signing {} ({} bytes) with key {key_index}",
            B::KIND,
            signed.len()
        );
        let signature = signer
            .sign(key_index, &signed)
            .await
            .map_err(BuildError::at(Stage::Signing))?;
        let signature = Signature::try_from(signature).map_err(BuildError::at(Stage::Signing))?;

        Ok(Self {
            header,
            body,
            signature,
        })
    }

    /// The header.
    #[must_use]
    pub fn header(&self) -> &CertHeader {
        &self.header
    }

    /// The body.
    #[must_use]
    pub fn body(&self) -> &B {
        &self.body
    }

    /// The signature.
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// `Header‖Body‖Signature`.
    #[must_use]
    pub fn certificate_data(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::LEN);
        self.header.write_to(&mut out);
        self.body.write_to(&mut out);
        self.signature.write_to(&mut out);
        out
    }
}

fn invalid_input(e: impl std::fmt::Display) -> BuildError {
    BuildError::new(Stage::Body, CertError::InvalidInput(e.to_string()))
}

impl KeyCertificate {
    /// Build and sign a key certificate from `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`Stage::Body`] error if a public key cannot be loaded and a
    /// [`Stage::Signing`] error if signing fails.
    pub async fn build(
        config: &KeyCertConfig,
        crypto: &dyn CryptoProvider,
        signer: &dyn Signer,
    ) -> Result<Self, BuildError> {
        let body = KeyCertBody {
            hbk_id: config.hbk_id,
            sw_version: config.sw_version,
            public_key: crypto
                .public_params(&config.auth_pubkey)
                .map_err(invalid_input)?,
            next_pubkey_hash: crypto
                .hashed_public_params(&config.next_cert_pubkey)
                .map_err(invalid_input)?,
        };
        let cert = Self::sign(body, &config.auth_key_index, signer).await?;
        info!("built key certificate ({} bytes)", Self::LEN);
        Ok(cert)
    }
}

impl EnablerDebugCertificate {
    /// Build and sign an enabler debug certificate from `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`Stage::Body`] error if a public key cannot be loaded and a
    /// [`Stage::Signing`] error if signing fails.
    pub async fn build(
        config: &EnablerCertConfig,
        crypto: &dyn CryptoProvider,
        signer: &dyn Signer,
    ) -> Result<Self, BuildError> {
        let body = EnablerDebugBody {
            hbk_id: config.hbk_id,
            lcs: config.lcs,
            rma_mode: config.rma_mode,
            public_key: crypto
                .public_params(&config.auth_pubkey)
                .map_err(invalid_input)?,
            debug_mask: config.debug_mask,
            debug_lock: config.debug_lock,
            next_pubkey_hash: crypto
                .hashed_public_params(&config.next_cert_pubkey)
                .map_err(invalid_input)?,
        };
        let cert = Self::sign(body, &config.auth_key_index, signer).await?;
        info!("built enabler debug certificate ({} bytes)", Self::LEN);
        Ok(cert)
    }
}

impl DeveloperDebugCertificate {
    /// Build and sign a developer debug certificate from `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`Stage::Body`] error if the public key or SoC ID cannot be
    /// loaded or the SoC ID has the wrong size, and a [`Stage::Signing`]
    /// error if signing fails.
    pub async fn build(
        config: &DeveloperCertConfig,
        crypto: &dyn CryptoProvider,
        signer: &dyn Signer,
    ) -> Result<Self, BuildError> {
        let body = DeveloperDebugBody {
            public_key: crypto
                .public_params(&config.auth_pubkey)
                .map_err(invalid_input)?,
            debug_mask: config.debug_mask,
            soc_id: load_soc_id(&config.soc_id).map_err(invalid_input)?,
        };
        let cert = Self::sign(body, &config.auth_key_index, signer).await?;
        info!("built developer debug certificate ({} bytes)", Self::LEN);
        Ok(cert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HbkId, Lcs};
    use sbcert_crypto::{PublicKeyParams, HASH_LEN, NP_LEN, N_LEN};

    #[test]
    fn enabler_flags_pack_hbk_lcs_and_rma() {
        let mut body = EnablerDebugBody {
            hbk_id: HbkId::Hbk1,
            lcs: Lcs::Secure,
            rma_mode: true,
            public_key: PublicKeyParams::from_parts([0; N_LEN], [0; NP_LEN]),
            debug_mask: [0; 4],
            debug_lock: [0; 4],
            next_pubkey_hash: [0; HASH_LEN],
        };
        assert_eq!(body.header_flags(), 0x151);
        body.rma_mode = false;
        body.hbk_id = HbkId::Unused;
        assert_eq!(body.header_flags(), 0x05F);
    }

    #[test]
    fn signed_sizes_are_word_counts_of_header_and_body() {
        assert_eq!(KeyCertificate::SIGNED_LEN, 456);
        assert_eq!(EnablerDebugCertificate::SIGNED_LEN, 484);
        assert_eq!(DeveloperDebugCertificate::SIGNED_LEN, 468);
        assert_eq!(DeveloperDebugCertificate::LEN, 468 + 384);
    }

    #[derive(Debug)]
    struct OddBody;

    impl Record for OddBody {
        const LEN: usize = 6;

        fn write_to(&self, out: &mut Vec<u8>) {
            out.extend_from_slice(&[0; 6]);
        }
    }

    impl CertBody for OddBody {
        const KIND: CertKind = CertKind::Key;

        fn header_flags(&self) -> u32 {
            0
        }
    }

    struct NeverSigner;

    impl Signer for NeverSigner {
        fn sign<'a>(
            &'a self,
            _: &'a KeyIndex,
            _: &'a [u8],
        ) -> sbcert_signer::BoxFuture<'a, Result<Vec<u8>, sbcert_signer::SignerError>> {
            unreachable!("header failure must stop before signing")
        }

        fn verify_key<'a>(
            &'a self,
            _: &'a KeyIndex,
        ) -> sbcert_signer::BoxFuture<'a, Result<(), sbcert_signer::SignerError>> {
            unreachable!("not used")
        }
    }

    #[tokio::test]
    async fn unaligned_body_fails_header_stage() {
        let err = Certificate::sign(OddBody, &KeyIndex::from(0), &NeverSigner)
            .await
            .unwrap_err();
        assert_eq!(err.stage, Stage::Header);
        assert!(err.to_string().starts_with("header stage failed"));
    }

    #[test]
    fn signature_requires_exact_length() {
        assert!(Signature::try_from(vec![0u8; SIGNATURE_LEN]).is_ok());
        let err = Signature::try_from(vec![0u8; 2]).unwrap_err();
        assert!(matches!(err, CertError::SignatureLength { got: 2, .. }));
    }
}
