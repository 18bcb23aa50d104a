//! Certificate bodies for each certificate kind.

use sbcert_crypto::{PublicKeyParams, HASH_LEN, NP_LEN, N_LEN, SOC_ID_LEN};

use crate::record::{put_u32, Record};
use crate::types::{DebugMask, HbkId, Lcs, MASK_WORDS};

/// Serialized size of the `N‖Np` public key record.
pub const PUBKEY_LEN: usize = N_LEN + NP_LEN;
const MASK_LEN: usize = MASK_WORDS * 4;

fn put_mask(out: &mut Vec<u8>, mask: &DebugMask) {
    for word in mask {
        put_u32(out, *word);
    }
}

/// Body of a key certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCertBody {
    /// Key bank that verifies this certificate's public key.
    pub hbk_id: HbkId,
    /// Anti-rollback software version counter.
    pub sw_version: u32,
    /// Public key of the certificate signer.
    pub public_key: PublicKeyParams,
    /// SHA-256 of the next certificate's `N‖Np`.
    pub next_pubkey_hash: [u8; HASH_LEN],
}

impl Record for KeyCertBody {
    const LEN: usize = 4 + PUBKEY_LEN + HASH_LEN;

    fn write_to(&self, out: &mut Vec<u8>) {
        put_u32(out, self.sw_version);
        out.extend_from_slice(&self.public_key.to_bytes());
        out.extend_from_slice(&self.next_pubkey_hash);
    }
}

/// Body of an enabler debug certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnablerDebugBody {
    /// Key bank that verifies this certificate's public key.
    pub hbk_id: HbkId,
    /// Life-cycle state the certificate applies to.
    pub lcs: Lcs,
    /// Whether the certificate authorizes entering RMA.
    pub rma_mode: bool,
    /// Public key of the certificate signer.
    pub public_key: PublicKeyParams,
    /// Debug interfaces the developer certificate may enable.
    pub debug_mask: DebugMask,
    /// Debug interfaces locked regardless of the developer certificate.
    pub debug_lock: DebugMask,
    /// SHA-256 of the developer certificate's `N‖Np`.
    pub next_pubkey_hash: [u8; HASH_LEN],
}

impl Record for EnablerDebugBody {
    const LEN: usize = PUBKEY_LEN + MASK_LEN + MASK_LEN + HASH_LEN;

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.public_key.to_bytes());
        put_mask(out, &self.debug_mask);
        put_mask(out, &self.debug_lock);
        out.extend_from_slice(&self.next_pubkey_hash);
    }
}

/// Body of a developer debug certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeveloperDebugBody {
    /// Public key of the certificate signer.
    pub public_key: PublicKeyParams,
    /// Debug interfaces to enable.
    pub debug_mask: DebugMask,
    /// The single device this certificate is valid for.
    pub soc_id: [u8; SOC_ID_LEN],
}

impl Record for DeveloperDebugBody {
    const LEN: usize = PUBKEY_LEN + MASK_LEN + SOC_ID_LEN;

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.public_key.to_bytes());
        put_mask(out, &self.debug_mask);
        out.extend_from_slice(&self.soc_id);
    }
}

const _: () = assert!(KeyCertBody::LEN % 4 == 0);
const _: () = assert!(EnablerDebugBody::LEN % 4 == 0);
const _: () = assert!(DeveloperDebugBody::LEN % 4 == 0);

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> PublicKeyParams {
        PublicKeyParams::from_parts([0x11; N_LEN], [0x22; NP_LEN])
    }

    #[test]
    fn key_body_layout() {
        let body = KeyCertBody {
            hbk_id: HbkId::Hbk0,
            sw_version: 0x0102_0304,
            public_key: key(),
            next_pubkey_hash: [0x33; HASH_LEN],
        };
        let bytes = body.serialize();
        assert_eq!(bytes.len(), 440);
        assert_eq!(&bytes[..4], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(bytes[4], 0x11);
        assert_eq!(bytes[4 + N_LEN], 0x22);
        assert_eq!(&bytes[4 + PUBKEY_LEN..], &[0x33; HASH_LEN]);
    }

    #[test]
    fn enabler_body_layout() {
        let body = EnablerDebugBody {
            hbk_id: HbkId::Hbk1,
            lcs: Lcs::Secure,
            rma_mode: true,
            public_key: key(),
            debug_mask: [1, 2, 3, 4],
            debug_lock: [5, 6, 7, 8],
            next_pubkey_hash: [0x44; HASH_LEN],
        };
        let bytes = body.serialize();
        assert_eq!(bytes.len(), 468);
        assert_eq!(&bytes[PUBKEY_LEN..PUBKEY_LEN + 4], &[1, 0, 0, 0]);
        assert_eq!(&bytes[PUBKEY_LEN + 16..PUBKEY_LEN + 20], &[5, 0, 0, 0]);
    }

    #[test]
    fn developer_body_layout() {
        let body = DeveloperDebugBody {
            public_key: key(),
            debug_mask: [0xFFFF_FFFF; MASK_WORDS],
            soc_id: [0x55; SOC_ID_LEN],
        };
        let bytes = body.serialize();
        assert_eq!(bytes.len(), 452);
        assert_eq!(&bytes[bytes.len() - SOC_ID_LEN..], &[0x55; SOC_ID_LEN]);
    }
}
