//! Walking a generated chain blob front to back.

use sbcert_crypto::{PublicKeyParams, HASH_LEN, NP_LEN, N_LEN, SIGNATURE_LEN};

use crate::body::{EnablerDebugBody, KeyCertBody, PUBKEY_LEN};
use crate::chain::{ENVELOPE_LEN, ENVELOPE_MAGIC};
use crate::error::CertError;
use crate::header::{CertHeader, CertKind, HEADER_LEN};
use crate::record::{word_at, Record};

/// One certificate found in a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEntry {
    /// Byte offset of the header within the blob.
    pub offset: usize,
    /// The parsed header.
    pub header: CertHeader,
    /// SHA-256 over the certificate's own `N‖Np`.
    pub public_key_hash: [u8; HASH_LEN],
    /// Hash of the next certificate's public key, for kinds that carry one.
    pub next_pubkey_hash: Option<[u8; HASH_LEN]>,
}

impl ChainEntry {
    /// Size of the certificate including its signature.
    #[must_use]
    pub fn len(&self) -> usize {
        self.header.signed_content_len() + SIGNATURE_LEN
    }

    /// Whether the certificate occupies no bytes; never true for a parsed
    /// entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Structure of a chain blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLayout {
    /// Envelope `(magic, total_len)`, if the blob starts with one.
    pub envelope: Option<(u32, u32)>,
    /// Certificates in blob order.
    pub certificates: Vec<ChainEntry>,
}

impl ChainLayout {
    /// Positions `i` where certificate `i` names a next key hash that does
    /// not match certificate `i + 1`.
    #[must_use]
    pub fn broken_links(&self) -> Vec<usize> {
        self.certificates
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| {
                pair[0]
                    .next_pubkey_hash
                    .is_some_and(|next| next != pair[1].public_key_hash)
            })
            .map(|(i, _)| i)
            .collect()
    }
}

/// Offset of `N‖Np` within a body of `kind`.
fn pubkey_offset(kind: CertKind) -> usize {
    match kind {
        CertKind::Key => 4,
        CertKind::EnablerDebug | CertKind::DeveloperDebug => 0,
    }
}

/// Offset of the next key hash within a body of `kind`.
fn next_hash_offset(kind: CertKind) -> Option<usize> {
    match kind {
        CertKind::Key => Some(KeyCertBody::LEN - HASH_LEN),
        CertKind::EnablerDebug => Some(EnablerDebugBody::LEN - HASH_LEN),
        CertKind::DeveloperDebug => None,
    }
}

fn read_entry(cert: &[u8], offset: usize, header: CertHeader) -> Option<ChainEntry> {
    let kind = header.kind()?;
    let body = cert.get(HEADER_LEN..header.signed_content_len())?;
    let key = body.get(pubkey_offset(kind)..pubkey_offset(kind) + PUBKEY_LEN)?;
    let n: [u8; N_LEN] = key[..N_LEN].try_into().ok()?;
    let np: [u8; NP_LEN] = key[N_LEN..].try_into().ok()?;
    let next_pubkey_hash = match next_hash_offset(kind) {
        Some(at) => Some(body.get(at..at + HASH_LEN)?.try_into().ok()?),
        None => None,
    };
    Some(ChainEntry {
        offset,
        header,
        public_key_hash: PublicKeyParams::from_parts(n, np).hash(),
        next_pubkey_hash,
    })
}

/// Parse the envelope and every certificate header in `blob`.
///
/// # Errors
///
/// Returns [`CertError::InvalidInput`] if a header is malformed, a
/// certificate runs past the end of the blob, or the envelope length does
/// not match the bytes behind it.
pub fn inspect_chain(blob: &[u8]) -> Result<ChainLayout, CertError> {
    let mut offset = 0;
    let mut envelope = None;
    if word_at(blob, 0) == Some(ENVELOPE_MAGIC) {
        let total = word_at(blob, 1)
            .ok_or_else(|| CertError::InvalidInput("truncated envelope".into()))?;
        let behind = blob.len() - ENVELOPE_LEN.min(blob.len());
        if total as usize != behind {
            return Err(CertError::InvalidInput(format!(
                "envelope announces {total} bytes, {behind} follow"
            )));
        }
        envelope = Some((ENVELOPE_MAGIC, total));
        offset = ENVELOPE_LEN;
    }

    let mut certificates = Vec::new();
    while offset < blob.len() {
        let header = CertHeader::parse(&blob[offset..])
            .map_err(|e| CertError::InvalidInput(format!("at offset {offset}: {e}")))?;
        let len = header.signed_content_len() + SIGNATURE_LEN;
        let end = offset + len;
        if end > blob.len() {
            return Err(CertError::InvalidInput(format!(
                "{} at offset {offset} needs {len} bytes, {} remain",
                header.kind().map_or_else(|| "certificate".to_owned(), |k| k.to_string()),
                blob.len() - offset
            )));
        }
        let entry = read_entry(&blob[offset..end], offset, header).ok_or_else(|| {
            CertError::InvalidInput(format!(
                "certificate at offset {offset} is too short for its kind"
            ))
        })?;
        certificates.push(entry);
        offset = end;
    }
    if certificates.is_empty() {
        return Err(CertError::InvalidInput("no certificate found".into()));
    }
    Ok(ChainLayout {
        envelope,
        certificates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ChainAssembler, Envelope};

    fn fake_cert(kind: CertKind, body_len: usize) -> Vec<u8> {
        let mut out = CertHeader::new(kind, body_len, 0).unwrap().serialize();
        out.resize(HEADER_LEN + body_len + SIGNATURE_LEN, 0xA5);
        out
    }

    #[test]
    fn walks_enveloped_chain() {
        let blob = ChainAssembler::new()
            .push(fake_cert(CertKind::Key, 440))
            .push(fake_cert(CertKind::EnablerDebug, 468))
            .push(fake_cert(CertKind::DeveloperDebug, 452))
            .envelope(Envelope::debug())
            .assemble()
            .unwrap();
        let layout = inspect_chain(&blob).unwrap();
        assert_eq!(
            layout.envelope,
            Some((ENVELOPE_MAGIC, u32::try_from(blob.len() - 8).unwrap()))
        );
        let kinds: Vec<_> = layout
            .certificates
            .iter()
            .map(|e| e.header.kind().unwrap())
            .collect();
        assert_eq!(
            kinds,
            [CertKind::Key, CertKind::EnablerDebug, CertKind::DeveloperDebug]
        );
        assert_eq!(layout.certificates[1].offset, 8 + 456 + 384);
    }

    #[test]
    fn reports_mismatched_key_links() {
        let mut key = fake_cert(CertKind::Key, 440);
        let developer = fake_cert(CertKind::DeveloperDebug, 452);
        let blob = ChainAssembler::new()
            .push(key.clone())
            .push(developer.clone())
            .assemble()
            .unwrap();
        assert_eq!(inspect_chain(&blob).unwrap().broken_links(), [0]);

        let dev_hash = inspect_chain(&developer).unwrap().certificates[0].public_key_hash;
        let hash_at = HEADER_LEN + 440 - HASH_LEN;
        key[hash_at..hash_at + HASH_LEN].copy_from_slice(&dev_hash);
        let blob = ChainAssembler::new()
            .push(key)
            .push(developer)
            .assemble()
            .unwrap();
        assert!(inspect_chain(&blob).unwrap().broken_links().is_empty());
    }

    #[test]
    fn truncated_certificate_is_rejected() {
        let mut blob = fake_cert(CertKind::Key, 440);
        blob.truncate(blob.len() - 1);
        assert!(inspect_chain(&blob).is_err());
    }

    #[test]
    fn envelope_length_mismatch_is_rejected() {
        let mut blob = ChainAssembler::new()
            .push(fake_cert(CertKind::DeveloperDebug, 452))
            .envelope(Envelope::debug())
            .assemble()
            .unwrap();
        blob.push(0);
        assert!(inspect_chain(&blob).is_err());
    }
}
