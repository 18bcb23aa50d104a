//! Certificate header: magic, version, signed size and flags.

use std::fmt;

use crate::error::CertError;
use crate::record::{put_u32, word_at, Record};

/// Size of a serialized [`CertHeader`].
pub const HEADER_LEN: usize = 16;

/// The certificate kinds a chain is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertKind {
    /// Key certificate: attests the next certificate's public key.
    Key,
    /// Enabler debug certificate: grants debug masks to a developer key.
    EnablerDebug,
    /// Developer debug certificate: binds debug masks to one SoC ID.
    DeveloperDebug,
}

impl CertKind {
    /// Header magic token of this kind.
    #[must_use]
    pub const fn magic(self) -> u32 {
        match self {
            Self::Key => 0x5342_6B63,
            Self::EnablerDebug => 0x5364_656E,
            Self::DeveloperDebug => 0x5364_6465,
        }
    }

    /// `(major, minor)` format version of this kind.
    #[must_use]
    pub const fn version(self) -> (u16, u16) {
        match self {
            Self::Key | Self::EnablerDebug | Self::DeveloperDebug => (1, 0),
        }
    }

    /// The kind whose magic token is `magic`.
    #[must_use]
    pub fn from_magic(magic: u32) -> Option<Self> {
        [Self::Key, Self::EnablerDebug, Self::DeveloperDebug]
            .into_iter()
            .find(|kind| kind.magic() == magic)
    }
}

impl fmt::Display for CertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Key => "key certificate",
            Self::EnablerDebug => "enabler debug certificate",
            Self::DeveloperDebug => "developer debug certificate",
        })
    }
}

/// Header preceding every certificate body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CertHeader {
    magic: u32,
    version: u32,
    signed_size_words: u32,
    flags: u32,
}

impl CertHeader {
    /// Header for a certificate of `kind` whose body serializes to
    /// `body_len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CertError::InvalidInput`] if `body_len` is not word aligned
    /// or `Header‖Body` does not fit the 32-bit size field.
    pub fn new(kind: CertKind, body_len: usize, flags: u32) -> Result<Self, CertError> {
        if body_len % 4 != 0 {
            return Err(CertError::InvalidInput(format!(
                "{kind} body of {body_len} bytes is not word aligned"
            )));
        }
        let words = u32::try_from((HEADER_LEN + body_len) / 4).map_err(|_| {
            CertError::InvalidInput(format!("{kind} body of {body_len} bytes is too large"))
        })?;
        let (major, minor) = kind.version();
        Ok(Self {
            magic: kind.magic(),
            version: (u32::from(major) << 16) | u32::from(minor),
            signed_size_words: words,
            flags,
        })
    }

    /// Parse the header at the start of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`CertError::InvalidInput`] if fewer than [`HEADER_LEN`]
    /// bytes are available or the magic token is unknown.
    pub fn parse(bytes: &[u8]) -> Result<Self, CertError> {
        let truncated = || {
            CertError::InvalidInput(format!(
                "certificate header needs {HEADER_LEN} bytes, got {}",
                bytes.len()
            ))
        };
        let header = Self {
            magic: word_at(bytes, 0).ok_or_else(truncated)?,
            version: word_at(bytes, 1).ok_or_else(truncated)?,
            signed_size_words: word_at(bytes, 2).ok_or_else(truncated)?,
            flags: word_at(bytes, 3).ok_or_else(truncated)?,
        };
        if header.kind().is_none() {
            return Err(CertError::InvalidInput(format!(
                "unknown certificate magic {:#010x}",
                header.magic
            )));
        }
        Ok(header)
    }

    /// Magic token.
    #[must_use]
    pub fn magic(&self) -> u32 {
        self.magic
    }

    /// Certificate kind named by the magic token.
    #[must_use]
    pub fn kind(&self) -> Option<CertKind> {
        CertKind::from_magic(self.magic)
    }

    /// `(major, minor)` version.
    #[must_use]
    pub fn version(&self) -> (u16, u16) {
        let [lo0, lo1, hi0, hi1] = self.version.to_le_bytes();
        (
            u16::from_le_bytes([hi0, hi1]),
            u16::from_le_bytes([lo0, lo1]),
        )
    }

    /// Raw version word, `(major << 16) | minor`.
    #[must_use]
    pub fn version_word(&self) -> u32 {
        self.version
    }

    /// Size of `Header‖Body` in 32-bit words.
    #[must_use]
    pub fn signed_content_size_words(&self) -> u32 {
        self.signed_size_words
    }

    /// Size of `Header‖Body` in bytes.
    #[must_use]
    pub fn signed_content_len(&self) -> usize {
        self.signed_size_words as usize * 4
    }

    /// Kind-specific flags.
    #[must_use]
    pub fn flags(&self) -> u32 {
        self.flags
    }
}

impl Record for CertHeader {
    const LEN: usize = HEADER_LEN;

    fn write_to(&self, out: &mut Vec<u8>) {
        put_u32(out, self.magic);
        put_u32(out, self.version);
        put_u32(out, self.signed_size_words);
        put_u32(out, self.flags);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialises_little_endian_words() {
        let header = CertHeader::new(CertKind::Key, 8, 0x0F).unwrap();
        assert_eq!(
            header.serialize(),
            [
                0x63, 0x6B, 0x42, 0x53, // magic
                0x00, 0x00, 0x01, 0x00, // version 1.0
                0x06, 0x00, 0x00, 0x00, // (16 + 8) / 4 words
                0x0F, 0x00, 0x00, 0x00, // flags
            ]
        );
    }

    #[test]
    fn version_word_packs_major_and_minor() {
        let header = CertHeader::new(CertKind::EnablerDebug, 0, 0).unwrap();
        assert_eq!(header.version_word(), 0x0001_0000);
        assert_eq!(header.version(), (1, 0));
    }

    #[test]
    fn parse_recovers_fields() {
        let header = CertHeader::new(CertKind::DeveloperDebug, 452, 0).unwrap();
        let parsed = CertHeader::parse(&header.serialize()).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(parsed.kind(), Some(CertKind::DeveloperDebug));
        assert_eq!(parsed.signed_content_size_words(), 117);
    }

    #[test]
    fn unaligned_body_is_rejected() {
        assert!(matches!(
            CertHeader::new(CertKind::Key, 6, 0),
            Err(CertError::InvalidInput(_))
        ));
    }

    #[test]
    fn parse_rejects_short_or_unknown_input() {
        assert!(CertHeader::parse(&[0u8; 15]).is_err());
        let mut bytes = CertHeader::new(CertKind::Key, 0, 0).unwrap().serialize();
        bytes[0] ^= 0xFF;
        assert!(matches!(
            CertHeader::parse(&bytes),
            Err(CertError::InvalidInput(_))
        ));
    }
}
