//! Concatenation of dependent certificates into one output blob.

use crate::error::CertError;
use crate::record::put_u32;

/// Magic token of the debug certificate envelope.
pub const ENVELOPE_MAGIC: u32 = 0x5364_6370;
/// Size of the envelope header.
pub const ENVELOPE_LEN: usize = 8;

/// Header placed in front of a chain: magic token and the combined length of
/// every certificate behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    magic: u32,
}

impl Envelope {
    /// The envelope used for developer debug certificate packages.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            magic: ENVELOPE_MAGIC,
        }
    }
}

/// Concatenates serialized certificates in verification order.
///
/// Blobs are pushed root first. The assembler does not interpret the
/// blobs; which certificates belong together is the caller's concern.
#[derive(Debug, Clone, Default)]
pub struct ChainAssembler {
    blobs: Vec<Vec<u8>>,
    envelope: Option<Envelope>,
}

impl ChainAssembler {
    /// An empty chain without envelope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next certificate blob.
    #[must_use]
    pub fn push(mut self, blob: Vec<u8>) -> Self {
        self.blobs.push(blob);
        self
    }

    /// Prefix the assembled chain with `envelope`.
    #[must_use]
    pub fn envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = Some(envelope);
        self
    }

    /// Produce `[magic‖length]‖blob₀‖blob₁‖…`.
    ///
    /// # Errors
    ///
    /// Returns [`CertError::InvalidInput`] if no blob was pushed, a blob is
    /// empty, or the chain is too long for the envelope's length field.
    pub fn assemble(self) -> Result<Vec<u8>, CertError> {
        if self.blobs.is_empty() {
            return Err(CertError::InvalidInput("empty certificate chain".into()));
        }
        if let Some(pos) = self.blobs.iter().position(Vec::is_empty) {
            return Err(CertError::InvalidInput(format!(
                "certificate {pos} of the chain is empty"
            )));
        }
        let total: usize = self.blobs.iter().map(Vec::len).sum();
        let mut out = Vec::with_capacity(total + ENVELOPE_LEN);
        if let Some(envelope) = self.envelope {
            let len = u32::try_from(total).map_err(|_| {
                CertError::InvalidInput(format!("chain of {total} bytes exceeds envelope limit"))
            })?;
            put_u32(&mut out, envelope.magic);
            put_u32(&mut out, len);
        }
        for blob in self.blobs {
            out.extend_from_slice(&blob);
        }
        Ok(out)
    }
}
