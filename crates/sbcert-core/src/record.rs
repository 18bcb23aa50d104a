//! Fixed-layout binary records.

/// A record with a fixed, word-aligned serialized size.
pub trait Record {
    /// Serialized size in bytes; always a multiple of 4.
    const LEN: usize;

    /// Append the serialized record to `out`.
    fn write_to(&self, out: &mut Vec<u8>);

    /// Serialize the record.
    fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::LEN);
        self.write_to(&mut out);
        debug_assert_eq!(out.len(), Self::LEN);
        out
    }
}

/// Append a little-endian word.
pub(crate) fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Read the little-endian word at word index `index`, if present.
pub(crate) fn word_at(bytes: &[u8], index: usize) -> Option<u32> {
    let start = index.checked_mul(4)?;
    let word = bytes.get(start..start + 4)?;
    Some(u32::from_le_bytes(word.try_into().ok()?))
}
