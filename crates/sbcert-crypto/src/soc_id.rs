//! SoC-ID loader.

use std::path::Path;

use crate::error::CryptoError;
use crate::SOC_ID_LEN;

/// Read a raw SoC ID from `path`.
///
/// # Errors
///
/// Returns [`CryptoError::Io`] if the file cannot be read and
/// [`CryptoError::SocIdLength`] unless it holds exactly [`SOC_ID_LEN`] bytes.
pub fn load_soc_id(path: &Path) -> Result<[u8; SOC_ID_LEN], CryptoError> {
    let raw = std::fs::read(path).map_err(|e| CryptoError::io(path, e))?;
    raw.as_slice()
        .try_into()
        .map_err(|_| CryptoError::SocIdLength {
            path: path.to_path_buf(),
            expected: SOC_ID_LEN,
            got: raw.len(),
        })
}
