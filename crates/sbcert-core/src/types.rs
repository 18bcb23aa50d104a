//! Flag and mask values carried by debug certificates.

use serde::{Deserialize, Serialize};

use crate::error::CertError;

/// Number of 32-bit words in a debug mask or lock vector.
pub const MASK_WORDS: usize = 4;

/// 128-bit debug permission mask or lock vector, least significant word first.
pub type DebugMask = [u32; MASK_WORDS];

/// Hardware key bank holding the hash of the root public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum HbkId {
    /// 128-bit HBK0.
    Hbk0,
    /// 128-bit HBK1.
    Hbk1,
    /// Full 256-bit HBK.
    Full,
    /// No key bank; the certificate is not the first in the chain.
    Unused,
}

impl From<HbkId> for u32 {
    fn from(id: HbkId) -> Self {
        match id {
            HbkId::Hbk0 => 0,
            HbkId::Hbk1 => 1,
            HbkId::Full => 2,
            HbkId::Unused => 0xF,
        }
    }
}

impl TryFrom<u32> for HbkId {
    type Error = CertError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Hbk0),
            1 => Ok(Self::Hbk1),
            2 => Ok(Self::Full),
            0xF => Ok(Self::Unused),
            other => Err(CertError::Configuration(format!(
                "HBK id must be 0, 1, 2 or 0xF, got {other:#x}"
            ))),
        }
    }
}

/// Device life-cycle state an enabler certificate is valid in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Lcs {
    /// Chip manufacture.
    ChipManufacture,
    /// Device manufacture.
    DeviceManufacture,
    /// Secure (deployed).
    Secure,
    /// Return merchandise authorization.
    Rma,
}

impl From<Lcs> for u32 {
    fn from(lcs: Lcs) -> Self {
        match lcs {
            Lcs::ChipManufacture => 0,
            Lcs::DeviceManufacture => 1,
            Lcs::Secure => 5,
            Lcs::Rma => 7,
        }
    }
}

impl TryFrom<u32> for Lcs {
    type Error = CertError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::ChipManufacture),
            1 => Ok(Self::DeviceManufacture),
            5 => Ok(Self::Secure),
            7 => Ok(Self::Rma),
            other => Err(CertError::Configuration(format!(
                "life-cycle state must be 0, 1, 5 or 7, got {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hbk_id_round_trips_through_u32() {
        for id in [HbkId::Hbk0, HbkId::Hbk1, HbkId::Full, HbkId::Unused] {
            assert_eq!(HbkId::try_from(u32::from(id)).unwrap(), id);
        }
        assert!(HbkId::try_from(3).is_err());
    }

    #[test]
    fn lcs_rejects_undefined_states() {
        assert_eq!(Lcs::try_from(5).unwrap(), Lcs::Secure);
        assert!(Lcs::try_from(2).is_err());
    }

    #[test]
    fn deserialises_from_config_integers() {
        #[derive(Deserialize)]
        struct Flags {
            hbk_id: HbkId,
            lcs: Lcs,
        }
        let flags: Flags = toml::from_str("hbk_id = 0xF\nlcs = 7").unwrap();
        assert_eq!(flags.hbk_id, HbkId::Unused);
        assert_eq!(flags.lcs, Lcs::Rma);
        assert!(toml::from_str::<Flags>("hbk_id = 4\nlcs = 0").is_err());
    }
}
