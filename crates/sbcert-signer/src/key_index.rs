//! Validated identifier of a signing key.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

/// Maximum length of a key index.
const MAX_LEN: usize = 64;

/// Names a signing key in a key table or on a signing service.
///
/// Key indexes are written either as strings or integers in configuration
/// files and travel as a URL path segment, so they are restricted to ASCII
/// alphanumerics, `-`, `_` and `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct KeyIndex(String);

impl KeyIndex {
    /// Create a new `KeyIndex`, validating its format.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidKeyIndex`] if the value is empty, longer
    /// than 64 characters, or contains other characters.
    pub fn new(value: &str) -> Result<Self, ConfigError> {
        let valid = !value.is_empty()
            && value.len() <= MAX_LEN
            && value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && value != "."
            && value != "..";
        if !valid {
            return Err(ConfigError::InvalidKeyIndex(value.to_owned()));
        }
        Ok(Self(value.to_owned()))
    }

    /// Return the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u32> for KeyIndex {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for KeyIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for KeyIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(u64),
            Str(String),
        }
        let raw = match Raw::deserialize(deserializer)? {
            Raw::Int(i) => i.to_string(),
            Raw::Str(s) => s,
        };
        Self::new(&raw).map_err(serde::de::Error::custom)
    }
}
