//! Principal identifiers and opaque 32-byte hashes.
//!
//! REGENT never interprets either type: principals are compared for
//! equality and hashes are stored and handed back verbatim.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{RegentError, RegentResult};

/// Stable identifier for anything that can act on or be acted on by a
/// controller: schemes, managed resources, constraints, controllers.
///
/// The empty string is the null principal. It is never a valid upgrade
/// target and never a valid bootstrap scheme.
/// Example: Principal("treasury-scheme")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Principal(pub String);

impl Principal {
    /// Construct a principal from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The null principal.
    pub fn null() -> Self {
        Self(String::new())
    }

    /// Return true for the null (empty) principal.
    pub fn is_null(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("<null>")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl From<&str> for Principal {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// An opaque 32-byte value: scheme configuration handles and constraint
/// parameter hashes.
///
/// Serialized as 64 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash32(pub [u8; 32]);

/// Handle to a scheme's off-band configuration.
pub type ConfigHash = Hash32;

/// Handle to a global constraint's parameters.
pub type ParamsHash = Hash32;

impl Hash32 {
    /// All zero bytes. The value an absent scheme reports as its config.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Parse a 64-character hex string (an optional `0x` prefix is accepted).
    pub fn from_hex(s: &str) -> RegentResult<Self> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| RegentError::ConfigError {
            reason: format!("invalid hash '{}': {}", s, e),
        })?;
        let arr: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| RegentError::ConfigError {
            reason: format!("hash '{}' is {} bytes, expected 32", s, b.len()),
        })?;
        Ok(Self(arr))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Hash32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash32::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
