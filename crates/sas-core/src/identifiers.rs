//! Operator identities
//!
//! A [`Principal`] is an opaque 20-byte address. It renders as `0x`-prefixed
//! lowercase hex and parses case-insensitively, which matches the address
//! strings external clients already hold.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Opaque principal identity (address-equivalent)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Principal([u8; 20]);

impl Principal {
    /// The zero address, used in empty records
    pub const ZERO: Principal = Principal([0u8; 20]);

    /// Create a principal from raw address bytes
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derive a stable principal from a human label (tooling and fixtures)
    pub fn from_label(label: &str) -> Self {
        let digest = Sha256::digest(label.as_bytes());
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[..20]);
        Self(bytes)
    }

    /// Raw address bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Whether this is the zero address
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({self})")
    }
}

/// Principal parse failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrincipalParseError {
    /// Missing `0x` prefix
    #[error("principal must start with 0x")]
    MissingPrefix,
    /// Wrong number of hex digits
    #[error("principal must have 40 hex digits, got {0}")]
    WrongLength(usize),
    /// Non-hex characters
    #[error("principal contains non-hex characters")]
    InvalidHex,
}

impl FromStr for Principal {
    type Err = PrincipalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or(PrincipalParseError::MissingPrefix)?;
        if digits.len() != 40 {
            return Err(PrincipalParseError::WrongLength(digits.len()));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| PrincipalParseError::InvalidHex)?;
        Ok(Self(bytes))
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
