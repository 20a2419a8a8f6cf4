//! Deterministic keying for devices and grants
//!
//! The composite key is a SHA-256 digest over a domain tag followed by each
//! field as a big-endian `u64` length and its bytes. Length prefixes keep
//! adjacent fields from bleeding into each other, so `("AB", "C")` and
//! `("A", "BC")` never collide.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// Domain separation tag for CBSD keys
const CBSD_KEY_DOMAIN: &[u8] = b"sas-registry/cbsd-key/v1";

/// Fixed-width key identifying a CBSD by (FCC ID, serial number)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeKey([u8; 32]);

impl CompositeKey {
    /// Wrap raw digest bytes
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering without prefix
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompositeKey({})", &self.to_hex()[..16])
    }
}

impl Serialize for CompositeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CompositeKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let digits = raw.strip_prefix("0x").unwrap_or(&raw);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes).map_err(serde::de::Error::custom)?;
        Ok(Self(bytes))
    }
}

/// Derive the composite key for a device.
///
/// Pure and stable across processes; used for CBSD lookups and for the
/// composite blacklist.
pub fn derive_composite_key(fcc_id: &str, serial_number: &str) -> CompositeKey {
    let mut hasher = Sha256::new();
    hasher.update(CBSD_KEY_DOMAIN);
    for field in [fcc_id, serial_number] {
        hasher.update((field.len() as u64).to_be_bytes());
        hasher.update(field.as_bytes());
    }
    CompositeKey(hasher.finalize().into())
}

/// Identifier of a grant within its device's ledger.
///
/// Rendered as `grant_{fccId}{serialNumber}{ordinal}`, the format external
/// clients already compute. Lookups are always scoped by the owning device's
/// composite key, so uniqueness only needs to hold within one device, where
/// distinct ordinals always yield distinct ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrantId(String);

impl GrantId {
    /// Derive the id of the `ordinal`-th grant on a device
    pub fn derive(fcc_id: &str, serial_number: &str, ordinal: u64) -> Self {
        Self(format!("grant_{fcc_id}{serial_number}{ordinal}"))
    }

    /// Borrow the id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GrantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GrantId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for GrantId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
