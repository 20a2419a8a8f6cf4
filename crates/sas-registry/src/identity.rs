//! Identity validation
//!
//! Two allow-lists and two deny-lists, all owner-mutable and never pruned
//! automatically. A deny-list entry always overrides the allow-list.

use sas_core::{derive_composite_key, CompositeKey, SasError, SasResult};
use std::collections::{BTreeMap, BTreeSet};

/// Allow-lists and deny-lists consulted by registration
#[derive(Debug, Clone, Default)]
pub struct IdentityValidator {
    /// Allow-listed FCC ids with their recorded (unenforced) EIRP cap
    fcc_ids: BTreeMap<String, u64>,
    user_ids: BTreeSet<String>,
    blacklisted_fcc_ids: BTreeSet<String>,
    blacklisted_devices: BTreeSet<CompositeKey>,
}

impl IdentityValidator {
    /// Empty lists
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow-list an FCC id; re-injecting updates the recorded cap
    pub fn inject_fcc_id(&mut self, fcc_id: &str, max_eirp: u64) {
        self.fcc_ids.insert(fcc_id.to_string(), max_eirp);
    }

    /// Allow-list a user id
    pub fn inject_user_id(&mut self, user_id: &str) {
        self.user_ids.insert(user_id.to_string());
    }

    /// Deny-list an FCC id
    pub fn blacklist_fcc_id(&mut self, fcc_id: &str) {
        self.blacklisted_fcc_ids.insert(fcc_id.to_string());
    }

    /// Deny-list a single device key
    pub fn blacklist_device(&mut self, fcc_id: &str, serial_number: &str) {
        self.blacklisted_devices
            .insert(derive_composite_key(fcc_id, serial_number));
    }

    /// Recorded EIRP cap for an allow-listed FCC id
    pub fn max_eirp_for(&self, fcc_id: &str) -> Option<u64> {
        self.fcc_ids.get(fcc_id).copied()
    }

    /// Whether the FCC id is allow-listed
    pub fn is_fcc_id_authorized(&self, fcc_id: &str) -> bool {
        self.fcc_ids.contains_key(fcc_id)
    }

    /// Whether the user id is allow-listed
    pub fn is_user_id_authorized(&self, user_id: &str) -> bool {
        self.user_ids.contains(user_id)
    }

    /// Whether the FCC id is deny-listed
    pub fn is_fcc_id_blacklisted(&self, fcc_id: &str) -> bool {
        self.blacklisted_fcc_ids.contains(fcc_id)
    }

    /// Whether the device key is deny-listed
    pub fn is_device_blacklisted(&self, key: &CompositeKey) -> bool {
        self.blacklisted_devices.contains(key)
    }

    /// Registration predicate.
    ///
    /// Checks run allow-lists first, then deny-lists, and the first failure
    /// is reported.
    pub fn check_registration(
        &self,
        fcc_id: &str,
        user_id: &str,
        serial_number: &str,
        key: &CompositeKey,
    ) -> SasResult<()> {
        if !self.is_fcc_id_authorized(fcc_id) {
            return Err(SasError::FccIdNotAuthorized {
                fcc_id: fcc_id.to_string(),
            });
        }
        if !self.is_user_id_authorized(user_id) {
            return Err(SasError::UserIdNotAuthorized {
                user_id: user_id.to_string(),
            });
        }
        if self.is_fcc_id_blacklisted(fcc_id) {
            return Err(SasError::FccIdBlacklisted {
                fcc_id: fcc_id.to_string(),
            });
        }
        if self.is_device_blacklisted(key) {
            return Err(SasError::SerialNumberBlacklisted {
                fcc_id: fcc_id.to_string(),
                serial_number: serial_number.to_string(),
            });
        }
        Ok(())
    }

    /// List sizes: (fcc allow, user allow, fcc deny, device deny)
    pub fn list_sizes(&self) -> (usize, usize, usize, usize) {
        (
            self.fcc_ids.len(),
            self.user_ids.len(),
            self.blacklisted_fcc_ids.len(),
            self.blacklisted_devices.len(),
        )
    }
}
