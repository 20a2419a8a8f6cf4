//! CBSD registry
//!
//! Keyed mapping from composite key to device record. Uniqueness is the
//! only invariant enforced here; authorization and identity checks happen
//! before the registry is touched.

use sas_core::{CbsdRecord, CompositeKey, SasError, SasResult};
use std::collections::HashMap;

/// Human-readable device designation used in error messages
pub(crate) fn designation(fcc_id: &str, serial_number: &str) -> String {
    format!("{fcc_id}/{serial_number}")
}

/// Live devices by composite key
#[derive(Debug, Clone, Default)]
pub struct CbsdRegistry {
    devices: HashMap<CompositeKey, CbsdRecord>,
}

impl CbsdRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live devices
    pub fn total(&self) -> u64 {
        self.devices.len() as u64
    }

    /// Whether a live device occupies `key`
    pub fn contains(&self, key: &CompositeKey) -> bool {
        self.devices.contains_key(key)
    }

    /// Borrow a live device
    pub fn get(&self, key: &CompositeKey) -> Option<&CbsdRecord> {
        self.devices.get(key)
    }

    /// Fail with `CBSDAlreadyExists` if `key` is taken
    pub fn ensure_vacant(&self, key: &CompositeKey, fcc_id: &str, serial_number: &str) -> SasResult<()> {
        if self.contains(key) {
            Err(SasError::cbsd_already_exists(designation(fcc_id, serial_number)))
        } else {
            Ok(())
        }
    }

    /// Fail with `CBSDNotRegistered` if `key` is free
    pub fn ensure_present(&self, key: &CompositeKey, fcc_id: &str, serial_number: &str) -> SasResult<()> {
        if self.contains(key) {
            Ok(())
        } else {
            Err(SasError::cbsd_not_registered(designation(fcc_id, serial_number)))
        }
    }

    /// Insert a record whose key was checked vacant under the same lock
    pub fn insert(&mut self, key: CompositeKey, record: CbsdRecord) {
        self.devices.insert(key, record);
    }

    /// Remove a device, returning its record
    pub fn remove(&mut self, key: &CompositeKey) -> Option<CbsdRecord> {
        self.devices.remove(key)
    }

    /// Drop every device
    pub fn clear(&mut self) {
        self.devices.clear();
    }
}
