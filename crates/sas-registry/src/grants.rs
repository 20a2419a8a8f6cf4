//! Grant ledger
//!
//! Per-device, insertion-ordered grant lists. Grants are never deleted one
//! at a time: relinquishment only flips `terminated`, and the whole list goes
//! when its device is deregistered. `live_total` counts grants that are not
//! terminated and whose device is still registered.
//!
//! Ordinals are tracked per composite key apart from the grant lists, so they
//! keep climbing across deregistration and reset. A grant id handed out once
//! never names a different grant later.

use sas_core::{CompositeKey, Grant, GrantId, GrantRequest, Principal, SasError, SasResult};
use std::collections::HashMap;

/// Result of relinquishing a grant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The grant was live and is now terminated
    Terminated,
    /// The grant had already been terminated; nothing changed
    AlreadyTerminated,
}

/// Grants for every registered device
#[derive(Debug, Clone, Default)]
pub struct GrantLedger {
    devices: HashMap<CompositeKey, Vec<Grant>>,
    next_ordinals: HashMap<CompositeKey, u64>,
    live_total: u64,
}

impl GrantLedger {
    /// Empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Live (non-terminated) grants across all devices
    pub fn live_total(&self) -> u64 {
        self.live_total
    }

    /// Append a new live grant to `key`'s list.
    ///
    /// The caller must already have checked that the device is registered.
    pub fn issue(
        &mut self,
        key: CompositeKey,
        request: &GrantRequest,
        sas_origin: Principal,
        now: u64,
    ) -> GrantId {
        let next_ordinal = self.next_ordinals.entry(key).or_default();
        let grant_id = GrantId::derive(&request.fcc_id, &request.cbsd_serial_number, *next_ordinal);
        *next_ordinal += 1;
        self.devices
            .entry(key)
            .or_default()
            .push(Grant::from_request(grant_id.clone(), request, sas_origin, now));
        self.live_total += 1;
        grant_id
    }

    /// Grants of a device in issue order; empty when there are none
    pub fn grants(&self, key: &CompositeKey) -> &[Grant] {
        self.devices
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Look up one grant under a device
    pub fn find(&self, key: &CompositeKey, grant_id: &GrantId) -> SasResult<&Grant> {
        self.grants(key)
            .iter()
            .find(|grant| grant.grant_id == *grant_id)
            .ok_or_else(|| SasError::grant_not_found(grant_id.as_str()))
    }

    /// Mark a grant terminated. Terminating twice is not an error.
    pub fn terminate(&mut self, key: &CompositeKey, grant_id: &GrantId) -> SasResult<Termination> {
        let grant = self
            .devices
            .get_mut(key)
            .and_then(|grants| grants.iter_mut().find(|g| g.grant_id == *grant_id))
            .ok_or_else(|| SasError::grant_not_found(grant_id.as_str()))?;

        if grant.terminated {
            return Ok(Termination::AlreadyTerminated);
        }
        grant.terminated = true;
        self.live_total -= 1;
        Ok(Termination::Terminated)
    }

    /// Drop every grant of a device, returning (all removed, live removed).
    /// The device's ordinal counter is kept.
    pub fn remove_device(&mut self, key: &CompositeKey) -> (u64, u64) {
        let Some(grants) = self.devices.remove(key) else {
            return (0, 0);
        };
        let live = grants.iter().filter(|g| !g.terminated).count() as u64;
        self.live_total -= live;
        (grants.len() as u64, live)
    }

    /// Drop every grant, keeping the ordinal counters
    pub fn clear(&mut self) {
        self.devices.clear();
        self.live_total = 0;
    }
}
