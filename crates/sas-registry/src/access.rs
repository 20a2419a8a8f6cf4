//! Access control
//!
//! One immutable owner plus the set of principals currently authorized to act
//! as SAS operators. The owner is authorized as an SAS at construction.

use sas_core::{Principal, SasError, SasResult};
use std::collections::BTreeSet;

/// Owner and SAS authorization table
#[derive(Debug, Clone)]
pub struct AccessControl {
    owner: Principal,
    authorized: BTreeSet<Principal>,
}

impl AccessControl {
    /// Create the table with `owner` fixed and implicitly authorized
    pub fn new(owner: Principal) -> Self {
        Self {
            owner,
            authorized: BTreeSet::from([owner]),
        }
    }

    /// The administrative principal
    pub fn owner(&self) -> Principal {
        self.owner
    }

    /// Whether `principal` is currently an authorized SAS
    pub fn is_authorized_sas(&self, principal: &Principal) -> bool {
        self.authorized.contains(principal)
    }

    /// Number of authorized SAS principals
    pub fn authorized_count(&self) -> usize {
        self.authorized.len()
    }

    /// Fail with `NotAuthorized` unless `caller` is the owner
    pub fn require_owner(&self, caller: &Principal) -> SasResult<()> {
        if *caller == self.owner {
            Ok(())
        } else {
            Err(SasError::not_authorized(caller))
        }
    }

    /// Fail with `NotAnAuthorizedSAS` unless `caller` is an authorized SAS
    pub fn require_sas(&self, caller: &Principal) -> SasResult<()> {
        if self.is_authorized_sas(caller) {
            Ok(())
        } else {
            Err(SasError::not_an_authorized_sas(caller))
        }
    }

    /// Mark `principal` authorized; idempotent
    pub fn authorize(&mut self, principal: Principal) {
        self.authorized.insert(principal);
    }

    /// Clear `principal`'s authorization; idempotent
    pub fn revoke(&mut self, principal: &Principal) {
        self.authorized.remove(principal);
    }
}
