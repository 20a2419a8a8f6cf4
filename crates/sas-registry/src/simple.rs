//! Simplified owner-only CBSD book
//!
//! A reduced registry keyed by numeric id with a three-field record. Every
//! mutation is owner-gated instead of SAS-gated; uniqueness and existence
//! follow the same rules as the full registry.

use sas_core::{Principal, SasError, SasResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Status assigned on registration
pub const INITIAL_STATUS: &str = "registered";

/// Reduced device record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleCbsd {
    /// Device address
    pub address: Principal,
    /// Granted amount
    pub grant_amount: u64,
    /// Free-form status label
    pub status: String,
}

impl SimpleCbsd {
    /// True for the empty record returned for absent ids
    pub fn is_empty(&self) -> bool {
        self.address.is_zero() && self.grant_amount == 0 && self.status.is_empty()
    }
}

/// Events emitted by the book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all_fields = "camelCase")]
pub enum SimpleCbsdEvent {
    /// New device recorded
    #[serde(rename = "CBSDRegistered")]
    CbsdRegistered {
        /// Device id
        id: u64,
        /// Device address
        address: Principal,
        /// Initial grant amount
        grant_amount: u64,
    },
    /// Grant amount replaced
    GrantAmountUpdated {
        /// Device id
        id: u64,
        /// New amount
        grant_amount: u64,
    },
    /// Status replaced
    StatusUpdated {
        /// Device id
        id: u64,
        /// New status
        status: String,
    },
}

/// Owner-gated book of reduced device records
#[derive(Debug, Clone)]
pub struct SimpleCbsdBook {
    owner: Principal,
    devices: HashMap<u64, SimpleCbsd>,
    events: Vec<SimpleCbsdEvent>,
}

impl SimpleCbsdBook {
    /// Empty book administered by `owner`
    pub fn new(owner: Principal) -> Self {
        Self {
            owner,
            devices: HashMap::new(),
            events: Vec::new(),
        }
    }

    /// The administrative principal
    pub fn owner(&self) -> Principal {
        self.owner
    }

    /// Every event emitted so far, in order
    pub fn events(&self) -> &[SimpleCbsdEvent] {
        &self.events
    }

    /// Record a new device with status `registered`
    pub fn register_cbsd(
        &mut self,
        caller: &Principal,
        id: u64,
        address: Principal,
        grant_amount: u64,
    ) -> SasResult<SimpleCbsdEvent> {
        self.require_owner(caller)?;
        if self.devices.contains_key(&id) {
            return Err(SasError::cbsd_already_exists(id.to_string()));
        }
        self.devices.insert(
            id,
            SimpleCbsd {
                address,
                grant_amount,
                status: INITIAL_STATUS.to_string(),
            },
        );
        Ok(self.emit(SimpleCbsdEvent::CbsdRegistered {
            id,
            address,
            grant_amount,
        }))
    }

    /// Replace a device's grant amount
    pub fn update_grant_amount(
        &mut self,
        caller: &Principal,
        id: u64,
        grant_amount: u64,
    ) -> SasResult<SimpleCbsdEvent> {
        self.require_owner(caller)?;
        self.existing_mut(id)?.grant_amount = grant_amount;
        Ok(self.emit(SimpleCbsdEvent::GrantAmountUpdated { id, grant_amount }))
    }

    /// Replace a device's status label
    pub fn update_status(
        &mut self,
        caller: &Principal,
        id: u64,
        status: &str,
    ) -> SasResult<SimpleCbsdEvent> {
        self.require_owner(caller)?;
        self.existing_mut(id)?.status = status.to_string();
        Ok(self.emit(SimpleCbsdEvent::StatusUpdated {
            id,
            status: status.to_string(),
        }))
    }

    /// Device record, or the empty record when absent
    pub fn cbsd_info(&self, id: u64) -> SimpleCbsd {
        self.devices.get(&id).cloned().unwrap_or_default()
    }

    fn require_owner(&self, caller: &Principal) -> SasResult<()> {
        if *caller == self.owner {
            Ok(())
        } else {
            Err(SasError::not_authorized(caller))
        }
    }

    fn existing_mut(&mut self, id: u64) -> SasResult<&mut SimpleCbsd> {
        self.devices
            .get_mut(&id)
            .ok_or_else(|| SasError::cbsd_not_registered(id.to_string()))
    }

    fn emit(&mut self, event: SimpleCbsdEvent) -> SimpleCbsdEvent {
        self.events.push(event.clone());
        event
    }
}
