//! Registry state machine
//!
//! [`RegistryState`] owns every map and list of the registry and implements
//! each operation as check-then-apply: all preconditions are evaluated
//! against unmodified state, and mutation starts only once they have all
//! passed. A failed operation therefore leaves the state exactly as it was.
//!
//! The state is not synchronized; [`crate::SharedRegistry`] wraps it in the
//! single-writer lock and attaches sequencing and publication.

use crate::access::AccessControl;
use crate::cbsd::CbsdRegistry;
use crate::event_log::EventLog;
use crate::grants::GrantLedger;
use crate::identity::IdentityValidator;
use crate::schema;
use sas_core::{
    derive_composite_key, CbsdRecord, EventRecord, Grant, GrantId, GrantRequest, Principal,
    RegistrationRequest, RegistryEvent, SasResult,
};
use serde::{Deserialize, Serialize};

/// Point-in-time counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    /// Live CBSDs
    pub total_cbsds: u64,
    /// Live grants on live CBSDs
    pub total_grants: u64,
    /// Principals holding SAS authorization, owner included while authorized
    pub authorized_sas: u64,
    /// Allow-listed FCC ids
    pub fcc_allow_list: u64,
    /// Allow-listed user ids
    pub user_allow_list: u64,
    /// Blacklisted FCC ids
    pub blacklisted_fcc_ids: u64,
    /// Blacklisted device keys
    pub blacklisted_devices: u64,
    /// Sequence of the last committed event
    pub last_sequence: u64,
}

/// All registry state behind the single-writer lock
#[derive(Debug, Clone)]
pub struct RegistryState {
    access: AccessControl,
    identity: IdentityValidator,
    cbsds: CbsdRegistry,
    grants: GrantLedger,
    events: EventLog,
    enforce_request_schema: bool,
}

impl RegistryState {
    /// Empty registry owned by `owner`
    pub fn new(owner: Principal, event_log_capacity: usize, enforce_request_schema: bool) -> Self {
        Self {
            access: AccessControl::new(owner),
            identity: IdentityValidator::new(),
            cbsds: CbsdRegistry::new(),
            grants: GrantLedger::new(),
            events: EventLog::with_capacity(event_log_capacity),
            enforce_request_schema,
        }
    }

    // Owner-gated administration

    /// Grant SAS authorization to `sas`
    pub fn authorize_sas(&mut self, caller: &Principal, sas: Principal) -> SasResult<RegistryEvent> {
        self.access.require_owner(caller)?;
        self.access.authorize(sas);
        Ok(RegistryEvent::SasAuthorized { sas })
    }

    /// Withdraw SAS authorization from `sas`
    pub fn revoke_sas(&mut self, caller: &Principal, sas: Principal) -> SasResult<RegistryEvent> {
        self.access.require_owner(caller)?;
        self.access.revoke(&sas);
        Ok(RegistryEvent::SasRevoked { sas })
    }

    /// Allow-list an FCC id
    pub fn inject_fcc_id(
        &mut self,
        caller: &Principal,
        fcc_id: &str,
        max_eirp: u64,
    ) -> SasResult<RegistryEvent> {
        self.access.require_owner(caller)?;
        self.identity.inject_fcc_id(fcc_id, max_eirp);
        Ok(RegistryEvent::FccIdInjected {
            fcc_id: fcc_id.to_string(),
            max_eirp,
        })
    }

    /// Allow-list a user id
    pub fn inject_user_id(&mut self, caller: &Principal, user_id: &str) -> SasResult<RegistryEvent> {
        self.access.require_owner(caller)?;
        self.identity.inject_user_id(user_id);
        Ok(RegistryEvent::UserIdInjected {
            user_id: user_id.to_string(),
        })
    }

    /// Blacklist an FCC id
    pub fn blacklist_fcc_id(&mut self, caller: &Principal, fcc_id: &str) -> SasResult<RegistryEvent> {
        self.access.require_owner(caller)?;
        self.identity.blacklist_fcc_id(fcc_id);
        Ok(RegistryEvent::FccIdBlacklisted {
            fcc_id: fcc_id.to_string(),
        })
    }

    /// Blacklist a single device key
    pub fn blacklist_device(
        &mut self,
        caller: &Principal,
        fcc_id: &str,
        serial_number: &str,
    ) -> SasResult<RegistryEvent> {
        self.access.require_owner(caller)?;
        self.identity.blacklist_device(fcc_id, serial_number);
        Ok(RegistryEvent::SerialNumberBlacklisted {
            fcc_id: fcc_id.to_string(),
            serial_number: serial_number.to_string(),
        })
    }

    /// Drop every CBSD and grant. Lists and authorizations survive.
    pub fn reset(&mut self, caller: &Principal) -> SasResult<RegistryEvent> {
        self.access.require_owner(caller)?;
        self.cbsds.clear();
        self.grants.clear();
        Ok(RegistryEvent::RegistryReset { by: *caller })
    }

    // SAS-gated device and grant lifecycle

    /// Register a device
    pub fn register(
        &mut self,
        caller: &Principal,
        mut request: RegistrationRequest,
        now: u64,
    ) -> SasResult<RegistryEvent> {
        self.access.require_sas(caller)?;
        if self.enforce_request_schema {
            schema::validate_registration(&request)?;
            schema::normalize_registration(&mut request);
        }

        let key = request.key();
        self.cbsds
            .ensure_vacant(&key, &request.fcc_id, &request.cbsd_serial_number)?;
        self.identity.check_registration(
            &request.fcc_id,
            &request.user_id,
            &request.cbsd_serial_number,
            &key,
        )?;

        let event = RegistryEvent::CbsdRegistered {
            fcc_id: request.fcc_id.clone(),
            serial_number: request.cbsd_serial_number.clone(),
            sas_origin: *caller,
        };
        self.cbsds
            .insert(key, CbsdRecord::from_request(request, *caller, now));
        Ok(event)
    }

    /// Remove a device and every grant attached to it
    pub fn deregister(
        &mut self,
        caller: &Principal,
        fcc_id: &str,
        serial_number: &str,
    ) -> SasResult<RegistryEvent> {
        self.access.require_sas(caller)?;
        let key = derive_composite_key(fcc_id, serial_number);
        self.cbsds.ensure_present(&key, fcc_id, serial_number)?;

        self.cbsds.remove(&key);
        let (grants_removed, _live) = self.grants.remove_device(&key);
        Ok(RegistryEvent::CbsdDeregistered {
            fcc_id: fcc_id.to_string(),
            serial_number: serial_number.to_string(),
            sas_origin: *caller,
            grants_removed,
        })
    }

    /// Issue a grant to a registered device
    pub fn grant_spectrum(
        &mut self,
        caller: &Principal,
        request: &GrantRequest,
        now: u64,
    ) -> SasResult<(GrantId, RegistryEvent)> {
        self.access.require_sas(caller)?;
        if self.enforce_request_schema {
            schema::validate_grant(request)?;
        }
        let key = request.key();
        self.cbsds
            .ensure_present(&key, &request.fcc_id, &request.cbsd_serial_number)?;

        let grant_id = self.grants.issue(key, request, *caller, now);
        let event = RegistryEvent::GrantCreated {
            fcc_id: request.fcc_id.clone(),
            serial_number: request.cbsd_serial_number.clone(),
            grant_id: grant_id.clone(),
            sas_origin: *caller,
        };
        Ok((grant_id, event))
    }

    /// Validate that a grant exists under a registered device
    pub fn heartbeat(
        &self,
        caller: &Principal,
        fcc_id: &str,
        serial_number: &str,
        grant_id: &GrantId,
    ) -> SasResult<()> {
        self.access.require_sas(caller)?;
        let key = derive_composite_key(fcc_id, serial_number);
        self.cbsds.ensure_present(&key, fcc_id, serial_number)?;
        self.grants.find(&key, grant_id).map(|_| ())
    }

    /// Terminate a grant; terminating an already-terminated grant succeeds
    pub fn relinquish(
        &mut self,
        caller: &Principal,
        fcc_id: &str,
        serial_number: &str,
        grant_id: &GrantId,
    ) -> SasResult<RegistryEvent> {
        self.access.require_sas(caller)?;
        let key = derive_composite_key(fcc_id, serial_number);
        self.cbsds.ensure_present(&key, fcc_id, serial_number)?;
        self.grants.terminate(&key, grant_id)?;
        Ok(RegistryEvent::GrantTerminated {
            fcc_id: fcc_id.to_string(),
            serial_number: serial_number.to_string(),
            grant_id: grant_id.clone(),
            sas_origin: *caller,
        })
    }

    // Sequencing

    /// Sequence a committed event into the history
    pub fn commit(&mut self, timestamp: u64, event: RegistryEvent) -> EventRecord {
        self.events.append(timestamp, event)
    }

    /// Up to `limit` most recent events, oldest first
    pub fn recent_events(&self, limit: usize) -> Vec<EventRecord> {
        self.events.recent(limit)
    }

    // Reads

    /// The administrative principal
    pub fn owner(&self) -> Principal {
        self.access.owner()
    }

    /// Whether `principal` is an authorized SAS
    pub fn is_authorized_sas(&self, principal: &Principal) -> bool {
        self.access.is_authorized_sas(principal)
    }

    /// Whether a device is currently registered
    pub fn is_cbsd_registered(&self, fcc_id: &str, serial_number: &str) -> bool {
        self.cbsds
            .contains(&derive_composite_key(fcc_id, serial_number))
    }

    /// Borrow a registered device's record
    pub fn find_cbsd(&self, fcc_id: &str, serial_number: &str) -> Option<&CbsdRecord> {
        self.cbsds.get(&derive_composite_key(fcc_id, serial_number))
    }

    /// Grants of a device in issue order
    pub fn grants(&self, fcc_id: &str, serial_number: &str) -> &[Grant] {
        self.grants
            .grants(&derive_composite_key(fcc_id, serial_number))
    }

    /// Live CBSD count
    pub fn total_cbsds(&self) -> u64 {
        self.cbsds.total()
    }

    /// Live grant count
    pub fn total_grants(&self) -> u64 {
        self.grants.live_total()
    }

    /// Recorded EIRP cap of an allow-listed FCC id
    pub fn max_eirp_for(&self, fcc_id: &str) -> Option<u64> {
        self.identity.max_eirp_for(fcc_id)
    }

    /// Current counters
    pub fn stats(&self) -> RegistryStats {
        let (fcc_allow, user_allow, fcc_deny, device_deny) = self.identity.list_sizes();
        RegistryStats {
            total_cbsds: self.cbsds.total(),
            total_grants: self.grants.live_total(),
            authorized_sas: self.access.authorized_count() as u64,
            fcc_allow_list: fcc_allow as u64,
            user_allow_list: user_allow as u64,
            blacklisted_fcc_ids: fcc_deny as u64,
            blacklisted_devices: device_deny as u64,
            last_sequence: self.events.last_sequence(),
        }
    }
}
