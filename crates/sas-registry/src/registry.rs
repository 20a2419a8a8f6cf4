//! Shared registry handle
//!
//! [`SharedRegistry`] is the serialized entry point every SAS operator goes
//! through. The whole [`RegistryState`] sits behind one `parking_lot::RwLock`:
//!
//! - every mutating operation holds the write lock for its entire
//!   check-then-apply sequence, then sequences its event, appends it to the
//!   history and publishes it before the lock is released
//! - reads and heartbeats take the read lock and may run concurrently
//!
//! Two operators racing to register the same key are therefore ordered by the
//! lock; the second one observes `CBSDAlreadyExists`.
//!
//! The lock is never held across an `.await`.

use crate::state::{RegistryState, RegistryStats};
use parking_lot::RwLock;
use sas_core::config::{RegistryConfig, MAX_BROADCAST_CAPACITY};
use sas_core::{
    CbsdRecord, EventRecord, Grant, GrantId, GrantRequest, PhysicalClock, Principal,
    RegistrationRequest, RegistryEvent, SasResult, SystemClock,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Outcome of a successful `grant_spectrum`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantReceipt {
    /// Identifier of the new grant
    pub grant_id: GrantId,
    /// The committed `GrantCreated` event
    pub record: EventRecord,
}

struct Inner {
    state: RwLock<RegistryState>,
    events_tx: broadcast::Sender<EventRecord>,
    clock: Arc<dyn PhysicalClock>,
    config: RegistryConfig,
}

/// Cloneable, thread-safe handle to one registry
#[derive(Clone)]
pub struct SharedRegistry {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SharedRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedRegistry")
            .field("owner", &self.inner.config.owner)
            .field("clock", &self.inner.clock)
            .finish_non_exhaustive()
    }
}

impl SharedRegistry {
    /// Build a registry on wall-clock time and apply the config's bootstrap
    pub fn new(config: RegistryConfig) -> SasResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build a registry with an injected clock and apply the config's bootstrap
    pub fn with_clock(config: RegistryConfig, clock: Arc<dyn PhysicalClock>) -> SasResult<Self> {
        let state = RegistryState::new(
            config.owner,
            config.event_log_capacity,
            config.enforce_request_schema,
        );
        let (events_tx, _) =
            broadcast::channel(config.broadcast_capacity.clamp(1, MAX_BROADCAST_CAPACITY));
        let registry = Self {
            inner: Arc::new(Inner {
                state: RwLock::new(state),
                events_tx,
                clock,
                config,
            }),
        };
        registry.apply_bootstrap()?;
        Ok(registry)
    }

    fn apply_bootstrap(&self) -> SasResult<()> {
        let owner = self.inner.config.owner;
        let bootstrap = self.inner.config.bootstrap.clone();
        if bootstrap.is_empty() {
            return Ok(());
        }

        for sas in bootstrap.authorized_sas {
            self.authorize_sas(owner, sas)?;
        }
        for entry in &bootstrap.fcc_ids {
            self.inject_fcc_id(owner, &entry.fcc_id, entry.max_eirp)?;
        }
        for user_id in &bootstrap.user_ids {
            self.inject_user_id(owner, user_id)?;
        }
        for fcc_id in &bootstrap.blacklisted_fcc_ids {
            self.blacklist_fcc_id(owner, fcc_id)?;
        }
        for device in &bootstrap.blacklisted_devices {
            self.blacklist_device(owner, &device.fcc_id, &device.serial_number)?;
        }
        info!(
            owner = %owner,
            last_sequence = self.stats().last_sequence,
            "Registry bootstrap applied"
        );
        Ok(())
    }

    /// Run one mutating operation under the write lock and commit its event
    fn mutate<T>(
        &self,
        operation: &'static str,
        caller: Principal,
        apply: impl FnOnce(&mut RegistryState, u64) -> SasResult<(RegistryEvent, T)>,
    ) -> SasResult<(EventRecord, T)> {
        let mut state = self.inner.state.write();
        let now = self.inner.clock.now_secs();

        match apply(&mut state, now) {
            Ok((event, output)) => {
                let record = state.commit(now, event);
                info!(
                    operation,
                    caller = %caller,
                    sequence = record.sequence,
                    event = ?record.event,
                    "Registry operation committed"
                );
                // No subscribers is fine; the history still has the record.
                let _ = self.inner.events_tx.send(record.clone());
                Ok((record, output))
            }
            Err(err) => {
                warn!(
                    operation,
                    caller = %caller,
                    reason = err.reason(),
                    error = %err,
                    "Registry operation rejected"
                );
                Err(err)
            }
        }
    }

    fn mutate_event(
        &self,
        operation: &'static str,
        caller: Principal,
        apply: impl FnOnce(&mut RegistryState) -> SasResult<RegistryEvent>,
    ) -> SasResult<EventRecord> {
        self.mutate(operation, caller, |state, _now| {
            apply(state).map(|event| (event, ()))
        })
        .map(|(record, ())| record)
    }

    // Owner-gated administration

    /// Authorize `sas` as an SAS operator (owner only)
    pub fn authorize_sas(&self, caller: Principal, sas: Principal) -> SasResult<EventRecord> {
        self.mutate_event("authorize_sas", caller, |state| {
            state.authorize_sas(&caller, sas)
        })
    }

    /// Revoke `sas`'s SAS authorization (owner only)
    ///
    /// Devices and grants it already created are unaffected.
    pub fn revoke_sas(&self, caller: Principal, sas: Principal) -> SasResult<EventRecord> {
        self.mutate_event("revoke_sas", caller, |state| state.revoke_sas(&caller, sas))
    }

    /// Allow-list an FCC id with its recorded EIRP cap (owner only)
    pub fn inject_fcc_id(
        &self,
        caller: Principal,
        fcc_id: &str,
        max_eirp: u64,
    ) -> SasResult<EventRecord> {
        self.mutate_event("inject_fcc_id", caller, |state| {
            state.inject_fcc_id(&caller, fcc_id, max_eirp)
        })
    }

    /// Allow-list a user id (owner only)
    pub fn inject_user_id(&self, caller: Principal, user_id: &str) -> SasResult<EventRecord> {
        self.mutate_event("inject_user_id", caller, |state| {
            state.inject_user_id(&caller, user_id)
        })
    }

    /// Blacklist an FCC id (owner only)
    pub fn blacklist_fcc_id(&self, caller: Principal, fcc_id: &str) -> SasResult<EventRecord> {
        self.mutate_event("blacklist_fcc_id", caller, |state| {
            state.blacklist_fcc_id(&caller, fcc_id)
        })
    }

    /// Blacklist one device key (owner only)
    pub fn blacklist_device(
        &self,
        caller: Principal,
        fcc_id: &str,
        serial_number: &str,
    ) -> SasResult<EventRecord> {
        self.mutate_event("blacklist_device", caller, |state| {
            state.blacklist_device(&caller, fcc_id, serial_number)
        })
    }

    /// Clear every device and grant (owner only)
    pub fn reset(&self, caller: Principal) -> SasResult<EventRecord> {
        self.mutate_event("reset", caller, |state| state.reset(&caller))
    }

    // SAS-gated lifecycle

    /// Register a device on behalf of `caller`
    pub fn register(
        &self,
        caller: Principal,
        request: RegistrationRequest,
    ) -> SasResult<EventRecord> {
        self.mutate("register", caller, |state, now| {
            state.register(&caller, request, now).map(|event| (event, ()))
        })
        .map(|(record, ())| record)
    }

    /// Remove a device and all of its grants
    pub fn deregister(
        &self,
        caller: Principal,
        fcc_id: &str,
        serial_number: &str,
    ) -> SasResult<EventRecord> {
        self.mutate_event("deregister", caller, |state| {
            state.deregister(&caller, fcc_id, serial_number)
        })
    }

    /// Issue a grant to a registered device
    pub fn grant_spectrum(
        &self,
        caller: Principal,
        request: &GrantRequest,
    ) -> SasResult<GrantReceipt> {
        self.mutate("grant_spectrum", caller, |state, now| {
            state
                .grant_spectrum(&caller, request, now)
                .map(|(grant_id, event)| (event, grant_id))
        })
        .map(|(record, grant_id)| GrantReceipt { grant_id, record })
    }

    /// Terminate a grant; repeating it on a terminated grant succeeds
    pub fn relinquish(
        &self,
        caller: Principal,
        fcc_id: &str,
        serial_number: &str,
        grant_id: &GrantId,
    ) -> SasResult<EventRecord> {
        self.mutate_event("relinquish", caller, |state| {
            state.relinquish(&caller, fcc_id, serial_number, grant_id)
        })
    }

    /// Read-only liveness probe. Does not inspect `terminated`.
    pub fn heartbeat(
        &self,
        caller: Principal,
        fcc_id: &str,
        serial_number: &str,
        grant_id: &GrantId,
    ) -> SasResult<()> {
        let result = self
            .inner
            .state
            .read()
            .heartbeat(&caller, fcc_id, serial_number, grant_id);
        match &result {
            Ok(()) => debug!(
                caller = %caller,
                fcc_id,
                serial = serial_number,
                grant_id = %grant_id,
                "Heartbeat accepted"
            ),
            Err(err) => warn!(
                operation = "heartbeat",
                caller = %caller,
                reason = err.reason(),
                error = %err,
                "Registry operation rejected"
            ),
        }
        result
    }

    // Reads

    /// The administrative principal
    pub fn owner(&self) -> Principal {
        self.inner.config.owner
    }

    /// Configuration this registry was built from
    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    /// Whether `principal` is currently an authorized SAS
    pub fn is_authorized_sas(&self, principal: &Principal) -> bool {
        self.inner.state.read().is_authorized_sas(principal)
    }

    /// Whether the device is currently registered
    pub fn is_cbsd_registered(&self, fcc_id: &str, serial_number: &str) -> bool {
        self.inner
            .state
            .read()
            .is_cbsd_registered(fcc_id, serial_number)
    }

    /// Registered device record, or `None` when absent
    pub fn find_cbsd(&self, fcc_id: &str, serial_number: &str) -> Option<CbsdRecord> {
        self.inner
            .state
            .read()
            .find_cbsd(fcc_id, serial_number)
            .cloned()
    }

    /// Registered device record, or the empty record when absent
    pub fn cbsd_info(&self, fcc_id: &str, serial_number: &str) -> CbsdRecord {
        self.find_cbsd(fcc_id, serial_number).unwrap_or_default()
    }

    /// Grants of a device in issue order; empty when absent
    pub fn grants(&self, fcc_id: &str, serial_number: &str) -> Vec<Grant> {
        self.inner
            .state
            .read()
            .grants(fcc_id, serial_number)
            .to_vec()
    }

    /// Live CBSD count
    pub fn total_cbsds(&self) -> u64 {
        self.inner.state.read().total_cbsds()
    }

    /// Live grant count
    pub fn total_grants(&self) -> u64 {
        self.inner.state.read().total_grants()
    }

    /// Recorded EIRP cap of an allow-listed FCC id
    pub fn max_eirp_for(&self, fcc_id: &str) -> Option<u64> {
        self.inner.state.read().max_eirp_for(fcc_id)
    }

    /// Counters, read atomically
    pub fn stats(&self) -> RegistryStats {
        self.inner.state.read().stats()
    }

    /// Up to `limit` most recent events, oldest first
    pub fn recent_events(&self, limit: usize) -> Vec<EventRecord> {
        self.inner.state.read().recent_events(limit)
    }

    /// Receive every event committed after this call, in commit order
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.inner.events_tx.subscribe()
    }
}
