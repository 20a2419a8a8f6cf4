//! Event indexer
//!
//! A downstream projection of devices and grants built only from committed
//! events, the way a dashboard or query service would follow the registry.
//! It never reads registry state directly, so it keeps history the registry
//! itself drops: deregistered devices stay in the index with their grants.

use sas_core::{derive_composite_key, CompositeKey, EventRecord, GrantId, Principal, RegistryEvent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Device status as seen through events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexedStatus {
    /// Registered and not yet removed
    Registered,
    /// Removed by a `CBSDDeregistered` event
    Deregistered,
}

/// Grant as seen through events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedGrant {
    /// Grant identifier
    pub grant_id: GrantId,
    /// Issuing SAS
    pub sas_origin: Principal,
    /// Sequence of the `GrantCreated` event
    pub created_at_sequence: u64,
    /// Whether a `GrantTerminated` event was seen
    pub terminated: bool,
    /// SAS that last terminated it
    pub terminated_by: Option<Principal>,
    /// Sequence of the first termination
    pub terminated_at_sequence: Option<u64>,
}

/// Device as seen through events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedCbsd {
    /// FCC identifier
    pub fcc_id: String,
    /// Serial number
    pub serial_number: String,
    /// Registering SAS
    pub sas_origin: Principal,
    /// Current status
    pub status: IndexedStatus,
    /// Sequence of the `CBSDRegistered` event
    pub registered_at_sequence: u64,
    /// Grants in creation order
    pub grants: Vec<IndexedGrant>,
}

/// In-memory event projection keyed by composite key
#[derive(Debug, Clone, Default)]
pub struct EventIndexer {
    devices: BTreeMap<CompositeKey, IndexedCbsd>,
    last_applied_sequence: u64,
}

impl EventIndexer {
    /// Empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence of the newest event folded in
    pub fn last_applied_sequence(&self) -> u64 {
        self.last_applied_sequence
    }

    /// Indexed device, registered or not
    pub fn device(&self, fcc_id: &str, serial_number: &str) -> Option<&IndexedCbsd> {
        self.devices.get(&derive_composite_key(fcc_id, serial_number))
    }

    /// Every indexed device in key order
    pub fn devices(&self) -> impl Iterator<Item = &IndexedCbsd> {
        self.devices.values()
    }

    /// Devices whose last known status is `Registered`
    pub fn registered_count(&self) -> usize {
        self.devices
            .values()
            .filter(|device| device.status == IndexedStatus::Registered)
            .count()
    }

    /// Fold one event in. Returns false if it was already applied.
    pub fn apply(&mut self, record: &EventRecord) -> bool {
        if record.sequence <= self.last_applied_sequence {
            return false;
        }
        self.last_applied_sequence = record.sequence;

        match &record.event {
            RegistryEvent::CbsdRegistered {
                fcc_id,
                serial_number,
                sas_origin,
            } => {
                self.devices.insert(
                    derive_composite_key(fcc_id, serial_number),
                    IndexedCbsd {
                        fcc_id: fcc_id.clone(),
                        serial_number: serial_number.clone(),
                        sas_origin: *sas_origin,
                        status: IndexedStatus::Registered,
                        registered_at_sequence: record.sequence,
                        grants: Vec::new(),
                    },
                );
            }
            RegistryEvent::CbsdDeregistered {
                fcc_id,
                serial_number,
                ..
            } => {
                if let Some(device) = self.device_mut(fcc_id, serial_number) {
                    device.status = IndexedStatus::Deregistered;
                }
            }
            RegistryEvent::GrantCreated {
                fcc_id,
                serial_number,
                grant_id,
                sas_origin,
            } => match self.device_mut(fcc_id, serial_number) {
                Some(device) => device.grants.push(IndexedGrant {
                    grant_id: grant_id.clone(),
                    sas_origin: *sas_origin,
                    created_at_sequence: record.sequence,
                    terminated: false,
                    terminated_by: None,
                    terminated_at_sequence: None,
                }),
                None => debug!(
                    fcc_id = %fcc_id,
                    serial = %serial_number,
                    grant_id = %grant_id,
                    "Grant for unindexed device ignored"
                ),
            },
            RegistryEvent::GrantTerminated {
                fcc_id,
                serial_number,
                grant_id,
                sas_origin,
            } => {
                let grant = self
                    .device_mut(fcc_id, serial_number)
                    .and_then(|device| device.grants.iter_mut().find(|g| g.grant_id == *grant_id));
                if let Some(grant) = grant {
                    grant.terminated = true;
                    grant.terminated_by = Some(*sas_origin);
                    grant.terminated_at_sequence.get_or_insert(record.sequence);
                }
            }
            RegistryEvent::RegistryReset { .. } => self.devices.clear(),
            RegistryEvent::SasAuthorized { .. }
            | RegistryEvent::SasRevoked { .. }
            | RegistryEvent::FccIdInjected { .. }
            | RegistryEvent::UserIdInjected { .. }
            | RegistryEvent::FccIdBlacklisted { .. }
            | RegistryEvent::SerialNumberBlacklisted { .. } => {}
        }
        true
    }

    /// Follow a subscription until the registry is dropped.
    ///
    /// Lagging behind the channel loses the skipped events; the gap is logged
    /// and indexing continues with the next available record.
    pub async fn run(&mut self, mut receiver: broadcast::Receiver<EventRecord>) {
        loop {
            match receiver.recv().await {
                Ok(record) => {
                    self.apply(&record);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(
                        skipped,
                        last_applied_sequence = self.last_applied_sequence,
                        "Event indexer lagged behind registry"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    fn device_mut(&mut self, fcc_id: &str, serial_number: &str) -> Option<&mut IndexedCbsd> {
        self.devices
            .get_mut(&derive_composite_key(fcc_id, serial_number))
    }
}
