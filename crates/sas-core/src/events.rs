//! Registry events
//!
//! One event is produced per committed mutating operation. Events carry
//! values only; subscribers never get references into registry state.

use crate::identifiers::Principal;
use crate::key::GrantId;
use serde::{Deserialize, Serialize};

/// Structured event emitted by a committed operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all_fields = "camelCase")]
pub enum RegistryEvent {
    /// Principal granted SAS authorization
    #[serde(rename = "SASAuthorized")]
    SasAuthorized {
        /// Newly authorized principal
        sas: Principal,
    },

    /// Principal's SAS authorization withdrawn
    #[serde(rename = "SASRevoked")]
    SasRevoked {
        /// Revoked principal
        sas: Principal,
    },

    /// FCC identifier added to the allow-list
    #[serde(rename = "FCCIdInjected")]
    FccIdInjected {
        /// FCC identifier
        fcc_id: String,
        /// Recorded EIRP cap
        max_eirp: u64,
    },

    /// User identifier added to the allow-list
    #[serde(rename = "UserIdInjected")]
    UserIdInjected {
        /// User identifier
        user_id: String,
    },

    /// FCC identifier added to the deny-list
    #[serde(rename = "FCCIdBlacklisted")]
    FccIdBlacklisted {
        /// FCC identifier
        fcc_id: String,
    },

    /// Device key added to the deny-list
    #[serde(rename = "SerialNumberBlacklisted")]
    SerialNumberBlacklisted {
        /// FCC identifier
        fcc_id: String,
        /// Serial number
        serial_number: String,
    },

    /// Device registered
    #[serde(rename = "CBSDRegistered")]
    CbsdRegistered {
        /// FCC identifier
        fcc_id: String,
        /// Serial number
        serial_number: String,
        /// Registering SAS
        sas_origin: Principal,
    },

    /// Device removed together with its grants
    #[serde(rename = "CBSDDeregistered")]
    CbsdDeregistered {
        /// FCC identifier
        fcc_id: String,
        /// Serial number
        serial_number: String,
        /// Deregistering SAS
        sas_origin: Principal,
        /// Number of grants dropped, live or terminated
        grants_removed: u64,
    },

    /// Grant issued
    #[serde(rename = "GrantCreated")]
    GrantCreated {
        /// FCC identifier
        fcc_id: String,
        /// Serial number
        serial_number: String,
        /// New grant identifier
        grant_id: GrantId,
        /// Issuing SAS
        sas_origin: Principal,
    },

    /// Grant relinquished
    #[serde(rename = "GrantTerminated")]
    GrantTerminated {
        /// FCC identifier
        fcc_id: String,
        /// Serial number
        serial_number: String,
        /// Terminated grant identifier
        grant_id: GrantId,
        /// Terminating SAS
        sas_origin: Principal,
    },

    /// All devices and grants cleared by the owner
    #[serde(rename = "RegistryReset")]
    RegistryReset {
        /// Owner that performed the reset
        by: Principal,
    },
}

impl RegistryEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            Self::SasAuthorized { .. } => "SASAuthorized",
            Self::SasRevoked { .. } => "SASRevoked",
            Self::FccIdInjected { .. } => "FCCIdInjected",
            Self::UserIdInjected { .. } => "UserIdInjected",
            Self::FccIdBlacklisted { .. } => "FCCIdBlacklisted",
            Self::SerialNumberBlacklisted { .. } => "SerialNumberBlacklisted",
            Self::CbsdRegistered { .. } => "CBSDRegistered",
            Self::CbsdDeregistered { .. } => "CBSDDeregistered",
            Self::GrantCreated { .. } => "GrantCreated",
            Self::GrantTerminated { .. } => "GrantTerminated",
            Self::RegistryReset { .. } => "RegistryReset",
        }
    }
}

/// An event with its position in the global order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Strictly increasing position, starting at 1
    pub sequence: u64,
    /// Commit time, seconds since the Unix epoch
    pub timestamp: u64,
    /// The event itself
    #[serde(flatten)]
    pub event: RegistryEvent,
}
