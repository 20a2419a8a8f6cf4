//! Pre-wired registry builder

use crate::fixtures::{FCC_ID, FCC_MAX_EIRP, OWNER, SAS_1, SAS_2, USER_ID};
use crate::time::ManualClock;
use sas_core::{Principal, RegistryConfig};
use sas_registry::SharedRegistry;
use std::sync::Arc;

/// Registry plus the clock driving it
#[derive(Debug, Clone)]
pub struct RegistryFixture {
    /// The registry under test
    pub registry: SharedRegistry,
    /// Clock feeding its timestamps
    pub clock: Arc<ManualClock>,
}

impl RegistryFixture {
    /// Builder with `SAS_1`/`SAS_2` authorized and `F1`/`U1` allow-listed
    pub fn builder() -> RegistryFixtureBuilder {
        RegistryFixtureBuilder::default()
    }

    /// Registry with only the owner configured
    pub fn empty() -> Self {
        Self::builder().without_defaults().build()
    }
}

/// Builder for [`RegistryFixture`]
#[derive(Debug, Clone)]
pub struct RegistryFixtureBuilder {
    start_time: u64,
    enforce_request_schema: bool,
    event_log_capacity: Option<usize>,
    broadcast_capacity: Option<usize>,
    authorized: Vec<Principal>,
    fcc_ids: Vec<(String, u64)>,
    user_ids: Vec<String>,
    blacklisted_fcc_ids: Vec<String>,
    blacklisted_devices: Vec<(String, String)>,
}

impl Default for RegistryFixtureBuilder {
    fn default() -> Self {
        Self {
            start_time: 1_700_000_000,
            enforce_request_schema: false,
            event_log_capacity: None,
            broadcast_capacity: None,
            authorized: vec![SAS_1, SAS_2],
            fcc_ids: vec![(FCC_ID.to_string(), FCC_MAX_EIRP)],
            user_ids: vec![USER_ID.to_string()],
            blacklisted_fcc_ids: Vec::new(),
            blacklisted_devices: Vec::new(),
        }
    }
}

impl RegistryFixtureBuilder {
    /// Drop the default SAS authorizations and allow-list entries
    pub fn without_defaults(mut self) -> Self {
        self.authorized.clear();
        self.fcc_ids.clear();
        self.user_ids.clear();
        self
    }

    /// Clock start time
    pub fn start_time(mut self, secs: u64) -> Self {
        self.start_time = secs;
        self
    }

    /// Turn request-schema enforcement on
    pub fn enforce_request_schema(mut self) -> Self {
        self.enforce_request_schema = true;
        self
    }

    /// History size
    pub fn event_log_capacity(mut self, capacity: usize) -> Self {
        self.event_log_capacity = Some(capacity);
        self
    }

    /// Broadcast buffer size
    pub fn broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = Some(capacity);
        self
    }

    /// Authorize another SAS
    pub fn authorize(mut self, sas: Principal) -> Self {
        self.authorized.push(sas);
        self
    }

    /// Allow-list another FCC id
    pub fn fcc_id(mut self, fcc_id: &str, max_eirp: u64) -> Self {
        self.fcc_ids.push((fcc_id.to_string(), max_eirp));
        self
    }

    /// Allow-list another user id
    pub fn user_id(mut self, user_id: &str) -> Self {
        self.user_ids.push(user_id.to_string());
        self
    }

    /// Blacklist an FCC id
    pub fn blacklist_fcc_id(mut self, fcc_id: &str) -> Self {
        self.blacklisted_fcc_ids.push(fcc_id.to_string());
        self
    }

    /// Blacklist one device
    pub fn blacklist_device(mut self, fcc_id: &str, serial_number: &str) -> Self {
        self.blacklisted_devices
            .push((fcc_id.to_string(), serial_number.to_string()));
        self
    }

    /// Build the registry, applying everything through owner-gated calls
    pub fn build(self) -> RegistryFixture {
        let mut config = RegistryConfig::new(OWNER).with_request_schema(self.enforce_request_schema);
        if let Some(capacity) = self.event_log_capacity {
            config.event_log_capacity = capacity;
        }
        if let Some(capacity) = self.broadcast_capacity {
            config.broadcast_capacity = capacity;
        }

        let clock = Arc::new(ManualClock::at(self.start_time));
        let registry = SharedRegistry::with_clock(config, clock.clone())
            .expect("empty bootstrap cannot fail");

        for sas in self.authorized {
            registry.authorize_sas(OWNER, sas).unwrap();
        }
        for (fcc_id, max_eirp) in &self.fcc_ids {
            registry.inject_fcc_id(OWNER, fcc_id, *max_eirp).unwrap();
        }
        for user_id in &self.user_ids {
            registry.inject_user_id(OWNER, user_id).unwrap();
        }
        for fcc_id in &self.blacklisted_fcc_ids {
            registry.blacklist_fcc_id(OWNER, fcc_id).unwrap();
        }
        for (fcc_id, serial_number) in &self.blacklisted_devices {
            registry.blacklist_device(OWNER, fcc_id, serial_number).unwrap();
        }

        RegistryFixture { registry, clock }
    }
}
