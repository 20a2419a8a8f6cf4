//! Registry configuration
//!
//! Loaded from TOML, overlaid with `SAS_`-prefixed environment variables,
//! then validated. The owner is fixed here and never reassigned afterwards.
//!
//! ```toml
//! owner = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
//! event_log_capacity = 1024
//! enforce_request_schema = true
//!
//! [bootstrap]
//! authorized_sas = ["0x70997970c51812dc3a010c7d01b50e0d17dc79c8"]
//! user_ids = ["USER1"]
//! fcc_ids = [{ fcc_id = "FCC1", max_eirp = 47 }]
//! ```

mod traits;
mod validation;

pub use traits::SasConfig;
pub use validation::{ConfigValidator, ValidationError, ValidationResult};

use crate::identifiers::Principal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Log levels accepted by `log_level`
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Largest accepted `broadcast_capacity`
pub const MAX_BROADCAST_CAPACITY: usize = 65_536;

/// Configuration loading and validation failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// File is not valid TOML for this schema
    #[error("Invalid config file {path}: {message}")]
    Parse {
        /// File that failed
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// Environment override could not be applied
    #[error("Invalid environment override {key}={value}")]
    Env {
        /// Variable name
        key: String,
        /// Supplied value
        value: String,
    },

    /// One or more validation rules failed
    #[error("Invalid configuration: {}", render_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn render_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// FCC identifier admitted at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FccIdEntry {
    /// FCC identifier
    pub fcc_id: String,
    /// Recorded EIRP cap
    #[serde(default)]
    pub max_eirp: u64,
}

/// Device key blacklisted at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEntry {
    /// FCC identifier
    pub fcc_id: String,
    /// Serial number
    pub serial_number: String,
}

/// Entries applied through the owner-gated operations right after construction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Principals to authorize as SAS operators
    pub authorized_sas: Vec<Principal>,
    /// FCC identifiers to allow-list
    pub fcc_ids: Vec<FccIdEntry>,
    /// User identifiers to allow-list
    pub user_ids: Vec<String>,
    /// FCC identifiers to blacklist
    pub blacklisted_fcc_ids: Vec<String>,
    /// Device keys to blacklist
    pub blacklisted_devices: Vec<DeviceEntry>,
}

impl BootstrapConfig {
    /// True when there is nothing to apply
    pub fn is_empty(&self) -> bool {
        self.authorized_sas.is_empty()
            && self.fcc_ids.is_empty()
            && self.user_ids.is_empty()
            && self.blacklisted_fcc_ids.is_empty()
            && self.blacklisted_devices.is_empty()
    }
}

/// Top-level registry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Administrative principal, fixed for the registry's lifetime
    pub owner: Principal,
    /// Number of committed events retained for `recent_events`
    #[serde(default = "default_event_log_capacity")]
    pub event_log_capacity: usize,
    /// Buffer size of the event broadcast channel, 1..=[`MAX_BROADCAST_CAPACITY`]
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
    /// Reject malformed registration and grant requests before lookup
    #[serde(default)]
    pub enforce_request_schema: bool,
    /// Default tracing filter for binaries
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Startup allow-lists, deny-lists and SAS authorizations
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

fn default_event_log_capacity() -> usize {
    1024
}

fn default_broadcast_capacity() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_string()
}

impl RegistryConfig {
    /// Configuration with defaults for everything but the owner
    pub fn new(owner: Principal) -> Self {
        Self {
            owner,
            event_log_capacity: default_event_log_capacity(),
            broadcast_capacity: default_broadcast_capacity(),
            enforce_request_schema: false,
            log_level: default_log_level(),
            bootstrap: BootstrapConfig::default(),
        }
    }

    /// Enable or disable request-schema enforcement
    pub fn with_request_schema(mut self, enforce: bool) -> Self {
        self.enforce_request_schema = enforce;
        self
    }

    /// Replace the bootstrap section
    pub fn with_bootstrap(mut self, bootstrap: BootstrapConfig) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(source: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }
}

impl SasConfig for RegistryConfig {
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    fn merge_with_vars<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix("SAS_") else {
                continue;
            };
            let bad_value = || ConfigError::Env {
                key: key.clone(),
                value: value.clone(),
            };
            match name {
                "LOG_LEVEL" => self.log_level = value.to_lowercase(),
                "EVENT_LOG_CAPACITY" => {
                    self.event_log_capacity = value.parse().map_err(|_| bad_value())?;
                }
                "BROADCAST_CAPACITY" => {
                    self.broadcast_capacity = value.parse().map_err(|_| bad_value())?;
                }
                "ENFORCE_REQUEST_SCHEMA" => {
                    self.enforce_request_schema = value.parse().map_err(|_| bad_value())?;
                }
                _ => tracing::debug!(key = %key, "Ignoring unknown SAS_ variable"),
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut validator = ConfigValidator::new();
        validator
            .check("owner", !self.owner.is_zero(), "must not be the zero address")
            .at_least("event_log_capacity", self.event_log_capacity as u64, 1)
            .at_least("broadcast_capacity", self.broadcast_capacity as u64, 1)
            .at_most(
                "broadcast_capacity",
                self.broadcast_capacity as u64,
                MAX_BROADCAST_CAPACITY as u64,
            )
            .one_of("log_level", &self.log_level, LOG_LEVELS)
            .section("bootstrap", |bootstrap| {
                bootstrap
                    .each("fcc_ids", &self.bootstrap.fcc_ids, |v, entry| {
                        v.non_empty("fcc_id", &entry.fcc_id);
                    })
                    .each("user_ids", &self.bootstrap.user_ids, |v, id| {
                        v.non_empty("user_id", id);
                    })
                    .each("blacklisted_fcc_ids", &self.bootstrap.blacklisted_fcc_ids, |v, id| {
                        v.non_empty("fcc_id", id);
                    })
                    .each(
                        "blacklisted_devices",
                        &self.bootstrap.blacklisted_devices,
                        |v, entry| {
                            v.non_empty("fcc_id", &entry.fcc_id)
                                .non_empty("serial_number", &entry.serial_number);
                        },
                    );
            });
        validator.finish().map_err(ConfigError::Invalid)
    }
}
