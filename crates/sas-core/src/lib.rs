//! Shared Spectrum Registry core types
//!
//! Foundation layer for the registry crates. Nothing in here holds registry
//! state; it defines the vocabulary every other crate speaks:
//!
//! - `identifiers` - principals (operator identities)
//! - `key` - deterministic composite keys and grant identifiers
//! - `model` - request and record shapes for CBSDs and grants
//! - `events` - structured events emitted by committed operations
//! - `errors` - the unified error type and its reason strings
//! - `time` - injected physical clock
//! - `config` - registry configuration loading and validation

#![forbid(unsafe_code)]

/// Unified error system
pub mod errors;

/// Operator identities
pub mod identifiers;

/// Composite key derivation
pub mod key;

/// CBSD and grant data model
pub mod model;

/// Registry events
pub mod events;

/// Injected clock
pub mod time;

/// Configuration system
pub mod config;

pub use config::{
    BootstrapConfig, ConfigError, DeviceEntry, FccIdEntry, RegistryConfig, MAX_BROADCAST_CAPACITY,
};
pub use errors::{ErrorCategory, SasError, SasResult};
pub use events::{EventRecord, RegistryEvent};
pub use identifiers::Principal;
pub use key::{derive_composite_key, CompositeKey, GrantId};
pub use model::{CbsdRecord, Grant, GrantRequest, RegistrationRequest};
pub use time::{PhysicalClock, SystemClock};
