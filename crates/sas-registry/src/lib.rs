//! # SAS Registry
//!
//! The shared CBSD and grant registry that mutually-distrusting Spectrum
//! Access System operators use to agree on which devices exist and which
//! grants they hold.
//!
//! ## Components
//!
//! - [`access`]: the immutable owner and the set of authorized SAS principals
//! - [`identity`]: FCC/user allow-lists and FCC/device deny-lists
//! - [`cbsd`]: composite-keyed device records with uniqueness
//! - [`grants`]: per-device grant lists, termination and live counting
//! - [`state`]: the check-then-apply state machine over all of the above
//! - [`registry`]: the lock-guarded [`SharedRegistry`] handle with event
//!   sequencing and broadcast
//! - [`schema`]: optional request shape validation
//! - [`indexer`]: an event-fed projection for downstream readers
//! - [`simple`]: a reduced owner-only device book
//!
//! ## Example
//!
//! ```
//! use sas_core::{Principal, RegistrationRequest, RegistryConfig};
//! use sas_registry::SharedRegistry;
//!
//! let owner = Principal::from_label("owner");
//! let sas = Principal::from_label("sas-1");
//! let registry = SharedRegistry::new(RegistryConfig::new(owner)).unwrap();
//!
//! registry.authorize_sas(owner, sas).unwrap();
//! registry.inject_fcc_id(owner, "F1", 30).unwrap();
//! registry.inject_user_id(owner, "U1").unwrap();
//!
//! let request = RegistrationRequest {
//!     fcc_id: "F1".into(),
//!     user_id: "U1".into(),
//!     cbsd_serial_number: "SN1".into(),
//!     ..Default::default()
//! };
//! registry.register(sas, request).unwrap();
//! assert_eq!(registry.total_cbsds(), 1);
//! ```

pub mod access;
pub mod cbsd;
pub mod event_log;
pub mod grants;
pub mod identity;
pub mod indexer;
pub mod registry;
pub mod schema;
pub mod simple;
pub mod state;

pub use access::AccessControl;
pub use cbsd::CbsdRegistry;
pub use event_log::EventLog;
pub use grants::{GrantLedger, Termination};
pub use identity::IdentityValidator;
pub use indexer::{EventIndexer, IndexedCbsd, IndexedGrant, IndexedStatus};
pub use registry::{GrantReceipt, SharedRegistry};
pub use simple::{SimpleCbsd, SimpleCbsdBook, SimpleCbsdEvent};
pub use state::{RegistryState, RegistryStats};
