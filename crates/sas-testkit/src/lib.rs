//! Registry Testing Infrastructure
//!
//! Shared fixtures for the registry crates: well-known principals, sample
//! registration and grant requests, a manually driven clock, a pre-wired
//! registry builder and proptest strategies.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```rust
//! use sas_testkit::*;
//!
//! let fixture = RegistryFixture::builder().build();
//! fixture
//!     .registry
//!     .register(SAS_1, sample_registration("F1", "U1", "SN1"))
//!     .unwrap();
//! assert_eq!(fixture.registry.total_cbsds(), 1);
//! ```

pub mod builders;
pub mod fixtures;
pub mod strategies;
pub mod time;

pub use builders::{RegistryFixture, RegistryFixtureBuilder};
pub use fixtures::*;
pub use time::ManualClock;
