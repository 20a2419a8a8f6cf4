//! sasctl library
//!
//! Subcommand implementations and the JSON operation-script format used by
//! the `sasctl` binary. Split out of `main.rs` so the integration tests can
//! drive them directly.

pub mod commands;
pub mod script;

pub use commands::run::RunSummary;
pub use script::{ScriptOp, ScriptStep};
