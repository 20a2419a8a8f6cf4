//! `sasctl` subcommands

pub mod check_config;
pub mod common;
pub mod key;
pub mod run;
