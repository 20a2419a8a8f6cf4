//! `sasctl check-config`

use crate::commands::common;
use anyhow::Result;
use std::io::Write;
use std::path::Path;

/// Load and validate a config, then print a summary of what it bootstraps
pub fn run(config_path: &Path, out: &mut impl Write) -> Result<()> {
    let config = common::load_config(config_path)?;
    let bootstrap = &config.bootstrap;

    writeln!(out, "config {} is valid", config_path.display())?;
    writeln!(out, "owner: {}", config.owner)?;
    writeln!(
        out,
        "event_log_capacity: {}, broadcast_capacity: {}, enforce_request_schema: {}",
        config.event_log_capacity, config.broadcast_capacity, config.enforce_request_schema
    )?;
    writeln!(
        out,
        "bootstrap: {} sas, {} fcc ids, {} user ids, {} blacklisted fcc ids, {} blacklisted devices",
        bootstrap.authorized_sas.len(),
        bootstrap.fcc_ids.len(),
        bootstrap.user_ids.len(),
        bootstrap.blacklisted_fcc_ids.len(),
        bootstrap.blacklisted_devices.len()
    )?;
    Ok(())
}
