//! `sasctl key`

use anyhow::Result;
use sas_core::{derive_composite_key, GrantId};
use std::io::Write;

/// Print the composite key of a device and the grant id at `ordinal`
pub fn run(fcc_id: &str, serial_number: &str, ordinal: u64, out: &mut impl Write) -> Result<()> {
    let key = derive_composite_key(fcc_id, serial_number);
    writeln!(out, "composite_key: {key}")?;
    writeln!(
        out,
        "grant_id[{ordinal}]: {}",
        GrantId::derive(fcc_id, serial_number, ordinal)
    )?;
    Ok(())
}
