//! Operation scripts
//!
//! A script is a JSON array of steps, each naming the calling principal and
//! one registry operation with its arguments:
//!
//! ```json
//! [
//!   { "caller": "0x70997970c51812dc3a010c7d01b50e0d17dc79c8",
//!     "op": "grant_spectrum",
//!     "request": { "fccId": "F1", "cbsdSerialNumber": "SN1", ... } },
//!   { "caller": "0x70997970c51812dc3a010c7d01b50e0d17dc79c8",
//!     "op": "relinquish", "fccId": "F1", "serialNumber": "SN1",
//!     "grantId": "grant_F1SN10" }
//! ]
//! ```

use sas_core::{
    EventRecord, GrantId, GrantRequest, Principal, RegistrationRequest, SasError, SasResult,
};
use sas_registry::SharedRegistry;
use serde::{Deserialize, Serialize};

/// One registry operation with its arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ScriptOp {
    /// Authorize an SAS
    AuthorizeSas {
        /// Principal to authorize
        sas: Principal,
    },
    /// Revoke an SAS
    RevokeSas {
        /// Principal to revoke
        sas: Principal,
    },
    /// Allow-list an FCC id
    InjectFccId {
        /// FCC identifier
        fcc_id: String,
        /// Recorded EIRP cap
        max_eirp: u64,
    },
    /// Allow-list a user id
    InjectUserId {
        /// User identifier
        user_id: String,
    },
    /// Blacklist an FCC id
    BlacklistFccId {
        /// FCC identifier
        fcc_id: String,
    },
    /// Blacklist a device
    BlacklistDevice {
        /// FCC identifier
        fcc_id: String,
        /// Serial number
        serial_number: String,
    },
    /// Register a device
    Register {
        /// Full registration request
        request: RegistrationRequest,
    },
    /// Deregister a device
    Deregister {
        /// FCC identifier
        fcc_id: String,
        /// Serial number
        serial_number: String,
    },
    /// Issue a grant
    GrantSpectrum {
        /// Full grant request
        request: GrantRequest,
    },
    /// Probe a grant
    Heartbeat {
        /// FCC identifier
        fcc_id: String,
        /// Serial number
        serial_number: String,
        /// Grant identifier
        grant_id: GrantId,
    },
    /// Terminate a grant
    Relinquish {
        /// FCC identifier
        fcc_id: String,
        /// Serial number
        serial_number: String,
        /// Grant identifier
        grant_id: GrantId,
    },
    /// Clear devices and grants
    Reset,
}

impl ScriptOp {
    /// Name used in output lines
    pub fn name(&self) -> &'static str {
        match self {
            Self::AuthorizeSas { .. } => "authorize_sas",
            Self::RevokeSas { .. } => "revoke_sas",
            Self::InjectFccId { .. } => "inject_fcc_id",
            Self::InjectUserId { .. } => "inject_user_id",
            Self::BlacklistFccId { .. } => "blacklist_fcc_id",
            Self::BlacklistDevice { .. } => "blacklist_device",
            Self::Register { .. } => "register",
            Self::Deregister { .. } => "deregister",
            Self::GrantSpectrum { .. } => "grant_spectrum",
            Self::Heartbeat { .. } => "heartbeat",
            Self::Relinquish { .. } => "relinquish",
            Self::Reset => "reset",
        }
    }
}

/// A scripted call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStep {
    /// Principal the call is made as
    pub caller: Principal,
    /// Operation and arguments
    #[serde(flatten)]
    pub op: ScriptOp,
}

/// Parse a script document
pub fn parse_script(source: &str) -> serde_json::Result<Vec<ScriptStep>> {
    serde_json::from_str(source)
}

/// Apply one step. Heartbeats succeed without an event.
pub fn execute(registry: &SharedRegistry, step: &ScriptStep) -> SasResult<Option<EventRecord>> {
    let caller = step.caller;
    let record = match &step.op {
        ScriptOp::AuthorizeSas { sas } => registry.authorize_sas(caller, *sas)?,
        ScriptOp::RevokeSas { sas } => registry.revoke_sas(caller, *sas)?,
        ScriptOp::InjectFccId { fcc_id, max_eirp } => {
            registry.inject_fcc_id(caller, fcc_id, *max_eirp)?
        }
        ScriptOp::InjectUserId { user_id } => registry.inject_user_id(caller, user_id)?,
        ScriptOp::BlacklistFccId { fcc_id } => registry.blacklist_fcc_id(caller, fcc_id)?,
        ScriptOp::BlacklistDevice {
            fcc_id,
            serial_number,
        } => registry.blacklist_device(caller, fcc_id, serial_number)?,
        ScriptOp::Register { request } => registry.register(caller, request.clone())?,
        ScriptOp::Deregister {
            fcc_id,
            serial_number,
        } => registry.deregister(caller, fcc_id, serial_number)?,
        ScriptOp::GrantSpectrum { request } => registry.grant_spectrum(caller, request)?.record,
        ScriptOp::Heartbeat {
            fcc_id,
            serial_number,
            grant_id,
        } => {
            registry.heartbeat(caller, fcc_id, serial_number, grant_id)?;
            return Ok(None);
        }
        ScriptOp::Relinquish {
            fcc_id,
            serial_number,
            grant_id,
        } => registry.relinquish(caller, fcc_id, serial_number, grant_id)?,
        ScriptOp::Reset => registry.reset(caller)?,
    };
    Ok(Some(record))
}

/// One output line for a step's outcome
pub fn render_outcome(
    step: &ScriptStep,
    outcome: &SasResult<Option<EventRecord>>,
) -> serde_json::Result<String> {
    Ok(match outcome {
        Ok(Some(record)) => format!("ok {} {}", step.op.name(), serde_json::to_string(record)?),
        Ok(None) => format!("ok {}", step.op.name()),
        Err(err) => render_error(step, err),
    })
}

fn render_error(step: &ScriptStep, err: &SasError) -> String {
    format!("err {} {}: {err}", step.op.name(), err.reason())
}
