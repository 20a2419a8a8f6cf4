//! CBSD and grant data model
//!
//! Wire names follow the camelCase field names external SAS clients submit,
//! so request bodies deserialize without a translation layer.

use crate::identifiers::Principal;
use crate::key::{derive_composite_key, CompositeKey, GrantId};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Registration request submitted by an SAS operator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    /// FCC identifier (must be allow-listed)
    pub fcc_id: String,
    /// User identifier (must be allow-listed)
    pub user_id: String,
    /// Device serial number
    pub cbsd_serial_number: String,
    /// Call sign
    pub call_sign: String,
    /// Device category (A or B)
    pub cbsd_category: String,
    /// Air interface technology
    pub air_interface: String,
    /// Measurement capabilities, in submission order
    pub meas_capability: Vec<String>,
    /// EIRP capability in dBm/MHz
    pub eirp_capability: u64,
    /// Latitude in microdegree scale
    pub latitude: i64,
    /// Longitude in microdegree scale
    pub longitude: i64,
    /// Antenna height in meters
    pub height: u64,
    /// Height reference (AGL or AMSL)
    pub height_type: String,
    /// Whether the device is deployed indoors
    pub indoor_deployment: bool,
    /// Antenna gain in dBi
    pub antenna_gain: u64,
    /// Antenna beamwidth in degrees
    pub antenna_beamwidth: u64,
    /// Antenna azimuth in degrees
    pub antenna_azimuth: u64,
    /// Grouping parameters. Accepted on the wire as a string or as a list of
    /// `{groupId, groupType}` objects; a list is stored as its JSON text.
    #[serde(default, deserialize_with = "grouping_param_text")]
    pub grouping_param: String,
    /// Network/contact address of the device
    pub cbsd_address: String,
}

impl RegistrationRequest {
    /// Composite key of the device this request registers
    pub fn key(&self) -> CompositeKey {
        derive_composite_key(&self.fcc_id, &self.cbsd_serial_number)
    }
}

/// A registered device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CbsdRecord {
    /// FCC identifier
    pub fcc_id: String,
    /// User identifier
    pub user_id: String,
    /// Device serial number
    pub cbsd_serial_number: String,
    /// Call sign
    pub call_sign: String,
    /// Device category
    pub cbsd_category: String,
    /// Air interface technology
    pub air_interface: String,
    /// Measurement capabilities
    pub meas_capability: Vec<String>,
    /// EIRP capability in dBm/MHz
    pub eirp_capability: u64,
    /// Latitude in microdegree scale
    pub latitude: i64,
    /// Longitude in microdegree scale
    pub longitude: i64,
    /// Antenna height in meters
    pub height: u64,
    /// Height reference
    pub height_type: String,
    /// Indoor deployment flag
    pub indoor_deployment: bool,
    /// Antenna gain in dBi
    pub antenna_gain: u64,
    /// Antenna beamwidth in degrees
    pub antenna_beamwidth: u64,
    /// Antenna azimuth in degrees
    pub antenna_azimuth: u64,
    /// Grouping parameters
    pub grouping_param: String,
    /// Network/contact address
    pub cbsd_address: String,
    /// Principal that performed the registration
    pub sas_origin: Principal,
    /// Registration time, seconds since the Unix epoch
    pub registration_timestamp: u64,
}

impl CbsdRecord {
    /// Build the stored record from an accepted request
    pub fn from_request(request: RegistrationRequest, sas_origin: Principal, now: u64) -> Self {
        Self {
            fcc_id: request.fcc_id,
            user_id: request.user_id,
            cbsd_serial_number: request.cbsd_serial_number,
            call_sign: request.call_sign,
            cbsd_category: request.cbsd_category,
            air_interface: request.air_interface,
            meas_capability: request.meas_capability,
            eirp_capability: request.eirp_capability,
            latitude: request.latitude,
            longitude: request.longitude,
            height: request.height,
            height_type: request.height_type,
            indoor_deployment: request.indoor_deployment,
            antenna_gain: request.antenna_gain,
            antenna_beamwidth: request.antenna_beamwidth,
            antenna_azimuth: request.antenna_azimuth,
            grouping_param: request.grouping_param,
            cbsd_address: request.cbsd_address,
            sas_origin,
            registration_timestamp: now,
        }
    }

    /// True for the empty record returned for absent devices
    pub fn is_empty(&self) -> bool {
        self.fcc_id.is_empty() && self.cbsd_serial_number.is_empty() && self.sas_origin.is_zero()
    }
}

/// Grant request submitted by an SAS operator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantRequest {
    /// FCC identifier of the target device
    pub fcc_id: String,
    /// Serial number of the target device
    pub cbsd_serial_number: String,
    /// Channel type (GAA or PAL)
    pub channel_type: String,
    /// Granted maximum EIRP in dBm/MHz
    pub max_eirp: u64,
    /// Granted lower frequency bound in Hz
    pub low_frequency: u64,
    /// Granted upper frequency bound in Hz
    pub high_frequency: u64,
    /// Requested maximum EIRP
    pub requested_max_eirp: u64,
    /// Requested lower frequency bound
    pub requested_low_frequency: u64,
    /// Requested upper frequency bound
    pub requested_high_frequency: u64,
    /// Expiry time of the grant; data only, never enforced by the registry
    pub grant_expire_time: u64,
}

impl GrantRequest {
    /// Composite key of the device this grant targets
    pub fn key(&self) -> CompositeKey {
        derive_composite_key(&self.fcc_id, &self.cbsd_serial_number)
    }
}

/// A spectrum grant bound to one CBSD
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grant {
    /// Grant identifier, unique within its device
    pub grant_id: GrantId,
    /// Channel type
    pub channel_type: String,
    /// Expiry time (data only)
    pub grant_expire_time: u64,
    /// Whether the grant was relinquished; never reverts to false
    pub terminated: bool,
    /// Granted maximum EIRP
    pub max_eirp: u64,
    /// Granted lower frequency bound
    pub low_frequency: u64,
    /// Granted upper frequency bound
    pub high_frequency: u64,
    /// Requested maximum EIRP
    pub requested_max_eirp: u64,
    /// Requested lower frequency bound
    pub requested_low_frequency: u64,
    /// Requested upper frequency bound
    pub requested_high_frequency: u64,
    /// Principal that issued the grant
    pub sas_origin: Principal,
    /// Issue time, seconds since the Unix epoch
    pub grant_timestamp: u64,
}

impl Grant {
    /// Build a live grant from an accepted request
    pub fn from_request(
        grant_id: GrantId,
        request: &GrantRequest,
        sas_origin: Principal,
        now: u64,
    ) -> Self {
        Self {
            grant_id,
            channel_type: request.channel_type.clone(),
            grant_expire_time: request.grant_expire_time,
            terminated: false,
            max_eirp: request.max_eirp,
            low_frequency: request.low_frequency,
            high_frequency: request.high_frequency,
            requested_max_eirp: request.requested_max_eirp,
            requested_low_frequency: request.requested_low_frequency,
            requested_high_frequency: request.requested_high_frequency,
            sas_origin,
            grant_timestamp: now,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GroupingParam {
    Text(String),
    Groups(Vec<Map<String, Value>>),
}

fn grouping_param_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let groups = match GroupingParam::deserialize(deserializer)
        .map_err(|_| D::Error::custom("groupingParam must be a string or a list of objects"))?
    {
        GroupingParam::Text(text) => return Ok(text),
        GroupingParam::Groups(groups) => groups,
    };
    for group in &groups {
        for field in ["groupId", "groupType"] {
            if !group.get(field).is_some_and(Value::is_string) {
                return Err(D::Error::custom(format!(
                    "every groupingParam entry needs a string {field}"
                )));
            }
        }
    }
    serde_json::to_string(&groups).map_err(D::Error::custom)
}
