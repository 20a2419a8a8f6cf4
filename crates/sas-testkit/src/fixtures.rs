//! Well-known principals and sample requests

use sas_core::{GrantRequest, Principal, RegistrationRequest};

/// Registry owner used by every fixture
pub const OWNER: Principal = Principal::new([0x0a; 20]);
/// First SAS operator
pub const SAS_1: Principal = Principal::new([0x51; 20]);
/// Second SAS operator
pub const SAS_2: Principal = Principal::new([0x52; 20]);
/// A principal that is never authorized
pub const OUTSIDER: Principal = Principal::new([0xee; 20]);

/// Allow-listed FCC id in the default fixture
pub const FCC_ID: &str = "F1";
/// Allow-listed user id in the default fixture
pub const USER_ID: &str = "U1";
/// Recorded EIRP cap of [`FCC_ID`]
pub const FCC_MAX_EIRP: u64 = 47;

pub use sas_registry::schema::{BAND_HIGH_HZ, BAND_LOW_HZ};

/// A registration request that also passes schema validation when the ids do
pub fn sample_registration(fcc_id: &str, user_id: &str, serial_number: &str) -> RegistrationRequest {
    RegistrationRequest {
        fcc_id: fcc_id.to_string(),
        user_id: user_id.to_string(),
        cbsd_serial_number: serial_number.to_string(),
        call_sign: "CALLSIGN1".to_string(),
        cbsd_category: "A".to_string(),
        air_interface: "E_UTRA".to_string(),
        meas_capability: vec!["EUTRA_CARRIER_RSSI".to_string()],
        eirp_capability: 47,
        latitude: 375_000_000,
        longitude: -1_224_000_000,
        height: 30,
        height_type: "AGL".to_string(),
        indoor_deployment: false,
        antenna_gain: 15,
        antenna_beamwidth: 360,
        antenna_azimuth: 0,
        grouping_param: String::new(),
        cbsd_address: format!("0x{}", "0a".repeat(20)),
    }
}

/// A grant request covering the whole band at 30 dBm/MHz
pub fn sample_grant(fcc_id: &str, serial_number: &str) -> GrantRequest {
    GrantRequest {
        fcc_id: fcc_id.to_string(),
        cbsd_serial_number: serial_number.to_string(),
        channel_type: "GAA".to_string(),
        max_eirp: 30,
        low_frequency: BAND_LOW_HZ,
        high_frequency: BAND_HIGH_HZ,
        requested_max_eirp: 30,
        requested_low_frequency: BAND_LOW_HZ,
        requested_high_frequency: BAND_HIGH_HZ,
        grant_expire_time: 0,
    }
}
