//! Request-schema validation
//!
//! Shape rules for registration and grant requests, applied before any
//! registry lookup when `enforce_request_schema` is set. Failures name the
//! offending field in wire (camelCase) form. A request that passes is then
//! normalized, so one device address is stored in one spelling.

use sas_core::{GrantRequest, RegistrationRequest, SasError, SasResult};

/// Accepted device categories
pub const CBSD_CATEGORIES: &[&str] = &["A", "B"];
/// Accepted air interfaces
pub const AIR_INTERFACES: &[&str] = &["E_UTRA", "E_UTRA_CA"];
/// Accepted height references
pub const HEIGHT_TYPES: &[&str] = &["AGL", "AMSL"];
/// Accepted channel types
pub const CHANNEL_TYPES: &[&str] = &["GAA", "PAL"];
/// Accepted measurement capabilities
pub const MEAS_CAPABILITIES: &[&str] = &[
    "EUTRA_CARRIER_RSSI_NON_TX",
    "EUTRA_CARRIER_RSSI_TX",
    "EUTRA_CARRIER_RSSI",
    "EUTRA_CARRIER_TX_POWER",
    "EUTRA_CARRIER_TX_POWER_NON_TX",
    "EUTRA_CARRIER_TX_POWER_TX",
];

/// Highest EIRP in dBm/MHz
pub const MAX_EIRP: u64 = 47;
/// Lower edge of the band in Hz
pub const BAND_LOW_HZ: u64 = 3_550_000_000;
/// Upper edge of the band in Hz
pub const BAND_HIGH_HZ: u64 = 3_700_000_000;

const MAX_ID_LEN: usize = 50;
const MAX_CALL_SIGN_LEN: usize = 20;
const MAX_LATITUDE: i64 = 900_000_000;
const MAX_LONGITUDE: i64 = 1_800_000_000;

fn identifier(field: &str, value: &str) -> SasResult<()> {
    if value.is_empty() || value.len() > MAX_ID_LEN {
        return Err(SasError::invalid_request(
            field,
            format!("length must be 1..={MAX_ID_LEN}"),
        ));
    }
    let valid = value
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !valid {
        return Err(SasError::invalid_request(
            field,
            "only uppercase letters, digits, '-' and '_' are allowed",
        ));
    }
    Ok(())
}

fn one_of(field: &str, value: &str, choices: &[&str]) -> SasResult<()> {
    if choices.contains(&value) {
        Ok(())
    } else {
        Err(SasError::invalid_request(
            field,
            format!("'{value}' is not one of {}", choices.join(", ")),
        ))
    }
}

fn within<T: PartialOrd + std::fmt::Display>(field: &str, value: T, min: T, max: T) -> SasResult<()> {
    if value < min || value > max {
        return Err(SasError::invalid_request(
            field,
            format!("{value} is outside {min}..={max}"),
        ));
    }
    Ok(())
}

fn frequency_range(low_field: &str, low: u64, high_field: &str, high: u64) -> SasResult<()> {
    within(low_field, low, BAND_LOW_HZ, BAND_HIGH_HZ)?;
    within(high_field, high, BAND_LOW_HZ, BAND_HIGH_HZ)?;
    if high <= low {
        return Err(SasError::invalid_request(
            high_field,
            format!("must be greater than {low_field}"),
        ));
    }
    Ok(())
}

/// Whether `value` is `0x` followed by 40 hex digits
pub fn is_address(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .is_some_and(|digits| digits.len() == 40 && digits.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Validate the shape of a registration request
pub fn validate_registration(request: &RegistrationRequest) -> SasResult<()> {
    identifier("fccId", &request.fcc_id)?;
    let user_id_len = request.user_id.chars().count();
    if user_id_len == 0 || user_id_len > MAX_ID_LEN {
        return Err(SasError::invalid_request(
            "userId",
            format!("length must be 1..={MAX_ID_LEN}"),
        ));
    }
    identifier("cbsdSerialNumber", &request.cbsd_serial_number)?;

    let call_sign_ok = !request.call_sign.is_empty()
        && request.call_sign.len() <= MAX_CALL_SIGN_LEN
        && request
            .call_sign
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    if !call_sign_ok {
        return Err(SasError::invalid_request(
            "callSign",
            format!("must be 1..={MAX_CALL_SIGN_LEN} uppercase letters or digits"),
        ));
    }

    one_of("cbsdCategory", &request.cbsd_category, CBSD_CATEGORIES)?;
    one_of("airInterface", &request.air_interface, AIR_INTERFACES)?;

    if request.meas_capability.is_empty() {
        return Err(SasError::invalid_request(
            "measCapability",
            "at least one capability is required",
        ));
    }
    for capability in &request.meas_capability {
        one_of("measCapability", capability, MEAS_CAPABILITIES)?;
    }

    within("eirpCapability", request.eirp_capability, 0, MAX_EIRP)?;
    within("latitude", request.latitude, -MAX_LATITUDE, MAX_LATITUDE)?;
    within("longitude", request.longitude, -MAX_LONGITUDE, MAX_LONGITUDE)?;
    within("height", request.height, 0, 2000)?;
    one_of("heightType", &request.height_type, HEIGHT_TYPES)?;
    within("antennaGain", request.antenna_gain, 0, 30)?;
    within("antennaBeamwidth", request.antenna_beamwidth, 1, 360)?;
    within("antennaAzimuth", request.antenna_azimuth, 0, 359)?;

    if !is_address(&request.cbsd_address) {
        return Err(SasError::invalid_request(
            "cbsdAddress",
            "must be 0x followed by 40 hex digits",
        ));
    }
    Ok(())
}

/// Canonical form of a validated registration: lowercase `cbsdAddress`
pub fn normalize_registration(request: &mut RegistrationRequest) {
    request.cbsd_address.make_ascii_lowercase();
}

/// Validate the shape of a grant request
pub fn validate_grant(request: &GrantRequest) -> SasResult<()> {
    identifier("fccId", &request.fcc_id)?;
    identifier("cbsdSerialNumber", &request.cbsd_serial_number)?;
    one_of("channelType", &request.channel_type, CHANNEL_TYPES)?;
    within("maxEirp", request.max_eirp, 0, MAX_EIRP)?;
    within("requestedMaxEirp", request.requested_max_eirp, 0, MAX_EIRP)?;
    frequency_range(
        "lowFrequency",
        request.low_frequency,
        "highFrequency",
        request.high_frequency,
    )?;
    frequency_range(
        "requestedLowFrequency",
        request.requested_low_frequency,
        "requestedHighFrequency",
        request.requested_high_frequency,
    )?;
    Ok(())
}
