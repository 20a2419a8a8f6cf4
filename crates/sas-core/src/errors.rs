//! Unified error system for registry operations
//!
//! Every rejected operation maps to exactly one variant, and every variant
//! maps to exactly one stable reason string. Callers that only need the
//! coarse taxonomy use [`SasError::category`].

use serde::{Deserialize, Serialize};

/// Coarse error taxonomy for rejected operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Caller lacks owner or SAS privilege
    Authorization,
    /// Duplicate key on creation
    Conflict,
    /// Referenced CBSD or grant absent
    NotFound,
    /// Unauthorized, blacklisted or malformed identifier
    Validation,
}

/// Unified error type for all registry operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum SasError {
    /// Owner-only operation attempted by another principal
    #[error("Not authorized: {caller} is not the registry owner")]
    NotAuthorized {
        /// Principal that attempted the call
        caller: String,
    },

    /// SAS-gated operation attempted by a principal without SAS authorization
    #[error("Not an authorized SAS: {caller}")]
    NotAnAuthorizedSas {
        /// Principal that attempted the call
        caller: String,
    },

    /// A live CBSD already occupies the key
    #[error("CBSD already exists: {device}")]
    CbsdAlreadyExists {
        /// Device designation (fccId/serial or numeric id)
        device: String,
    },

    /// FCC identifier is not on the allow-list
    #[error("FCC ID not authorized: {fcc_id}")]
    FccIdNotAuthorized {
        /// Rejected FCC identifier
        fcc_id: String,
    },

    /// User identifier is not on the allow-list
    #[error("User ID not authorized: {user_id}")]
    UserIdNotAuthorized {
        /// Rejected user identifier
        user_id: String,
    },

    /// FCC identifier is blacklisted
    #[error("FCC ID blacklisted: {fcc_id}")]
    FccIdBlacklisted {
        /// Rejected FCC identifier
        fcc_id: String,
    },

    /// Composite device key is blacklisted
    #[error("Serial number blacklisted: {fcc_id}/{serial_number}")]
    SerialNumberBlacklisted {
        /// FCC identifier of the rejected device
        fcc_id: String,
        /// Serial number of the rejected device
        serial_number: String,
    },

    /// Referenced CBSD is not registered
    #[error("CBSD not registered: {device}")]
    CbsdNotRegistered {
        /// Device designation (fccId/serial or numeric id)
        device: String,
    },

    /// Referenced grant does not exist under the device
    #[error("Grant not found: {grant_id}")]
    GrantNotFound {
        /// Requested grant identifier
        grant_id: String,
    },

    /// Request failed schema validation
    #[error("Invalid request field '{field}': {message}")]
    InvalidRequest {
        /// Offending field, in wire naming
        field: String,
        /// What was wrong with it
        message: String,
    },
}

impl SasError {
    /// Create a not-authorized (owner gate) error
    pub fn not_authorized(caller: impl ToString) -> Self {
        Self::NotAuthorized {
            caller: caller.to_string(),
        }
    }

    /// Create a not-an-authorized-SAS error
    pub fn not_an_authorized_sas(caller: impl ToString) -> Self {
        Self::NotAnAuthorizedSas {
            caller: caller.to_string(),
        }
    }

    /// Create a CBSD conflict error
    pub fn cbsd_already_exists(device: impl Into<String>) -> Self {
        Self::CbsdAlreadyExists {
            device: device.into(),
        }
    }

    /// Create a CBSD not-registered error
    pub fn cbsd_not_registered(device: impl Into<String>) -> Self {
        Self::CbsdNotRegistered {
            device: device.into(),
        }
    }

    /// Create a grant not-found error
    pub fn grant_not_found(grant_id: impl Into<String>) -> Self {
        Self::GrantNotFound {
            grant_id: grant_id.into(),
        }
    }

    /// Create a schema validation error
    pub fn invalid_request(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable reason string surfaced to callers
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotAuthorized { .. } => "NotAuthorized",
            Self::NotAnAuthorizedSas { .. } => "NotAnAuthorizedSAS",
            Self::CbsdAlreadyExists { .. } => "CBSDAlreadyExists",
            Self::FccIdNotAuthorized { .. } => "FCCIdNotAuthorized",
            Self::UserIdNotAuthorized { .. } => "UserIdNotAuthorized",
            Self::FccIdBlacklisted { .. } => "FCCIdBlacklisted",
            Self::SerialNumberBlacklisted { .. } => "SerialNumberBlacklisted",
            Self::CbsdNotRegistered { .. } => "CBSDNotRegistered",
            Self::GrantNotFound { .. } => "GrantNotFound",
            Self::InvalidRequest { .. } => "InvalidRequest",
        }
    }

    /// Taxonomy bucket for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotAuthorized { .. } | Self::NotAnAuthorizedSas { .. } => {
                ErrorCategory::Authorization
            }
            Self::CbsdAlreadyExists { .. } => ErrorCategory::Conflict,
            Self::CbsdNotRegistered { .. } | Self::GrantNotFound { .. } => {
                ErrorCategory::NotFound
            }
            Self::FccIdNotAuthorized { .. }
            | Self::UserIdNotAuthorized { .. }
            | Self::FccIdBlacklisted { .. }
            | Self::SerialNumberBlacklisted { .. }
            | Self::InvalidRequest { .. } => ErrorCategory::Validation,
        }
    }
}

/// Standard Result type for registry operations
pub type SasResult<T> = std::result::Result<T, SasError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_strings() {
        assert_eq!(SasError::not_authorized("0x01").reason(), "NotAuthorized");
        assert_eq!(
            SasError::not_an_authorized_sas("0x01").reason(),
            "NotAnAuthorizedSAS"
        );
        assert_eq!(
            SasError::cbsd_already_exists("F1/SN1").reason(),
            "CBSDAlreadyExists"
        );
        assert_eq!(SasError::grant_not_found("g").reason(), "GrantNotFound");
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            SasError::not_authorized("a").category(),
            ErrorCategory::Authorization
        );
        assert_eq!(
            SasError::cbsd_already_exists("x").category(),
            ErrorCategory::Conflict
        );
        assert_eq!(
            SasError::cbsd_not_registered("x").category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            SasError::FccIdBlacklisted {
                fcc_id: "F".to_string()
            }
            .category(),
            ErrorCategory::Validation
        );
    }

    #[test]
    fn test_display_carries_context() {
        let err = SasError::invalid_request("maxEirp", "must be between 0 and 47");
        assert_eq!(
            err.to_string(),
            "Invalid request field 'maxEirp': must be between 0 and 47"
        );
    }
}
